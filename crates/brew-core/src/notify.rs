//! Toast notifications handed to the renderer

use crate::error::{BrewError, SubmissionError};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient message; the renderer removes it after `ttl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub ttl: Duration,
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(NotificationKind::Success, message, ttl)
    }

    /// Toast carrying the customer-facing message of `err`. A cancellation
    /// the customer asked for is informational.
    #[must_use]
    pub fn from_error(err: &BrewError, ttl: Duration) -> Self {
        let kind = match err {
            BrewError::Submission(SubmissionError::Cancelled) => NotificationKind::Info,
            _ => NotificationKind::Error,
        };
        Self::new(kind, err.user_message(), ttl)
    }
}
