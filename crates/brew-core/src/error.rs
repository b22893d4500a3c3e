//! Error types for the storefront core
//!
//! Three families of failure exist:
//! - Validation failures: recoverable, shown to the customer as a message
//! - Configuration errors: raised while loading or checking [`ShopConfig`]
//! - Submission errors: the gateway timed out, rejected or was cancelled
//!
//! Defensive guards (a command that references state which cannot exist)
//! are not errors at all; see [`guard_breach`].
//!
//! [`ShopConfig`]: crate::config::ShopConfig

use std::time::Duration;

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum BrewError {
    /// Customer input did not pass a gate
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Shop configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Submission through the gateway failed
    #[error("submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl BrewError {
    /// Recoverable errors return control to the customer with a message
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            BrewError::Validation(_) => true,
            BrewError::Submission(_) => true,
            BrewError::Config(_) => false,
        }
    }

    /// Message suitable for a notification toast
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BrewError::Validation(e) => e.to_string(),
            BrewError::Submission(e) => e.user_message().to_string(),
            BrewError::Config(_) => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

/// Validation failures
///
/// `Display` is the customer-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a quantity")]
    NoQuantitySelected,

    #[error("Please select a date")]
    DateRequired,

    #[error("Please select a time")]
    TimeRequired,

    #[error("Please select party size")]
    PartySizeRequired,

    #[error("Party size must be between 1 and {max}")]
    PartySizeOutOfRange { max: u8 },

    #[error("Please choose a date that is not in the past")]
    DateInPast,

    #[error("The {slot} time slot is not available")]
    SlotUnavailable { slot: String },

    #[error("{slot} is not a valid reservation time")]
    InvalidTime { slot: String },

    #[error("This field is required: {field}")]
    FieldRequired { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Please fill in all required fields correctly")]
    FormIncomplete { fields: Vec<FieldError> },

    #[error("Please add items to your cart")]
    EmptyCart,

    #[error("Please complete payment information")]
    PaymentIncomplete,

    #[error("Card number must have at least 16 digits")]
    InvalidCardNumber,

    #[error("Expiry must be a valid MM/YY date")]
    InvalidExpiry,

    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,

    #[error("Please complete all reservation steps")]
    ReservationIncomplete,

    #[error("A submission is already in progress")]
    SubmissionInFlight,
}

/// A single invalid form field, collected when a whole form is checked at once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field identifier
    pub field: &'static str,
    /// Customer-facing message for that field
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, error: &ValidationError) -> Self {
        Self {
            field,
            message: error.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("business hours {opening}:00-{closing}:00 are not a valid range")]
    InvalidHours { opening: u32, closing: u32 },

    #[error("slot length must be 30 or 60 minutes, got {0}")]
    InvalidSlotLength(u32),

    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },

    #[error("default party size {default} exceeds maximum {max}")]
    InvalidPartySize { default: u8, max: u8 },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Gateway submission errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("rejected by the shop: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("submission cancelled")]
    Cancelled,

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<SubmissionError>,
    },
}

impl SubmissionError {
    /// Whether another attempt may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }

    /// Message suitable for a notification toast
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "The shop could not accept this request. Please review your details.",
            Self::Cancelled => "Request cancelled.",
            Self::Timeout(_) | Self::Transport(_) | Self::Exhausted { .. } => {
                "We could not reach the shop. Please try again."
            }
        }
    }
}

/// Report a command that referenced state which cannot exist.
///
/// With the `strict-debug` feature this panics so the broken caller is found
/// during development. Otherwise the anomaly is logged and the caller treats
/// the command as a no-op.
#[track_caller]
pub(crate) fn guard_breach(context: &str) {
    #[cfg(feature = "strict-debug")]
    panic!("guard breached: {context}");

    #[cfg(not(feature = "strict-debug"))]
    tracing::warn!(context, location = %std::panic::Location::caller(), "guard breached, ignoring command");
}
