//! Asynchronous submission of reservations, orders and contact messages
//!
//! The flows never talk to a backend directly. They freeze a request, hand it
//! to a [`SubmissionGateway`] through [`submit_with_policy`], and apply the
//! outcome when it settles. Every attempt runs under a timeout, retryable
//! failures back off exponentially, and a [`CancellationToken`] aborts the
//! whole submission at any await point.

use crate::clock::Clock;
use crate::config::SubmissionPolicy;
use crate::contact::ContactForm;
use crate::error::SubmissionError;
use crate::order::OrderRequest;
use crate::reservation::ReservationRequest;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

/// Backend seam for everything the customer submits
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Returns the reservation code, e.g. `BCR-20261018-042`
    async fn submit_reservation(&self, request: &ReservationRequest) -> Result<String, SubmissionError>;

    /// Returns the order id
    async fn submit_order(&self, request: &OrderRequest) -> Result<String, SubmissionError>;

    async fn submit_contact(&self, form: &ContactForm) -> Result<(), SubmissionError>;
}

/// A frozen request waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubmissionRequest {
    Reservation(ReservationRequest),
    Order(OrderRequest),
    Contact(ContactForm),
}

impl SubmissionRequest {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionRequest::Reservation(_) => "reservation",
            SubmissionRequest::Order(_) => "order",
            SubmissionRequest::Contact(_) => "contact",
        }
    }
}

/// What the gateway handed back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubmissionReceipt {
    Reservation { code: String },
    Order { order_id: String },
    Contact,
}

async fn send_once(
    gateway: &dyn SubmissionGateway,
    request: &SubmissionRequest,
) -> Result<SubmissionReceipt, SubmissionError> {
    match request {
        SubmissionRequest::Reservation(r) => gateway
            .submit_reservation(r)
            .await
            .map(|code| SubmissionReceipt::Reservation { code }),
        SubmissionRequest::Order(o) => gateway
            .submit_order(o)
            .await
            .map(|order_id| SubmissionReceipt::Order { order_id }),
        SubmissionRequest::Contact(c) => gateway
            .submit_contact(c)
            .await
            .map(|()| SubmissionReceipt::Contact),
    }
}

/// Send `request` with timeout, retry and cancellation
pub async fn submit_with_policy(
    gateway: &dyn SubmissionGateway,
    request: &SubmissionRequest,
    policy: &SubmissionPolicy,
    cancel: &CancellationToken,
) -> Result<SubmissionReceipt, SubmissionError> {
    let attempts = policy.max_retries + 1;
    let mut attempt = 0;

    loop {
        attempt += 1;
        let timeout = policy.attempt_timeout();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(kind = request.kind(), attempt, "submission cancelled");
                return Err(SubmissionError::Cancelled);
            }
            sent = tokio::time::timeout(timeout, send_once(gateway, request)) => {
                sent.unwrap_or(Err(SubmissionError::Timeout(timeout)))
            }
        };

        let err = match result {
            Ok(receipt) => {
                tracing::info!(kind = request.kind(), attempt, "submission accepted");
                return Ok(receipt);
            }
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => err,
        };

        if attempt >= attempts {
            tracing::warn!(kind = request.kind(), attempts, %err, "submission gave up");
            return Err(SubmissionError::Exhausted {
                attempts,
                last: Box::new(err),
            });
        }

        let delay = policy.backoff(attempt - 1);
        tracing::warn!(kind = request.kind(), attempt, %err, ?delay, "submission failed, retrying");
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SubmissionError::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
}

/// Gateway that only waits, then accepts
///
/// Reservation codes are `BCR-<today>-NNN`; order ids are ULIDs stamped with
/// the clock's time. Seed it for reproducible codes.
pub struct SimulatedGateway {
    latency: Duration,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for SimulatedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedGateway")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl SimulatedGateway {
    #[must_use]
    pub fn new(latency: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            latency,
            clock,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }
}

#[async_trait]
impl SubmissionGateway for SimulatedGateway {
    async fn submit_reservation(&self, request: &ReservationRequest) -> Result<String, SubmissionError> {
        tokio::time::sleep(self.latency).await;
        let serial: u32 = self.rng.lock().await.random_range(0..1000);
        let code = format!("BCR-{}-{serial:03}", self.clock.today().format("%Y%m%d"));
        tracing::debug!(%code, date = %request.date, "simulated reservation accepted");
        Ok(code)
    }

    async fn submit_order(&self, request: &OrderRequest) -> Result<String, SubmissionError> {
        tokio::time::sleep(self.latency).await;
        let millis = u64::try_from(self.clock.now().and_utc().timestamp_millis()).unwrap_or(0);
        let random: u128 = self.rng.lock().await.random();
        let order_id = Ulid::from_parts(millis, random).to_string();
        tracing::debug!(%order_id, items = request.item_count(), "simulated order accepted");
        Ok(order_id)
    }

    async fn submit_contact(&self, form: &ContactForm) -> Result<(), SubmissionError> {
        tokio::time::sleep(self.latency).await;
        tracing::debug!(subject = %form.subject, "simulated contact message accepted");
        Ok(())
    }
}
