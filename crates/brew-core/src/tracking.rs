//! Order tracking after checkout
//!
//! A spawned task walks the order through its stages, one per interval, and
//! streams each stage over a channel. The [`TrackingHandle`] owns the task:
//! cancelling or dropping it stops the stream, so a closed tracking view never
//! receives late updates.

use crate::cart::DeliveryOption;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrackingStage {
    Received,
    Preparing,
    ReadyForPickup,
    OutForDelivery,
    Completed,
}

impl TrackingStage {
    /// Stages in the order a customer sees them
    #[must_use]
    pub fn sequence(delivery: DeliveryOption) -> [TrackingStage; 4] {
        let handoff = match delivery {
            DeliveryOption::Pickup => TrackingStage::ReadyForPickup,
            DeliveryOption::Delivery => TrackingStage::OutForDelivery,
        };
        [
            TrackingStage::Received,
            TrackingStage::Preparing,
            handoff,
            TrackingStage::Completed,
        ]
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TrackingStage::Received => "Order received",
            TrackingStage::Preparing => "Preparing",
            TrackingStage::ReadyForPickup => "Ready for pickup",
            TrackingStage::OutForDelivery => "Out for delivery",
            TrackingStage::Completed => "Completed",
        }
    }
}

/// Live tracking of one order
#[derive(Debug)]
pub struct TrackingHandle {
    order_id: String,
    cancel: CancellationToken,
    updates: UnboundedReceiver<TrackingStage>,
    task: JoinHandle<()>,
}

impl TrackingHandle {
    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Next stage, or `None` once tracking finished or was cancelled
    pub async fn next_stage(&mut self) -> Option<TrackingStage> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            stage = self.updates.recv() => stage,
        }
    }

    /// Stop tracking; no further stages are delivered
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The stage task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stages are still being produced or are waiting to be read
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && !(self.is_finished() && self.updates.is_empty())
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start tracking an order; the first stage arrives after one `period`
///
/// Must be called from within a Tokio runtime.
#[must_use]
pub fn spawn_tracker(order_id: impl Into<String>, delivery: DeliveryOption, period: Duration) -> TrackingHandle {
    let order_id = order_id.into();
    let cancel = CancellationToken::new();
    let (tx, updates) = unbounded_channel();
    let child = cancel.clone();
    let task_order = order_id.clone();

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        for stage in TrackingStage::sequence(delivery) {
            tokio::select! {
                biased;
                () = child.cancelled() => {
                    tracing::debug!(order_id = %task_order, "order tracking cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }
            tracing::debug!(order_id = %task_order, ?stage, "order stage reached");
            if tx.send(stage).is_err() {
                return;
            }
        }
    });

    TrackingHandle {
        order_id,
        cancel,
        updates,
        task,
    }
}
