//! Async driver around [`Session`]
//!
//! Feeds commands to the session, renders each [`Outcome`] into a
//! [`RenderSink`] and runs the resulting effects: gateway submissions with
//! the configured retry policy and order tracking.

use crate::dispatch::{Command, Effect, Outcome, RenderSink, Session, Settlement, ViewUpdate};
use crate::submission::{submit_with_policy, SubmissionGateway};
use crate::tracking::{spawn_tracker, TrackingHandle, TrackingStage};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Storefront<R: RenderSink> {
    session: Session,
    gateway: Arc<dyn SubmissionGateway>,
    sink: R,
    cancel: CancellationToken,
    tracker: Option<TrackingHandle>,
}

impl<R: RenderSink> Storefront<R> {
    /// Wrap a session and paint its initial view
    pub fn new(session: Session, gateway: Arc<dyn SubmissionGateway>, mut sink: R) -> Self {
        for update in session.initial_view() {
            sink.render(&update);
        }
        Self {
            session,
            gateway,
            sink,
            cancel: CancellationToken::new(),
            tracker: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    /// Token that aborts submissions in flight. A cancelled token is replaced
    /// on the next [`Storefront::handle`] call.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Apply `command` and run its effects to completion.
    ///
    /// Submissions are awaited here; their settlement is dispatched before
    /// this returns.
    pub async fn handle(&mut self, command: Command) {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            let outcome = self.session.dispatch(command);
            self.sink.apply(&outcome);
            let Outcome { effects, .. } = outcome;
            for effect in effects {
                if let Some(settled) = self.run_effect(effect).await {
                    queue.push_back(settled);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<Command> {
        match effect {
            Effect::Submit(request) => {
                let policy = self.session.config().submission;
                let result =
                    submit_with_policy(&*self.gateway, &request, &policy, &self.cancel).await;
                Some(Command::Settled(Settlement { request, result }))
            }
            Effect::StartTracking { order_id, delivery } => {
                let period = self.session.config().tracking_interval();
                // replacing the handle cancels any previous tracker
                self.tracker = Some(spawn_tracker(order_id, delivery, period));
                None
            }
        }
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracker.as_ref().is_some_and(TrackingHandle::is_active)
    }

    /// Wait for the next tracking stage and render it
    pub async fn next_tracking_update(&mut self) -> Option<TrackingStage> {
        let tracker = self.tracker.as_mut()?;
        let Some(stage) = tracker.next_stage().await else {
            self.tracker = None;
            return None;
        };
        let update = ViewUpdate::Tracking {
            order_id: tracker.order_id().to_string(),
            stage,
            label: stage.label(),
        };
        self.sink.render(&update);
        if stage == TrackingStage::Completed {
            self.tracker = None;
        }
        Some(stage)
    }

    /// Close the tracking view
    pub fn stop_tracking(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.cancel();
        }
    }
}
