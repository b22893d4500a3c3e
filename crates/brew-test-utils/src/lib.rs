//! Testing utilities for the storefront workspace
//!
//! Shared fixtures, a recording renderer, a scripted gateway and the seeded
//! session simulator.

#![allow(missing_docs)]

pub mod simulator;

use async_trait::async_trait;
use brew_core::prelude::*;
use brew_core::{
    CartView, OrderRequest, PaymentDetails, ReservationRequest, SubmissionError,
    SubmissionGateway,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub use simulator::{run_simulator, SimulatorConfig, SimulatorReport};

/// Fixed "today" for every fixture: Sunday, October 18 2026
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// 10:00 on [`today`]
pub fn fixed_now() -> NaiveDateTime {
    today().and_hms_opt(10, 0, 0).unwrap()
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at(fixed_now()))
}

/// Session on the fixed clock with every slot open
pub fn session() -> Session {
    session_with(Arc::new(AlwaysAvailable))
}

pub fn session_with(availability: Arc<dyn AvailabilityLookup>) -> Session {
    Session::new(ShopConfig::default(), fixed_clock(), availability)
}

/// Deterministic partial availability: a slot is closed when the day of the
/// month plus the hour is a multiple of five
pub fn patchy_availability() -> Arc<dyn AvailabilityLookup> {
    use chrono::Datelike;
    Arc::new(|date: NaiveDate, slot: SlotTime| (date.day() + slot.hour()) % 5 != 0)
}

pub fn sample_details() -> ReservationDetails {
    ReservationDetails {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "+1 (555) 010-2030".into(),
        occasion: Some("Birthday".into()),
        special_requests: "Window seat, please".into(),
        subscribe: true,
    }
}

pub fn sample_card() -> PaymentDetails {
    PaymentDetails {
        card_number: "4242 4242 4242 4242".into(),
        card_name: "Ada Lovelace".into(),
        expiry: "09/28".into(),
        cvv: "123".into(),
    }
}

pub fn sample_contact() -> ContactForm {
    ContactForm {
        name: "Grace Hopper".into(),
        email: "grace@example.com".into(),
        subject: "Catering".into(),
        message: "Could you cater a team breakfast for 12?".into(),
    }
}

/// Two espressos and a latte, the canonical pricing example
pub fn espresso_and_latte_cart() -> CartLedger {
    let menu = Catalog::house_menu();
    let mut cart = CartLedger::new(&ShopConfig::default());
    for (id, quantity) in [(1, 2), (3, 1)] {
        let item = menu.get(MenuItemId(id)).unwrap();
        cart.add_item(item, quantity, Customization::default()).unwrap();
    }
    cart
}

/// Renderer that keeps everything it was given
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<ViewUpdate>,
    pub notifications: Vec<Notification>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<&str> {
        self.notifications.iter().map(|n| n.message.as_str()).collect()
    }

    pub fn last_cart(&self) -> Option<&CartView> {
        self.updates.iter().rev().find_map(|u| match u {
            ViewUpdate::Cart(view) => Some(view),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.updates.clear();
        self.notifications.clear();
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, update: &ViewUpdate) {
        self.updates.push(update.clone());
    }

    fn notify(&mut self, notification: &Notification) {
        self.notifications.push(notification.clone());
    }
}

/// Gateway that replays queued failures before accepting
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    failures: Mutex<VecDeque<SubmissionError>>,
    latency: Duration,
    attempts: AtomicU32,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail the next attempts with `errors`, in order
    pub fn failing_with(self, errors: impl IntoIterator<Item = SubmissionError>) -> Self {
        Self {
            failures: Mutex::new(errors.into_iter().collect()),
            ..self
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn attempt(&self) -> Result<(), SubmissionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        match self.failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SubmissionGateway for ScriptedGateway {
    async fn submit_reservation(&self, _request: &ReservationRequest) -> Result<String, SubmissionError> {
        self.attempt().await?;
        Ok(format!("BCR-{}-042", today().format("%Y%m%d")))
    }

    async fn submit_order(&self, request: &OrderRequest) -> Result<String, SubmissionError> {
        self.attempt().await?;
        Ok(format!("ORDER-{:03}", request.item_count()))
    }

    async fn submit_contact(&self, _form: &ContactForm) -> Result<(), SubmissionError> {
        self.attempt().await
    }
}
