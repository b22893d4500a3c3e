//! Brew & Co. storefront core
//!
//! Business logic behind the café site, free of any presentation layer:
//! - A generic multi-step wizard with per-step validation gates
//! - The cart ledger with exact-decimal pricing
//! - The reservation calendar: month grids and bookable time slots
//! - Order and reservation flows, contact form and calendar invite export
//! - A command dispatcher plus an async driver for submissions and tracking
//!
//! # Example
//!
//! ```rust,ignore
//! use brew_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = ShopConfig::default();
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock);
//! let session = Session::new(config.clone(), clock.clone(), Arc::new(AlwaysAvailable));
//! let gateway = Arc::new(SimulatedGateway::new(config.submission.simulated_latency(), clock));
//! let mut store = Storefront::new(session, gateway, my_renderer);
//!
//! store
//!     .handle(Command::Order(OrderCommand::AdjustQuantity { item: MenuItemId(1), delta: 2 }))
//!     .await;
//! store.handle(Command::Order(OrderCommand::AddToCart(MenuItemId(1)))).await;
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Domain
pub mod calendar;
pub mod cart;
pub mod catalog;
pub mod money;
pub mod wizard;

// Flows and forms
pub mod contact;
pub mod invite;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod validate;

// Orchestration
pub mod dispatch;
pub mod notify;
pub mod storefront;
pub mod submission;
pub mod tracking;

// Ambient
pub mod clock;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-exports for convenience
pub use calendar::{
    month_grid, time_slots, AlwaysAvailable, AvailabilityLookup, BookedSlots, CalendarCell,
    CalendarMonth, SlotTime, TimeSlot, YearMonth,
};
pub use cart::{
    AddOutcome, CartLedger, CartRow, CartTotals, CartView, Customization, DeliveryOption,
    LineItem, Milk, QuantityPicker, Size,
};
pub use catalog::{Catalog, Category, MenuItem, MenuItemId};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BusinessHours, ShopConfig, SubmissionPolicy};
pub use contact::ContactForm;
pub use dispatch::{
    Command, Effect, OrderCommand, Outcome, RenderSink, ReservationCommand, Session, Settlement,
    ViewUpdate,
};
pub use error::{BrewError, ConfigError, FieldError, SubmissionError, ValidationError};
pub use invite::CalendarInvite;
pub use money::Money;
pub use notify::{Notification, NotificationKind};
pub use order::{OrderFlow, OrderReceipt, OrderRequest, OrderState, OrderStep};
pub use payment::PaymentDetails;
pub use reservation::{
    PartySize, ReservationConfirmation, ReservationDetails, ReservationFlow, ReservationRequest,
    ReservationState, ReservationStep, ReservationSummary,
};
pub use storefront::Storefront;
pub use submission::{
    submit_with_policy, SimulatedGateway, SubmissionGateway, SubmissionReceipt, SubmissionRequest,
};
pub use tracking::{spawn_tracker, TrackingHandle, TrackingStage};
pub use wizard::{StepMarker, StepValidator, Transition, WizardController, WizardStep};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a storefront session
    pub use crate::{
        AlwaysAvailable, AvailabilityLookup, CartLedger, Catalog, Clock, Command, ContactForm,
        Customization, DeliveryOption, FixedClock, MenuItemId, Money, Notification, OrderCommand,
        RenderSink, ReservationCommand, ReservationDetails, Session, ShopConfig, SimulatedGateway,
        SlotTime, Storefront, SystemClock, ValidationError, ViewUpdate, WizardStep,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
