//! Command dispatcher
//!
//! [`Session`] owns both flows and is the single entry point for customer
//! input. Each [`Command`] is applied synchronously and yields an [`Outcome`]:
//! view updates for the renderer, toast notifications, and [`Effect`]s that
//! the async driver must run (a gateway submission or order tracking). The
//! settled result of a submission comes back in as another command, so all
//! state changes happen inside `dispatch`.

use crate::calendar::{AvailabilityLookup, CalendarMonth, SlotTime, TimeSlot};
use crate::cart::{CartView, Customization, DeliveryOption};
use crate::catalog::{Catalog, MenuItemId};
use crate::clock::Clock;
use crate::config::ShopConfig;
use crate::contact::ContactForm;
use crate::error::{guard_breach, BrewError, SubmissionError};
use crate::invite::CalendarInvite;
use crate::notify::Notification;
use crate::order::{OrderFlow, OrderReceipt};
use crate::payment::PaymentDetails;
use crate::reservation::{ReservationConfirmation, ReservationDetails, ReservationFlow, ReservationSummary};
use crate::submission::{SubmissionReceipt, SubmissionRequest};
use crate::tracking::TrackingStage;
use crate::wizard::StepMarker;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Input for the reservation page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationCommand {
    SelectDate(NaiveDate),
    SelectTime(SlotTime),
    ChoosePartySize(u8),
    UpdateDetails(ReservationDetails),
    Next,
    Back,
    GoToStep(u8),
    PrevMonth,
    NextMonth,
    Submit,
    /// Export the last confirmed reservation as an `.ics` file
    DownloadInvite,
}

/// Input for the order page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    AdjustQuantity { item: MenuItemId, delta: i32 },
    AddToCart(MenuItemId),
    Customize(Customization),
    SetDelivery(DeliveryOption),
    UpdatePayment(PaymentDetails),
    Next,
    Back,
    GoToStep(u8),
    PlaceOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reservation(ReservationCommand),
    Order(OrderCommand),
    SubmitContact(ContactForm),
    /// A submission finished, one way or another
    Settled(Settlement),
}

/// Final result of a submission, fed back through [`Session::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub request: SubmissionRequest,
    pub result: Result<SubmissionReceipt, SubmissionError>,
}

/// Work the driver performs outside the synchronous core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit(SubmissionRequest),
    StartTracking {
        order_id: String,
        delivery: DeliveryOption,
    },
}

/// Data the renderer should redraw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ViewUpdate {
    Cart(CartView),
    PendingQuantity { item: MenuItemId, quantity: u32 },
    OrderSteps(Vec<StepMarker>),
    ReservationSteps(Vec<StepMarker>),
    Calendar(CalendarMonth),
    TimeSlots(Vec<TimeSlot>),
    ReservationSummary(ReservationSummary),
    ReservationConfirmed {
        code: String,
        when: String,
        party: String,
    },
    OrderPlaced(OrderReceipt),
    Tracking {
        order_id: String,
        stage: TrackingStage,
        label: &'static str,
    },
    CalendarFile { file_name: String, contents: String },
    ContactSent,
    /// A submit button switches between idle and "Processing..."
    Submitting { kind: &'static str, in_flight: bool },
}

/// Everything produced by one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub updates: Vec<ViewUpdate>,
    pub notifications: Vec<Notification>,
    pub effects: Vec<Effect>,
}

impl Outcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.notifications.is_empty() && self.effects.is_empty()
    }
}

/// Presentation collaborator
pub trait RenderSink {
    fn render(&mut self, update: &ViewUpdate);

    fn notify(&mut self, notification: &Notification);

    /// Apply a whole outcome, updates first
    fn apply(&mut self, outcome: &Outcome) {
        for update in &outcome.updates {
            self.render(update);
        }
        for notification in &outcome.notifications {
            self.notify(notification);
        }
    }
}

/// One customer's browsing session
pub struct Session {
    config: ShopConfig,
    clock: Arc<dyn Clock>,
    availability: Arc<dyn AvailabilityLookup>,
    catalog: Catalog,
    reservation: ReservationFlow,
    order: OrderFlow,
    contact_in_flight: bool,
    last_confirmation: Option<ReservationConfirmation>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("reservation_step", &self.reservation.step())
            .field("order_step", &self.order.step())
            .field("cart_items", &self.order.cart().item_count())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        config: ShopConfig,
        clock: Arc<dyn Clock>,
        availability: Arc<dyn AvailabilityLookup>,
    ) -> Self {
        let reservation = ReservationFlow::new(&config, clock.today());
        let order = OrderFlow::new(&config);
        Self {
            config,
            clock,
            availability,
            catalog: Catalog::house_menu(),
            reservation,
            order,
            contact_in_flight: false,
            last_confirmation: None,
        }
    }

    /// Session configured from a TOML or JSON file
    pub fn from_config_file(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
        availability: Arc<dyn AvailabilityLookup>,
    ) -> Result<Self, BrewError> {
        let config = ShopConfig::load(path)?;
        Ok(Self::new(config, clock, availability))
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn reservation(&self) -> &ReservationFlow {
        &self.reservation
    }

    #[inline]
    #[must_use]
    pub fn order(&self) -> &OrderFlow {
        &self.order
    }

    #[must_use]
    pub fn last_confirmation(&self) -> Option<&ReservationConfirmation> {
        self.last_confirmation.as_ref()
    }

    /// Everything needed for the first paint
    #[must_use]
    pub fn initial_view(&self) -> Vec<ViewUpdate> {
        let mut updates = vec![
            ViewUpdate::Cart(self.order.cart().view()),
            ViewUpdate::OrderSteps(self.order.indicator()),
        ];
        self.push_reservation_views(&mut updates);
        updates
    }

    fn push_reservation_views(&self, updates: &mut Vec<ViewUpdate>) {
        updates.push(ViewUpdate::ReservationSteps(self.reservation.indicator()));
        updates.push(ViewUpdate::Calendar(self.reservation.calendar(self.clock.today())));
        updates.push(ViewUpdate::TimeSlots(
            self.reservation.time_slots(self.clock.now(), &*self.availability),
        ));
        updates.push(ViewUpdate::ReservationSummary(self.reservation.summary()));
    }

    fn reject(&self, outcome: &mut Outcome, err: impl Into<BrewError>) {
        let err = err.into();
        tracing::debug!(%err, recoverable = err.is_recoverable(), "command rejected");
        outcome
            .notifications
            .push(Notification::from_error(&err, self.config.notification_ttl()));
    }

    /// Apply one command
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let mut outcome = Outcome::default();
        match command {
            Command::Reservation(cmd) => self.dispatch_reservation(cmd, &mut outcome),
            Command::Order(cmd) => self.dispatch_order(cmd, &mut outcome),
            Command::SubmitContact(form) => self.submit_contact(form, &mut outcome),
            Command::Settled(settlement) => self.settle(settlement, &mut outcome),
        }
        outcome
    }

    fn dispatch_reservation(&mut self, command: ReservationCommand, outcome: &mut Outcome) {
        // the invite only reads the last confirmation
        if self.reservation.is_submitting() && command != ReservationCommand::DownloadInvite {
            guard_breach("reservation command while submission in flight");
            return;
        }
        let today = self.clock.today();
        let result = match command {
            ReservationCommand::SelectDate(date) => {
                self.reservation.select_date(date, today).map(|()| {
                    outcome.updates.push(ViewUpdate::Calendar(self.reservation.calendar(today)));
                    outcome.updates.push(ViewUpdate::TimeSlots(
                        self.reservation.time_slots(self.clock.now(), &*self.availability),
                    ));
                    outcome
                        .updates
                        .push(ViewUpdate::ReservationSummary(self.reservation.summary()));
                })
            }
            ReservationCommand::SelectTime(slot) => self
                .reservation
                .select_time(slot, self.clock.now(), &*self.availability)
                .map(|()| {
                    outcome.updates.push(ViewUpdate::TimeSlots(
                        self.reservation.time_slots(self.clock.now(), &*self.availability),
                    ));
                    outcome
                        .updates
                        .push(ViewUpdate::ReservationSummary(self.reservation.summary()));
                }),
            ReservationCommand::ChoosePartySize(guests) => {
                self.reservation.choose_party_size(guests).map(|()| {
                    outcome
                        .updates
                        .push(ViewUpdate::ReservationSummary(self.reservation.summary()));
                })
            }
            ReservationCommand::UpdateDetails(details) => {
                self.reservation.update_details(details);
                Ok(())
            }
            ReservationCommand::Next => self.reservation.next().map(|_| ()),
            ReservationCommand::Back => {
                self.reservation.back();
                Ok(())
            }
            ReservationCommand::GoToStep(number) => match self.reservation.go_to_number(number) {
                Some(moved) => moved.map(|_| ()),
                None => return,
            },
            ReservationCommand::PrevMonth => {
                self.reservation.show_prev_month();
                outcome.updates.push(ViewUpdate::Calendar(self.reservation.calendar(today)));
                Ok(())
            }
            ReservationCommand::NextMonth => {
                self.reservation.show_next_month();
                outcome.updates.push(ViewUpdate::Calendar(self.reservation.calendar(today)));
                Ok(())
            }
            ReservationCommand::Submit => self.reservation.begin_submission().map(|request| {
                tracing::info!(date = %request.date, time = %request.time, "submitting reservation");
                outcome.updates.push(ViewUpdate::Submitting {
                    kind: "reservation",
                    in_flight: true,
                });
                outcome
                    .effects
                    .push(Effect::Submit(SubmissionRequest::Reservation(request)));
            }),
            ReservationCommand::DownloadInvite => {
                self.download_invite(outcome);
                return;
            }
        };

        if let Err(err) = result {
            self.reject(outcome, err);
        }
        outcome
            .updates
            .push(ViewUpdate::ReservationSteps(self.reservation.indicator()));
    }

    fn download_invite(&self, outcome: &mut Outcome) {
        let Some(confirmation) = &self.last_confirmation else {
            guard_breach("invite requested before any reservation was confirmed");
            return;
        };
        let invite = CalendarInvite::for_reservation(&confirmation.request, &self.config);
        let millis = self.clock.now().and_utc().timestamp_millis();
        outcome.updates.push(ViewUpdate::CalendarFile {
            file_name: CalendarInvite::file_name(millis),
            contents: invite.to_ics(),
        });
        outcome.notifications.push(Notification::success(
            "Calendar event downloaded",
            self.config.notification_ttl(),
        ));
    }

    fn dispatch_order(&mut self, command: OrderCommand, outcome: &mut Outcome) {
        // the cart is frozen until the gateway answers
        if self.order.is_submitting() {
            guard_breach("order command while submission in flight");
            return;
        }
        let result = match command {
            OrderCommand::AdjustQuantity { item, delta } => {
                if self.catalog.get(item).is_none() {
                    guard_breach("quantity change for unknown menu item");
                    return;
                }
                let quantity = self.order.adjust_quantity(item, delta);
                outcome
                    .updates
                    .push(ViewUpdate::PendingQuantity { item, quantity });
                Ok(())
            }
            OrderCommand::AddToCart(id) => {
                let Some(item) = self.catalog.get(id) else {
                    guard_breach("add to cart for unknown menu item");
                    return;
                };
                match self.order.add_to_cart(item) {
                    Ok(added) => {
                        tracing::debug!(item = %id, quantity = added.quantity, result = ?added.outcome, "added to cart");
                        outcome.notifications.push(Notification::success(
                            format!("{} {}(s) added to cart!", added.quantity, item.name),
                            self.config.notification_ttl(),
                        ));
                        outcome.updates.push(ViewUpdate::PendingQuantity {
                            item: id,
                            quantity: 0,
                        });
                        outcome.updates.push(ViewUpdate::Cart(self.order.cart().view()));
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            OrderCommand::Customize(customization) => {
                self.order.set_customization(customization);
                Ok(())
            }
            OrderCommand::SetDelivery(option) => {
                self.order.set_delivery(option);
                outcome.updates.push(ViewUpdate::Cart(self.order.cart().view()));
                Ok(())
            }
            OrderCommand::UpdatePayment(payment) => {
                self.order.update_payment(payment);
                Ok(())
            }
            OrderCommand::Next => self.order.next().map(|_| ()),
            OrderCommand::Back => {
                self.order.back();
                Ok(())
            }
            OrderCommand::GoToStep(number) => match self.order.go_to_number(number) {
                Some(moved) => moved.map(|_| ()),
                None => return,
            },
            OrderCommand::PlaceOrder => self.order.begin_submission().map(|request| {
                tracing::info!(items = request.item_count(), total = %request.totals.total, "placing order");
                outcome.updates.push(ViewUpdate::Submitting {
                    kind: "order",
                    in_flight: true,
                });
                outcome
                    .effects
                    .push(Effect::Submit(SubmissionRequest::Order(request)));
            }),
        };

        if let Err(err) = result {
            self.reject(outcome, err);
        }
        outcome
            .updates
            .push(ViewUpdate::OrderSteps(self.order.indicator()));
    }

    fn submit_contact(&mut self, form: ContactForm, outcome: &mut Outcome) {
        if self.contact_in_flight {
            guard_breach("contact form submitted twice");
            return;
        }
        if let Err(err) = form.validate() {
            self.reject(outcome, err);
            return;
        }
        self.contact_in_flight = true;
        outcome.updates.push(ViewUpdate::Submitting {
            kind: "contact",
            in_flight: true,
        });
        outcome
            .effects
            .push(Effect::Submit(SubmissionRequest::Contact(form)));
    }

    fn settle(&mut self, settlement: Settlement, outcome: &mut Outcome) {
        let Settlement { request, result } = settlement;
        let kind = request.kind();
        outcome.updates.push(ViewUpdate::Submitting {
            kind,
            in_flight: false,
        });

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(kind, %err, "submission failed");
                match request {
                    SubmissionRequest::Reservation(_) => self.reservation.abort_submission(),
                    SubmissionRequest::Order(_) => self.order.abort_submission(),
                    SubmissionRequest::Contact(_) => self.contact_in_flight = false,
                }
                outcome.notifications.push(Notification::from_error(
                    &BrewError::from(err),
                    self.config.notification_ttl(),
                ));
                return;
            }
        };

        match (request, receipt) {
            (SubmissionRequest::Reservation(request), SubmissionReceipt::Reservation { code }) => {
                let confirmation =
                    self.reservation
                        .complete_submission(code, request, self.clock.today());
                outcome.updates.push(ViewUpdate::ReservationConfirmed {
                    code: confirmation.code.clone(),
                    when: confirmation.when_label(),
                    party: confirmation.party_label(),
                });
                self.push_reservation_views(&mut outcome.updates);
                self.last_confirmation = Some(confirmation);
            }
            (SubmissionRequest::Order(request), SubmissionReceipt::Order { order_id }) => {
                let delivery = request.delivery;
                let receipt = self.order.complete_submission(order_id.clone(), request);
                outcome.updates.push(ViewUpdate::OrderPlaced(receipt));
                outcome.updates.push(ViewUpdate::Cart(self.order.cart().view()));
                outcome
                    .updates
                    .push(ViewUpdate::OrderSteps(self.order.indicator()));
                outcome
                    .effects
                    .push(Effect::StartTracking { order_id, delivery });
            }
            (SubmissionRequest::Contact(_), SubmissionReceipt::Contact) => {
                self.contact_in_flight = false;
                outcome.updates.push(ViewUpdate::ContactSent);
                outcome.notifications.push(Notification::success(
                    "Thank you! Your message has been sent.",
                    self.config.notification_ttl(),
                ));
            }
            (request, _) => {
                guard_breach("gateway receipt does not match the request");
                match request {
                    SubmissionRequest::Reservation(_) => self.reservation.abort_submission(),
                    SubmissionRequest::Order(_) => self.order.abort_submission(),
                    SubmissionRequest::Contact(_) => self.contact_in_flight = false,
                }
            }
        }
    }
}
