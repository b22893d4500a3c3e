//! Table reservation flow
//!
//! Four linear steps: date & time, party size, contact details, review. The
//! flow owns the in-progress [`ReservationState`], the wizard position and
//! the month currently shown by the date picker.

use crate::calendar::{month_grid, time_slots, AvailabilityLookup, CalendarMonth, SlotTime, TimeSlot, YearMonth};
use crate::config::{BusinessHours, ShopConfig};
use crate::error::ValidationError;
use crate::validate::{self, FormCheck};
use crate::wizard::{StepMarker, StepValidator, Transition, WizardController, WizardStep};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Reservation wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStep {
    DateTime,
    PartySize,
    Details,
    Review,
}

impl WizardStep for ReservationStep {
    const ALL: &'static [Self] = &[
        ReservationStep::DateTime,
        ReservationStep::PartySize,
        ReservationStep::Details,
        ReservationStep::Review,
    ];

    fn number(self) -> u8 {
        match self {
            ReservationStep::DateTime => 1,
            ReservationStep::PartySize => 2,
            ReservationStep::Details => 3,
            ReservationStep::Review => 4,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ReservationStep::DateTime => "Date & Time",
            ReservationStep::PartySize => "Party Size",
            ReservationStep::Details => "Your Details",
            ReservationStep::Review => "Confirm",
        }
    }
}

/// Number of guests, at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartySize(u8);

impl PartySize {
    pub fn new(guests: u8, max: u8) -> Result<Self, ValidationError> {
        if guests == 0 || guests > max {
            Err(ValidationError::PartySizeOutOfRange { max })
        } else {
            Ok(Self(guests))
        }
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// `1 person`, `4 people`
    #[must_use]
    pub fn label(self) -> String {
        if self.0 == 1 {
            "1 person".to_string()
        } else {
            format!("{} people", self.0)
        }
    }
}

/// Contact details collected on step 3
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub occasion: Option<String>,
    pub special_requests: String,
    pub subscribe: bool,
}

impl ReservationDetails {
    /// Check every required field, reporting all failures together
    pub fn validate(&self) -> Result<(), ValidationError> {
        FormCheck::new()
            .field("name", [validate::required("name", &self.name)])
            .field(
                "email",
                [
                    validate::required("email", &self.email),
                    validate::email(&self.email),
                ],
            )
            .field(
                "phone",
                [
                    validate::required("phone", &self.phone),
                    validate::phone(&self.phone),
                ],
            )
            .finish()
    }
}

/// The reservation being assembled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationState {
    pub date: Option<NaiveDate>,
    pub time: Option<SlotTime>,
    pub party_size: Option<PartySize>,
    pub details: ReservationDetails,
}

impl StepValidator<ReservationStep> for ReservationState {
    fn validate_step(&self, step: ReservationStep) -> Result<(), ValidationError> {
        match step {
            ReservationStep::DateTime => {
                if self.date.is_none() {
                    return Err(ValidationError::DateRequired);
                }
                if self.time.is_none() {
                    return Err(ValidationError::TimeRequired);
                }
                Ok(())
            }
            ReservationStep::PartySize => self
                .party_size
                .map(|_| ())
                .ok_or(ValidationError::PartySizeRequired),
            ReservationStep::Details => self.details.validate(),
            ReservationStep::Review => Ok(()),
        }
    }
}

/// Side-panel summary of the choices so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationSummary {
    /// e.g. `Mon, Oct 19`
    pub date: Option<String>,
    /// e.g. `7:30 PM`
    pub time: Option<String>,
    /// e.g. `2 people`
    pub party: Option<String>,
}

/// Validated reservation handed to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub date: NaiveDate,
    pub time: SlotTime,
    pub party_size: PartySize,
    pub details: ReservationDetails,
}

impl ReservationRequest {
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.as_time())
    }
}

/// Confirmed reservation shown in the confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfirmation {
    /// e.g. `BCR-20261018-042`
    pub code: String,
    pub request: ReservationRequest,
}

impl ReservationConfirmation {
    /// e.g. `Monday, October 19, 2026 at 7:30 PM`
    #[must_use]
    pub fn when_label(&self) -> String {
        format!(
            "{} at {}",
            self.request.date.format("%A, %B %-d, %Y"),
            self.request.time.label()
        )
    }

    #[must_use]
    pub fn party_label(&self) -> String {
        self.request.party_size.label()
    }
}

/// Reservation wizard with its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationFlow {
    state: ReservationState,
    wizard: WizardController<ReservationStep>,
    visible_month: YearMonth,
    hours: BusinessHours,
    default_party_size: u8,
    max_party_size: u8,
    submitting: bool,
}

impl ReservationFlow {
    /// Fresh flow: tomorrow preselected, no time, default party size
    #[must_use]
    pub fn new(config: &ShopConfig, today: NaiveDate) -> Self {
        let mut flow = Self {
            state: ReservationState::default(),
            wizard: WizardController::new(),
            visible_month: YearMonth::of(today),
            hours: config.hours,
            default_party_size: config.default_party_size,
            max_party_size: config.max_party_size,
            submitting: false,
        };
        flow.reset(today);
        flow
    }

    /// Back to defaults after a confirmation
    pub fn reset(&mut self, today: NaiveDate) {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        self.state = ReservationState {
            date: Some(tomorrow),
            time: None,
            party_size: PartySize::new(self.default_party_size, self.max_party_size).ok(),
            details: ReservationDetails::default(),
        };
        self.visible_month = YearMonth::of(tomorrow);
        self.wizard.reset();
        self.submitting = false;
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &ReservationState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> ReservationStep {
        self.wizard.current()
    }

    #[inline]
    #[must_use]
    pub fn visible_month(&self) -> YearMonth {
        self.visible_month
    }

    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Pick a date; a different date clears the chosen time
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
        if date < today {
            return Err(ValidationError::DateInPast);
        }
        if self.state.date != Some(date) {
            self.state.time = None;
        }
        self.state.date = Some(date);
        self.visible_month = YearMonth::of(date);
        tracing::debug!(%date, "reservation date selected");
        Ok(())
    }

    /// Pick a time slot offered for the selected date
    pub fn select_time(
        &mut self,
        slot: SlotTime,
        now: NaiveDateTime,
        availability: &dyn AvailabilityLookup,
    ) -> Result<(), ValidationError> {
        let offered = self
            .time_slots(now, availability)
            .into_iter()
            .find(|s| s.value == slot)
            .ok_or_else(|| ValidationError::InvalidTime {
                slot: slot.to_string(),
            })?;
        if !offered.available {
            return Err(ValidationError::SlotUnavailable {
                slot: slot.to_string(),
            });
        }
        self.state.time = Some(slot);
        tracing::debug!(%slot, "reservation time selected");
        Ok(())
    }

    pub fn choose_party_size(&mut self, guests: u8) -> Result<(), ValidationError> {
        self.state.party_size = Some(PartySize::new(guests, self.max_party_size)?);
        Ok(())
    }

    pub fn update_details(&mut self, details: ReservationDetails) {
        self.state.details = details;
    }

    pub fn show_next_month(&mut self) {
        self.visible_month = self.visible_month.next();
    }

    pub fn show_prev_month(&mut self) {
        self.visible_month = self.visible_month.prev();
    }

    #[must_use]
    pub fn can_advance(&self, from: ReservationStep) -> bool {
        self.wizard.can_advance(from, &self.state)
    }

    pub fn go_to(
        &mut self,
        step: ReservationStep,
    ) -> Result<Transition<ReservationStep>, ValidationError> {
        self.wizard.go_to(step, &self.state)
    }

    /// Step-indicator click; `None` for a number with no step
    pub fn go_to_number(
        &mut self,
        number: u8,
    ) -> Option<Result<Transition<ReservationStep>, ValidationError>> {
        self.wizard.go_to_number(number, &self.state)
    }

    pub fn next(&mut self) -> Result<Transition<ReservationStep>, ValidationError> {
        self.wizard.next(&self.state)
    }

    pub fn back(&mut self) -> Transition<ReservationStep> {
        self.wizard.back()
    }

    #[must_use]
    pub fn indicator(&self) -> Vec<StepMarker> {
        self.wizard.indicator()
    }

    /// Grid for the month on screen
    #[must_use]
    pub fn calendar(&self, today: NaiveDate) -> CalendarMonth {
        month_grid(self.visible_month, today, self.state.date)
    }

    /// Slots for the selected date; empty until a date is chosen
    #[must_use]
    pub fn time_slots(&self, now: NaiveDateTime, availability: &dyn AvailabilityLookup) -> Vec<TimeSlot> {
        self.state
            .date
            .map(|date| time_slots(date, now, &self.hours, availability))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn summary(&self) -> ReservationSummary {
        ReservationSummary {
            date: self.state.date.map(|d| d.format("%a, %b %-d").to_string()),
            time: self.state.time.map(SlotTime::label),
            party: self.state.party_size.map(PartySize::label),
        }
    }

    /// Validate everything and freeze a request for the gateway
    pub fn begin_submission(&mut self) -> Result<ReservationRequest, ValidationError> {
        if self.submitting {
            return Err(ValidationError::SubmissionInFlight);
        }
        self.state.details.validate()?;
        let (Some(date), Some(time), Some(party_size)) =
            (self.state.date, self.state.time, self.state.party_size)
        else {
            return Err(ValidationError::ReservationIncomplete);
        };
        self.submitting = true;
        Ok(ReservationRequest {
            date,
            time,
            party_size,
            details: self.state.details.clone(),
        })
    }

    /// Gateway accepted: build the confirmation and start over
    pub fn complete_submission(
        &mut self,
        code: String,
        request: ReservationRequest,
        today: NaiveDate,
    ) -> ReservationConfirmation {
        tracing::info!(%code, date = %request.date, time = %request.time, "reservation confirmed");
        self.reset(today);
        ReservationConfirmation { code, request }
    }

    /// Gateway failed: keep the entered data so the customer can retry
    pub fn abort_submission(&mut self) {
        self.submitting = false;
    }
}
