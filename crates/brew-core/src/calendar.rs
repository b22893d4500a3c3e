//! Availability calendar
//!
//! Month grids for the date picker and half-hour time slots for the chosen
//! day. Whether a slot can be booked is decided by an injected
//! [`AvailabilityLookup`], never by chance.

use crate::config::BusinessHours;
use crate::error::ValidationError;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar month shown by the date picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = String;

    fn try_from(raw: RawYearMonth) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
            .ok_or_else(|| format!("{}-{:02} is not a calendar month", raw.year, raw.month))
    }
}

impl YearMonth {
    /// `month` is 1-based; `None` when it is out of range
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[inline]
    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[inline]
    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Weekday of the 1st, 0 = Sunday
    #[must_use]
    pub fn leading_blanks(self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    #[must_use]
    pub fn days_in_month(self) -> u32 {
        let next = self.next().first_day();
        next.signed_duration_since(self.first_day())
            .num_days()
            .unsigned_abs() as u32
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::of(
            self.first_day()
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::of(
            self.first_day()
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Heading such as `October 2026`
    #[must_use]
    pub fn title(self) -> String {
        let name = self
            .month
            .checked_sub(1)
            .and_then(|i| MONTH_NAMES.get(i as usize))
            .copied()
            .unwrap_or("Unknown");
        format!("{name} {}", self.year)
    }
}

/// One cell of the 7-column month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    /// `None` for the padding before the 1st
    pub date: Option<NaiveDate>,
    pub in_month: bool,
    pub is_today: bool,
    pub is_past: bool,
    pub is_selected: bool,
}

impl CalendarCell {
    const BLANK: CalendarCell = CalendarCell {
        date: None,
        in_month: false,
        is_today: false,
        is_past: false,
        is_selected: false,
    };

    /// Cells the customer may click
    #[inline]
    #[must_use]
    pub fn selectable(&self) -> bool {
        self.in_month && !self.is_past
    }

    #[must_use]
    pub fn day(&self) -> Option<u32> {
        self.date.map(|d| d.day())
    }
}

/// Derived grid for a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year_month: YearMonth,
    pub title: String,
    pub weekday_headers: [&'static str; 7],
    pub cells: Vec<CalendarCell>,
}

impl CalendarMonth {
    /// Cells that carry a date
    pub fn days(&self) -> impl Iterator<Item = &CalendarCell> + '_ {
        self.cells.iter().filter(|c| c.in_month)
    }
}

/// Build the month grid: blanks up to the weekday of the 1st, then one cell
/// per day. Today is not past.
#[must_use]
pub fn month_grid(
    year_month: YearMonth,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> CalendarMonth {
    let blanks = year_month.leading_blanks() as usize;
    let mut cells = vec![CalendarCell::BLANK; blanks];
    cells.extend(year_month.first_day().iter_days().take(year_month.days_in_month() as usize).map(
        |date| CalendarCell {
            date: Some(date),
            in_month: true,
            is_today: date == today,
            is_past: date < today,
            is_selected: selected == Some(date),
        },
    ));

    CalendarMonth {
        year_month,
        title: year_month.title(),
        weekday_headers: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        cells,
    }
}

/// Start time of a reservation slot, serialized as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime {
    hour: u32,
    minute: u32,
}

impl SlotTime {
    /// Only half-hour aligned times exist
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && (minute == 0 || minute == 30)).then_some(Self { hour, minute })
    }

    #[inline]
    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    #[inline]
    #[must_use]
    pub fn minute(self) -> u32 {
        self.minute
    }

    #[must_use]
    pub fn as_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Twelve-hour label, e.g. `7:00 AM`, `12:30 PM`
    #[must_use]
    pub fn label(self) -> String {
        let period = if self.hour >= 12 { "PM" } else { "AM" };
        let display_hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{display_hour}:{:02} {period}", self.minute)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for SlotTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime { slot: s.to_string() };
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour = h.parse().map_err(|_| invalid())?;
        let minute = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}

/// Time slot shown to the customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub label: String,
    pub value: SlotTime,
    pub available: bool,
}

/// Source of truth for bookable slots
pub trait AvailabilityLookup: Send + Sync {
    fn is_available(&self, date: NaiveDate, slot: SlotTime) -> bool;
}

impl<F> AvailabilityLookup for F
where
    F: Fn(NaiveDate, SlotTime) -> bool + Send + Sync,
{
    fn is_available(&self, date: NaiveDate, slot: SlotTime) -> bool {
        self(date, slot)
    }
}

/// Every slot is open
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl AvailabilityLookup for AlwaysAvailable {
    fn is_available(&self, _date: NaiveDate, _slot: SlotTime) -> bool {
        true
    }
}

/// In-memory reservation book with a table capacity per slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookedSlots {
    capacity: u32,
    booked: HashMap<(NaiveDate, SlotTime), u32>,
}

impl BookedSlots {
    /// `capacity` tables can be booked per slot
    #[must_use]
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            capacity,
            booked: HashMap::new(),
        }
    }

    /// Record one booking; returns the remaining capacity
    pub fn book(&mut self, date: NaiveDate, slot: SlotTime) -> Result<u32, ValidationError> {
        let taken = self.booked.entry((date, slot)).or_insert(0);
        if *taken >= self.capacity {
            return Err(ValidationError::SlotUnavailable {
                slot: slot.to_string(),
            });
        }
        *taken += 1;
        Ok(self.capacity - *taken)
    }

    #[must_use]
    pub fn booked(&self, date: NaiveDate, slot: SlotTime) -> u32 {
        self.booked.get(&(date, slot)).copied().unwrap_or(0)
    }
}

impl AvailabilityLookup for BookedSlots {
    fn is_available(&self, date: NaiveDate, slot: SlotTime) -> bool {
        self.booked(date, slot) < self.capacity
    }
}

/// Slots from opening hour up to, but excluding, closing hour.
///
/// On `now`'s own date, slots that already started are unavailable.
#[must_use]
pub fn time_slots(
    date: NaiveDate,
    now: NaiveDateTime,
    hours: &BusinessHours,
    availability: &dyn AvailabilityLookup,
) -> Vec<TimeSlot> {
    let step = hours.slot_minutes.max(30);
    (hours.opening_hour * 60..hours.closing_hour * 60)
        .step_by(step as usize)
        .filter_map(|minutes| SlotTime::new(minutes / 60, minutes % 60))
        .map(|slot| {
            let elapsed =
                date < now.date() || (date == now.date() && slot.as_time() <= now.time());
            TimeSlot {
                label: slot.label(),
                value: slot,
                available: !elapsed && availability.is_available(date, slot),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn february_non_leap() {
        let feb = YearMonth::new(2027, 2).unwrap();
        let grid = month_grid(feb, date(2027, 1, 10), None);
        // 1 February 2027 is a Monday
        assert_eq!(grid.cells.iter().filter(|c| !c.in_month).count(), 1);
        assert_eq!(grid.days().count(), 28);
        assert_eq!(grid.title, "February 2027");
    }

    #[test]
    fn past_today_and_selected_flags() {
        let oct = YearMonth::new(2026, 10).unwrap();
        let today = date(2026, 10, 18);
        let grid = month_grid(oct, today, Some(date(2026, 10, 19)));
        let cell = |d: u32| *grid.days().find(|c| c.day() == Some(d)).unwrap();

        assert!(cell(17).is_past);
        assert!(!cell(17).selectable());
        assert!(cell(18).is_today);
        assert!(!cell(18).is_past);
        assert!(cell(19).is_selected);
        assert!(cell(19).selectable());
    }

    #[test]
    fn month_navigation_wraps_years() {
        let dec = YearMonth::new(2026, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2027, 1).unwrap());
        assert_eq!(YearMonth::new(2027, 1).unwrap().prev(), dec);
        assert_eq!(YearMonth::new(2028, 2).unwrap().days_in_month(), 29);
        assert!(YearMonth::new(2026, 13).is_none());
    }

    #[test]
    fn deserialize_checks_month_range() {
        let oct: YearMonth = serde_json::from_str(r#"{"year":2026,"month":10}"#).unwrap();
        assert_eq!(oct, YearMonth::new(2026, 10).unwrap());
        assert_eq!(oct.title(), "October 2026");

        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2026,"month":13}"#).is_err());
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2026,"month":0}"#).is_err());
    }

    #[test]
    fn slots_cover_business_hours() {
        let day = date(2026, 10, 20);
        let now = day.pred_opt().unwrap().and_hms_opt(9, 0, 0).unwrap();
        let slots = time_slots(day, now, &BusinessHours::default(), &AlwaysAvailable);
        assert_eq!(slots.len(), 28);
        assert_eq!(slots[0].value.to_string(), "07:00");
        assert_eq!(slots[0].label, "7:00 AM");
        assert_eq!(slots[11].label, "12:30 PM");
        assert_eq!(slots.last().unwrap().value.to_string(), "20:30");
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn hourly_slots_start_on_the_hour() {
        let day = date(2026, 10, 20);
        let now = day.pred_opt().unwrap().and_hms_opt(9, 0, 0).unwrap();
        let hourly = BusinessHours {
            slot_minutes: 60,
            ..BusinessHours::default()
        };
        let slots = time_slots(day, now, &hourly, &AlwaysAvailable);
        assert_eq!(slots.len(), 14);
        assert!(slots.iter().all(|s| s.value.minute() == 0));
        assert_eq!(slots.last().unwrap().label, "8:00 PM");
    }

    #[test]
    fn elapsed_slots_today_are_unavailable() {
        let day = date(2026, 10, 18);
        let now = day.and_hms_opt(9, 10, 0).unwrap();
        let slots = time_slots(day, now, &BusinessHours::default(), &AlwaysAvailable);
        let open: Vec<String> = slots
            .iter()
            .filter(|s| s.available)
            .take(1)
            .map(|s| s.value.to_string())
            .collect();
        assert_eq!(open, vec!["09:30"]);
    }

    #[test]
    fn injected_lookup_decides_availability() {
        let day = date(2026, 10, 20);
        let now = date(2026, 10, 1).and_hms_opt(0, 0, 0).unwrap();
        let evenings_full = |_: NaiveDate, slot: SlotTime| slot.hour() < 18;
        let slots = time_slots(day, now, &BusinessHours::default(), &evenings_full);
        assert!(slots.iter().filter(|s| s.value.hour() >= 18).all(|s| !s.available));
        assert!(slots.iter().filter(|s| s.value.hour() < 18).all(|s| s.available));
    }

    #[test]
    fn booked_slots_respect_capacity() {
        let day = date(2026, 10, 20);
        let slot: SlotTime = "19:00".parse().unwrap();
        let mut book = BookedSlots::with_capacity(2);
        assert_eq!(book.book(day, slot), Ok(1));
        assert!(book.is_available(day, slot));
        assert_eq!(book.book(day, slot), Ok(0));
        assert!(!book.is_available(day, slot));
        assert!(book.book(day, slot).is_err());
    }

    #[test]
    fn slot_time_parsing() {
        assert!("07:30".parse::<SlotTime>().is_ok());
        assert!("7:30".parse::<SlotTime>().is_err());
        assert!("07:15".parse::<SlotTime>().is_err());
        assert!("24:00".parse::<SlotTime>().is_err());
        assert_eq!(
            "ab:cd".parse::<SlotTime>(),
            Err(ValidationError::InvalidTime {
                slot: "ab:cd".to_string()
            })
        );
    }
}
