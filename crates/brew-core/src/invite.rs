//! iCalendar export of a confirmed reservation

use crate::config::ShopConfig;
use crate::reservation::ReservationRequest;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

const STAMP: &str = "%Y%m%dT%H%M%SZ";

/// Event ready to be written as a `.ics` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarInvite {
    pub summary: String,
    /// UTC
    pub starts_at: NaiveDateTime,
    /// UTC
    pub ends_at: NaiveDateTime,
    pub location: String,
    pub description: String,
}

impl CalendarInvite {
    /// Event for `request`, shifted from the shop's local time to UTC
    #[must_use]
    pub fn for_reservation(request: &ReservationRequest, config: &ShopConfig) -> Self {
        let local = request.starts_at();
        let starts_at = local - Duration::minutes(i64::from(config.utc_offset_minutes));
        let ends_at = starts_at + Duration::minutes(i64::from(config.reservation_minutes));
        Self {
            summary: format!("Coffee Reservation at {}", config.business_name),
            starts_at,
            ends_at,
            location: config.location.clone(),
            description: format!(
                "Reservation for {} people at {}",
                request.party_size.get(),
                config.business_name
            ),
        }
    }

    /// VCALENDAR text, LF separated, no trailing newline
    #[must_use]
    pub fn to_ics(&self) -> String {
        [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("DTSTART:{}", self.starts_at.format(STAMP)),
            format!("DTEND:{}", self.ends_at.format(STAMP)),
            format!("LOCATION:{}", escape_text(&self.location)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ]
        .join("\n")
    }

    /// Download name, e.g. `Brew-Co-Reservation-1792425600000.ics`
    #[must_use]
    pub fn file_name(unix_millis: i64) -> String {
        format!("Brew-Co-Reservation-{unix_millis}.ics")
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ',' | ';' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_values() {
        assert_eq!(escape_text("a, b; c\\d"), "a\\, b\\; c\\\\d");
        assert_eq!(escape_text("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_text("Brew & Co."), "Brew & Co.");
    }

    #[test]
    fn file_name_uses_millis() {
        assert_eq!(
            CalendarInvite::file_name(1_792_425_600_000),
            "Brew-Co-Reservation-1792425600000.ics"
        );
    }
}
