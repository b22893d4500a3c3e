use brew_core::{CalendarInvite, PartySize, ReservationRequest, ShopConfig, SlotTime};
use brew_test_utils::sample_details;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn request(party: u8) -> ReservationRequest {
    ReservationRequest {
        date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        time: SlotTime::new(19, 30).unwrap(),
        party_size: PartySize::new(party, 12).unwrap(),
        details: sample_details(),
    }
}

#[test]
fn test_ics_is_bit_exact() {
    let invite = CalendarInvite::for_reservation(&request(4), &ShopConfig::default());
    let expected = "BEGIN:VCALENDAR\n\
VERSION:2.0\n\
BEGIN:VEVENT\n\
SUMMARY:Coffee Reservation at Brew & Co.\n\
DTSTART:20261019T193000Z\n\
DTEND:20261019T213000Z\n\
LOCATION:123 Coffee Street\\, Brew City\n\
DESCRIPTION:Reservation for 4 people at Brew & Co.\n\
END:VEVENT\n\
END:VCALENDAR";
    assert_eq!(invite.to_ics(), expected);
    assert!(!invite.to_ics().ends_with('\n'));
}

#[test]
fn test_local_time_is_shifted_to_utc() {
    // UTC-5: 19:30 local is 00:30 UTC the next day
    let config = ShopConfig::default().with_utc_offset_minutes(-300);
    let ics = CalendarInvite::for_reservation(&request(2), &config).to_ics();
    assert!(ics.contains("\nDTSTART:20261020T003000Z\n"));
    assert!(ics.contains("\nDTEND:20261020T023000Z\n"));
}

#[test]
fn test_text_fields_are_escaped() {
    let mut config = ShopConfig::default();
    config.business_name = "Brew; Co, Ltd".into();
    let ics = CalendarInvite::for_reservation(&request(2), &config).to_ics();
    assert!(ics.contains("SUMMARY:Coffee Reservation at Brew\\; Co\\, Ltd\n"));
    assert!(ics.contains("DESCRIPTION:Reservation for 2 people at Brew\\; Co\\, Ltd\n"));
}
