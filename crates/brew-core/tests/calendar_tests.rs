use brew_core::{month_grid, time_slots, BookedSlots, BusinessHours, SlotTime, YearMonth};
use brew_test_utils::{fixed_now, today};
use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

#[test]
fn test_february_2027_layout() {
    let feb = YearMonth::new(2027, 2).unwrap();
    let grid = month_grid(feb, today(), None);

    // 1 Feb 2027 is a Monday
    assert_eq!(grid.cells.iter().take_while(|c| c.date.is_none()).count(), 1);
    assert_eq!(grid.days().count(), 28);
    assert_eq!(grid.title, "February 2027");
    assert!(grid.days().all(|c| !c.is_past && !c.is_today));
}

#[test]
fn test_today_is_not_past() {
    let grid = month_grid(YearMonth::of(today()), today(), Some(today()));
    let cell = grid.days().find(|c| c.date == Some(today())).unwrap();
    assert!(cell.is_today);
    assert!(!cell.is_past);
    assert!(cell.is_selected);
    assert!(cell.selectable());
    assert!(grid.days().filter(|c| c.is_past).count() == 17);
}

#[test]
fn test_booked_slot_disappears_from_listing() {
    let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let seven_pm = SlotTime::new(19, 0).unwrap();
    let mut booked = BookedSlots::with_capacity(1);
    booked.book(tomorrow, seven_pm).unwrap();

    let slots = time_slots(tomorrow, fixed_now(), &BusinessHours::default(), &booked);
    let entry = slots.iter().find(|s| s.value == seven_pm).unwrap();
    assert!(!entry.available);
    assert_eq!(entry.label, "7:00 PM");
    assert_eq!(slots.iter().filter(|s| s.available).count(), slots.len() - 1);
    assert!(booked.book(tomorrow, seven_pm).is_err());
}

proptest! {
    #[test]
    fn prop_leading_blanks_match_weekday(year in 1990i32..2100, month in 1u32..=12) {
        let ym = YearMonth::new(year, month).unwrap();
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        let grid = month_grid(ym, first, None);
        let blanks = grid.cells.iter().take_while(|c| c.date.is_none()).count();
        prop_assert_eq!(blanks as u32, first.weekday().num_days_from_sunday());
        prop_assert_eq!(grid.days().count() as u32, ym.days_in_month());
    }

    #[test]
    fn prop_non_leap_february_has_28_days(year in 1900i32..2400) {
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        prop_assume!(!leap);
        let feb = YearMonth::new(year, 2).unwrap();
        prop_assert_eq!(feb.days_in_month(), 28);
        let first = NaiveDate::from_ymd_opt(year, 2, 1).unwrap();
        prop_assert_eq!(feb.leading_blanks(), first.weekday().num_days_from_sunday());
    }

    #[test]
    fn prop_next_then_prev_is_identity(year in 1990i32..2100, month in 1u32..=12) {
        let ym = YearMonth::new(year, month).unwrap();
        prop_assert_eq!(ym.next().prev(), ym);
        prop_assert_eq!(ym.prev().next(), ym);
    }
}
