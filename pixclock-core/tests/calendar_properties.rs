//! Calendar arithmetic checked against a day-by-day walk

use pixclock_core::time::calendar::{
    civil_from_days, day_of_week, day_of_year, days_from_civil, days_in_month, is_leap_year,
};
use pixclock_core::time::{dst_active_for, DstCountry, WallTime, Weekday};
use proptest::prelude::*;

/// Walk forward from 1970-01-01 (a Thursday) one day at a time
fn naive_walk(target_days: u32) -> (i32, u8, u8, u8) {
    let (mut year, mut month, mut day) = (1970, 1u8, 1u8);
    let mut weekday = 4u8;
    for _ in 0..target_days {
        weekday = (weekday + 1) % 7;
        day += 1;
        if day > days_in_month(year, month) {
            day = 1;
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
    }
    (year, month, day, weekday)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_civil_matches_walk(days in 0u32..40_000) {
        let (year, month, day, weekday) = naive_walk(days);
        prop_assert_eq!(civil_from_days(days as i64), (year, month, day));
        prop_assert_eq!(days_from_civil(year, month, day), days as i64);
        prop_assert_eq!(day_of_week(year, month, day).index(), weekday);
    }

    #[test]
    fn prop_day_of_year_counts_days(days in 0u32..40_000) {
        let (year, month, day, _) = naive_walk(days);
        let jan1 = days_from_civil(year, 1, 1);
        prop_assert_eq!(day_of_year(year, month, day) as i64, days as i64 - jan1 + 1);
    }

    #[test]
    fn prop_wall_time_round_trips(seconds in -2_000_000_000i64..4_000_000_000) {
        let t = WallTime::from_local_seconds(seconds, false);
        prop_assert_eq!(t.to_local_seconds(), seconds);
        prop_assert_eq!(t.weekday, day_of_week(t.year, t.month, t.day));
        prop_assert_eq!(t.day_of_year, day_of_year(t.year, t.month, t.day));
        prop_assert!(t.hour < 24 && t.minute < 60 && t.second < 60);
    }
}

#[test]
fn test_leap_years() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert_eq!(day_of_year(2024, 12, 31), 366);
}

#[test]
fn test_known_weekdays() {
    assert_eq!(day_of_week(2024, 1, 1), Weekday::Monday);
    assert_eq!(day_of_week(2000, 2, 29), Weekday::Tuesday);
}

#[test]
fn test_north_america_summer_only() {
    let winter = WallTime::from_civil(2024, 1, 1, 12, 0, 0);
    let summer = WallTime::from_civil(2024, 7, 1, 12, 0, 0);
    assert!(!dst_active_for(DstCountry::NorthAmerica, &winter));
    assert!(dst_active_for(DstCountry::NorthAmerica, &summer));
    assert!(!dst_active_for(DstCountry::None, &summer));
}

#[test]
fn test_southern_rule_wraps_year() {
    let january = WallTime::from_civil(2024, 1, 15, 12, 0, 0);
    let july = WallTime::from_civil(2024, 7, 15, 12, 0, 0);
    assert!(dst_active_for(DstCountry::Australia, &january));
    assert!(!dst_active_for(DstCountry::Australia, &july));
}
