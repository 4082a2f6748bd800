//! Proleptic Gregorian calendar arithmetic
//!
//! Day counts are relative to 1970-01-01 (a Thursday). Conversions follow
//! the era-based civil/day algorithms, so they are exact for every year the
//! clock can display.

use serde::{Deserialize, Serialize};

/// Seconds per day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Cumulative days before each month in a common year
const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// All days, Sunday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Index with Sunday = 0
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Day from a Sunday-based index (wraps modulo 7)
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % 7) as usize]
    }

    /// Bit for this day in a weekday mask (bit 0 = Sunday)
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Weekday of a day count relative to 1970-01-01
    pub const fn from_days(days: i64) -> Self {
        // 1970-01-01 was a Thursday
        Self::from_index(((days.rem_euclid(7) + 4) % 7) as u8)
    }
}

/// Gregorian leap year rule
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`
pub const fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Returns true if (year, month, day) names a real date
pub const fn is_valid_date(year: i32, month: u8, day: u8) -> bool {
    month >= 1 && month <= 12 && day >= 1 && day <= days_in_month(year, month)
}

/// Day of the year, 1-based (January 1st = 1)
pub const fn day_of_year(year: i32, month: u8, day: u8) -> u16 {
    let mut doy = DAYS_BEFORE_MONTH[(month as usize + 11) % 12] + day as u16;
    if month > 2 && is_leap_year(year) {
        doy += 1;
    }
    doy
}

/// Days since 1970-01-01 for a civil date
pub const fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (month as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date (year, month, day) for a day count relative to 1970-01-01
pub const fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = (yoe + era * 400) as i32 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Day of the week for a civil date
pub const fn day_of_week(year: i32, month: u8, day: u8) -> Weekday {
    Weekday::from_days(days_from_civil(year, month, day))
}

/// Broken-down local time
///
/// Always derived from a seconds count, so the weekday and day-of-year
/// fields agree with (day, month, year).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Weekday,
    pub day: u8,
    pub month: u8,
    pub year: i32,
    /// 1-based
    pub day_of_year: u16,
    /// Daylight saving shift is included in the fields above
    pub dst_active: bool,
}

impl WallTime {
    /// Break down local seconds since 1970-01-01 00:00
    pub const fn from_local_seconds(seconds: i64, dst_active: bool) -> Self {
        let days = seconds.div_euclid(SECONDS_PER_DAY);
        let secs_of_day = seconds.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        Self {
            hour: (secs_of_day / 3600) as u8,
            minute: ((secs_of_day / 60) % 60) as u8,
            second: (secs_of_day % 60) as u8,
            weekday: Weekday::from_days(days),
            day,
            month,
            year,
            day_of_year: day_of_year(year, month, day),
            dst_active,
        }
    }

    /// Build a wall time from civil fields (standard time, no DST)
    pub const fn from_civil(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let seconds = days_from_civil(year, month, day) * SECONDS_PER_DAY
            + hour as i64 * 3600
            + minute as i64 * 60
            + second as i64;
        Self::from_local_seconds(seconds, false)
    }

    /// Local seconds since 1970-01-01 00:00 for this wall time
    pub const fn to_local_seconds(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day) * SECONDS_PER_DAY
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64
    }

    /// Minutes since local midnight
    pub const fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Key that changes exactly once per local day
    pub const fn date_key(&self) -> u32 {
        (self.year as u32) << 9 | self.day_of_year as u32
    }

    /// Key that changes exactly once per local minute
    pub const fn minute_key(&self) -> u32 {
        self.date_key() << 11 | self.minute_of_day() as u32
    }

    /// Hour on a 12-hour dial (1-12)
    pub const fn hour12(&self) -> u8 {
        match self.hour {
            0 => 12,
            1..=12 => self.hour,
            _ => self.hour - 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn test_days_in_february() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn test_epoch_is_thursday() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(day_of_week(1970, 1, 1), Weekday::Thursday);
        assert_eq!(Weekday::from_days(-1), Weekday::Wednesday);
    }

    #[test]
    fn test_known_weekdays() {
        assert_eq!(day_of_week(2000, 1, 1), Weekday::Saturday);
        assert_eq!(day_of_week(2024, 2, 29), Weekday::Thursday);
        assert_eq!(day_of_week(2024, 12, 25), Weekday::Wednesday);
        assert_eq!(day_of_week(2026, 10, 19), Weekday::Monday);
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(day_of_year(2023, 1, 1), 1);
        assert_eq!(day_of_year(2023, 3, 1), 60);
        assert_eq!(day_of_year(2024, 3, 1), 61);
        assert_eq!(day_of_year(2024, 12, 31), 366);
        assert_eq!(day_of_year(2023, 12, 31), 365);
    }

    #[test]
    fn test_civil_roundtrip_across_leap_day() {
        let days = days_from_civil(2024, 2, 29);
        assert_eq!(civil_from_days(days), (2024, 2, 29));
        assert_eq!(civil_from_days(days + 1), (2024, 3, 1));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }

    #[test]
    fn test_wall_time_breakdown() {
        // 2024-07-01 12:34:56
        let t = WallTime::from_civil(2024, 7, 1, 12, 34, 56);
        assert_eq!(t.hour, 12);
        assert_eq!(t.minute, 34);
        assert_eq!(t.second, 56);
        assert_eq!(t.weekday, Weekday::Monday);
        assert_eq!(t.day_of_year, 183);
        assert_eq!(t.to_local_seconds(), 1_719_837_296);
    }

    #[test]
    fn test_minute_key_changes_each_minute() {
        let a = WallTime::from_civil(2024, 12, 31, 23, 59, 0);
        let b = WallTime::from_civil(2024, 12, 31, 23, 59, 59);
        let c = WallTime::from_civil(2025, 1, 1, 0, 0, 0);
        assert_eq!(a.minute_key(), b.minute_key());
        assert_ne!(b.minute_key(), c.minute_key());
        assert_ne!(b.date_key(), c.date_key());
    }

    #[test]
    fn test_hour12() {
        assert_eq!(WallTime::from_civil(2024, 1, 1, 0, 0, 0).hour12(), 12);
        assert_eq!(WallTime::from_civil(2024, 1, 1, 13, 0, 0).hour12(), 1);
        assert_eq!(WallTime::from_civil(2024, 1, 1, 12, 0, 0).hour12(), 12);
    }
}
