//! Daylight saving rules
//!
//! Each supported region has one immutable [`DstRule`]. A rule's start and
//! end are symbolic ("2nd Sunday of March") and are resolved to a day of the
//! year for the year being evaluated. Hours in the table are local
//! *standard* time, so evaluation never has to reason about the skipped or
//! repeated hour.

use super::calendar::{day_of_week, day_of_year, days_in_month, WallTime, Weekday};

/// Supported DST regions, indexed by the persisted selector byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DstCountry {
    /// No daylight saving
    None = 0,
    /// New South Wales, Victoria, Tasmania, ACT
    Australia = 1,
    Chile = 2,
    Cuba = 3,
    /// Central European Time zone
    Europe = 4,
    Israel = 5,
    NewZealand = 6,
    /// United States and Canada
    NorthAmerica = 7,
}

impl DstCountry {
    /// Highest valid selector
    pub const MAX_SELECTOR: u8 = 7;

    /// Map a persisted selector to a region
    ///
    /// Out-of-range selectors yield `None`; callers treat them as "no DST"
    /// and flag the fault rather than guessing a region.
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            0 => Some(DstCountry::None),
            1 => Some(DstCountry::Australia),
            2 => Some(DstCountry::Chile),
            3 => Some(DstCountry::Cuba),
            4 => Some(DstCountry::Europe),
            5 => Some(DstCountry::Israel),
            6 => Some(DstCountry::NewZealand),
            7 => Some(DstCountry::NorthAmerica),
            _ => None,
        }
    }

    /// Selector byte for persistence
    pub fn selector(self) -> u8 {
        self as u8
    }

    /// The rule for this region, or `None` when the region has no DST
    pub fn rule(self) -> Option<&'static DstRule> {
        match self {
            DstCountry::None => None,
            DstCountry::Australia => Some(&AUSTRALIA),
            DstCountry::Chile => Some(&CHILE),
            DstCountry::Cuba => Some(&CUBA),
            DstCountry::Europe => Some(&EUROPE),
            DstCountry::Israel => Some(&ISRAEL),
            DstCountry::NewZealand => Some(&NEW_ZEALAND),
            DstCountry::NorthAmerica => Some(&NORTH_AMERICA),
        }
    }
}

/// One transition point of a rule
///
/// The transition happens on the first `weekday` falling inside
/// `day_low..=day_high` of `month`. Negative bounds count from the end of
/// the month (-1 is the last day), so `-7..=-1` means "last <weekday>".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DstTransition {
    pub month: u8,
    pub weekday: Weekday,
    pub day_low: i8,
    pub day_high: i8,
    /// Local standard time
    pub hour: u8,
}

impl DstTransition {
    /// Day of the year (1-based) on which this transition falls in `year`
    pub fn day_of_year(&self, year: i32) -> Option<u16> {
        let last = days_in_month(year, self.month);
        if last == 0 {
            return None;
        }
        let low = resolve_bound(self.day_low, last);
        let high = resolve_bound(self.day_high, last);

        (low..=high)
            .find(|&day| day_of_week(year, self.month, day) == self.weekday)
            .map(|day| day_of_year(year, self.month, day))
    }
}

fn resolve_bound(bound: i8, last: u8) -> u8 {
    let day = if bound < 0 {
        last as i16 + bound as i16 + 1
    } else {
        bound as i16
    };
    day.clamp(1, last as i16) as u8
}

/// Daylight saving definition for one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DstRule {
    pub start: DstTransition,
    pub end: DstTransition,
    /// Added at start, subtracted at end
    pub shift_minutes: u8,
}

impl DstRule {
    /// Returns true if `t` (local standard time) falls inside `[start, end)`
    ///
    /// Southern-hemisphere rules start late in the year and end early in the
    /// next one; for those the window wraps the year boundary.
    pub fn is_active(&self, t: &WallTime) -> bool {
        let (Some(start_doy), Some(end_doy)) = (
            self.start.day_of_year(t.year),
            self.end.day_of_year(t.year),
        ) else {
            return false;
        };

        let now = hour_index(t.day_of_year, t.hour);
        let start = hour_index(start_doy, self.start.hour);
        let end = hour_index(end_doy, self.end.hour);

        if start < end {
            start <= now && now < end
        } else {
            now >= start || now < end
        }
    }

    /// Shift in seconds
    pub fn shift_seconds(&self) -> i64 {
        self.shift_minutes as i64 * 60
    }
}

fn hour_index(doy: u16, hour: u8) -> u32 {
    doy as u32 * 24 + hour as u32
}

/// Evaluate the rule for `country` at local standard time `t`
///
/// `DstCountry::None` is never active.
pub fn dst_active_for(country: DstCountry, t: &WallTime) -> bool {
    country.rule().is_some_and(|rule| rule.is_active(t))
}

const fn transition(month: u8, weekday: Weekday, day_low: i8, day_high: i8, hour: u8) -> DstTransition {
    DstTransition {
        month,
        weekday,
        day_low,
        day_high,
        hour,
    }
}

// Start: 1st Sunday October 02:00. End: 1st Sunday April 03:00 daylight.
static AUSTRALIA: DstRule = DstRule {
    start: transition(10, Weekday::Sunday, 1, 7, 2),
    end: transition(4, Weekday::Sunday, 1, 7, 2),
    shift_minutes: 60,
};

// Start: Saturday 24:00 before the 1st Sunday after September 1st.
// End: 1st Saturday of April, 24:00 daylight.
static CHILE: DstRule = DstRule {
    start: transition(9, Weekday::Sunday, 2, 8, 0),
    end: transition(4, Weekday::Saturday, 1, 7, 23),
    shift_minutes: 60,
};

// Start: 2nd Sunday March 00:00. End: 1st Sunday November 01:00 daylight.
static CUBA: DstRule = DstRule {
    start: transition(3, Weekday::Sunday, 8, 14, 0),
    end: transition(11, Weekday::Sunday, 1, 7, 0),
    shift_minutes: 60,
};

// Start: last Sunday March 02:00. End: last Sunday October 03:00 daylight.
static EUROPE: DstRule = DstRule {
    start: transition(3, Weekday::Sunday, -7, -1, 2),
    end: transition(10, Weekday::Sunday, -7, -1, 2),
    shift_minutes: 60,
};

// Start: Friday before the last Sunday of March 02:00.
// End: last Sunday October 02:00 daylight.
static ISRAEL: DstRule = DstRule {
    start: transition(3, Weekday::Friday, -9, -3, 2),
    end: transition(10, Weekday::Sunday, -7, -1, 1),
    shift_minutes: 60,
};

// Start: last Sunday September 02:00. End: 1st Sunday April 03:00 daylight.
static NEW_ZEALAND: DstRule = DstRule {
    start: transition(9, Weekday::Sunday, -7, -1, 2),
    end: transition(4, Weekday::Sunday, 1, 7, 2),
    shift_minutes: 60,
};

// Start: 2nd Sunday March 02:00. End: 1st Sunday November 02:00 daylight.
static NORTH_AMERICA: DstRule = DstRule {
    start: transition(3, Weekday::Sunday, 8, 14, 2),
    end: transition(11, Weekday::Sunday, 1, 7, 1),
    shift_minutes: 60,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u8, day: u8, hour: u8) -> WallTime {
        WallTime::from_civil(year, month, day, hour, 0, 0)
    }

    #[test]
    fn test_none_is_never_active() {
        assert!(!dst_active_for(DstCountry::None, &at(2024, 7, 1, 12)));
        assert!(!dst_active_for(DstCountry::None, &at(2024, 1, 1, 12)));
    }

    #[test]
    fn test_north_america_summer_vs_winter() {
        assert!(!dst_active_for(DstCountry::NorthAmerica, &at(2024, 1, 1, 0)));
        assert!(dst_active_for(DstCountry::NorthAmerica, &at(2024, 7, 1, 0)));
    }

    #[test]
    fn test_north_america_transition_days() {
        // 2024: March 10 and November 3
        let start = NORTH_AMERICA.start.day_of_year(2024).unwrap();
        let end = NORTH_AMERICA.end.day_of_year(2024).unwrap();
        assert_eq!(start, day_of_year(2024, 3, 10));
        assert_eq!(end, day_of_year(2024, 11, 3));

        assert!(!dst_active_for(DstCountry::NorthAmerica, &at(2024, 3, 10, 1)));
        assert!(dst_active_for(DstCountry::NorthAmerica, &at(2024, 3, 10, 2)));
        assert!(dst_active_for(DstCountry::NorthAmerica, &at(2024, 11, 3, 0)));
        assert!(!dst_active_for(DstCountry::NorthAmerica, &at(2024, 11, 3, 1)));
    }

    #[test]
    fn test_europe_last_sunday() {
        // 2025: March 30 and October 26
        assert_eq!(
            EUROPE.start.day_of_year(2025),
            Some(day_of_year(2025, 3, 30))
        );
        assert_eq!(
            EUROPE.end.day_of_year(2025),
            Some(day_of_year(2025, 10, 26))
        );
        assert!(dst_active_for(DstCountry::Europe, &at(2025, 8, 15, 12)));
        assert!(!dst_active_for(DstCountry::Europe, &at(2025, 12, 15, 12)));
    }

    #[test]
    fn test_israel_friday_before_last_sunday() {
        // 2024: last Sunday of March is the 31st, so DST starts Friday 29th
        assert_eq!(
            ISRAEL.start.day_of_year(2024),
            Some(day_of_year(2024, 3, 29))
        );
    }

    #[test]
    fn test_southern_rule_wraps_year() {
        assert!(dst_active_for(DstCountry::Australia, &at(2024, 1, 1, 12)));
        assert!(dst_active_for(DstCountry::Australia, &at(2024, 12, 25, 12)));
        assert!(!dst_active_for(DstCountry::Australia, &at(2024, 7, 1, 12)));

        assert!(dst_active_for(DstCountry::NewZealand, &at(2025, 2, 1, 12)));
        assert!(!dst_active_for(DstCountry::NewZealand, &at(2025, 6, 1, 12)));
    }

    #[test]
    fn test_selector_mapping() {
        for selector in 0..=DstCountry::MAX_SELECTOR {
            let country = DstCountry::from_selector(selector).unwrap();
            assert_eq!(country.selector(), selector);
        }
        assert!(DstCountry::from_selector(DstCountry::MAX_SELECTOR + 1).is_none());
        assert!(DstCountry::from_selector(0xFF).is_none());
    }

    #[test]
    fn test_shift_is_symmetric() {
        for selector in 1..=DstCountry::MAX_SELECTOR {
            let rule = DstCountry::from_selector(selector).unwrap().rule().unwrap();
            assert_eq!(rule.shift_seconds(), 3600);
        }
    }
}
