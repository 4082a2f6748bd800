//! Persisted configuration records
//!
//! Two records live in flash. [`ClockConfig`] carries the operator settings,
//! alarms, auto-scroll cadences and calendar events; [`ReminderTable`]
//! carries the periodic reminders, which the scheduler rewrites on its own
//! every time a reminder window ends.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use super::settings::GlobalSettings;
use crate::content::ContentId;
use crate::time::WallTime;

/// Maximum alarms
pub const MAX_ALARMS: usize = 9;

/// Maximum reminder rules
pub const MAX_REMINDERS: usize = 25;

/// Maximum calendar events (one bit each in the daily mask)
pub const MAX_EVENTS: usize = 64;

/// Maximum auto-scroll cadences
pub const MAX_AUTO_SCROLLS: usize = 5;

/// Maximum content items per cadence
pub const MAX_SCROLL_ITEMS: usize = 32;

/// Alarm and reminder message length
pub const MAX_MESSAGE_LEN: usize = 40;

/// Calendar event message length
pub const MAX_EVENT_MESSAGE_LEN: usize = 32;

/// Weekly alarm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
    /// Bit 0 = Sunday
    pub weekdays: u8,
    /// Scrolled on every ring; empty for a silent display
    pub message: String<MAX_MESSAGE_LEN>,
    /// Passes of the message per ring (0 = no scroll)
    pub scroll_repeat: u8,
    /// Beeps per ring
    pub beep_count: u8,
    pub beep_duration_ms: u16,
    /// Seconds between rings
    pub ring_period_s: u16,
    /// Seconds the alarm keeps ringing after it fires
    pub ring_duration_s: u16,
}

impl Default for Alarm {
    fn default() -> Self {
        Self {
            enabled: false,
            hour: 7,
            minute: 0,
            weekdays: 0b0011_1110,
            message: String::new(),
            scroll_repeat: 1,
            beep_count: 3,
            beep_duration_ms: 100,
            ring_period_s: 10,
            ring_duration_s: 60,
        }
    }
}

impl Alarm {
    /// Returns true if the fields describe an alarm that can fire
    pub fn is_well_formed(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.ring_period_s > 0
    }

    /// Returns true if the alarm is due at `t`
    pub fn matches(&self, t: &WallTime) -> bool {
        self.enabled
            && self.weekdays & t.weekday.bit() != 0
            && self.hour == t.hour
            && self.minute == t.minute
    }
}

/// Periodic reminder, times in local epoch seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReminderRule {
    pub enabled: bool,
    /// Window opens
    pub start: i64,
    /// Window closes (exclusive)
    pub end: i64,
    /// Seconds between ring sessions inside the window
    pub repeat_interval_s: u32,
    /// Length of one ring session
    pub ring_duration_s: u32,
    /// Shift applied to the window once it closes
    pub delay_s: u32,
    /// Next ring session start
    pub next_trigger: i64,
    pub message: String<MAX_MESSAGE_LEN>,
}

impl Default for ReminderRule {
    fn default() -> Self {
        Self {
            enabled: false,
            start: 0,
            end: 0,
            repeat_interval_s: 600,
            ring_duration_s: 30,
            delay_s: 86_400,
            next_trigger: 0,
            message: String::new(),
        }
    }
}

impl ReminderRule {
    /// Returns true if the rule can ever fire
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end && self.delay_s > 0 && self.repeat_interval_s > 0
    }

    /// Returns true if `now` lies inside `[start, end)`
    pub fn in_window(&self, now: i64) -> bool {
        self.start <= now && now < self.end
    }

    /// Shift the window forward by whole delays until it ends after `now`
    ///
    /// Returns the number of delays applied. `next_trigger` restarts at the
    /// new window's start.
    pub fn advance_past(&mut self, now: i64) -> u32 {
        if now < self.end || self.delay_s == 0 {
            return 0;
        }
        let delay = self.delay_s as i64;
        let steps = (now - self.end) / delay + 1;
        self.start += steps * delay;
        self.end += steps * delay;
        self.next_trigger = self.start;
        steps.min(u32::MAX as i64) as u32
    }
}

/// Yearly calendar event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarEvent {
    /// Day of month, 0 for an unused entry
    pub day: u8,
    pub month: u8,
    /// Index into the jingle table
    pub jingle: u8,
    pub message: String<MAX_EVENT_MESSAGE_LEN>,
}

impl CalendarEvent {
    /// Returns true if the event falls on `t`'s date
    pub fn matches(&self, t: &WallTime) -> bool {
        self.day != 0 && self.day == t.day && self.month == t.month
    }
}

/// Cadence of informational scrolls
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoScroll {
    /// 0 disables the cadence
    pub period_minutes: u16,
    /// Content scrolled in order
    pub items: Vec<ContentId, MAX_SCROLL_ITEMS>,
}

impl AutoScroll {
    /// Returns true if the cadence is due at `t`
    pub fn is_due(&self, t: &WallTime) -> bool {
        self.period_minutes != 0
            && !self.items.is_empty()
            && t.second == 0
            && t.minute_of_day() % self.period_minutes == 0
    }
}

/// Record 1: general configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    pub settings: GlobalSettings,
    pub alarms: Vec<Alarm, MAX_ALARMS>,
    pub auto_scrolls: Vec<AutoScroll, MAX_AUTO_SCROLLS>,
    pub events: Vec<CalendarEvent, MAX_EVENTS>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let mut auto_scrolls = Vec::new();
        let mut items = Vec::new();
        for item in [ContentId::DayOfWeek, ContentId::Date, ContentId::Temperature] {
            items.push(item).ok();
        }
        auto_scrolls
            .push(AutoScroll {
                period_minutes: 5,
                items,
            })
            .ok();

        Self {
            settings: GlobalSettings::default(),
            alarms: Vec::new(),
            auto_scrolls,
            events: Vec::new(),
        }
    }
}

/// Record 2: reminder rules
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReminderTable {
    pub rules: Vec<ReminderRule, MAX_REMINDERS>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Weekday;

    #[test]
    fn test_alarm_matches_weekday_and_minute() {
        let alarm = Alarm {
            enabled: true,
            weekdays: Weekday::Monday.bit(),
            ..Default::default()
        };
        // 2024-07-01 is a Monday
        assert!(alarm.matches(&WallTime::from_civil(2024, 7, 1, 7, 0, 30)));
        assert!(!alarm.matches(&WallTime::from_civil(2024, 7, 1, 7, 1, 0)));
        assert!(!alarm.matches(&WallTime::from_civil(2024, 7, 2, 7, 0, 0)));
    }

    #[test]
    fn test_alarm_well_formed() {
        assert!(Alarm::default().is_well_formed());
        let bad = Alarm {
            hour: 24,
            ..Default::default()
        };
        assert!(!bad.is_well_formed());
        let silent = Alarm {
            ring_period_s: 0,
            ..Default::default()
        };
        assert!(!silent.is_well_formed());
    }

    #[test]
    fn test_reminder_advance_past() {
        let t = 1_000_000;
        let mut rule = ReminderRule {
            enabled: true,
            start: t,
            end: t + 3600,
            delay_s: 86_400,
            next_trigger: t + 1200,
            ..Default::default()
        };
        assert_eq!(rule.advance_past(t + 3599), 0);
        assert_eq!(rule.advance_past(t + 3600), 1);
        assert_eq!(rule.start, t + 86_400);
        assert_eq!(rule.end, t + 90_000);
        assert_eq!(rule.next_trigger, t + 86_400);

        // Several missed days collapse into one shift
        assert_eq!(rule.advance_past(t + 3 * 86_400 + 3600), 3);
        assert_eq!(rule.start, t + 4 * 86_400);
    }

    #[test]
    fn test_reminder_zero_delay_is_malformed() {
        let rule = ReminderRule {
            delay_s: 0,
            ..Default::default()
        };
        assert!(!rule.is_well_formed());
        let inverted = ReminderRule {
            start: 10,
            end: 5,
            ..Default::default()
        };
        assert!(!inverted.is_well_formed());
    }

    #[test]
    fn test_auto_scroll_due() {
        let cadence = ClockConfig::default().auto_scrolls[0].clone();
        assert!(cadence.is_due(&WallTime::from_civil(2024, 1, 1, 10, 15, 0)));
        assert!(!cadence.is_due(&WallTime::from_civil(2024, 1, 1, 10, 15, 1)));
        assert!(!cadence.is_due(&WallTime::from_civil(2024, 1, 1, 10, 16, 0)));
    }

    #[test]
    fn test_calendar_event_matches() {
        let event = CalendarEvent {
            day: 25,
            month: 12,
            ..Default::default()
        };
        assert!(event.matches(&WallTime::from_civil(2024, 12, 25, 0, 0, 0)));
        assert!(!event.matches(&WallTime::from_civil(2024, 12, 26, 0, 0, 0)));
        assert!(!CalendarEvent::default().matches(&WallTime::from_civil(2024, 1, 1, 0, 0, 0)));
    }
}
