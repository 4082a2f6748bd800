//! Calendar event tracking
//!
//! On every local day rollover the event table is scanned once and the
//! matches are kept in a 64-bit mask. Set bits surface at the rollover and
//! again on every half hour until the next rollover recomputes the mask.

use crate::config::CalendarEvent;
use crate::time::WallTime;

/// Minutes between repeated surfacing of today's events
pub const RESURFACE_MINUTES: u16 = 30;

/// Daily calendar mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTracker {
    date_key: Option<u32>,
    today_mask: u64,
    last_surfaced: Option<u32>,
}

impl CalendarTracker {
    pub const fn new() -> Self {
        Self {
            date_key: None,
            today_mask: 0,
            last_surfaced: None,
        }
    }

    /// Events matching today, bit n = entry n
    pub fn today_mask(&self) -> u64 {
        self.today_mask
    }

    /// Forget the current day so the next update recomputes the mask
    pub fn invalidate(&mut self) {
        self.date_key = None;
    }

    /// Update for `t`; returns the mask of events to surface now (0 if none)
    pub fn update(&mut self, t: &WallTime, events: &[CalendarEvent]) -> u64 {
        let date_key = t.date_key();
        if self.date_key != Some(date_key) {
            self.date_key = Some(date_key);
            self.today_mask = events
                .iter()
                .take(64)
                .enumerate()
                .filter(|(_, event)| event.matches(t))
                .fold(0u64, |mask, (index, _)| mask | 1u64 << index);
            self.last_surfaced = Some(t.minute_key());
            return self.today_mask;
        }

        let on_slot = t.second == 0 && t.minute_of_day() % RESURFACE_MINUTES == 0;
        if self.today_mask != 0 && on_slot && self.last_surfaced != Some(t.minute_key()) {
            self.last_surfaced = Some(t.minute_key());
            return self.today_mask;
        }
        0
    }
}
