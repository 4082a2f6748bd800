//! Alarm, reminder, calendar and auto-scroll scheduling
//!
//! [`Scheduler::run`] is called once per second with the DST-corrected wall
//! time. It never touches the display or the sound queue; it reports what
//! became due as [`Activation`]s and the controller acts on them.

use heapless::Vec;

use super::calendar::CalendarTracker;
use super::ring::{RingSession, RingStep};
use crate::config::{ClockConfig, ReminderTable, MAX_ALARMS, MAX_REMINDERS};
use crate::error::{CoreError, FaultCounters};
use crate::fmt::{info, warn};
use crate::time::WallTime;

/// Activations reported by one run
pub const MAX_ACTIVATIONS: usize = 64;

/// Seconds between rings of a reminder session
pub const REMINDER_RING_PERIOD_S: u32 = 10;

/// Something the scheduler decided is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activation {
    /// Alarm `n` fired; a ring session was created
    AlarmStarted(u8),
    AlarmRing(u8),
    /// Ring session of alarm `n` ended or was acknowledged
    AlarmEnded(u8),
    ReminderStarted(u8),
    ReminderRing(u8),
    ReminderEnded(u8),
    /// Reminder `n` window moved forward; the reminder record must be saved
    ReminderAdvanced(u8),
    /// Calendar event `n` is today
    CalendarDue(u8),
    /// Auto-scroll cadence `n` is due
    AutoScrollDue(u8),
    /// Top of the hour
    Chime,
}

/// Activations of one run
pub type Activations = Vec<Activation, MAX_ACTIVATIONS>;

/// Time-driven scheduler state (never persisted)
#[derive(Debug, Clone)]
pub struct Scheduler {
    alarms: [Option<RingSession>; MAX_ALARMS],
    /// Minute key at which each alarm last fired
    alarm_fired: [Option<u32>; MAX_ALARMS],
    reminders: [Option<RingSession>; MAX_REMINDERS],
    /// Rules already reported as dormant, bit n = entry n
    dormant_alarms: u32,
    dormant_reminders: u32,
    calendar: CalendarTracker,
    auto_scroll_minute: Option<u32>,
    chime_minute: Option<u32>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            alarms: [None; MAX_ALARMS],
            alarm_fired: [None; MAX_ALARMS],
            reminders: [None; MAX_REMINDERS],
            dormant_alarms: 0,
            dormant_reminders: 0,
            calendar: CalendarTracker::new(),
            auto_scroll_minute: None,
            chime_minute: None,
        }
    }

    /// Drop every session and fault mark, e.g. after the tables were replaced
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Decide what is due at wall time `t`
    ///
    /// `local_epoch` is `t` in local epoch seconds and drives reminders;
    /// `uptime_s` is monotonic and drives ring sessions. Returns true when a
    /// reminder window moved and the reminder record must be saved.
    pub fn run(
        &mut self,
        t: &WallTime,
        local_epoch: i64,
        uptime_s: u64,
        config: &ClockConfig,
        reminders: &mut ReminderTable,
        faults: &mut FaultCounters,
        out: &mut Activations,
    ) -> bool {
        self.run_alarms(t, uptime_s, config, faults, out);
        let changed = self.run_reminders(local_epoch, uptime_s, reminders, faults, out);

        let due = self.calendar.update(t, &config.events);
        for index in 0..64u8 {
            if due & (1 << index) != 0 {
                emit(out, Activation::CalendarDue(index), faults);
            }
        }

        let minute = t.minute_key();
        if t.second == 0 && self.auto_scroll_minute != Some(minute) {
            self.auto_scroll_minute = Some(minute);
            for (index, cadence) in config.auto_scrolls.iter().enumerate() {
                if cadence.is_due(t) {
                    emit(out, Activation::AutoScrollDue(index as u8), faults);
                }
            }
        }

        if config.settings.chime
            && t.minute == 0
            && t.second == 0
            && self.chime_minute != Some(minute)
        {
            self.chime_minute = Some(minute);
            emit(out, Activation::Chime, faults);
        }

        changed
    }

    /// Silence every ring session, reporting each one that ended
    pub fn acknowledge(&mut self, out: &mut Activations, faults: &mut FaultCounters) -> usize {
        let mut ended = 0;
        for (index, session) in self.alarms.iter_mut().enumerate() {
            if session.take().is_some() {
                emit(out, Activation::AlarmEnded(index as u8), faults);
                ended += 1;
            }
        }
        for (index, session) in self.reminders.iter_mut().enumerate() {
            if session.take().is_some() {
                emit(out, Activation::ReminderEnded(index as u8), faults);
                ended += 1;
            }
        }
        if ended > 0 {
            info!("Acknowledged {} ring sessions", ended);
        }
        ended
    }

    /// Returns true while any alarm or reminder rings
    pub fn is_ringing(&self) -> bool {
        self.alarms.iter().chain(self.reminders.iter()).any(Option::is_some)
    }

    /// Ring session of alarm `index`
    pub fn alarm_session(&self, index: usize) -> Option<&RingSession> {
        self.alarms.get(index).and_then(Option::as_ref)
    }

    /// Ring session of reminder `index`
    pub fn reminder_session(&self, index: usize) -> Option<&RingSession> {
        self.reminders.get(index).and_then(Option::as_ref)
    }

    /// Calendar events matching today
    pub fn today_mask(&self) -> u64 {
        self.calendar.today_mask()
    }

    fn run_alarms(
        &mut self,
        t: &WallTime,
        uptime_s: u64,
        config: &ClockConfig,
        faults: &mut FaultCounters,
        out: &mut Activations,
    ) {
        for (index, alarm) in config.alarms.iter().enumerate() {
            let id = index as u8;

            if let Some(session) = self.alarms[index].as_mut() {
                match session.step(uptime_s) {
                    RingStep::Idle => {}
                    RingStep::Ring => emit(out, Activation::AlarmRing(id), faults),
                    RingStep::Finished => {
                        self.alarms[index] = None;
                        emit(out, Activation::AlarmEnded(id), faults);
                    }
                }
                continue;
            }

            if !alarm.enabled {
                continue;
            }
            if !alarm.is_well_formed() {
                mark_dormant(&mut self.dormant_alarms, index, faults);
                continue;
            }

            let minute = t.minute_key();
            if alarm.matches(t) && self.alarm_fired[index] != Some(minute) {
                info!("Alarm {} fired", index);
                self.alarm_fired[index] = Some(minute);
                self.alarms[index] = Some(RingSession::start(
                    alarm.ring_duration_s as u32,
                    alarm.ring_period_s as u32,
                    uptime_s,
                ));
                emit(out, Activation::AlarmStarted(id), faults);
                emit(out, Activation::AlarmRing(id), faults);
            }
        }
    }

    fn run_reminders(
        &mut self,
        local_epoch: i64,
        uptime_s: u64,
        reminders: &mut ReminderTable,
        faults: &mut FaultCounters,
        out: &mut Activations,
    ) -> bool {
        let mut changed = false;

        for (index, rule) in reminders.rules.iter_mut().enumerate() {
            let id = index as u8;

            if let Some(session) = self.reminders[index].as_mut() {
                match session.step(uptime_s) {
                    RingStep::Idle => {}
                    RingStep::Ring => emit(out, Activation::ReminderRing(id), faults),
                    RingStep::Finished => {
                        self.reminders[index] = None;
                        emit(out, Activation::ReminderEnded(id), faults);
                    }
                }
            }

            if !rule.enabled {
                continue;
            }
            if !rule.is_well_formed() {
                mark_dormant(&mut self.dormant_reminders, index, faults);
                continue;
            }

            if rule.advance_past(local_epoch) > 0 {
                info!("Reminder {} moved to {}", index, rule.start);
                changed = true;
                emit(out, Activation::ReminderAdvanced(id), faults);
            }

            if !rule.in_window(local_epoch) {
                continue;
            }
            if rule.next_trigger < rule.start {
                rule.next_trigger = rule.start;
            }
            if local_epoch < rule.next_trigger {
                continue;
            }

            let interval = rule.repeat_interval_s as i64;
            let missed = (local_epoch - rule.next_trigger) / interval + 1;
            rule.next_trigger += missed * interval;

            if self.reminders[index].is_none() {
                self.reminders[index] = Some(RingSession::start(
                    rule.ring_duration_s,
                    REMINDER_RING_PERIOD_S,
                    uptime_s,
                ));
                emit(out, Activation::ReminderStarted(id), faults);
                emit(out, Activation::ReminderRing(id), faults);
            }
        }

        changed
    }
}

fn emit(out: &mut Activations, activation: Activation, faults: &mut FaultCounters) {
    if out.push(activation).is_err() {
        faults.record(CoreError::CapacityExceeded);
    }
}

fn mark_dormant(mask: &mut u32, index: usize, faults: &mut FaultCounters) {
    let bit = 1 << index;
    if *mask & bit == 0 {
        *mask |= bit;
        warn!("Rule {} is malformed and will never fire", index);
        faults.record(CoreError::DormantRule);
    }
}
