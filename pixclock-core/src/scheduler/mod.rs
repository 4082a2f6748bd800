//! Time-driven scheduling
//!
//! Alarms, reminders, calendar events and auto-scroll cadences are
//! evaluated once per second against the local wall time.

pub mod calendar;
pub mod engine;
pub mod ring;

pub use calendar::{CalendarTracker, RESURFACE_MINUTES};
pub use engine::{Activation, Activations, Scheduler, MAX_ACTIVATIONS, REMINDER_RING_PERIOD_S};
pub use ring::{RingSession, RingStep};
