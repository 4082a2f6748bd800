//! Ring sessions
//!
//! A ring session is what an alarm or reminder does once it fires: ring
//! now, then ring once per period until its countdown is used up. Sessions
//! run on monotonic seconds, so wall-clock corrections never stretch or
//! shorten them.

/// Outcome of advancing a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingStep {
    /// Nothing due this second
    Idle,
    /// Ring now
    Ring,
    /// Countdown exhausted; destroy the session
    Finished,
}

/// One active ring session (never persisted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingSession {
    /// Seconds of ringing left
    countdown_s: u32,
    /// Monotonic second of the last ring
    last_ring_s: u64,
    period_s: u32,
}

impl RingSession {
    /// Start a session; the caller rings immediately
    pub fn start(duration_s: u32, period_s: u32, now_s: u64) -> Self {
        Self {
            countdown_s: duration_s,
            last_ring_s: now_s,
            period_s: period_s.max(1),
        }
    }

    /// Advance to monotonic second `now_s`
    pub fn step(&mut self, now_s: u64) -> RingStep {
        if now_s.saturating_sub(self.last_ring_s) < self.period_s as u64 {
            return RingStep::Idle;
        }
        if self.countdown_s == 0 {
            return RingStep::Finished;
        }
        self.last_ring_s += self.period_s as u64;
        self.countdown_s = self.countdown_s.saturating_sub(self.period_s);
        RingStep::Ring
    }

    pub fn countdown(&self) -> u32 {
        self.countdown_s
    }

    pub fn last_ring(&self) -> u64 {
        self.last_ring_s
    }
}
