//! Network time exchange state machine
//!
//! The transport (DNS, UDP, packet framing) lives outside the core. This
//! machine only decides when an exchange should start, how long to wait for
//! its result and how far to push the next attempt after a failure.

use pixclock_protocol::{SyncFailure, TimeSyncResult};

use super::clock::DEFAULT_EPOCH_SECONDS;
use crate::error::CoreError;
use crate::fmt::{debug, info, warn};

/// Default interval between successful synchronizations (seconds)
pub const DEFAULT_REFRESH_INTERVAL_S: u32 = 3600;

/// Time to wait for a result before the exchange is abandoned (seconds)
pub const RESEND_TIMEOUT_S: u64 = 10;

/// Delay before retrying after an ordinary failure (seconds)
pub const RETRY_INTERVAL_S: u64 = 60;

/// Last second accepted from the network (9999-12-31 23:59:59 UTC)
pub const MAX_EPOCH_SECONDS: u64 = 253_402_300_799;

/// Exchange phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPhase {
    /// Waiting for the next attempt to fall due
    Poll,
    /// Exchange started, waiting for the result
    Read,
}

/// What the caller must do after [`TimeSync::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncAction {
    /// Nothing to do
    Idle,
    /// Ask the network collaborator to start an exchange
    Start,
    /// The running exchange produced no result in time
    TimedOut,
}

/// Network time synchronization scheduler
#[derive(Debug, Clone)]
pub struct TimeSync {
    phase: SyncPhase,
    /// Monotonic second at which the next exchange may start
    next_attempt_s: u64,
    /// Monotonic second at which the current exchange started
    started_s: u64,
    refresh_interval_s: u32,
    error_count: u16,
    /// Protocol faults since the last success, drives the backoff
    consecutive_faults: u8,
    last_success_s: Option<u64>,
}

impl Default for TimeSync {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL_S)
    }
}

impl TimeSync {
    /// Create a machine that starts an exchange on the first poll
    pub fn new(refresh_interval_s: u32) -> Self {
        Self {
            phase: SyncPhase::Poll,
            next_attempt_s: 0,
            started_s: 0,
            refresh_interval_s: refresh_interval_s.max(1),
            error_count: 0,
            consecutive_faults: 0,
            last_success_s: None,
        }
    }

    /// Advance the machine to monotonic second `uptime_s`
    pub fn poll(&mut self, uptime_s: u64) -> SyncAction {
        match self.phase {
            SyncPhase::Poll if uptime_s >= self.next_attempt_s => {
                debug!("Starting time exchange at {}", uptime_s);
                self.phase = SyncPhase::Read;
                self.started_s = uptime_s;
                SyncAction::Start
            }
            SyncPhase::Read if uptime_s.saturating_sub(self.started_s) >= RESEND_TIMEOUT_S => {
                warn!("Time exchange timed out");
                self.error_count = self.error_count.saturating_add(1);
                self.phase = SyncPhase::Poll;
                self.next_attempt_s = uptime_s + RETRY_INTERVAL_S;
                SyncAction::TimedOut
            }
            _ => SyncAction::Idle,
        }
    }

    /// Consume a result from the network collaborator
    ///
    /// Returns the UTC epoch seconds to apply on success. A result that
    /// arrives after its exchange timed out is still honoured.
    pub fn on_result(&mut self, result: TimeSyncResult, uptime_s: u64) -> Result<i64, CoreError> {
        self.phase = SyncPhase::Poll;

        let result = match result {
            TimeSyncResult::Success { epoch_seconds }
                if !(DEFAULT_EPOCH_SECONDS as u64..=MAX_EPOCH_SECONDS).contains(&epoch_seconds) =>
            {
                warn!("Time exchange returned implausible epoch {}", epoch_seconds);
                TimeSyncResult::Failure(SyncFailure::ProtocolFault)
            }
            other => other,
        };

        match result {
            TimeSyncResult::Success { epoch_seconds } => {
                info!("Time exchange succeeded: {}", epoch_seconds);
                self.consecutive_faults = 0;
                self.last_success_s = Some(uptime_s);
                self.next_attempt_s = uptime_s + self.refresh_interval_s as u64;
                Ok(epoch_seconds as i64)
            }
            TimeSyncResult::Failure(kind) => {
                warn!("Time exchange failed: {}", kind);
                self.error_count = self.error_count.saturating_add(1);
                let delay = if result.needs_backoff() {
                    self.consecutive_faults = self.consecutive_faults.saturating_add(1);
                    self.backoff_s()
                } else {
                    RETRY_INTERVAL_S
                };
                self.next_attempt_s = uptime_s + delay;
                Err(CoreError::ProtocolFault)
            }
        }
    }

    /// Make the next poll start an exchange immediately
    pub fn force(&mut self, uptime_s: u64) {
        if self.phase == SyncPhase::Poll {
            self.next_attempt_s = uptime_s;
        }
    }

    /// Change the refresh interval; takes effect after the next success
    pub fn set_refresh_interval(&mut self, refresh_interval_s: u32) {
        self.refresh_interval_s = refresh_interval_s.max(1);
    }

    /// Current phase
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Failed or timed-out exchanges since boot
    pub fn error_count(&self) -> u16 {
        self.error_count
    }

    /// Monotonic second of the last success
    pub fn last_success(&self) -> Option<u64> {
        self.last_success_s
    }

    /// Monotonic second at which the next attempt falls due
    pub fn next_attempt(&self) -> u64 {
        self.next_attempt_s
    }

    /// Retry interval doubled per consecutive protocol fault, capped at the refresh interval
    fn backoff_s(&self) -> u64 {
        let shift = self.consecutive_faults.saturating_sub(1).min(16) as u32;
        (RETRY_INTERVAL_S << shift).min(self.refresh_interval_s as u64)
    }
}
