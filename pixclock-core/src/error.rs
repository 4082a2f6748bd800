//! Error kinds and fault accounting
//!
//! No error in the core stops the tick loop. Operations that can be refused
//! return a [`CoreError`]; conditions that are recovered locally are counted
//! in [`FaultCounters`] so they can be surfaced on the display or in logs.

use crate::traits::StorageError;

/// Errors returned by core operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreError {
    /// Window table, scroll table or sound queue is full
    CapacityExceeded,
    /// A proposed back-link does not name an active or inactive window
    InvalidBackLink,
    /// Persisted record failed its CRC check; defaults substituted
    ConfigCorrupt,
    /// Network time exchange failed
    ProtocolFault,
    /// Alarm or reminder definition is malformed and will never fire
    DormantRule,
    /// Region lies outside the framebuffer or has start > end
    InvalidRegion,
    /// Window handle does not name a live window
    UnknownWindow,
    /// Flash primitive failed
    Storage(StorageError),
}

impl From<StorageError> for CoreError {
    fn from(e: StorageError) -> Self {
        CoreError::Storage(e)
    }
}

/// Counters for recovered faults
///
/// All counters saturate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultCounters {
    /// Malformed alarms/reminders detected
    pub dormant_rules: u16,
    /// Failed or timed-out network time exchanges
    pub sync_errors: u16,
    /// Requests dropped because a table or queue was full
    pub capacity_drops: u16,
    /// Input events discarded by the drop-oldest policy
    pub input_overflows: u16,
    /// Flash writes that failed
    pub storage_errors: u16,
    /// General configuration record was rejected at boot
    pub config_corrupt: bool,
    /// Reminder record was rejected at boot
    pub reminders_corrupt: bool,
    /// Persisted DST selector does not name a known rule
    pub unknown_dst_rule: bool,
}

impl FaultCounters {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            dormant_rules: 0,
            sync_errors: 0,
            capacity_drops: 0,
            input_overflows: 0,
            storage_errors: 0,
            config_corrupt: false,
            reminders_corrupt: false,
            unknown_dst_rule: false,
        }
    }

    /// Record an error returned by an operation whose result is not otherwise used
    pub fn record(&mut self, error: CoreError) {
        match error {
            CoreError::CapacityExceeded => {
                self.capacity_drops = self.capacity_drops.saturating_add(1)
            }
            CoreError::ProtocolFault => self.sync_errors = self.sync_errors.saturating_add(1),
            CoreError::DormantRule => self.dormant_rules = self.dormant_rules.saturating_add(1),
            CoreError::Storage(_) => self.storage_errors = self.storage_errors.saturating_add(1),
            CoreError::ConfigCorrupt => self.config_corrupt = true,
            CoreError::InvalidBackLink | CoreError::InvalidRegion | CoreError::UnknownWindow => {}
        }
    }

    /// Returns true if any persisted record was rejected
    pub fn any_corrupt(&self) -> bool {
        self.config_corrupt || self.reminders_corrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let mut faults = FaultCounters::new();
        faults.record(CoreError::CapacityExceeded);
        faults.record(CoreError::CapacityExceeded);
        faults.record(CoreError::DormantRule);
        faults.record(CoreError::Storage(StorageError::Write));

        assert_eq!(faults.capacity_drops, 2);
        assert_eq!(faults.dormant_rules, 1);
        assert_eq!(faults.storage_errors, 1);
        assert!(!faults.any_corrupt());
    }

    #[test]
    fn test_counters_saturate() {
        let mut faults = FaultCounters {
            sync_errors: u16::MAX,
            ..Default::default()
        };
        faults.record(CoreError::ProtocolFault);
        assert_eq!(faults.sync_errors, u16::MAX);
    }

    #[test]
    fn test_corrupt_flag() {
        let mut faults = FaultCounters::new();
        faults.record(CoreError::ConfigCorrupt);
        assert!(faults.any_corrupt());
    }
}
