//! Configuration persistence
//!
//! Loads and saves the two configuration records through a
//! [`RecordStorage`]. A record that fails validation is replaced by its
//! compiled-in default; the caller decides how to surface the fault.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::record::{decode, encode, RecordError, RECORD_SIZE};
use crate::config::{ClockConfig, ReminderTable};
use crate::error::CoreError;
use crate::fmt::{debug, info, warn};
use crate::traits::RecordStorage;

/// Layout version of the general configuration record
pub const CONFIG_VERSION: u16 = 1;

/// Layout version of the reminder record
pub const REMINDER_VERSION: u16 = 1;

/// Offset of record 1 from the store base
pub const CONFIG_OFFSET: u32 = 0;

/// Offset of record 2 from the store base
pub const REMINDER_OFFSET: u32 = RECORD_SIZE as u32;

/// Bytes of storage the store occupies
pub const STORE_SIZE: usize = 2 * RECORD_SIZE;

/// Outcome of loading a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordStatus {
    /// Record validated
    Valid,
    /// Region never written; defaults used
    Missing,
    /// Record rejected; defaults used
    Corrupt,
}

/// A loaded record and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub value: T,
    pub status: RecordStatus,
}

impl<T> Loaded<T> {
    /// `ConfigCorrupt` if the stored record was rejected
    pub fn error(&self) -> Option<CoreError> {
        match self.status {
            RecordStatus::Corrupt => Some(CoreError::ConfigCorrupt),
            RecordStatus::Valid | RecordStatus::Missing => None,
        }
    }
}

/// Record store over a flash primitive
pub struct ConfigStore<S> {
    storage: S,
    base: u32,
    buffer: [u8; RECORD_SIZE],
}

impl<S: RecordStorage> ConfigStore<S> {
    /// Create a store whose records start at `base`
    pub fn new(storage: S, base: u32) -> Self {
        Self {
            storage,
            base,
            buffer: [0xFF; RECORD_SIZE],
        }
    }

    /// Load record 1
    pub fn load_config(&mut self) -> Loaded<ClockConfig> {
        self.load(CONFIG_OFFSET, CONFIG_VERSION)
    }

    /// Load record 2
    pub fn load_reminders(&mut self) -> Loaded<ReminderTable> {
        self.load(REMINDER_OFFSET, REMINDER_VERSION)
    }

    /// Write record 1
    pub fn save_config(&mut self, config: &ClockConfig) -> Result<(), CoreError> {
        self.save(CONFIG_OFFSET, CONFIG_VERSION, config)
    }

    /// Write record 2
    pub fn save_reminders(&mut self, reminders: &ReminderTable) -> Result<(), CoreError> {
        self.save(REMINDER_OFFSET, REMINDER_VERSION, reminders)
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Underlying storage, mutable
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the store and return the storage
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn load<T: DeserializeOwned + Default>(&mut self, offset: u32, version: u16) -> Loaded<T> {
        let address = self.base + offset;

        if let Err(e) = self.storage.read(address, &mut self.buffer) {
            warn!("Record at {:#x} unreadable: {}", address, e);
            return Loaded {
                value: T::default(),
                status: RecordStatus::Corrupt,
            };
        }

        match decode(version, &self.buffer) {
            Ok(value) => {
                debug!("Record at {:#x} loaded", address);
                Loaded {
                    value,
                    status: RecordStatus::Valid,
                }
            }
            Err(RecordError::Erased) => {
                info!("Record at {:#x} empty, using defaults", address);
                Loaded {
                    value: T::default(),
                    status: RecordStatus::Missing,
                }
            }
            Err(e) => {
                warn!("Record at {:#x} rejected: {}", address, e);
                Loaded {
                    value: T::default(),
                    status: RecordStatus::Corrupt,
                }
            }
        }
    }

    fn save<T: Serialize>(&mut self, offset: u32, version: u16, value: &T) -> Result<(), CoreError> {
        let address = self.base + offset;

        self.buffer.fill(0xFF);
        let len = encode(version, value, &mut self.buffer).map_err(|_| CoreError::CapacityExceeded)?;
        self.storage
            .erase_and_write(address, RECORD_SIZE as u32, &self.buffer[..len])?;

        info!("Record at {:#x} saved ({} bytes)", address, len);
        Ok(())
    }
}
