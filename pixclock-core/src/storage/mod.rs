//! CRC-validated persistence of configuration records

pub mod crc;
pub mod record;
pub mod store;

pub use crc::crc16;
pub use record::{RecordError, RECORD_SIZE};
pub use store::{ConfigStore, Loaded, RecordStatus, STORE_SIZE};
