//! Record framing
//!
//! ```text
//! +------------+------------+------------------+----------+
//! | version:u16| length:u16 | postcard payload | crc16:u16|
//! +------------+------------+------------------+----------+
//! ```
//!
//! All fields little endian. The CRC covers every byte before it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::crc::crc16;

/// Size of one record region in flash (one erase sector)
pub const RECORD_SIZE: usize = 4096;

/// Version + length
pub const HEADER_SIZE: usize = 4;

/// Trailing checksum
pub const CRC_SIZE: usize = 2;

/// Largest payload that fits a record
pub const MAX_PAYLOAD_SIZE: usize = RECORD_SIZE - HEADER_SIZE - CRC_SIZE;

/// Why a record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Region is still erased
    Erased,
    /// Length field exceeds the region
    BadLength,
    /// Stored CRC does not match the contents
    CrcMismatch,
    /// Record was written by an incompatible layout
    VersionMismatch,
    /// Value does not fit in a record
    Encode,
    /// CRC matched but the payload did not deserialize
    Decode,
}

/// Frame `value` into `buffer`, returning the number of bytes used
pub fn encode<T: Serialize>(
    version: u16,
    value: &T,
    buffer: &mut [u8; RECORD_SIZE],
) -> Result<usize, RecordError> {
    let payload_len = postcard::to_slice(value, &mut buffer[HEADER_SIZE..HEADER_SIZE + MAX_PAYLOAD_SIZE])
        .map_err(|_| RecordError::Encode)?
        .len();

    buffer[0..2].copy_from_slice(&version.to_le_bytes());
    buffer[2..4].copy_from_slice(&(payload_len as u16).to_le_bytes());

    let crc_offset = HEADER_SIZE + payload_len;
    let crc = crc16(&buffer[..crc_offset]);
    buffer[crc_offset..crc_offset + CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

    Ok(crc_offset + CRC_SIZE)
}

/// Validate and deserialize a framed record
pub fn decode<T: DeserializeOwned>(version: u16, buffer: &[u8]) -> Result<T, RecordError> {
    if buffer.len() < HEADER_SIZE + CRC_SIZE {
        return Err(RecordError::BadLength);
    }

    let stored_version = u16::from_le_bytes([buffer[0], buffer[1]]);
    let payload_len = u16::from_le_bytes([buffer[2], buffer[3]]) as usize;

    if stored_version == 0xFFFF && payload_len == 0xFFFF {
        return Err(RecordError::Erased);
    }
    if payload_len > MAX_PAYLOAD_SIZE || HEADER_SIZE + payload_len + CRC_SIZE > buffer.len() {
        return Err(RecordError::BadLength);
    }

    let crc_offset = HEADER_SIZE + payload_len;
    let stored_crc = u16::from_le_bytes([buffer[crc_offset], buffer[crc_offset + 1]]);
    if stored_crc != crc16(&buffer[..crc_offset]) {
        return Err(RecordError::CrcMismatch);
    }
    if stored_version != version {
        return Err(RecordError::VersionMismatch);
    }

    postcard::from_bytes(&buffer[HEADER_SIZE..crc_offset]).map_err(|_| RecordError::Decode)
}
