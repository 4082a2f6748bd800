//! Line codec for the network time co-processor
//!
//! The co-processor runs the DNS/UDP/NTP exchange and talks to the clock
//! over a UART with newline-terminated ASCII lines:
//!
//! ```text
//! clock → co-processor   SYNC
//! co-processor → clock   OK <utc epoch seconds>
//!                        ERR TIMEOUT | ERR DNS | ERR PROTO | ERR NOLINK
//! ```

use crate::sync::{SyncFailure, TimeSyncResult};

/// Request line asking for one exchange
pub const SYNC_REQUEST: &[u8] = b"SYNC\n";

/// Longest accepted response line, terminator excluded
pub const MAX_LINE: usize = 32;

/// Parse one response line (without its terminator)
///
/// Trailing `\r` and surrounding spaces are ignored. Returns `None` for
/// anything that is not a well-formed response.
pub fn parse_response(line: &[u8]) -> Option<TimeSyncResult> {
    let line = trim(line);

    if let Some(digits) = line.strip_prefix(b"OK ") {
        return parse_u64(trim(digits)).map(|epoch_seconds| TimeSyncResult::Success { epoch_seconds });
    }

    let kind = match trim(line.strip_prefix(b"ERR ")?) {
        b"TIMEOUT" => SyncFailure::Timeout,
        b"DNS" => SyncFailure::Dns,
        b"PROTO" => SyncFailure::ProtocolFault,
        b"NOLINK" => SyncFailure::NoLink,
        _ => return None,
    };
    Some(TimeSyncResult::Failure(kind))
}

fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [b' ' | b'\r', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' ' | b'\r'] = bytes {
        bytes = rest;
    }
    bytes
}

fn parse_u64(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add((b - b'0') as u64)
    })
}

/// Incremental decoder fed byte by byte from the UART
#[derive(Debug, Clone)]
pub struct LineDecoder {
    buffer: [u8; MAX_LINE],
    len: usize,
    /// Current line overflowed; discard until the next terminator
    overflow: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            buffer: [0; MAX_LINE],
            len: 0,
            overflow: false,
        }
    }

    /// Feed one byte; returns a result when a complete valid line ends
    pub fn push(&mut self, byte: u8) -> Option<TimeSyncResult> {
        if byte == b'\n' {
            let result = if self.overflow {
                None
            } else {
                parse_response(&self.buffer[..self.len])
            };
            self.len = 0;
            self.overflow = false;
            return result;
        }

        if self.len == MAX_LINE {
            self.overflow = true;
        } else {
            self.buffer[self.len] = byte;
            self.len += 1;
        }
        None
    }
}
