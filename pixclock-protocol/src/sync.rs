//! Result contract of the network time client
//!
//! The client owns DNS resolution, the UDP socket and NTP packet framing.
//! It reports one result per exchange the core asked for.

/// Why an exchange produced no time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncFailure {
    /// No response inside the client's own timeout
    Timeout,
    /// Server name could not be resolved
    Dns,
    /// Response arrived but was malformed (bad mode, stratum 0, kiss-o'-death)
    ProtocolFault,
    /// Network link down
    NoLink,
}

/// One-shot result delivered by the network time collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSyncResult {
    /// Exchange succeeded; UTC seconds since the Unix epoch
    Success { epoch_seconds: u64 },
    /// Exchange failed
    Failure(SyncFailure),
}

impl TimeSyncResult {
    /// Returns true if the failure should defer the next attempt with backoff
    pub fn needs_backoff(&self) -> bool {
        matches!(self, TimeSyncResult::Failure(SyncFailure::ProtocolFault))
    }
}
