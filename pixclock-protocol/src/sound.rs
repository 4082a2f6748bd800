//! Sound queue elements consumed by the buzzer collaborator

/// One buzzer instruction: sound for `duration_ms`, `repeat_count` times
///
/// The buzzer inserts a pause of the same length between repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoundRequest {
    /// Tone length in milliseconds
    pub duration_ms: u16,
    /// Number of tones
    pub repeat_count: u8,
}

impl SoundRequest {
    /// Create a new request
    pub const fn new(duration_ms: u16, repeat_count: u8) -> Self {
        Self {
            duration_ms,
            repeat_count,
        }
    }

    /// A request that produces no sound
    pub const fn is_silent(&self) -> bool {
        self.duration_ms == 0 || self.repeat_count == 0
    }

    /// Total time the buzzer is busy with this request (tones and gaps)
    pub const fn busy_ms(&self) -> u32 {
        if self.repeat_count == 0 {
            return 0;
        }
        let tones = self.duration_ms as u32 * self.repeat_count as u32;
        let gaps = self.duration_ms as u32 * (self.repeat_count as u32 - 1);
        tones + gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_requests() {
        assert!(SoundRequest::new(0, 3).is_silent());
        assert!(SoundRequest::new(100, 0).is_silent());
        assert!(!SoundRequest::new(100, 1).is_silent());
    }

    #[test]
    fn test_busy_time_includes_gaps() {
        assert_eq!(SoundRequest::new(100, 1).busy_ms(), 100);
        assert_eq!(SoundRequest::new(100, 3).busy_ms(), 500);
        assert_eq!(SoundRequest::new(100, 0).busy_ms(), 0);
    }
}
