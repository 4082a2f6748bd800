//! Outgoing sound queue
//!
//! The core pushes [`SoundRequest`]s; the buzzer task pops them. A full
//! queue rejects the new request and keeps what is already queued.

use heapless::Deque;
use pixclock_protocol::SoundRequest;

use crate::error::CoreError;
use crate::fmt::trace;

/// Queue depth
pub const SOUND_QUEUE_LEN: usize = 100;

/// Single beep used by alarms and reminders without their own pattern
pub const BEEP: SoundRequest = SoundRequest::new(100, 1);

/// Hourly chime
pub const CHIME: SoundRequest = SoundRequest::new(60, 2);

static JINGLES: [&[SoundRequest]; 4] = [
    &[SoundRequest::new(120, 2)],
    &[
        SoundRequest::new(80, 3),
        SoundRequest::new(250, 1),
        SoundRequest::new(80, 3),
    ],
    &[
        SoundRequest::new(200, 1),
        SoundRequest::new(100, 2),
        SoundRequest::new(400, 1),
    ],
    &[SoundRequest::new(50, 8)],
];

/// Tone sequence of calendar jingle `id`; unknown ids fall back to the first
pub fn jingle(id: u8) -> &'static [SoundRequest] {
    JINGLES.get(id as usize).copied().unwrap_or(JINGLES[0])
}

/// Bounded FIFO of buzzer requests
#[derive(Debug, Clone, Default)]
pub struct SoundQueue {
    queue: Deque<SoundRequest, SOUND_QUEUE_LEN>,
}

impl SoundQueue {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Queue a request; silent requests are accepted and dropped
    pub fn push(&mut self, request: SoundRequest) -> Result<(), CoreError> {
        if request.is_silent() {
            return Ok(());
        }
        self.queue.push_back(request).map_err(|_| {
            trace!("Sound queue full");
            CoreError::CapacityExceeded
        })
    }

    /// Queue every tone of a sequence, stopping at the first rejection
    pub fn push_all(&mut self, requests: &[SoundRequest]) -> Result<(), CoreError> {
        for request in requests {
            self.push(*request)?;
        }
        Ok(())
    }

    pub fn pop(&mut self) -> Option<SoundRequest> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Move every queued request into `other`, stopping when it is full
    pub fn drain_into(&mut self, other: &mut SoundQueue) -> Result<(), CoreError> {
        while let Some(request) = self.queue.front().copied() {
            other.push(request)?;
            self.queue.pop_front();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_when_full() {
        let mut queue = SoundQueue::new();
        for _ in 0..SOUND_QUEUE_LEN {
            queue.push(BEEP).unwrap();
        }
        assert_eq!(
            queue.push(SoundRequest::new(999, 1)),
            Err(CoreError::CapacityExceeded)
        );
        // Oldest entries are kept
        assert_eq!(queue.len(), SOUND_QUEUE_LEN);
        assert_eq!(queue.pop(), Some(BEEP));
    }

    #[test]
    fn test_silent_is_not_queued() {
        let mut queue = SoundQueue::new();
        queue.push(SoundRequest::new(0, 4)).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_jingle_fallback() {
        assert_eq!(jingle(1).len(), 3);
        assert_eq!(jingle(200), jingle(0));
    }

    #[test]
    fn test_drain_into_stops_when_full() {
        let mut local = SoundQueue::new();
        local.push_all(&[BEEP, CHIME]).unwrap();

        let mut shared = SoundQueue::new();
        for _ in 0..SOUND_QUEUE_LEN - 1 {
            shared.push(BEEP).unwrap();
        }
        assert_eq!(local.drain_into(&mut shared), Err(CoreError::CapacityExceeded));
        assert_eq!(local.len(), 1);
        assert_eq!(local.pop(), Some(CHIME));
    }
}
