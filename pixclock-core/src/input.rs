//! Incoming button queue
//!
//! The input decoder pushes one [`ButtonEvent`] per gesture; the tick drains
//! the queue once. When the queue is full the oldest event is dropped.

use heapless::Deque;
use pixclock_protocol::ButtonEvent;

use crate::fmt::debug;

/// Queue depth
pub const INPUT_QUEUE_LEN: usize = 10;

/// Bounded drop-oldest queue of button events
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    queue: Deque<ButtonEvent, INPUT_QUEUE_LEN>,
    overflows: u16,
}

impl InputQueue {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            overflows: 0,
        }
    }

    /// Queue an event; `None` codes are ignored
    pub fn push(&mut self, event: ButtonEvent) {
        if event == ButtonEvent::None {
            return;
        }
        if self.queue.is_full() {
            self.queue.pop_front();
            self.overflows = self.overflows.saturating_add(1);
            debug!("Input queue overflow, dropped oldest");
        }
        self.queue.push_back(event).ok();
    }

    pub fn pop(&mut self) -> Option<ButtonEvent> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Events dropped since the last call
    pub fn take_overflows(&mut self) -> u16 {
        core::mem::take(&mut self.overflows)
    }

    /// Move every queued event into `other`, which drops its oldest as needed
    pub fn drain_into(&mut self, other: &mut InputQueue) {
        while let Some(event) = self.pop() {
            other.push(event);
        }
        other.overflows = other.overflows.saturating_add(self.take_overflows());
    }
}
