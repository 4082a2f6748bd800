//! Text scroll engine
//!
//! Each active scroll turns a message into a stream of pixel columns. The
//! next glyphs are staged in a small per-row bitmap buffer; one column
//! leaves the buffer every `speed` ticks. After the last content column the
//! scroll keeps emitting blank columns until the text has left the window.

use heapless::String;

use super::font::{glyph, Font, GLYPH_SPACING};
use super::framebuffer::Region;
use super::window::{ScrollLane, WindowId};
use crate::error::CoreError;
use crate::fmt::trace;

/// Maximum concurrent scrolls
pub const MAX_SCROLLS: usize = 10;

/// Longest message a scroll can carry
pub const MAX_SCROLL_TEXT: usize = 96;

/// Buffer is refilled while it holds fewer columns than this
pub const REFILL_THRESHOLD: u8 = 8;

/// Rows a scroll can drive
const BUFFER_ROWS: usize = 8;

/// Parameters of a scroll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub window: WindowId,
    pub lane: ScrollLane,
    /// Rows and columns written by the scroll
    pub rows: Region,
    pub font: Font,
    pub message: String<MAX_SCROLL_TEXT>,
    /// Passes of the message
    pub repeat: u8,
    /// Ticks per column (0 behaves as 1)
    pub speed: u8,
}

/// Result of advancing one scroll by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollStep {
    /// Not due this tick
    Wait,
    /// Feed this column into the lane (bit n = row n of the lane)
    Column(u8),
    /// Scroll destroyed; the window's lane flag must be cleared
    Finished,
}

/// A running scroll
#[derive(Debug, Clone)]
pub struct ActiveScroll {
    window: WindowId,
    lane: ScrollLane,
    rows: Region,
    font: Font,
    message: String<MAX_SCROLL_TEXT>,
    repeat: u8,
    speed: u8,
    ticks_until_due: u8,
    /// Next byte of `message` to stage
    cursor: usize,
    /// Bit (31 - k) of row r holds buffered column k
    buffer: [u32; BUFFER_ROWS],
    buffer_remaining: u8,
    display_remaining: u16,
}

impl ActiveScroll {
    fn new(request: ScrollRequest) -> Self {
        let repeat = if request.message.is_empty() {
            0
        } else {
            request.repeat
        };
        Self {
            window: request.window,
            lane: request.lane,
            rows: request.rows,
            font: request.font,
            message: request.message,
            repeat,
            speed: request.speed.max(1),
            ticks_until_due: 0,
            cursor: 0,
            buffer: [0; BUFFER_ROWS],
            buffer_remaining: 0,
            display_remaining: 0,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn lane(&self) -> ScrollLane {
        self.lane
    }

    pub fn rows(&self) -> &Region {
        &self.rows
    }

    /// Passes still to be staged
    pub fn repeat(&self) -> u8 {
        self.repeat
    }

    /// Columns staged but not yet emitted
    pub fn buffer_remaining(&self) -> u8 {
        self.buffer_remaining
    }

    /// Blank columns still needed to clear the window
    pub fn display_remaining(&self) -> u16 {
        self.display_remaining
    }

    /// Stage glyphs until the buffer reaches the threshold or the text runs out
    fn refill(&mut self) {
        while self.buffer_remaining < REFILL_THRESHOLD && self.repeat > 0 {
            let ch = self.message.as_bytes()[self.cursor];
            let glyph = glyph(ch, self.font);
            for &column in glyph.columns() {
                self.push_column(column);
            }
            for _ in 0..GLYPH_SPACING {
                self.push_column(0);
            }

            self.cursor += 1;
            if self.cursor >= self.message.len() {
                self.cursor = 0;
                self.repeat -= 1;
            }
        }
    }

    fn push_column(&mut self, column: u8) {
        let bit = 31 - self.buffer_remaining as u32;
        for (row, bits) in self.buffer.iter_mut().enumerate() {
            if column & (1 << row) != 0 {
                *bits |= 1 << bit;
            }
        }
        self.buffer_remaining += 1;
    }

    fn pop_column(&mut self) -> u8 {
        let mut column = 0;
        for (row, bits) in self.buffer.iter_mut().enumerate() {
            if *bits & 0x8000_0000 != 0 {
                column |= 1 << row;
            }
            *bits <<= 1;
        }
        self.buffer_remaining -= 1;
        column
    }

    fn step(&mut self) -> ScrollStep {
        if self.ticks_until_due > 0 {
            self.ticks_until_due -= 1;
            return ScrollStep::Wait;
        }
        self.ticks_until_due = self.speed - 1;

        self.refill();

        if self.buffer_remaining > 0 {
            self.display_remaining = self.rows.width() as u16;
            ScrollStep::Column(self.pop_column())
        } else if self.display_remaining > 0 {
            self.display_remaining -= 1;
            ScrollStep::Column(0)
        } else {
            ScrollStep::Finished
        }
    }
}

/// Fixed table of active scrolls
#[derive(Debug, Clone)]
pub struct ScrollEngine {
    slots: [Option<ActiveScroll>; MAX_SCROLLS],
}

impl Default for ScrollEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollEngine {
    pub const fn new() -> Self {
        const EMPTY: Option<ActiveScroll> = None;
        Self {
            slots: [EMPTY; MAX_SCROLLS],
        }
    }

    /// Start a scroll
    ///
    /// A lane carries one scroll at a time; a request for a busy lane
    /// replaces the running scroll.
    pub fn request_scroll(&mut self, request: ScrollRequest) -> Result<(), CoreError> {
        let slot = match self.position(request.window, request.lane) {
            Some(index) => index,
            None => self
                .slots
                .iter()
                .position(Option::is_none)
                .ok_or(CoreError::CapacityExceeded)?,
        };
        trace!("Scroll slot {} for window {}", slot, request.window.0);
        self.slots[slot] = Some(ActiveScroll::new(request));
        Ok(())
    }

    /// Advance the scroll on (window, lane) by one tick
    ///
    /// Returns `Finished` (and frees the slot) when nothing is left to show,
    /// and also when no scroll exists for the lane.
    pub fn step(&mut self, window: WindowId, lane: ScrollLane) -> ScrollStep {
        let Some(index) = self.position(window, lane) else {
            return ScrollStep::Finished;
        };
        let step = match self.slots[index].as_mut() {
            Some(scroll) => scroll.step(),
            None => ScrollStep::Finished,
        };
        if step == ScrollStep::Finished {
            self.slots[index] = None;
        }
        step
    }

    /// Stop staging new passes for every scroll of `window`
    ///
    /// Text already on screen still scrolls out.
    pub fn stop_repeats(&mut self, window: WindowId) {
        for scroll in self.slots.iter_mut().flatten() {
            if scroll.window == window {
                scroll.repeat = 0;
            }
        }
    }

    /// Drop every scroll of `window` immediately
    pub fn cancel_window(&mut self, window: WindowId) {
        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|s| s.window == window) {
                *slot = None;
            }
        }
    }

    /// Scroll on (window, lane), if any
    pub fn get(&self, window: WindowId, lane: ScrollLane) -> Option<&ActiveScroll> {
        self.position(window, lane)
            .and_then(|index| self.slots[index].as_ref())
    }

    /// Number of active scrolls
    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Iterate over active scrolls
    pub fn iter(&self) -> impl Iterator<Item = &ActiveScroll> {
        self.slots.iter().flatten()
    }

    fn position(&self, window: WindowId, lane: ScrollLane) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.window == window && s.lane == lane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(window: u8, text: &str, repeat: u8, speed: u8) -> ScrollRequest {
        let mut message = String::new();
        message.push_str(text).unwrap();
        ScrollRequest {
            window: WindowId(window),
            lane: ScrollLane::Top,
            rows: Region::new(24, 31, 0, 15).unwrap(),
            font: Font::Normal,
            message,
            repeat,
            speed,
        }
    }

    fn run_to_end(engine: &mut ScrollEngine, window: u8) -> (u32, u32) {
        let (mut content, mut total) = (0, 0);
        for _ in 0..10_000 {
            match engine.step(WindowId(window), ScrollLane::Top) {
                ScrollStep::Column(c) => {
                    total += 1;
                    if c != 0 {
                        content = total;
                    }
                }
                ScrollStep::Wait => {}
                ScrollStep::Finished => return (content, total),
            }
        }
        panic!("scroll never finished");
    }

    #[test]
    fn test_emits_text_then_clears_window() {
        let mut engine = ScrollEngine::new();
        engine.request_scroll(request(0, "I", 1, 1)).unwrap();

        // "I" is 3 wide + 1 spacing, then 16 blank columns to clear the window
        let (_, total) = run_to_end(&mut engine, 0);
        assert_eq!(total, 4 + 16);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_first_column_of_glyph() {
        let mut engine = ScrollEngine::new();
        engine.request_scroll(request(0, "L", 1, 1)).unwrap();
        assert_eq!(
            engine.step(WindowId(0), ScrollLane::Top),
            ScrollStep::Column(0x7F)
        );
        assert_eq!(
            engine.step(WindowId(0), ScrollLane::Top),
            ScrollStep::Column(0x40)
        );
    }

    #[test]
    fn test_repeat_counts_passes() {
        let mut once = ScrollEngine::new();
        once.request_scroll(request(0, "AB", 1, 1)).unwrap();
        let (_, one) = run_to_end(&mut once, 0);

        let mut twice = ScrollEngine::new();
        twice.request_scroll(request(0, "AB", 2, 1)).unwrap();
        let (_, two) = run_to_end(&mut twice, 0);

        // "AB" = 5 + 1 + 5 + 1 columns per pass
        assert_eq!(two - one, 12);
    }

    #[test]
    fn test_speed_divides_rate() {
        let mut engine = ScrollEngine::new();
        engine.request_scroll(request(0, "I", 1, 3)).unwrap();
        assert!(matches!(
            engine.step(WindowId(0), ScrollLane::Top),
            ScrollStep::Column(_)
        ));
        assert_eq!(engine.step(WindowId(0), ScrollLane::Top), ScrollStep::Wait);
        assert_eq!(engine.step(WindowId(0), ScrollLane::Top), ScrollStep::Wait);
        assert!(matches!(
            engine.step(WindowId(0), ScrollLane::Top),
            ScrollStep::Column(_)
        ));
    }

    #[test]
    fn test_capacity() {
        let mut engine = ScrollEngine::new();
        for window in 0..MAX_SCROLLS as u8 {
            engine.request_scroll(request(window, "X", 1, 1)).unwrap();
        }
        assert_eq!(
            engine.request_scroll(request(42, "X", 1, 1)),
            Err(CoreError::CapacityExceeded)
        );
        // Same lane replaces instead of allocating
        assert!(engine.request_scroll(request(0, "Y", 1, 1)).is_ok());
    }

    #[test]
    fn test_empty_message_finishes() {
        let mut engine = ScrollEngine::new();
        engine.request_scroll(request(0, "", 3, 1)).unwrap();
        assert_eq!(
            engine.step(WindowId(0), ScrollLane::Top),
            ScrollStep::Finished
        );
    }

    #[test]
    fn test_stop_repeats_drains() {
        let mut engine = ScrollEngine::new();
        engine.request_scroll(request(0, "HELLO", 200, 1)).unwrap();
        engine.step(WindowId(0), ScrollLane::Top);
        engine.stop_repeats(WindowId(0));
        let (_, total) = run_to_end(&mut engine, 0);
        assert!(total < 200);
    }
}
