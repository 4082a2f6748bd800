//! Window compositor
//!
//! Owns a fixed arena of windows and multiplexes them onto the shared
//! framebuffer. Slot order is z-order: later slots are processed, and so
//! drawn, after earlier ones.
//!
//! A window that back-links to others covers them while it is open. The
//! covered windows are demoted to `Inactive` (not drawn, not scrolled) and
//! get their `Active` status back when the covering window is released.

use heapless::String;

use super::font::{draw_text, text_width, Font};
use super::framebuffer::{Color, FrameBuffer};
use super::scroll::{ScrollEngine, ScrollRequest, ScrollStep, MAX_SCROLL_TEXT};
use super::window::{
    PostAction, ScrollLane, Window, WindowEvent, WindowId, WindowSpec, WindowStatus, LANES,
};
use crate::error::CoreError;
use crate::fmt::{debug, trace};

/// Window slots
pub const MAX_WINDOWS: usize = 20;

/// Milliseconds between blink toggles
pub const BLINK_INTERVAL_MS: u64 = 500;

/// Horizontal text placement for static text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    Left,
    Centre,
}

/// What a compositor pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassReport {
    /// Columns pushed into lanes
    pub columns: u16,
    /// Windows that reached `Unused` during the pass
    pub released: u8,
    /// Scrolls that finished during the pass
    pub scrolls_finished: u8,
}

/// Window compositor
#[derive(Debug, Clone)]
pub struct Compositor {
    windows: [Window; MAX_WINDOWS],
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub const fn new() -> Self {
        Self {
            windows: [Window::UNUSED; MAX_WINDOWS],
        }
    }

    /// Open a window in the first free slot and draw it
    pub fn activate(
        &mut self,
        spec: &WindowSpec,
        now_ms: u64,
        fb: &mut FrameBuffer,
    ) -> Result<WindowId, CoreError> {
        if !spec.region.is_valid() {
            return Err(CoreError::InvalidRegion);
        }
        for link in spec.back_links.iter().flatten() {
            let linkable = self
                .windows
                .get(link.index())
                .is_some_and(|w| w.status.is_linkable());
            if !linkable {
                return Err(CoreError::InvalidBackLink);
            }
        }
        let slot = self
            .windows
            .iter()
            .position(|w| w.status == WindowStatus::Unused)
            .ok_or(CoreError::CapacityExceeded)?;

        for link in spec.back_links.iter().flatten() {
            self.windows[link.index()].apply(WindowEvent::Covered);
        }

        let window = Window::open(spec, now_ms);
        fb.fill(&window.region, window.inside);
        if window.border != window.inside {
            fb.border(&window.region, window.border);
        }
        self.windows[slot] = window;

        debug!("Window '{}' opened in slot {}", spec.name, slot);
        Ok(WindowId(slot as u8))
    }

    /// Start closing a window
    ///
    /// Deferred while any lane scrolls. Explosion windows animate first;
    /// the post action then runs and the window either holds for its
    /// countdown or is released.
    pub fn begin_close(&mut self, id: WindowId, fb: &mut FrameBuffer) -> Result<(), CoreError> {
        let window = self.live_mut(id)?;
        if window.status == WindowStatus::Countdown || window.is_closing() {
            return Ok(());
        }
        if window.is_scrolling() {
            trace!("Close of slot {} deferred until scroll ends", id.0);
            window.close_requested = true;
            return Ok(());
        }
        self.proceed_close(id, fb);
        Ok(())
    }

    /// Start a scroll on a lane of an active window
    pub fn scroll_text(
        &mut self,
        scrolls: &mut ScrollEngine,
        id: WindowId,
        lane: ScrollLane,
        font: Font,
        message: &str,
        repeat: u8,
        speed: u8,
    ) -> Result<(), CoreError> {
        let window = self.live_mut(id)?;
        if window.status != WindowStatus::Active || window.is_closing() {
            return Err(CoreError::UnknownWindow);
        }

        let mut text = String::<MAX_SCROLL_TEXT>::new();
        for ch in message.chars() {
            if text.push(ch).is_err() {
                break;
            }
        }

        scrolls.request_scroll(ScrollRequest {
            window: id,
            lane,
            rows: lane.rows(&window.region),
            font,
            message: text,
            repeat,
            speed,
        })?;
        window.scrolling[lane.index()] = true;
        Ok(())
    }

    /// Draw static text into a lane of a window
    ///
    /// Inactive windows are not drawn. Lanes that are scrolling are left
    /// alone.
    pub fn draw_text(
        &mut self,
        id: WindowId,
        lane: ScrollLane,
        text: &str,
        font: Font,
        align: Align,
        fb: &mut FrameBuffer,
    ) -> Result<(), CoreError> {
        let window = self.live_mut(id)?;
        if window.status != WindowStatus::Active
            || window.is_closing()
            || window.scrolling[lane.index()]
        {
            return Ok(());
        }

        let rows = lane.rows(&window.region);
        fb.fill(&rows, window.inside);
        let x = match align {
            Align::Left => rows.start_col,
            Align::Centre => {
                let width = text_width(text, font).min(rows.width() as u16) as u8;
                rows.start_col + (rows.width() - width) / 2
            }
        };
        draw_text(fb, &rows, x, rows.start_row, text, font);
        window.blink_inverted = false;
        Ok(())
    }

    /// Enable or disable blinking; a window left inverted is restored
    pub fn set_blink(
        &mut self,
        id: WindowId,
        blink: bool,
        now_ms: u64,
        fb: &mut FrameBuffer,
    ) -> Result<(), CoreError> {
        let window = self.live_mut(id)?;
        if !blink && window.blink_inverted {
            fb.invert(&window.region);
            window.blink_inverted = false;
        }
        window.blink = blink;
        window.last_blink_ms = now_ms;
        Ok(())
    }

    /// Advance every window by one tick
    ///
    /// In slot order: countdown, explosion step, blink, then one column per
    /// scrolling lane.
    pub fn tick(
        &mut self,
        elapsed_ms: u32,
        now_ms: u64,
        fb: &mut FrameBuffer,
        scrolls: &mut ScrollEngine,
    ) -> PassReport {
        let mut report = PassReport::default();

        for slot in 0..MAX_WINDOWS {
            let id = WindowId(slot as u8);

            match self.windows[slot].status {
                WindowStatus::Unused | WindowStatus::Inactive => continue,
                WindowStatus::Countdown => {
                    let window = &mut self.windows[slot];
                    window.countdown_remaining_ms =
                        window.countdown_remaining_ms.saturating_sub(elapsed_ms);
                    if window.countdown_remaining_ms == 0 {
                        window.apply(WindowEvent::CountdownElapsed);
                        self.release(id);
                        report.released += 1;
                    }
                    continue;
                }
                WindowStatus::Active => {}
            }

            if let Some(step) = self.windows[slot].explode_step {
                self.explode(id, step, fb);
                if self.windows[slot].status == WindowStatus::Unused {
                    report.released += 1;
                }
                continue;
            }

            let window = &mut self.windows[slot];
            if window.blink && now_ms.saturating_sub(window.last_blink_ms) >= BLINK_INTERVAL_MS {
                fb.invert(&window.region);
                window.blink_inverted = !window.blink_inverted;
                window.last_blink_ms = now_ms;
            }

            for lane in ScrollLane::ALL {
                if !self.windows[slot].scrolling[lane.index()] {
                    continue;
                }
                match scrolls.step(id, lane) {
                    ScrollStep::Wait => {}
                    ScrollStep::Column(column) => {
                        let rows = lane.rows(&self.windows[slot].region);
                        fb.shift_left(&rows, column);
                        report.columns += 1;
                    }
                    ScrollStep::Finished => {
                        self.windows[slot].scrolling[lane.index()] = false;
                        report.scrolls_finished += 1;
                    }
                }
            }

            let window = &self.windows[slot];
            if window.close_requested && !window.is_scrolling() {
                self.windows[slot].close_requested = false;
                self.proceed_close(id, fb);
                if self.windows[slot].status == WindowStatus::Unused {
                    report.released += 1;
                }
            }
        }

        report
    }

    /// Window in slot `id`
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id.index())
    }

    /// Status of slot `id`
    pub fn status(&self, id: WindowId) -> WindowStatus {
        self.window(id).map_or(WindowStatus::Unused, |w| w.status)
    }

    /// First live window called `name`
    pub fn find(&self, name: &str) -> Option<WindowId> {
        self.windows
            .iter()
            .position(|w| w.status != WindowStatus::Unused && w.name == name)
            .map(|slot| WindowId(slot as u8))
    }

    /// Slots not `Unused`
    pub fn live_count(&self) -> usize {
        self.windows
            .iter()
            .filter(|w| w.status != WindowStatus::Unused)
            .count()
    }

    fn live_mut(&mut self, id: WindowId) -> Result<&mut Window, CoreError> {
        match self.windows.get_mut(id.index()) {
            Some(window) if window.status != WindowStatus::Unused => Ok(window),
            _ => Err(CoreError::UnknownWindow),
        }
    }

    /// Run the explosion or go straight to the post action
    fn proceed_close(&mut self, id: WindowId, fb: &mut FrameBuffer) {
        if self.windows[id.index()].explode {
            self.windows[id.index()].explode_step = Some(0);
        } else {
            self.finish_close(id, fb);
        }
    }

    fn explode(&mut self, id: WindowId, step: u8, fb: &mut FrameBuffer) {
        let window = &mut self.windows[id.index()];
        let frame = window.region.centred_box(step);
        match window.post_action {
            PostAction::Draw => {
                fb.fill(&frame, window.inside);
                fb.border(&frame, window.border);
            }
            PostAction::Erase => fb.fill(&frame, Color::Off),
        }

        if frame == window.region {
            window.explode_step = None;
            self.finish_close(id, fb);
        } else {
            window.explode_step = Some(step.saturating_add(1));
        }
    }

    fn finish_close(&mut self, id: WindowId, fb: &mut FrameBuffer) {
        let window = &mut self.windows[id.index()];
        match window.post_action {
            PostAction::Draw => {
                fb.fill(&window.region, window.inside);
                fb.border(&window.region, window.border);
            }
            PostAction::Erase => fb.fill(&window.region, Color::Off),
        }
        window.blink_inverted = false;

        let hold = window.countdown_s > 0;
        window.apply(WindowEvent::Closed { hold });
        if hold {
            window.countdown_remaining_ms = window.countdown_s as u32 * 1000;
        } else {
            self.release(id);
        }
    }

    /// Slot reached `Unused`: restore covered windows and clear stale links
    fn release(&mut self, id: WindowId) {
        let links = self.windows[id.index()].back_links;
        for &target in links.iter().flatten() {
            // Stays covered while another live window still links to it
            let still_covered = self.windows.iter().enumerate().any(|(slot, w)| {
                slot != id.index()
                    && w.status != WindowStatus::Unused
                    && w.back_links.contains(&Some(target))
            });
            if !still_covered {
                self.windows[target.index()].apply(WindowEvent::Uncovered);
            }
        }

        for window in self.windows.iter_mut() {
            for link in window.back_links.iter_mut() {
                if *link == Some(id) {
                    *link = None;
                }
            }
        }

        debug!("Window slot {} released", id.0);
        self.windows[id.index()] = Window::UNUSED;
    }
}

/// Back-link array covering one window on `lane`
pub fn back_link(lane: ScrollLane, target: WindowId) -> [Option<WindowId>; LANES] {
    let mut links = [None; LANES];
    links[lane.index()] = Some(target);
    links
}
