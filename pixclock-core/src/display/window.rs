//! Window definitions and lifecycle
//!
//! A window is a rectangular region of the matrix with its own colours,
//! blink state, scroll lanes and close behaviour. Its status only changes
//! through [`WindowStatus::transition`].

use super::framebuffer::{Color, Region};
use super::font::GLYPH_HEIGHT;

/// Number of scroll lanes (and back-links) per window
pub const LANES: usize = 3;

/// Lane height: one glyph plus a blank row
pub const LANE_HEIGHT: u8 = GLYPH_HEIGHT + 1;

/// Index of a window slot in the compositor arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowId(pub u8);

impl WindowId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Window lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowStatus {
    /// Free slot
    #[default]
    Unused,
    /// Drawn and animated
    Active,
    /// Covered by a window that back-links to it; not drawn
    Inactive,
    /// Closed, holding its final image until the countdown elapses
    Countdown,
}

/// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowEvent {
    Open,
    /// A newly opened window back-links to this one
    Covered,
    /// The covering window was released
    Uncovered,
    /// Close transition finished; `hold` when a countdown is configured
    Closed { hold: bool },
    CountdownElapsed,
}

impl WindowStatus {
    /// Next status for `event`; events that do not apply leave the status unchanged
    pub fn transition(self, event: WindowEvent) -> Self {
        use WindowEvent::*;
        use WindowStatus::*;

        match (self, event) {
            (Unused, Open) => Active,

            (Active, Covered) => Inactive,
            (Inactive, Uncovered) => Active,

            (Active | Inactive, Closed { hold: true }) => Countdown,
            (Active | Inactive, Closed { hold: false }) => Unused,

            (Countdown, CountdownElapsed) => Unused,

            (state, _) => state,
        }
    }

    /// Returns true if the window may be the target of a back-link
    pub fn is_linkable(self) -> bool {
        matches!(self, WindowStatus::Active | WindowStatus::Inactive)
    }
}

/// What the close transition leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PostAction {
    /// Clear the region
    #[default]
    Erase,
    /// Fill with the inside colour and draw the border
    Draw,
}

/// Scroll lane inside a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollLane {
    Top,
    Middle,
    Bottom,
}

impl ScrollLane {
    pub const ALL: [ScrollLane; LANES] = [ScrollLane::Top, ScrollLane::Middle, ScrollLane::Bottom];

    pub fn index(self) -> usize {
        match self {
            ScrollLane::Top => 0,
            ScrollLane::Middle => 1,
            ScrollLane::Bottom => 2,
        }
    }

    /// Rows this lane occupies inside `region`
    ///
    /// Lanes are one glyph high. In a region shorter than a lane every lane
    /// covers the whole region.
    pub fn rows(self, region: &Region) -> Region {
        let height = region.height();
        if height <= LANE_HEIGHT {
            return *region;
        }
        let start = match self {
            ScrollLane::Top => region.start_row,
            ScrollLane::Middle => region.start_row + (height - LANE_HEIGHT) / 2,
            ScrollLane::Bottom => region.end_row + 1 - LANE_HEIGHT,
        };
        Region {
            start_row: start,
            end_row: start + LANE_HEIGHT - 1,
            ..*region
        }
    }
}

/// Parameters of a window to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowSpec {
    pub name: &'static str,
    pub region: Region,
    pub border: Color,
    pub inside: Color,
    pub post_action: PostAction,
    /// Seconds to hold the final image after closing (0 = release at once)
    pub countdown_s: u16,
    pub blink: bool,
    /// Animate a growing box before the post action
    pub explode: bool,
    /// Windows this one covers, restored when it is released
    pub back_links: [Option<WindowId>; LANES],
}

impl WindowSpec {
    /// Plain window with no border, links or transitions
    pub const fn new(name: &'static str, region: Region) -> Self {
        Self {
            name,
            region,
            border: Color::Off,
            inside: Color::Off,
            post_action: PostAction::Erase,
            countdown_s: 0,
            blink: false,
            explode: false,
            back_links: [None; LANES],
        }
    }
}

/// Compositor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub name: &'static str,
    pub region: Region,
    pub border: Color,
    pub inside: Color,
    pub post_action: PostAction,
    pub status: WindowStatus,
    pub blink: bool,
    /// Region currently shown inverted
    pub blink_inverted: bool,
    pub last_blink_ms: u64,
    pub countdown_s: u16,
    /// Milliseconds left while in `Countdown`
    pub countdown_remaining_ms: u32,
    pub explode: bool,
    /// Current explosion box step while closing
    pub explode_step: Option<u8>,
    pub back_links: [Option<WindowId>; LANES],
    pub scrolling: [bool; LANES],
    /// Close was requested while a lane was scrolling
    pub close_requested: bool,
}

impl Window {
    /// An empty slot
    pub const UNUSED: Window = Window {
        name: "",
        region: Region::FULL,
        border: Color::Off,
        inside: Color::Off,
        post_action: PostAction::Erase,
        status: WindowStatus::Unused,
        blink: false,
        blink_inverted: false,
        last_blink_ms: 0,
        countdown_s: 0,
        countdown_remaining_ms: 0,
        explode: false,
        explode_step: None,
        back_links: [None; LANES],
        scrolling: [false; LANES],
        close_requested: false,
    };

    pub(crate) fn open(spec: &WindowSpec, now_ms: u64) -> Self {
        Self {
            name: spec.name,
            region: spec.region,
            border: spec.border,
            inside: spec.inside,
            post_action: spec.post_action,
            status: WindowStatus::Unused.transition(WindowEvent::Open),
            blink: spec.blink,
            last_blink_ms: now_ms,
            countdown_s: spec.countdown_s,
            explode: spec.explode,
            back_links: spec.back_links,
            ..Self::UNUSED
        }
    }

    /// Returns true if any lane is scrolling
    pub fn is_scrolling(&self) -> bool {
        self.scrolling.iter().any(|&s| s)
    }

    /// Returns true while a close transition is pending or animating
    pub fn is_closing(&self) -> bool {
        self.close_requested || self.explode_step.is_some()
    }

    pub fn apply(&mut self, event: WindowEvent) {
        self.status = self.status.transition(event);
    }
}
