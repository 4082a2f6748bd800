//! Display layer
//!
//! Framebuffer, glyphs, windows, the scroll engine and the compositor that
//! ties them together.

pub mod compositor;
pub mod font;
pub mod framebuffer;
pub mod scroll;
pub mod window;

pub use compositor::{back_link, Align, Compositor, PassReport, BLINK_INTERVAL_MS, MAX_WINDOWS};
pub use font::Font;
pub use framebuffer::{Color, FrameBuffer, Region, FRAME_BYTES, HEIGHT, WIDTH};
pub use scroll::{ScrollEngine, ScrollRequest, ScrollStep, MAX_SCROLLS};
pub use window::{PostAction, ScrollLane, Window, WindowId, WindowSpec, WindowStatus};
