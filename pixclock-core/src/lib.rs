//! Board-agnostic core of the pixel-matrix clock firmware
//!
//! Everything that decides what the clock shows and when it rings lives
//! here, independent of the RP2040 board:
//!
//! - Wall time with DST rules, reconciled against a network time source
//! - Alarm, reminder, calendar and auto-scroll scheduling
//! - Window compositor and text scroll engine over a 64×32 framebuffer
//! - CRC-validated configuration records
//! - The tick controller that runs all of the above in a fixed order

#![no_std]
#![deny(unsafe_code)]

pub(crate) mod fmt;

pub mod config;
pub mod content;
pub mod controller;
pub mod display;
pub mod error;
pub mod input;
pub mod scheduler;
pub mod sound;
pub mod storage;
pub mod time;
pub mod traits;

pub use controller::{Controller, TickIo, TickReport};
pub use error::{CoreError, FaultCounters};
