//! Collaborator contracts for the pixclock core
//!
//! The clock core talks to three external execution contexts. Each one is
//! reduced here to the small value types that cross the boundary:
//!
//! ```text
//!  button / IR decoder ──ButtonEvent──▶ ┌──────────────┐
//!                                       │ pixclock-core│ ──SoundRequest──▶ buzzer
//!  network time client ─TimeSyncResult▶ └──────────────┘
//! ```
//!
//! Transport mechanics (GPIO sampling, DNS/UDP, PWM waveforms) stay on the
//! collaborator side; only these contracts are shared.

#![no_std]
#![deny(unsafe_code)]

pub mod input;
pub mod link;
pub mod sound;
pub mod sync;

pub use input::ButtonEvent;
pub use link::{parse_response, LineDecoder, SYNC_REQUEST};
pub use sound::SoundRequest;
pub use sync::{SyncFailure, TimeSyncResult};
