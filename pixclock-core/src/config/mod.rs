//! Configuration types
//!
//! Operator settings and schedule tables, stored in flash as postcard
//! binary data inside CRC-checked records.

pub mod settings;
pub mod types;

pub use settings::*;
pub use types::*;
