//! Embassy tasks
//!
//! The tick task owns the controller; every other task is a thin driver
//! for one piece of board hardware.

mod buttons;
mod buzzer;
mod scan;
mod temperature;
mod tick;
mod time_link;

pub use buttons::button_task;
pub use buzzer::buzzer_task;
pub use scan::{scan_task, MatrixPins};
pub use temperature::temperature_task;
pub use tick::{tick_task, TICK_INTERVAL_MS};
pub use time_link::time_link_task;
