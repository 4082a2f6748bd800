//! Time and daylight saving model
//!
//! Calendar arithmetic, DST rule evaluation, the monotonic wall clock and
//! the network time exchange that corrects it.

pub mod calendar;
pub mod clock;
pub mod dst;
pub mod sync;

pub use calendar::{WallTime, Weekday};
pub use clock::{Clock, DEFAULT_EPOCH_SECONDS};
pub use dst::{dst_active_for, DstCountry, DstRule, DstTransition};
pub use sync::{SyncAction, SyncPhase, TimeSync};
