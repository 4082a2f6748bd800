//! Logging shim
//!
//! Forwards to `defmt` when the `defmt` feature is enabled; otherwise the
//! macros only borrow their arguments so host builds and tests carry no
//! logger and no unused-variable warnings.

#![allow(unused_macros, unused_imports)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        pub(crate) use defmt::{debug, info, trace, warn};
    } else {
        macro_rules! log_trace {
            ($s:literal $(, $x:expr)* $(,)?) => {{ let _ = ($(&$x),*); }};
        }
        macro_rules! log_debug {
            ($s:literal $(, $x:expr)* $(,)?) => {{ let _ = ($(&$x),*); }};
        }
        macro_rules! log_info {
            ($s:literal $(, $x:expr)* $(,)?) => {{ let _ = ($(&$x),*); }};
        }
        macro_rules! log_warn {
            ($s:literal $(, $x:expr)* $(,)?) => {{ let _ = ($(&$x),*); }};
        }

        // `warn` alone would clash with the built-in lint attribute
        pub(crate) use log_debug as debug;
        pub(crate) use log_info as info;
        pub(crate) use log_trace as trace;
        pub(crate) use log_warn as warn;
    }
}
