//! Compile-time configuration knobs.
//!
//! Values are read from `DOT15D4_TSCH_*` environment variables at build
//! time by `build.rs`, with the defaults below used when a variable is
//! unset. Tests bypass the build script and use the literal defaults in
//! [`customizable`] directly, the same split the rest of the crate uses for
//! its own constant tables.

#![allow(dead_code)]

pub use customizable::*;

use crate::time::Duration;

/// Clock rate of the slot timer, in ticks per second. The engine expresses
/// every offset and duration in these ticks.
pub const TIMER_TICKS_PER_SECOND: u32 = 1_000_000;

/// Minimum guard window applied around a scheduled wake-up to absorb timer
/// granularity and scheduling jitter: `max(TIMER_TICKS_PER_SECOND / 100_000, 2)` ticks.
pub const GUARD_TICKS: u32 = {
    let derived = TIMER_TICKS_PER_SECOND / 100_000;
    if derived > 2 {
        derived
    } else {
        2
    }
};

/// The minimum backoff exponent used to reset a neighbor's CSMA state.
pub const MIN_BACKOFF_EXPONENT: u8 = 1;
/// The maximum backoff exponent a neighbor's CSMA state may reach.
pub const MAX_BACKOFF_EXPONENT: u8 = 5;

/// Fraction of the RX guard time within which a received frame's arrival
/// must fall for drift correction to be trusted: `rx_wait / 4`.
pub fn sync_bound(rx_wait: Duration) -> Duration {
    rx_wait / 4
}


#[cfg(not(test))]
mod customizable {
    #![allow(unused)]
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}
