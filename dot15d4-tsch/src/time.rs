//! Time types shared with the frame crate. Kept as a thin re-export so the
//! engine, like the frame reader/writer layer, speaks in [`Instant`] and
//! [`Duration`] rather than raw integers.

pub use dot15d4_tsch_frame::{Duration, Instant};
