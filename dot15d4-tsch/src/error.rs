//! Crate-wide error and status types.

pub use crate::queue::TxStatus as MacTxStatus;

/// An error that can occur while driving the per-timeslot engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The radio driver reported a failure preparing or starting an
    /// operation.
    Radio,
    /// A frame could not be parsed or built.
    Frame,
    /// Link-layer security processing failed (MIC mismatch, replay, or the
    /// security codec reported an error).
    Security,
    /// No active link was found within the configured scheduling horizon.
    ScheduleExhausted,
}

/// A type alias for `Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;
