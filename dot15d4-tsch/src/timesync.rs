//! Time synchronization hook.
//!
//! The engine measures drift directly (from an Enhanced ACK's time
//! correction field, or from the arrival offset of an Enhanced Beacon) but
//! never decides on its own how that measurement should feed back into the
//! slot timer: that policy — how aggressively to compensate, whether to
//! filter out single-sample jitter, when to ask for an extra synchronization
//! opportunity — is delegated to a [`TimeSync`] implementation, the same way
//! frame security is delegated to a [`SecurityCodec`](crate::security::SecurityCodec).

use crate::neighbor::NeighborAddress;
use crate::time::Duration;

/// Consulted by the slot-operation loop when advancing to the next
/// timeslot, and by the TX/RX slot engines whenever a drift measurement
/// becomes available.
pub trait TimeSync {
    /// Adjust the length of the upcoming inter-slot gap to compensate for
    /// systematic clock skew accumulated since the last correction. Called
    /// once per scheduled slot with the nominal gap; returns the actual gap
    /// to wait. A no-op filter returns `dt` unchanged.
    fn adaptive_compensate(&mut self, dt: Duration) -> Duration;

    /// Feed a new drift measurement from `neighbor` into the filter:
    /// `since_last_sync` is how long it's been since the previous accepted
    /// correction from this time source, `correction` the clamped
    /// correction extracted from the frame.
    fn timesync_update(&mut self, neighbor: NeighborAddress, since_last_sync: Duration, correction: Duration);

    /// Called whenever a fresh synchronization opportunity is consumed
    /// (an accepted Enhanced ACK or Enhanced Beacon correction), letting the
    /// filter request an earlier-than-scheduled keepalive transmission if
    /// it judges the current sync quality too stale.
    fn schedule_keepalive(&mut self);
}

/// The filter wired in when no adaptive compensation is desired: every gap
/// passes through unmodified and no keepalive is ever requested early. This
/// is still a full implementation of [`TimeSync`], not a disabled stub — a
/// node that never calls [`TimeSync::timesync_update`] has no skew to
/// compensate for in the first place.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTimeSync;

impl TimeSync for PassthroughTimeSync {
    fn adaptive_compensate(&mut self, dt: Duration) -> Duration {
        dt
    }

    fn timesync_update(&mut self, _neighbor: NeighborAddress, _since_last_sync: Duration, _correction: Duration) {}

    fn schedule_keepalive(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbor::BROADCAST_ADDRESS;

    #[test]
    fn passthrough_leaves_the_gap_unchanged() {
        let mut ts = PassthroughTimeSync;
        let dt = Duration::from_us(10_000);
        assert_eq!(ts.adaptive_compensate(dt), dt);
        ts.timesync_update(BROADCAST_ADDRESS, Duration::from_us(1_000_000), Duration::from_us(45));
        ts.schedule_keepalive();
    }
}
