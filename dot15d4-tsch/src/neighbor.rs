//! The neighbor table kept by the upper layer. The per-timeslot engine only
//! ever needs a handful of per-neighbor facts (addressing, synchronization
//! role, CSMA backoff state) — the table itself, and everything else it
//! tracks (ETX, LQI, routing metrics, ...), lives outside this crate.

use crate::time::Instant;

/// IEEE 802.15.4 extended address of a neighbor.
pub type NeighborAddress = [u8; 8];

/// The broadcast pseudo-neighbor address. Used for the shared-link broadcast
/// transmit queue, addressed by `0xff` repeated across all eight bytes.
pub const BROADCAST_ADDRESS: NeighborAddress = [0xff; 8];

/// Trait implemented by the upper layer's neighbor table entries. The engine
/// borrows neighbor state for exactly as long as it needs it during a slot —
/// it never owns or allocates neighbors itself.
pub trait Neighbor {
    /// The IEEE 802.15.4 extended address of this neighbor.
    fn address(&self) -> NeighborAddress;

    /// `true` for the sentinel broadcast neighbor used by shared links.
    fn is_broadcast(&self) -> bool {
        self.address() == BROADCAST_ADDRESS
    }

    /// `true` if this neighbor is the device's current time source, i.e. the
    /// neighbor whose Enhanced Beacons and Enhanced ACKs are used to correct
    /// local drift.
    fn is_time_source(&self) -> bool;

    /// Current CSMA contention window, in units of backoff slots, used on
    /// shared links.
    fn backoff_window(&self) -> u16;

    /// Current CSMA backoff exponent.
    fn backoff_exponent(&self) -> u8;

    /// Instant of the last successful transmission to this neighbor.
    fn last_tx(&self) -> Instant;

    /// Set the CSMA contention window.
    fn set_backoff_window(&mut self, window: u16);

    /// Set the CSMA backoff exponent.
    fn set_backoff_exponent(&mut self, exponent: u8);

    /// Record the instant of a successful transmission to this neighbor.
    fn set_last_tx(&mut self, instant: Instant);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    pub(crate) struct TestNeighbor {
        address: NeighborAddress,
        is_time_source: bool,
        backoff_window: u16,
        backoff_exponent: u8,
        last_tx: Instant,
    }

    impl TestNeighbor {
        pub(crate) fn new(address: NeighborAddress) -> Self {
            Self {
                address,
                is_time_source: false,
                backoff_window: 0,
                backoff_exponent: crate::config::MIN_BACKOFF_EXPONENT,
                last_tx: Instant::from_us(0),
            }
        }

        pub(crate) fn broadcast() -> Self {
            Self::new(BROADCAST_ADDRESS)
        }

        pub(crate) fn time_source(mut self) -> Self {
            self.is_time_source = true;
            self
        }
    }

    impl Neighbor for TestNeighbor {
        fn address(&self) -> NeighborAddress {
            self.address
        }

        fn is_time_source(&self) -> bool {
            self.is_time_source
        }

        fn backoff_window(&self) -> u16 {
            self.backoff_window
        }

        fn backoff_exponent(&self) -> u8 {
            self.backoff_exponent
        }

        fn last_tx(&self) -> Instant {
            self.last_tx
        }

        fn set_backoff_window(&mut self, window: u16) {
            self.backoff_window = window;
        }

        fn set_backoff_exponent(&mut self, exponent: u8) {
            self.backoff_exponent = exponent;
        }

        fn set_last_tx(&mut self, instant: Instant) {
            self.last_tx = instant;
        }
    }
}
