//! Per-neighbor transmit queues. Ownership of the queues lives with the
//! upper layer; the engine only ever borrows one packet at a time through
//! the [`Queue`] trait.

use crate::neighbor::{Neighbor, NeighborAddress};

/// Maximum length, in bytes, of a queued MAC frame (header through payload,
/// before the Enhanced ACK / security expansion).
pub const MAX_FRAME_LEN: usize = 127;

/// The outcome of the most recent transmission attempt for a queued packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Never attempted yet.
    Pending,
    /// Acknowledged successfully.
    Ok,
    /// No acknowledgment was received before the ack-wait timeout expired.
    NoAck,
    /// A CSMA collision was detected (CCA reported a busy channel on every
    /// retry, or the shared-link backoff window never granted the slot).
    Collision,
    /// The radio driver reported a transmission error.
    Err,
    /// A fatal, non-retryable error (e.g. the frame could not be secured).
    ErrFatal,
}

/// A MAC-layer frame waiting to be sent to a neighbor.
///
/// `queued_buffer` holds the frame exactly as it will be put on the air
/// except for fields patched in right before transmission (ASN-derived
/// sequence/IE fields); `header_len` marks where the MAC payload begins, and
/// `sync_ie_offset` — when `Some` — marks where a Time Synchronization
/// nested IE must be patched with the current ASN before each transmission
/// (used for Enhanced Beacons).
pub struct TschPacket {
    /// Frame bytes queued for transmission.
    pub queued_buffer: heapless::Vec<u8, { MAX_FRAME_LEN }>,
    /// Offset of the first payload byte, i.e. the length of the MHR plus any
    /// information elements already emitted.
    pub header_len: usize,
    /// Offset of the TSCH Synchronization IE's ASN field within
    /// `queued_buffer`, if this packet carries one.
    pub sync_ie_offset: Option<usize>,
    /// Number of transmission attempts made so far for this packet.
    pub transmissions: u8,
    /// Outcome of the most recent transmission attempt.
    pub last_status: TxStatus,
}

impl TschPacket {
    /// Build a packet from a fully-formed frame buffer.
    pub fn new(buffer: &[u8], header_len: usize, sync_ie_offset: Option<usize>) -> Self {
        let mut queued_buffer = heapless::Vec::new();
        let _ = queued_buffer.extend_from_slice(buffer);
        Self {
            queued_buffer,
            header_len,
            sync_ie_offset,
            transmissions: 0,
            last_status: TxStatus::Pending,
        }
    }
}

/// The per-neighbor transmit queue collection, implemented by the upper
/// layer. The engine drives transmissions purely through this trait — it
/// never allocates or frees queue entries itself.
pub trait Queue<N: Neighbor> {
    /// Look up the neighbor table entry for `address`, if one exists.
    fn get_nbr(&self, address: NeighborAddress) -> Option<&N>;

    /// Mutable access to the neighbor table entry for `address`.
    fn get_nbr_mut(&mut self, address: NeighborAddress) -> Option<&mut N>;

    /// Peek the head-of-queue packet destined for `address`, without
    /// removing it.
    fn get_packet_for_nbr(&self, address: NeighborAddress) -> Option<&TschPacket>;

    /// Mutable access to the head-of-queue packet destined for `address`.
    fn get_packet_for_nbr_mut(&mut self, address: NeighborAddress) -> Option<&mut TschPacket>;

    /// Peek the head-of-queue unicast packet for any neighbor, used on
    /// shared links that are not bound to a specific destination. Returns
    /// the destination address together with the packet.
    fn get_unicast_packet_for_any(&self) -> Option<(NeighborAddress, &TschPacket)>;

    /// Dequeue the head-of-queue packet for `address`, after a transmission
    /// has terminally succeeded or exhausted its retries. Returns the
    /// removed packet so the caller can report it to
    /// [`crate::upper::UpperLayer::dequeued`].
    fn remove_packet_from_queue(&mut self, address: NeighborAddress) -> Option<TschPacket>;

    /// `true` if there is no queued packet for `address`.
    fn is_empty(&self, address: NeighborAddress) -> bool;

    /// Reset a neighbor's CSMA backoff window and exponent to their initial
    /// values after a successful transmission.
    fn backoff_reset(&mut self, address: NeighborAddress);

    /// Double the backoff window (up to the configured maximum) and
    /// increment the backoff exponent after a collision.
    fn backoff_inc(&mut self, address: NeighborAddress);

    /// Decrement every neighbor's backoff window by one, called once per
    /// shared-link slot regardless of whether this device transmits.
    fn update_all_backoff_windows(&mut self);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::neighbor::tests::TestNeighbor;

    pub(crate) struct TestQueue<const N: usize> {
        pub(crate) neighbors: heapless::Vec<TestNeighbor, N>,
        pub(crate) packets: heapless::Vec<(NeighborAddress, TschPacket), N>,
    }

    impl<const N: usize> TestQueue<N> {
        pub(crate) fn new() -> Self {
            Self {
                neighbors: heapless::Vec::new(),
                packets: heapless::Vec::new(),
            }
        }

        pub(crate) fn add_neighbor(&mut self, neighbor: TestNeighbor) {
            let _ = self.neighbors.push(neighbor);
        }

        pub(crate) fn enqueue(&mut self, address: NeighborAddress, packet: TschPacket) {
            let _ = self.packets.push((address, packet));
        }
    }

    impl<const N: usize> Queue<TestNeighbor> for TestQueue<N> {
        fn get_nbr(&self, address: NeighborAddress) -> Option<&TestNeighbor> {
            self.neighbors.iter().find(|n| n.address() == address)
        }

        fn get_nbr_mut(&mut self, address: NeighborAddress) -> Option<&mut TestNeighbor> {
            self.neighbors.iter_mut().find(|n| n.address() == address)
        }

        fn get_packet_for_nbr(&self, address: NeighborAddress) -> Option<&TschPacket> {
            self.packets
                .iter()
                .find(|(a, _)| *a == address)
                .map(|(_, p)| p)
        }

        fn get_packet_for_nbr_mut(&mut self, address: NeighborAddress) -> Option<&mut TschPacket> {
            self.packets
                .iter_mut()
                .find(|(a, _)| *a == address)
                .map(|(_, p)| p)
        }

        fn get_unicast_packet_for_any(&self) -> Option<(NeighborAddress, &TschPacket)> {
            self.packets
                .iter()
                .find(|(a, _)| *a != crate::neighbor::BROADCAST_ADDRESS)
                .map(|(a, p)| (*a, p))
        }

        fn remove_packet_from_queue(&mut self, address: NeighborAddress) -> Option<TschPacket> {
            let pos = self.packets.iter().position(|(a, _)| *a == address)?;
            Some(self.packets.swap_remove(pos).1)
        }

        fn is_empty(&self, address: NeighborAddress) -> bool {
            self.get_packet_for_nbr(address).is_none()
        }

        fn backoff_reset(&mut self, address: NeighborAddress) {
            if let Some(nbr) = self.get_nbr_mut(address) {
                nbr.set_backoff_window(0);
                nbr.set_backoff_exponent(crate::config::MIN_BACKOFF_EXPONENT);
            }
        }

        fn backoff_inc(&mut self, address: NeighborAddress) {
            if let Some(nbr) = self.get_nbr_mut(address) {
                let be = (nbr.backoff_exponent() + 1).min(crate::config::MAX_BACKOFF_EXPONENT);
                nbr.set_backoff_exponent(be);
                nbr.set_backoff_window((1u16 << be) - 1);
            }
        }

        fn update_all_backoff_windows(&mut self) {
            for nbr in self.neighbors.iter_mut() {
                let window = nbr.backoff_window();
                if window > 0 {
                    nbr.set_backoff_window(window - 1);
                }
            }
        }
    }
}
