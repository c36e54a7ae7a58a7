//! Link, neighbor and packet arbitration (primary link, shared-link
//! broadcast/unicast lookup, backup-link fallback).

use crate::neighbor::{Neighbor, NeighborAddress, BROADCAST_ADDRESS};
use crate::queue::Queue;
use crate::schedule::Link;

/// What the slot-operation loop should do this timeslot, and on which link.
#[derive(Debug, Clone, Copy)]
pub enum SlotAction {
    /// Transmit the head-of-queue packet for `neighbor` on `link`.
    Transmit { link: Link, neighbor: NeighborAddress },
    /// Open a listen window on `link`; nothing of ours is queued to send.
    Receive { link: Link },
    /// Neither a packet to send nor a reason to listen.
    Idle,
}

/// The neighbor (and its queued packet) a transmission should target on
/// `link`, if one is ready.
fn tx_candidate<N: Neighbor, Q: Queue<N>>(queue: &Q, link: &Link) -> Option<NeighborAddress> {
    if !link.is_tx() {
        return None;
    }

    if let Some(address) = link.neighbor_address {
        return if queue.is_empty(address) { None } else { Some(address) };
    }

    // A shared link with no dedicated neighbor: prefer a unicast packet for
    // any destination, falling back to a pending broadcast.
    if let Some((address, _)) = queue.get_unicast_packet_for_any() {
        return Some(address);
    }
    if !queue.is_empty(BROADCAST_ADDRESS) {
        return Some(BROADCAST_ADDRESS);
    }
    None
}

/// Choose what to do this slot, given the primary link the schedule handed
/// back and an optional backup link sharing the same timeslot.
pub fn select_slot_action<N: Neighbor, Q: Queue<N>>(
    queue: &Q,
    primary: Link,
    backup: Option<Link>,
) -> SlotAction {
    if let Some(neighbor) = tx_candidate(queue, &primary) {
        return SlotAction::Transmit { link: primary, neighbor };
    }

    if let Some(backup) = backup {
        if let Some(neighbor) = tx_candidate(queue, &backup) {
            return SlotAction::Transmit { link: backup, neighbor };
        }
        if backup.is_rx() {
            return SlotAction::Receive { link: backup };
        }
    }

    if primary.is_rx() {
        return SlotAction::Receive { link: primary };
    }

    SlotAction::Idle
}
