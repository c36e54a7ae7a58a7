//! The TSCH schedule: slotframes, links, and the lookup that tells the
//! per-timeslot engine what to do next.
//!
//! Ownership of the schedule itself — how links got there, whether they
//! came from a joined Enhanced Beacon or a hardcoded topology — is the
//! upper layer's concern. The engine only ever calls
//! [`Schedule::next_active_link`].

pub use dot15d4_tsch_frame::TschLinkOption as LinkOptions;

use crate::asn::Asn;
use crate::neighbor::NeighborAddress;

/// The kind of a TSCH link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// An ordinary data link.
    Normal,
    /// A link that also carries Enhanced Beacons in addition to ordinary
    /// traffic.
    Advertising,
    /// A link reserved exclusively for Enhanced Beacon transmission.
    AdvertisingOnly,
}

/// A pairwise assignment of communication opportunity between devices, for
/// a given slotframe, timeslot, and channel offset.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    /// Link identifier, unique within the owning slotframe.
    pub handle: u16,
    /// Timeslot, within the slotframe, at which this link is active.
    pub timeslot: u16,
    /// Channel offset used to derive the physical channel via channel
    /// hopping.
    pub channel_offset: u16,
    /// TX/RX/SHARED/TIME_KEEPING option bits.
    pub options: LinkOptions,
    /// Normal, advertising, or advertising-only.
    pub link_type: LinkType,
    /// The neighbor this link is dedicated to, or `None` for a shared link
    /// open to any neighbor (e.g. the broadcast/EB link).
    pub neighbor_address: Option<NeighborAddress>,
}

impl Link {
    /// `true` if frames may be transmitted on this link.
    pub fn is_tx(&self) -> bool {
        self.options.contains(LinkOptions::Tx)
    }

    /// `true` if frames may be received on this link.
    pub fn is_rx(&self) -> bool {
        self.options.contains(LinkOptions::Rx)
    }

    /// `true` if this link is contended for via CSMA backoff rather than
    /// dedicated to a single neighbor.
    pub fn is_shared(&self) -> bool {
        self.options.contains(LinkOptions::Shared)
    }

    /// `true` if this link may be used to correct clock drift against its
    /// neighbor.
    pub fn is_time_keeping(&self) -> bool {
        self.options.contains(LinkOptions::TimeKeeping)
    }
}

/// Errors returned while building a [`StaticSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// The link's timeslot does not fit within the slotframe's size.
    InvalidTimeslot,
    /// The link's channel offset does not fit within the hopping sequence.
    InvalidChannelOffset,
    /// A slotframe or link collection has no remaining capacity.
    CapacityExceeded,
    /// A handle is already in use.
    HandleDuplicate,
}

/// The schedule lookup the engine depends on. Implemented by the upper
/// layer; a device that never changes its schedule can keep a
/// [`StaticSchedule`] around and implement this trait as a thin forward.
pub trait Schedule {
    /// Starting from `asn` (inclusive), find the nearest active link.
    ///
    /// Returns the primary link to act on, how many slots ahead of `asn` it
    /// is, and — when the same slot also holds a second, shared link that
    /// can be used if the primary link turns out to have no queued traffic
    /// — that backup link.
    fn next_active_link(&self, asn: &Asn) -> Option<(Link, u32, Option<Link>)>;

    /// Resolve the physical channel to use for `link` at `asn`. Only ever
    /// called with a `link` previously returned by
    /// [`Schedule::next_active_link`] on the same schedule.
    fn channel(&self, asn: &Asn, link: &Link) -> u8;
}

/// Channel hopping sequence for a slotframe: one PHY channel per hop index.
pub type HoppingSequence = heapless::Vec<u8, 16>;

/// A collection of timeslots repeating in time, analogous to a superframe.
pub struct Slotframe<const L: usize> {
    handle: u16,
    size: u16,
    hopping_sequence: HoppingSequence,
    links: heapless::Vec<Link, L>,
}

impl<const L: usize> Slotframe<L> {
    /// Create a new, empty slotframe of `size` timeslots using
    /// `hopping_sequence`.
    pub fn new(handle: u16, size: u16, hopping_sequence: HoppingSequence) -> Self {
        Self {
            handle,
            size,
            hopping_sequence,
            links: heapless::Vec::new(),
        }
    }

    /// Identifier of this slotframe.
    pub fn handle(&self) -> u16 {
        self.handle
    }

    /// Add `link` to the slotframe.
    pub fn add_link(&mut self, link: Link) -> Result<(), ScheduleError> {
        if link.timeslot >= self.size {
            Err(ScheduleError::InvalidTimeslot)
        } else if link.channel_offset as usize >= self.hopping_sequence.len() {
            Err(ScheduleError::InvalidChannelOffset)
        } else if self.links.iter().any(|l| l.handle == link.handle) {
            Err(ScheduleError::HandleDuplicate)
        } else if self.links.push(link).is_err() {
            Err(ScheduleError::CapacityExceeded)
        } else {
            Ok(())
        }
    }

    /// Every link active at the given timeslot-within-slotframe.
    fn links_at(&self, timeslot: u16) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.timeslot == timeslot)
    }

    /// Resolve the physical channel for `link` at a given ASN.
    pub fn channel(&self, asn: &Asn, link: &Link) -> u8 {
        crate::channel_hopping::channel(asn, link.channel_offset, &self.hopping_sequence)
    }
}

/// A statically-built schedule made up of a handful of slotframes, suitable
/// both as a default implementation for devices with a fixed topology and
/// as the schedule used by tests.
pub struct StaticSchedule<const S: usize, const L: usize> {
    slotframes: heapless::Vec<Slotframe<L>, S>,
    /// Maximum number of slots searched before giving up on finding an
    /// active link.
    horizon: u32,
}

impl<const S: usize, const L: usize> StaticSchedule<S, L> {
    /// Create a schedule that searches up to `horizon` slots ahead when
    /// looking for the next active link.
    pub fn new(horizon: u32) -> Self {
        Self {
            slotframes: heapless::Vec::new(),
            horizon,
        }
    }

    /// Add `slotframe` to the schedule.
    pub fn add_slotframe(&mut self, slotframe: Slotframe<L>) -> Result<(), ScheduleError> {
        if self
            .slotframes
            .iter()
            .any(|s| s.handle() == slotframe.handle())
        {
            Err(ScheduleError::HandleDuplicate)
        } else if self.slotframes.push(slotframe).is_err() {
            Err(ScheduleError::CapacityExceeded)
        } else {
            Ok(())
        }
    }

    /// Resolve the physical channel for `link` at `asn`, searching the
    /// owning slotframe.
    pub fn resolve_channel(&self, asn: &Asn, link: &Link) -> Option<u8> {
        self.slotframes
            .iter()
            .find(|sf| sf.links_at(link.timeslot).any(|l| l.handle == link.handle))
            .map(|sf| sf.channel(asn, link))
    }
}

impl<const S: usize, const L: usize> Schedule for StaticSchedule<S, L> {
    fn channel(&self, asn: &Asn, link: &Link) -> u8 {
        // `link` always came from a prior `next_active_link` call on this
        // same schedule, so its owning slotframe is guaranteed to be found.
        self.resolve_channel(asn, link).unwrap_or(0)
    }

    fn next_active_link(&self, asn: &Asn) -> Option<(Link, u32, Option<Link>)> {
        for diff in 0..self.horizon {
            let candidate_asn = *asn + diff;
            let mut primary: Option<Link> = None;
            let mut backup: Option<Link> = None;

            for slotframe in self.slotframes.iter() {
                let timeslot = candidate_asn % slotframe.size;
                for link in slotframe.links_at(timeslot) {
                    if primary.is_none() {
                        primary = Some(*link);
                    } else if backup.is_none() {
                        backup = Some(*link);
                    }
                }
            }

            if primary.is_some() {
                return primary.map(|p| (p, diff, backup));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hopping(seq: &[u8]) -> HoppingSequence {
        let mut v = HoppingSequence::new();
        v.extend_from_slice(seq).unwrap();
        v
    }

    fn link(handle: u16, timeslot: u16, options: LinkOptions) -> Link {
        Link {
            handle,
            timeslot,
            channel_offset: 0,
            options,
            link_type: LinkType::Normal,
            neighbor_address: None,
        }
    }

    #[test]
    fn finds_the_nearest_active_link() {
        let mut sf = Slotframe::<4>::new(1, 3, hopping(&[15, 25, 26, 20]));
        sf.add_link(link(0, 0, LinkOptions::Tx)).unwrap();
        sf.add_link(link(1, 2, LinkOptions::Rx)).unwrap();

        let mut schedule = StaticSchedule::<1, 4>::new(10);
        schedule.add_slotframe(sf).unwrap();

        let (l, diff, backup) = schedule.next_active_link(&Asn::from_u64(1)).unwrap();
        assert_eq!(l.handle, 1);
        assert_eq!(diff, 1);
        assert!(backup.is_none());
    }

    #[test]
    fn surfaces_a_shared_backup_link_in_the_same_slot() {
        let mut sf = Slotframe::<4>::new(1, 1, hopping(&[15, 25, 26, 20]));
        sf.add_link(link(0, 0, LinkOptions::Tx)).unwrap();
        sf.add_link(link(1, 0, LinkOptions::Rx | LinkOptions::Shared))
            .unwrap();

        let mut schedule = StaticSchedule::<1, 4>::new(10);
        schedule.add_slotframe(sf).unwrap();

        let (primary, diff, backup) = schedule.next_active_link(&Asn::ZERO).unwrap();
        assert_eq!(diff, 0);
        assert_eq!(primary.handle, 0);
        assert_eq!(backup.unwrap().handle, 1);
    }

    #[test]
    fn returns_none_when_nothing_is_scheduled() {
        let schedule = StaticSchedule::<1, 4>::new(10);
        assert!(schedule.next_active_link(&Asn::ZERO).is_none());
    }

    #[test]
    fn rejects_out_of_range_links() {
        let mut sf = Slotframe::<2>::new(1, 3, hopping(&[15, 25, 26, 20]));
        assert_eq!(
            sf.add_link(link(0, 5, LinkOptions::Tx)).unwrap_err(),
            ScheduleError::InvalidTimeslot
        );

        let mut bad = link(0, 0, LinkOptions::Tx);
        bad.channel_offset = 10;
        assert_eq!(
            sf.add_link(bad).unwrap_err(),
            ScheduleError::InvalidChannelOffset
        );
    }
}
