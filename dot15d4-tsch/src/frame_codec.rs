//! Builds and parses the frames the engine puts on the air: Enhanced Beacons
//! carrying the synchronization and schedule IEs, Enhanced ACKs carrying
//! time correction, and plain data frames.
//!
//! Emission goes through [`DataFrame`]'s setters directly rather than
//! [`FrameRepr::emit`], since that generic path is written against the
//! read-only [`Frame`] enum and cannot actually be used to mutate a buffer;
//! [`DataFrame`] shares the same wire layout for every frame type and does
//! the real writing everywhere else in this crate already.

use heapless::Vec as HVec;

use dot15d4_tsch_frame::{
    Address, AddressingFieldsRepr, AddressingMode, DataFrame, Error as FrameError, Frame,
    FrameBuilder, FrameControlRepr, FrameRepr, FrameType, FrameVersion, HeaderElementId,
    HeaderInformationElement, HeaderInformationElementRepr, InformationElementsRepr,
    NestedInformationElementRepr, PayloadInformationElementRepr, TimeCorrection,
    TimeCorrectionRepr, TschSynchronization, TschSynchronizationRepr,
};

use crate::error::{Error, Result};
use crate::time::Duration;

fn emit(repr: &FrameRepr<'_>, buf: &mut [u8]) -> usize {
    let len = repr.buffer_len();
    let mut w = DataFrame::new_unchecked(&mut buf[..len]);
    w.set_frame_control(&repr.frame_control);
    if let Some(seq) = repr.sequence_number {
        w.set_sequence_number(seq);
    }
    if let Some(af) = &repr.addressing_fields {
        w.set_addressing_fields(af);
    }
    if let Some(ie) = &repr.information_elements {
        w.set_information_elements(ie, repr.payload.is_some());
    }
    if let Some(payload) = repr.payload {
        w.set_payload(payload);
    }
    len
}

fn map_err(_: FrameError) -> Error {
    Error::Frame
}

/// Build an Enhanced ACK carrying a Time Correction header Information
/// Element, returning the number of bytes written.
pub fn create_eack(
    buf: &mut [u8],
    sequence_number: u8,
    time_correction: Duration,
    nack: bool,
) -> Result<usize> {
    let mut header_information_elements = HVec::new();
    header_information_elements
        .push(HeaderInformationElementRepr::TimeCorrection(
            TimeCorrectionRepr {
                time_correction,
                nack,
            },
        ))
        .map_err(|_| Error::Frame)?;

    let repr = FrameRepr {
        frame_control: FrameControlRepr {
            frame_type: FrameType::Ack,
            security_enabled: false,
            frame_pending: false,
            ack_request: false,
            pan_id_compression: false,
            sequence_number_suppression: false,
            information_elements_present: true,
            dst_addressing_mode: AddressingMode::Absent,
            src_addressing_mode: AddressingMode::Absent,
            frame_version: FrameVersion::Ieee802154_2020,
        },
        sequence_number: Some(sequence_number),
        addressing_fields: None,
        information_elements: Some(InformationElementsRepr {
            header_information_elements,
            payload_information_elements: HVec::new(),
        }),
        payload: None,
    };

    if buf.len() < repr.buffer_len() {
        return Err(Error::Frame);
    }

    Ok(emit(&repr, buf))
}

/// Parse an Enhanced ACK, returning its time correction if one was present.
/// The sequence number is checked against `expected_sequence_number`.
pub fn parse_eack(buf: &[u8], expected_sequence_number: u8) -> Result<(Duration, bool)> {
    let frame = Frame::new(buf).map_err(map_err)?;
    let Frame::EnhancedAck(ack) = frame else {
        return Err(Error::Frame);
    };

    if ack.sequence_number() != Some(expected_sequence_number) {
        return Err(Error::Frame);
    }

    let ies = ack.information_elements().ok_or(Error::Frame)?;
    for header_ie in ies.header_information_elements() {
        if header_ie.element_id() == HeaderElementId::TimeCorrection {
            let tc = TimeCorrection::new(header_ie.content()).map_err(map_err)?;
            return Ok((tc.time_correction(), tc.nack()));
        }
    }

    Err(Error::Frame)
}

/// Number of bytes of fixed header preceding the TSCH Synchronization
/// nested Information Element content in every beacon built by
/// [`create_enhanced_beacon`]: frame control, suppressed sequence number,
/// addressing fields, the header-IE-list termination, the MLME payload IE's
/// own header, and the nested IE's own header.
fn sync_ie_offset(addressing_len: usize) -> usize {
    2 // frame control
        + addressing_len
        + 2 // header information element list termination (HT1)
        + 2 // MLME payload information element header
        + 2 // nested information element header
}

/// Build an Enhanced Beacon advertising `absolute_slot_number` and
/// `join_metric`, with a single nested TSCH Synchronization Information
/// Element. Returns the number of bytes written and the offset of the
/// Synchronization IE's content, so a later re-transmission can patch the
/// ASN in place via [`patch_synchronization`] without rebuilding the frame.
pub fn create_enhanced_beacon(
    buf: &mut [u8],
    pan_id: u16,
    src_address: Address,
    absolute_slot_number: u64,
    join_metric: u8,
) -> Result<(usize, usize)> {
    let mut nested = HVec::new();
    nested
        .push(NestedInformationElementRepr::TschSynchronization(
            TschSynchronizationRepr {
                absolute_slot_number,
                join_metric,
            },
        ))
        .map_err(|_| Error::Frame)?;

    let mut payload_information_elements = HVec::new();
    payload_information_elements
        .push(PayloadInformationElementRepr::Mlme(nested))
        .map_err(|_| Error::Frame)?;

    let repr = FrameBuilder::new_enhanced_beacon()
        .set_dst_pan_id(pan_id)
        .set_dst_address(Address::Short([0xff, 0xff]))
        .set_src_address(src_address)
        .finalize()
        .map_err(map_err)?;

    let mut repr = repr;
    repr.frame_control.information_elements_present = true;
    repr.information_elements = Some(InformationElementsRepr {
        header_information_elements: HVec::new(),
        payload_information_elements,
    });

    if buf.len() < repr.buffer_len() {
        return Err(Error::Frame);
    }

    let addressing_len = repr
        .addressing_fields
        .as_ref()
        .map(|af| af.buffer_len(&repr.frame_control))
        .unwrap_or(0);

    let len = emit(&repr, buf);
    Ok((len, sync_ie_offset(addressing_len)))
}

/// Patch the absolute slot number and join metric of a beacon previously
/// built by [`create_enhanced_beacon`], in place, at the offset it returned.
pub fn patch_synchronization(
    buf: &mut [u8],
    sync_ie_offset: usize,
    absolute_slot_number: u64,
    join_metric: u8,
) {
    let mut w = TschSynchronization::new_unchecked(&mut buf[sync_ie_offset..][..6]);
    w.set_absolute_slot_number(absolute_slot_number);
    w.set_join_metric(join_metric);
}

/// Parse a received frame header far enough to recover its type, addressing
/// and payload, leaving Information Element interpretation to the caller.
pub struct ParsedFrame<'f> {
    /// The parsed frame.
    pub frame: Frame<&'f [u8]>,
}

impl<'f> ParsedFrame<'f> {
    /// Parse `buf` as an IEEE 802.15.4 frame.
    pub fn parse(buf: &'f [u8]) -> Result<Self> {
        Ok(Self {
            frame: Frame::new(buf).map_err(map_err)?,
        })
    }

    /// `true` if the frame requests an acknowledgment.
    pub fn ack_requested(&self) -> bool {
        self.frame.frame_control().ack_request()
    }

    /// The frame's sequence number, if not suppressed.
    pub fn sequence_number(&self) -> Option<u8> {
        self.frame.sequence_number()
    }

    /// The frame's source address, if present.
    pub fn src_address(&self) -> Option<Address> {
        self.frame.addressing()?.src_address()
    }

    /// The frame's destination address, if present.
    pub fn dst_address(&self) -> Option<Address> {
        self.frame.addressing()?.dst_address()
    }

    /// The frame's payload bytes, if present.
    pub fn payload(&self) -> Option<&'f [u8]> {
        self.frame.payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eack_round_trips_time_correction() {
        let mut buf = [0u8; 32];
        let len = create_eack(&mut buf, 7, Duration::from_us(-120), true).unwrap();
        let (tc, nack) = parse_eack(&buf[..len], 7).unwrap();
        assert_eq!(tc, Duration::from_us(-120));
        assert!(nack);
    }

    #[test]
    fn eack_rejects_mismatched_sequence_number() {
        let mut buf = [0u8; 32];
        let len = create_eack(&mut buf, 7, Duration::from_us(0), false).unwrap();
        assert!(parse_eack(&buf[..len], 8).is_err());
    }

    #[test]
    fn beacon_carries_asn_and_join_metric_and_is_patchable() {
        let mut buf = [0u8; 64];
        let (len, offset) =
            create_enhanced_beacon(&mut buf, 0xabcd, Address::Extended([1; 8]), 42, 3).unwrap();

        let frame = Frame::new(&buf[..len]).unwrap();
        let Frame::EnhancedBeacon(beacon) = frame else {
            panic!("not an enhanced beacon");
        };
        let ies = beacon.information_elements().unwrap();
        let payload_ie = ies.payload_information_elements().next().unwrap();
        let repr = PayloadInformationElementRepr::parse(&payload_ie).unwrap();
        let PayloadInformationElementRepr::Mlme(nested) = repr else {
            panic!("not an mlme ie");
        };
        let NestedInformationElementRepr::TschSynchronization(sync) = &nested[0] else {
            panic!("not a sync ie");
        };
        assert_eq!(sync.absolute_slot_number, 42);
        assert_eq!(sync.join_metric, 3);

        patch_synchronization(&mut buf[..len], offset, 43, 4);
        let frame = Frame::new(&buf[..len]).unwrap();
        let Frame::EnhancedBeacon(beacon) = frame else {
            panic!("not an enhanced beacon");
        };
        let ies = beacon.information_elements().unwrap();
        let payload_ie = ies.payload_information_elements().next().unwrap();
        let repr = PayloadInformationElementRepr::parse(&payload_ie).unwrap();
        let PayloadInformationElementRepr::Mlme(nested) = repr else {
            panic!("not an mlme ie");
        };
        let NestedInformationElementRepr::TschSynchronization(sync) = &nested[0] else {
            panic!("not a sync ie");
        };
        assert_eq!(sync.absolute_slot_number, 43);
        assert_eq!(sync.join_metric, 4);
    }
}
