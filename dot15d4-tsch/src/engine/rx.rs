//! RX slot engine (C7): open a listen window, accept a frame if one arrives,
//! ack it if requested, and feed drift measurements back to the time source.

use embedded_hal_async::delay::DelayNs;

use dot15d4_tsch_frame::Address;

use crate::asn::Asn;
use crate::config::{LLSEC_ENABLED, RESYNC_WITH_SFD_TIMESTAMPS, TIMESYNC_REMOVE_JITTER};
use crate::frame_codec::{self, ParsedFrame};
use crate::neighbor::Neighbor;
use crate::queue::Queue;
use crate::radio::config::{Channel, RxConfig, TxConfig};
use crate::radio::futures::{receive, transmit};
use crate::radio::{Radio, RadioObject};
use crate::radio_gate::{self, Site};
use crate::ring::{InputPacket, Ring, RING_CAPACITY};
use crate::security::SecurityCodec;
use crate::sync::select::select;
use crate::sync::Either;
use crate::time::Duration;
use crate::timer::{yield_until, Clock, Deadline};
use crate::timesync::TimeSync;

use super::SlotTiming;

/// Turn a received frame's source address into a neighbor-table key, if it
/// carries an extended source address (the only kind the neighbor table
/// indexes on).
fn src_as_neighbor(parsed: &ParsedFrame<'_>) -> Option<[u8; 8]> {
    match parsed.src_address()? {
        Address::Extended(addr) => Some(addr),
        _ => None,
    }
}

/// Open a receive window for this slot and handle whatever arrives. Returns
/// `true` if a frame was accepted (security-verified and, for unicast
/// frames, addressed to us by virtue of having reached this point at all —
/// hardware address filtering is assumed to have already discarded frames
/// for other destinations when [`crate::config::HW_FRAME_FILTERING`] is set).
#[allow(clippy::too_many_arguments)]
pub async fn run_rx<R, D, C, N, Q, Sec, Ts>(
    radio: &mut R,
    delay: &mut D,
    clock: &C,
    queue: &mut Q,
    security: &Sec,
    timesync: &mut Ts,
    timing: &SlotTiming,
    slot_start: Deadline,
    current_asn: Asn,
    channel: u8,
    incoming: &Ring<InputPacket, RING_CAPACITY>,
) -> bool
where
    R: Radio,
    D: DelayNs,
    C: Clock,
    N: Neighbor,
    Q: Queue<N>,
    Sec: SecurityCodec,
    Ts: TimeSync,
{
    let channel_num = channel;
    let channel: Channel = channel.try_into().unwrap_or_default();

    yield_until(
        delay,
        clock,
        slot_start + (timing.ts_rx_offset.saturating_sub(timing.radio_delay_before_rx)),
    )
    .await;

    let mut buf = [0u8; 128];
    let rx_config = RxConfig { channel };
    let received = match select(
        receive(radio, &mut buf, rx_config),
        delay.delay_us(timing.ts_rx_wait),
    )
    .await
    {
        Either::First(ok) => ok,
        Either::Second(_) => false,
    };

    if !received {
        return false;
    }

    let sfd_timestamp = match radio.get_object(RadioObject::LastPacketTimestamp(
        crate::time::Instant::from_us(0),
    )) {
        RadioObject::LastPacketTimestamp(sfd) => sfd,
        _ => crate::time::Instant::from_us(0),
    };

    let expected_arrival = slot_start + timing.ts_rx_offset;
    let mut estimated_drift = Duration::ZERO;
    if RESYNC_WITH_SFD_TIMESTAMPS {
        let expected_us = expected_arrival.0 as i64;
        estimated_drift = Duration::from_us(sfd_timestamp.as_us() - expected_us);
    }
    if TIMESYNC_REMOVE_JITTER && estimated_drift.as_us().unsigned_abs() < 2 {
        estimated_drift = Duration::ZERO;
    }

    let mut len = 127usize.min(buf.len());
    let read_len = radio.read(&mut buf);
    if read_len > 0 {
        len = read_len;
    }

    if LLSEC_ENABLED {
        match security.parse_frame(&mut buf, len, crate::asn::Asn::ZERO) {
            Ok(new_len) => len = new_len,
            Err(_) => return false,
        }
    }

    let Ok(parsed) = ParsedFrame::parse(&buf[..len]) else {
        return false;
    };

    let rssi = match radio.get_object(RadioObject::LastPacketRssi(0)) {
        RadioObject::LastPacketRssi(rssi) => rssi,
        _ => 0,
    };
    let mut payload = heapless::Vec::new();
    let _ = payload.extend_from_slice(&buf[..len]);
    let _ = incoming.push(InputPacket {
        payload,
        rx_asn: current_asn,
        rssi,
        channel: channel_num,
        timestamp: sfd_timestamp,
    });

    let neighbor_addr = src_as_neighbor(&parsed);
    let is_time_source = neighbor_addr
        .and_then(|a| queue.get_nbr(a))
        .map(|n| n.is_time_source())
        .unwrap_or(false);

    if is_time_source {
        timesync.timesync_update(
            neighbor_addr.unwrap_or(crate::neighbor::BROADCAST_ADDRESS),
            Duration::from_us(timing.ts_timeslot_length as i64),
            estimated_drift,
        );
        timesync.schedule_keepalive();
    }

    if parsed.ack_requested() {
        if let Some(seq) = parsed.sequence_number() {
            let mut ack_buf = [0u8; 32];
            if let Ok(ack_len) =
                frame_codec::create_eack(&mut ack_buf, seq, Duration::ZERO - estimated_drift, false)
            {
                yield_until(delay, clock, slot_start + timing.ts_tx_ack_delay).await;
                radio_gate::enable(radio, Site::WithinSlot).await;
                let tx_config = TxConfig {
                    channel,
                    cca: false,
                };
                let mut ack = AckBuf {
                    data: ack_buf,
                    len: ack_len,
                };
                let _ = transmit(radio, &mut ack, tx_config).await;
                radio_gate::disable(radio, Site::WithinSlot).await;
            }
        }
    }

    true
}

struct AckBuf {
    data: [u8; 32],
    len: usize,
}

impl AsMut<[u8]> for AckBuf {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbor::tests::TestNeighbor;
    use crate::queue::tests::TestQueue;
    use crate::radio::tests::TestRadio;
    use crate::sync::test::Delay;
    use crate::timesync::PassthroughTimeSync;

    struct FakeClock;
    impl Clock for FakeClock {
        fn now(&self) -> u32 {
            0
        }
    }

    #[pollster::test]
    async fn rx_window_times_out_when_nothing_arrives() {
        let mut radio = TestRadio::default();
        let mut delay = Delay::default();
        let clock = FakeClock;
        let mut queue = TestQueue::<4>::new();
        let mut timesync = PassthroughTimeSync;
        let timing = SlotTiming::default();
        let incoming = Ring::new();

        let accepted = run_rx(
            &mut radio,
            &mut delay,
            &clock,
            &mut queue,
            &crate::security::NoSecurity,
            &mut timesync,
            &timing,
            Deadline(0),
            Asn::ZERO,
            26,
            &incoming,
        )
        .await;

        assert!(!accepted);
        assert!(incoming.is_empty());
    }

    #[pollster::test]
    async fn rx_accepts_a_frame_from_a_time_source_and_updates_timesync() {
        let src = [7u8; 8];
        let mut radio = TestRadio::default();
        let mut frame = [0u8; 128];
        let len = crate::frame_codec::create_enhanced_beacon(
            &mut frame,
            0xabcd,
            dot15d4_tsch_frame::Address::Extended(src),
            10,
            0,
        )
        .unwrap()
        .0;
        let mut should_receive = [0u8; 128];
        should_receive[..len].copy_from_slice(&frame[..len]);
        radio.inner(|inner| inner.should_receive = Some(should_receive));

        let mut delay = Delay::default();
        let clock = FakeClock;
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::new(src).time_source());
        let mut timesync = PassthroughTimeSync;
        let timing = SlotTiming::default();
        let incoming = Ring::new();

        let accepted = run_rx(
            &mut radio,
            &mut delay,
            &clock,
            &mut queue,
            &crate::security::NoSecurity,
            &mut timesync,
            &timing,
            Deadline(0),
            Asn::ZERO,
            26,
            &incoming,
        )
        .await;

        assert!(accepted);
        assert!(incoming.pop().is_some());
    }
}
