//! TX slot engine (C6): send the head-of-queue packet for a neighbor, wait
//! for its Enhanced ACK when one is expected, and settle the neighbor's
//! retry/backoff state.

use embedded_hal_async::delay::DelayNs;

use crate::asn::Asn;
use crate::config::{CCA_ENABLED, DRIFT_FROM_ACK_ENABLED, LLSEC_ENABLED, MAX_FRAME_RETRIES};
use crate::frame_codec;
use crate::neighbor::{Neighbor, NeighborAddress, BROADCAST_ADDRESS};
use crate::queue::{Queue, TschPacket, TxStatus};
use crate::radio::config::{RxConfig, TxConfig};
use crate::radio::config::Channel;
use crate::radio::futures::{channel_clear, transmit};
use crate::radio::Radio;
use crate::radio_gate::{self, Site};
use crate::ring::{Ring, RING_CAPACITY};
use crate::schedule::Link;
use crate::security::SecurityCodec;
use crate::sync::select::select;
use crate::sync::Either;
use crate::time::{Duration, Instant};
use crate::timer::{yield_until, Clock, Deadline};
use crate::timesync::TimeSync;

use super::SlotTiming;

/// Headroom-aware transmit buffer: `secure_frame` may grow the frame by the
/// codec's MIC length, so the backing array is sized past
/// [`crate::queue::MAX_FRAME_LEN`] and only the first `len` bytes are ever
/// handed to the radio.
struct TxBuf {
    data: [u8; 148],
    len: usize,
}

impl AsMut<[u8]> for TxBuf {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }
}

fn packet_duration(len: usize) -> u32 {
    super::packet_duration(len)
}

/// Reduce a neighbor's retry/backoff state after a transmission attempt,
/// reporting any packet that leaves the queue to `dequeued`.
fn update_neighbor_state<N: Neighbor, Q: Queue<N>>(
    queue: &mut Q,
    address: NeighborAddress,
    link: &Link,
    status: TxStatus,
    transmissions: u8,
    dequeued: &Ring<TschPacket, RING_CAPACITY>,
) {
    if status == TxStatus::Ok {
        if let Some(packet) = queue.remove_packet_from_queue(address) {
            let _ = dequeued.push(packet);
        }
        if address != BROADCAST_ADDRESS && (link.is_shared() || queue.is_empty(address)) {
            queue.backoff_reset(address);
        }
        return;
    }

    if transmissions as u32 >= MAX_FRAME_RETRIES as u32 + 1 {
        if let Some(packet) = queue.remove_packet_from_queue(address) {
            let _ = dequeued.push(packet);
        }
        return;
    }

    if address != BROADCAST_ADDRESS && link.is_shared() {
        queue.backoff_inc(address);
    }
}

fn bump_transmissions<N: Neighbor, Q: Queue<N>>(queue: &mut Q, address: NeighborAddress) -> u8 {
    if let Some(packet) = queue.get_packet_for_nbr_mut(address) {
        packet.transmissions += 1;
        packet.transmissions
    } else {
        0
    }
}

/// Send the head-of-queue packet to `neighbor` on `link`, await its
/// acknowledgment if one is expected, and update the neighbor/queue state to
/// match the outcome. Returns the final status; never panics on a missing
/// queued packet, reporting [`TxStatus::ErrFatal`] instead.
#[allow(clippy::too_many_arguments)]
pub async fn run_tx<R, D, C, N, Q, Sec, Ts>(
    radio: &mut R,
    delay: &mut D,
    clock: &C,
    queue: &mut Q,
    security: &Sec,
    timesync: &mut Ts,
    timing: &SlotTiming,
    slot_start: Deadline,
    link: &Link,
    neighbor_address: NeighborAddress,
    current_asn: Asn,
    channel: u8,
    dequeued: &Ring<TschPacket, RING_CAPACITY>,
) -> TxStatus
where
    R: Radio,
    D: DelayNs,
    C: Clock,
    N: Neighbor,
    Q: Queue<N>,
    Sec: SecurityCodec,
    Ts: TimeSync,
{
    let is_broadcast = neighbor_address == BROADCAST_ADDRESS;
    let is_time_source = queue
        .get_nbr(neighbor_address)
        .map(|n| n.is_time_source())
        .unwrap_or(false);
    let channel: Channel = channel.try_into().unwrap_or_default();

    let mut buf = TxBuf { data: [0u8; 148], len: 0 };
    {
        let Some(packet) = queue.get_packet_for_nbr(neighbor_address) else {
            return TxStatus::ErrFatal;
        };
        buf.len = packet.queued_buffer.len();
        buf.data[..buf.len].copy_from_slice(&packet.queued_buffer);
        if let Some(offset) = packet.sync_ie_offset {
            frame_codec::patch_synchronization(&mut buf.data[..buf.len], offset, current_asn.as_u64(), 0);
        }
    }

    if LLSEC_ENABLED {
        match security.secure_frame(&mut buf.data, buf.len, current_asn) {
            Ok(new_len) => buf.len = new_len,
            Err(_) => {
                let transmissions = bump_transmissions(queue, neighbor_address);
                update_neighbor_state(
                    queue,
                    neighbor_address,
                    link,
                    TxStatus::ErrFatal,
                    transmissions,
                    dequeued,
                );
                return TxStatus::ErrFatal;
            }
        }
    }

    let needs_cca = CCA_ENABLED && link.is_shared();
    let tx_config = TxConfig {
        channel,
        cca: needs_cca,
    };

    if needs_cca {
        yield_until(delay, clock, slot_start + timing.cca_offset).await;
        radio_gate::enable(radio, Site::WithinSlot).await;
        let clear = channel_clear(radio).await;
        if !clear {
            radio_gate::disable(radio, Site::WithinSlot).await;
            let transmissions = bump_transmissions(queue, neighbor_address);
            update_neighbor_state(
                queue,
                neighbor_address,
                link,
                TxStatus::Collision,
                transmissions,
                dequeued,
            );
            return TxStatus::Collision;
        }
    }

    yield_until(
        delay,
        clock,
        slot_start + (timing.ts_tx_offset.saturating_sub(timing.radio_delay_before_tx)),
    )
    .await;
    let transmitted = transmit(radio, &mut buf, tx_config).await;
    radio_gate::disable(radio, Site::WithinSlot).await;

    let status;
    if !transmitted {
        status = TxStatus::Err;
    } else if is_broadcast {
        status = TxStatus::Ok;
    } else {
        let tx_duration = packet_duration(buf.len).min(timing.ts_max_tx);
        let ack_deadline = slot_start
            + (timing.ts_tx_offset + tx_duration + timing.ts_rx_ack_delay)
                .saturating_sub(timing.radio_delay_before_rx);
        yield_until(delay, clock, ack_deadline).await;
        radio_gate::enable(radio, Site::WithinSlot).await;

        let mut ack_buf = [0u8; 128];
        let rx_config = RxConfig { channel };
        let window = timing.ts_ack_wait + timing.ts_max_ack;
        let expected_seq = queue
            .get_packet_for_nbr(neighbor_address)
            .and_then(|p| p.queued_buffer.get(2).copied())
            .unwrap_or(0);

        let received = match select(
            crate::radio::futures::receive(radio, &mut ack_buf, rx_config),
            delay.delay_us(window),
        )
        .await
        {
            Either::First(ok) => ok,
            Either::Second(_) => false,
        };
        radio_gate::disable(radio, Site::WithinSlot).await;

        let mut ack_status = TxStatus::NoAck;
        if received {
            if let Ok((mut time_correction, _nack)) = frame_codec::parse_eack(&ack_buf, expected_seq) {
                let bound = crate::config::sync_bound(Duration::from_us(timing.ts_rx_wait as i64));
                if time_correction > bound {
                    time_correction = bound;
                } else if time_correction < Duration::ZERO - bound {
                    time_correction = Duration::ZERO - bound;
                }

                ack_status = TxStatus::Ok;

                if DRIFT_FROM_ACK_ENABLED && is_time_source {
                    timesync.timesync_update(neighbor_address, Duration::from_us(0), time_correction);
                    timesync.schedule_keepalive();
                }
            }
        }
        status = ack_status;
    }

    if status == TxStatus::Ok {
        if let Some(nbr) = queue.get_nbr_mut(neighbor_address) {
            nbr.set_last_tx(Instant::from_us(clock.now() as i64));
        }
    }

    let transmissions = bump_transmissions(queue, neighbor_address);
    if let Some(packet) = queue.get_packet_for_nbr_mut(neighbor_address) {
        packet.last_status = status;
    }
    update_neighbor_state(queue, neighbor_address, link, status, transmissions, dequeued);

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbor::tests::TestNeighbor;
    use crate::queue::tests::TestQueue;
    use crate::queue::TschPacket;
    use crate::radio::tests::TestRadio;
    use crate::schedule::{LinkOptions, LinkType};
    use crate::sync::test::Delay;
    use crate::timesync::PassthroughTimeSync;

    struct FakeClock;
    impl Clock for FakeClock {
        fn now(&self) -> u32 {
            0
        }
    }

    fn link(options: LinkOptions, neighbor_address: Option<NeighborAddress>) -> Link {
        Link {
            handle: 0,
            timeslot: 0,
            channel_offset: 0,
            options,
            link_type: LinkType::Normal,
            neighbor_address,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn exec<N: Neighbor, Q: Queue<N>>(
        radio: &mut TestRadio,
        queue: &mut Q,
        link: &Link,
        neighbor_address: NeighborAddress,
    ) -> TxStatus {
        let mut delay = Delay::default();
        let clock = FakeClock;
        let mut timesync = PassthroughTimeSync;
        let timing = SlotTiming::default();
        let dequeued = Ring::new();
        run_tx(
            radio,
            &mut delay,
            &clock,
            queue,
            &crate::security::NoSecurity,
            &mut timesync,
            &timing,
            Deadline(0),
            link,
            neighbor_address,
            Asn::ZERO,
            26,
            &dequeued,
        )
        .await
    }

    #[pollster::test]
    async fn broadcast_transmit_succeeds_without_waiting_for_an_ack() {
        let addr = BROADCAST_ADDRESS;
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::broadcast());
        queue.enqueue(addr, TschPacket::new(&[0u8; 10], 5, None));

        let mut radio = TestRadio::default();
        let link = link(LinkOptions::Tx | LinkOptions::Shared, None);

        let status = exec(&mut radio, &mut queue, &link, addr).await;

        assert_eq!(status, TxStatus::Ok);
        assert!(queue.get_packet_for_nbr(addr).is_none());
    }

    #[pollster::test]
    async fn missing_queued_packet_is_reported_as_fatal() {
        let addr = [3; 8];
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::new(addr));

        let mut radio = TestRadio::default();
        let link = link(LinkOptions::Tx, Some(addr));

        let status = exec(&mut radio, &mut queue, &link, addr).await;

        assert_eq!(status, TxStatus::ErrFatal);
    }

    #[pollster::test]
    async fn shared_link_collision_increments_backoff_and_keeps_the_packet() {
        let addr = [4; 8];
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::new(addr));
        queue.enqueue(addr, TschPacket::new(&[0u8; 10], 5, None));

        let mut radio = TestRadio::default();
        radio.inner(|inner| inner.channel_busy = true);
        let link = link(LinkOptions::Tx | LinkOptions::Shared, Some(addr));

        let status = exec(&mut radio, &mut queue, &link, addr).await;

        assert_eq!(status, TxStatus::Collision);
        assert!(queue.get_packet_for_nbr(addr).is_some());
        assert_eq!(
            queue.get_nbr(addr).unwrap().backoff_exponent(),
            crate::config::MIN_BACKOFF_EXPONENT + 1
        );
    }

    #[pollster::test]
    async fn dedicated_unicast_link_drops_the_packet_after_max_retries_without_an_ack() {
        let addr = [5; 8];
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::new(addr));
        queue.enqueue(addr, TschPacket::new(&[0u8; 10], 5, None));
        for p in queue.get_packet_for_nbr_mut(addr) {
            p.transmissions = crate::config::MAX_FRAME_RETRIES;
        }

        let mut radio = TestRadio::default();
        let link = link(LinkOptions::Tx, Some(addr));

        let status = exec(&mut radio, &mut queue, &link, addr).await;

        assert_eq!(status, TxStatus::NoAck);
        assert!(queue.get_packet_for_nbr(addr).is_none());
    }

    #[pollster::test]
    async fn successful_broadcast_reports_the_packet_on_the_dequeued_ring() {
        let addr = BROADCAST_ADDRESS;
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::broadcast());
        queue.enqueue(addr, TschPacket::new(&[0u8; 10], 5, None));

        let mut radio = TestRadio::default();
        let link = link(LinkOptions::Tx | LinkOptions::Shared, None);
        let mut delay = Delay::default();
        let clock = FakeClock;
        let mut timesync = PassthroughTimeSync;
        let timing = SlotTiming::default();
        let dequeued = Ring::new();

        let status = run_tx(
            &mut radio,
            &mut delay,
            &clock,
            &mut queue,
            &crate::security::NoSecurity,
            &mut timesync,
            &timing,
            Deadline(0),
            &link,
            addr,
            Asn::ZERO,
            26,
            &dequeued,
        )
        .await;

        assert_eq!(status, TxStatus::Ok);
        assert!(dequeued.pop().is_some());
    }

    #[pollster::test]
    async fn dedicated_link_with_more_queued_traffic_keeps_its_backoff_on_success() {
        let addr = [6; 8];
        let mut queue = TestQueue::<4>::new();
        queue.add_neighbor(TestNeighbor::new(addr));
        queue
            .get_nbr_mut(addr)
            .unwrap()
            .set_backoff_exponent(crate::config::MIN_BACKOFF_EXPONENT + 2);
        queue.enqueue(addr, TschPacket::new(&[0u8; 10], 5, None));
        queue.enqueue(addr, TschPacket::new(&[0u8; 10], 5, None));

        let mut radio = TestRadio::default();
        let mut ack = [0u8; 32];
        let ack_len = crate::frame_codec::create_eack(&mut ack, 0, Duration::ZERO, false).unwrap();
        let mut should_receive = [0u8; 128];
        should_receive[..ack_len].copy_from_slice(&ack[..ack_len]);
        radio.inner(|inner| inner.should_receive = Some(should_receive));
        let link = link(LinkOptions::Tx, Some(addr));

        let status = exec(&mut radio, &mut queue, &link, addr).await;

        assert_eq!(status, TxStatus::Ok);
        assert!(queue.get_packet_for_nbr(addr).is_some());
        assert_eq!(
            queue.get_nbr(addr).unwrap().backoff_exponent(),
            crate::config::MIN_BACKOFF_EXPONENT + 2
        );
    }
}
