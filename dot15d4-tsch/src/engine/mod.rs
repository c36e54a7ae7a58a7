//! The per-timeslot operation engine: the cooperative loop that, once per
//! scheduled link, figures out what to do ([`select`]), hands off to the TX
//! ([`tx`]) or RX ([`rx`]) slot engine, and advances the ASN.

pub mod rx;
pub mod select;
pub mod tx;

use embedded_hal_async::delay::DelayNs;

use dot15d4_tsch_frame::TschTimeslotTimings;

use crate::asn::Asn;
use crate::lock::{self, Mutex};
use crate::neighbor::Neighbor;
use crate::queue::{Queue, TschPacket};
use crate::radio::Radio;
use crate::radio_gate::{self, Site};
use crate::ring::{InputPacket, Ring, RING_CAPACITY};
use crate::schedule::Schedule;
use crate::security::SecurityCodec;
use crate::timer::{Clock, Deadline};
use crate::timesync::TimeSync;
use crate::upper::UpperLayer;

use self::select::SlotAction;

/// Per-phase tick offsets governing a single timeslot, expressed in the same
/// ticks [`crate::timer::Clock`] counts in (one tick per microsecond at the
/// default [`crate::config::TIMER_TICKS_PER_SECOND`]). Mirrors the fields of
/// the TSCH Timeslot Information Element so a joined network's advertised
/// timing can be applied directly via [`SlotTiming::from`].
#[derive(Debug, Clone, Copy)]
pub struct SlotTiming {
    /// Offset from the start of the slot to the start of the CCA sample.
    pub cca_offset: u32,
    /// Duration of the CCA sample.
    pub cca_duration: u32,
    /// Offset from the start of the slot to the start of the TX.
    pub ts_tx_offset: u32,
    /// Offset from the start of the slot to the start of the RX.
    pub ts_rx_offset: u32,
    /// Gap between the end of a TX and the start of the ACK RX window.
    pub ts_rx_ack_delay: u32,
    /// Gap between the end of an RX and the start of the ACK TX.
    pub ts_tx_ack_delay: u32,
    /// How long to keep the receiver open waiting for a frame.
    pub ts_rx_wait: u32,
    /// How long to keep the receiver open waiting for an ACK.
    pub ts_ack_wait: u32,
    /// Maximum time an ACK transmission/reception may take.
    pub ts_max_ack: u32,
    /// Maximum time a data frame transmission/reception may take.
    pub ts_max_tx: u32,
    /// Total length of the timeslot.
    pub ts_timeslot_length: u32,
    /// Platform radio wake-up latency to account for ahead of a TX.
    pub radio_delay_before_tx: u32,
    /// Platform radio wake-up latency to account for ahead of an RX.
    pub radio_delay_before_rx: u32,
}

impl From<TschTimeslotTimings> for SlotTiming {
    fn from(t: TschTimeslotTimings) -> Self {
        Self {
            cca_offset: t.cca_offset().as_us() as u32,
            cca_duration: t.cca().as_us() as u32,
            ts_tx_offset: t.tx_offset().as_us() as u32,
            ts_rx_offset: t.rx_offset().as_us() as u32,
            ts_rx_ack_delay: t.rx_ack_delay().as_us() as u32,
            ts_tx_ack_delay: t.tx_ack_delay().as_us() as u32,
            ts_rx_wait: t.rx_wait().as_us() as u32,
            ts_ack_wait: t.ack_wait().as_us() as u32,
            ts_max_ack: t.max_ack().as_us() as u32,
            ts_max_tx: t.max_tx().as_us() as u32,
            ts_timeslot_length: t.time_slot_length().as_us() as u32,
            radio_delay_before_tx: 0,
            radio_delay_before_rx: 0,
        }
    }
}

impl Default for SlotTiming {
    fn default() -> Self {
        Self::from(TschTimeslotTimings::default())
    }
}

/// Approximate on-air duration of a `len`-byte 802.15.4 O-QPSK frame at
/// 250 kb/s (32 us/byte), used to place the ACK RX window right after the
/// frame actually finishes instead of after the worst-case `ts_max_tx`.
pub fn packet_duration(len: usize) -> u32 {
    len as u32 * 32
}

/// Outcome of a single call to [`run_slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// Nothing scheduled; the slot was skipped entirely.
    NoActiveLink,
    /// A foreground mutator currently holds the lock arbiter (C2); the slot
    /// was skipped rather than race the schedule/queue it is mutating.
    Locked,
    /// A transmission was attempted; carries its [`crate::queue::TxStatus`].
    Transmitted(crate::queue::TxStatus),
    /// A receive window was opened; carries whether a frame was accepted.
    Received(bool),
    /// The slot had an active link but nothing to send and no reason to
    /// listen (a dedicated TX link with an empty queue, for instance).
    Idle,
}

/// Run exactly one timeslot: resolve the next active link from `asn`,
/// arbitrate what to do, perform it, and return the outcome. Does not itself
/// advance `asn` past the link that was acted on — the caller owns the ASN
/// and advances it by the `diff` [`Schedule::next_active_link`] reported,
/// since a caller integrating with real hardware needs that count to
/// reprogram its timer for the next interrupt.
///
/// Checks the lock arbiter (C2) before touching anything: if a foreground
/// mutator currently holds it, the slot is skipped entirely rather than read
/// a schedule/queue mid-mutation (spec invariant 2, "`locked` ⇒ no new slot
/// starts"). The check only ever transiently holds the lock to observe it —
/// it is released again before the slot body runs, so the slot engine itself
/// never holds the foreground lock while executing (invariant 1).
#[allow(clippy::too_many_arguments)]
pub async fn run_slot<R, D, C, N, Q, S, Sec, Ts, U>(
    radio: &mut R,
    delay: &mut D,
    clock: &C,
    queue: &mut Q,
    schedule: &S,
    security: &Sec,
    timesync: &mut Ts,
    state_lock: &Mutex<()>,
    dequeued: &Ring<TschPacket, RING_CAPACITY>,
    incoming: &Ring<InputPacket, RING_CAPACITY>,
    upper: &U,
    asn: Asn,
    slot_start: Deadline,
) -> (SlotOutcome, u32)
where
    R: Radio,
    D: DelayNs,
    C: Clock,
    N: Neighbor,
    Q: Queue<N>,
    S: Schedule,
    Sec: SecurityCodec,
    Ts: TimeSync,
    U: UpperLayer,
{
    match state_lock.try_lock() {
        Some(guard) => lock::release(guard),
        None => return (SlotOutcome::Locked, 1),
    }

    let Some((primary, diff, backup)) = schedule.next_active_link(&asn) else {
        return (SlotOutcome::NoActiveLink, 1);
    };

    let target_asn = asn + diff;
    queue.update_all_backoff_windows();

    let timing = SlotTiming::default();
    let action = select::select_slot_action(queue, primary, backup);

    let outcome = match action {
        SlotAction::Transmit { link, neighbor } => {
            radio_gate::enable(radio, Site::StartOfSlot).await;
            let channel_num = schedule.channel(&target_asn, &link);
            let status = tx::run_tx(
                radio,
                delay,
                clock,
                queue,
                security,
                timesync,
                &timing,
                slot_start,
                &link,
                neighbor,
                target_asn,
                channel_num,
                dequeued,
            )
            .await;
            radio_gate::disable(radio, Site::EndOfSlot).await;
            SlotOutcome::Transmitted(status)
        }
        SlotAction::Receive { link } => {
            radio_gate::enable(radio, Site::StartOfSlot).await;
            let channel_num = schedule.channel(&target_asn, &link);
            let accepted = rx::run_rx(
                radio,
                delay,
                clock,
                queue,
                security,
                timesync,
                &timing,
                slot_start,
                target_asn,
                channel_num,
                incoming,
            )
            .await;
            radio_gate::disable(radio, Site::EndOfSlot).await;
            SlotOutcome::Received(accepted)
        }
        SlotAction::Idle => SlotOutcome::Idle,
    };

    while let Some(packet) = dequeued.pop() {
        upper.dequeued(packet).await;
    }
    while let Some(packet) = incoming.pop() {
        upper.received_frame(packet).await;
    }

    (outcome, diff.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_matches_the_advertised_timeslot_template() {
        let timing = SlotTiming::default();
        assert_eq!(timing.ts_tx_offset, 2120);
        assert_eq!(timing.ts_timeslot_length, 10000);
    }

    #[test]
    fn packet_duration_scales_linearly_with_length() {
        assert_eq!(packet_duration(0), 0);
        assert_eq!(packet_duration(10), 320);
    }
}
