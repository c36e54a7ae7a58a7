//! The foreground/upper-layer boundary: what the slot engine hands off to
//! (and pulls from) the rest of the stack once a slot finishes.
//!
//! `frame_to_transmit` lets an upper layer enqueue without reaching into the
//! per-neighbor queues directly; `received_frame`/`dequeued` are how the
//! engine reports the two rings described in [`crate::ring`] and
//! [`crate::queue`] — an accepted incoming frame, and an outgoing packet
//! that left a neighbor's queue (successfully or via a final drop).

use core::future::Future;

use crate::error::Error;
use crate::queue::TschPacket;
use crate::ring::InputPacket;

/// Interactions the slot engine needs with whatever runs outside slot
/// execution. An async executor can implement this directly over channels;
/// see [`tests::TestUpperLayer`] for the pattern.
pub trait UpperLayer {
    /// Waits for the upper layer to hand over a frame to transmit.
    fn frame_to_transmit(&self) -> impl Future<Output = TschPacket>;
    /// Reports a frame accepted off the air. Holds until the upper layer has
    /// taken ownership of `packet`.
    fn received_frame(&self, packet: InputPacket) -> impl Future<Output = ()>;
    /// Reports an outgoing packet that left its neighbor's queue, carrying
    /// its final [`crate::queue::TxStatus`].
    fn dequeued(&self, packet: TschPacket) -> impl Future<Output = ()>;
    /// Reports an error encountered while driving the engine.
    fn error(&self, error: Error) -> impl Future<Output = ()>;
}

#[cfg(test)]
pub mod tests {
    use crate::sync::channel::{Channel, Receiver, Sender};

    use super::*;

    #[derive(Default)]
    pub struct TestUpperLayerChannel {
        pub tx: Channel<TschPacket>,
        pub rx: Channel<InputPacket>,
        pub dequeued: Channel<TschPacket>,
        pub errors: Channel<Error>,
    }

    impl TestUpperLayerChannel {
        pub fn new() -> Self {
            Self {
                tx: Channel::new(),
                rx: Channel::new(),
                dequeued: Channel::new(),
                errors: Channel::new(),
            }
        }

        pub fn split(&mut self) -> (TestUpperLayer<'_>, TestUpperLayerMonitor<'_>) {
            let (tx_send, tx_recv) = self.tx.split();
            let (rx_send, rx_recv) = self.rx.split();
            let (dequeued_send, dequeued_recv) = self.dequeued.split();
            let (errors_send, errors_recv) = self.errors.split();
            (
                TestUpperLayer {
                    tx: tx_recv,
                    rx: rx_send,
                    dequeued: dequeued_send,
                    errors: errors_send,
                },
                TestUpperLayerMonitor {
                    tx: tx_send,
                    rx: rx_recv,
                    dequeued: dequeued_recv,
                    errors: errors_recv,
                },
            )
        }
    }

    pub struct TestUpperLayerMonitor<'a> {
        pub tx: Sender<'a, TschPacket>,
        pub rx: Receiver<'a, InputPacket>,
        pub dequeued: Receiver<'a, TschPacket>,
        pub errors: Receiver<'a, Error>,
    }

    pub struct TestUpperLayer<'a> {
        tx: Receiver<'a, TschPacket>,
        rx: Sender<'a, InputPacket>,
        dequeued: Sender<'a, TschPacket>,
        errors: Sender<'a, Error>,
    }

    impl UpperLayer for TestUpperLayer<'_> {
        async fn frame_to_transmit(&self) -> TschPacket {
            self.tx.receive().await
        }

        async fn received_frame(&self, packet: InputPacket) {
            self.rx.send(packet);
        }

        async fn dequeued(&self, packet: TschPacket) {
            self.dequeued.send(packet);
        }

        async fn error(&self, error: Error) {
            self.errors.send(error);
        }
    }
}
