//! The radio driver boundary: everything the slot-operation engine needs
//! from the underlying chip, expressed as an async trait so a platform
//! integration can drive real hardware interrupts while tests drive a mock.

pub mod config;
pub mod futures;

use core::future::Future;

use crate::time::Instant;
use self::config::{RxConfig, TxConfig};

/// A value read from or written to the radio besides a full frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioValue {
    /// Current receive sensitivity threshold, in the driver's native units.
    CcaThreshold(i8),
    /// Transmit power, in dBm.
    TxPower(i8),
}

/// Metadata about the most recently received frame, fetched out-of-band from
/// the frame bytes themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadioObject {
    /// SFD timestamp of the last received frame, used for drift correction.
    LastPacketTimestamp(Instant),
    /// Received signal strength indicator of the last received frame.
    LastPacketRssi(i8),
}

pub trait Radio {
    /// Request the radio to idle to a low-power sleep mode.
    fn disable(&mut self) -> impl Future<Output = ()>;
    /// Request the radio to wake from sleep.
    fn enable(&mut self) -> impl Future<Output = ()>;

    /// Request the radio to go in receive mode and try to receive a frame into
    /// the supplied buffer.
    ///
    /// # Safety
    /// The supplied buffer must remain writable until either
    /// successful reception, or the radio state changed.
    unsafe fn prepare_receive(
        &mut self,
        cfg: &RxConfig,
        bytes: &mut [u8; 128],
    ) -> impl Future<Output = ()>;

    /// Request the radio to go in receive mode and try to receive a frame.
    fn receive(&mut self) -> impl Future<Output = bool>;

    /// Request the radio to go in transmit mode and try to send a frame.
    /// The mutability of the bytes argument is not really to modify the buffer,
    /// but rather to signify to hand over exclusive ownership. In addition this
    /// also helps with the easy_dma on the nRF family of chips as the buffer
    /// may not be in flash.
    ///
    /// # Safety
    /// The supplied buffer must remain valid until either
    /// successful reception, or the radio state changed.
    unsafe fn prepare_transmit(
        &mut self,
        cfg: &TxConfig,
        bytes: &mut [u8],
    ) -> impl Future<Output = ()>;

    /// When working with futures, it is not always guaranteed that a future
    /// will complete. This method must be seen as a notification to the radio
    /// where it can prepare for this cancelation. This method may not use any
    /// async behavior, as dropping in Rust (when a future is cancelled) can
    /// not be async.
    fn cancel_current_opperation(&mut self);

    /// Request the radio to transmit the queued frame.
    ///
    /// Returns whether a transmission was successful.
    fn transmit(&mut self) -> impl Future<Output = bool>;

    /// Sample the channel and report whether it is clear, i.e. whether
    /// transmitting now would collide with an in-flight frame. Used ahead of
    /// every shared-link transmission.
    fn channel_clear(&mut self) -> impl Future<Output = bool>;

    /// `true` if the radio has a fully received frame sitting in its buffer
    /// that has not been [`read`](Radio::read) out yet.
    fn pending_packet(&self) -> bool;

    /// Copy the pending received frame into `buf`, returning the number of
    /// bytes written. `buf` must be at least as large as the frame.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Fetch a piece of out-of-band metadata about the last received frame.
    fn get_object(&self, object: RadioObject) -> RadioObject;

    /// Read a radio parameter.
    fn get_value(&self, value: RadioValue) -> RadioValue;

    /// Write a radio parameter.
    fn set_value(&mut self, value: RadioValue);

    /// Returns the IEEE802.15.4 8-octet MAC address of the radio device.
    fn ieee802154_address(&self) -> [u8; 8];
}
