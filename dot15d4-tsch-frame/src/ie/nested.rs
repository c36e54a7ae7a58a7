use super::{Error, Result};
use crate::time::Duration;
use bitflags::bitflags;

/// A reader/writer for the IEEE 802.15.4 Nested Information Elements.
///
/// ## Short format
/// ```notrust
/// +--------+--------+--------+--------------------------+
/// | Length | Sub-ID | Type=0 | Content (0-255 octets)...|
/// +--------+--------+--------+--------------------------+
/// ```
///
/// ## Long format
/// ```notrust
/// +--------+--------+--------+---------------------------+
/// | Length | Sub-ID | Type=1 | Content (0-2046 octets)...|
/// +--------+--------+--------+---------------------------+
/// ```
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct NestedInformationElement<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> NestedInformationElement<T> {
    /// Create a new [`NestedInformationElement`] reader/writer from a given
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short to contain the nested
    /// information element.
    pub fn new(data: T) -> Result<Self> {
        let nested = Self::new_unchecked(data);

        if !nested.check_len() {
            return Err(Error);
        }

        Ok(nested)
    }

    /// Returns `false` if the buffer is too short to contain the nested
    /// information element.
    fn check_len(&self) -> bool {
        if self.data.as_ref().len() < 2 {
            return false;
        }

        let len = self.length();

        self.data.as_ref().len() >= len + 2
    }

    /// Create a new [`NestedInformationElement`] reader/writer from a given
    /// buffer without length checking.
    pub fn new_unchecked(data: T) -> Self {
        Self { data }
    }

    /// Return the length of the Nested Information Element in bytes.
    pub fn length(&self) -> usize {
        let b = &self.data.as_ref()[0..];
        if self.is_long() {
            (u16::from_le_bytes([b[0], b[1]]) & 0b1111111111) as usize
        } else {
            (u16::from_le_bytes([b[0], b[1]]) & 0b1111111) as usize
        }
    }

    /// Return the [`NestedSubId`].
    pub fn sub_id(&self) -> NestedSubId {
        let b = &self.data.as_ref()[0..];
        let id = u16::from_le_bytes([b[0], b[1]]);
        if self.is_long() {
            NestedSubId::Long(NestedSubIdLong::from(((id >> 11) & 0b1111) as u8))
        } else {
            NestedSubId::Short(NestedSubIdShort::from(((id >> 8) & 0b111111) as u8))
        }
    }

    /// Returns `true` when the Nested Information Element is a short type.
    pub fn is_short(&self) -> bool {
        !self.is_long()
    }

    /// Returns `true` when the Nested Information Element is a long type.
    pub fn is_long(&self) -> bool {
        let b = &self.data.as_ref()[0..];
        (u16::from_le_bytes([b[0], b[1]]) >> 15) & 0b1 == 0b1
    }

    /// Return the content of this Nested Information Element.
    pub fn content(&self) -> &[u8] {
        &self.data.as_ref()[2..][..self.length()]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> NestedInformationElement<T> {
    /// Clear the content of this Nested Information Element.
    pub fn clear(&mut self) {
        self.data.as_mut().fill(0);
    }

    /// Set the length of the Nested Information Element.
    pub fn set_length(&mut self, len: u16, id: NestedSubId) {
        let mask: u16 = if id.is_short() {
            0b0000_1111_1111
        } else {
            0b0111_1111_1111
        };

        let b = &mut self.data.as_mut()[0..2];
        let value = u16::from_le_bytes([b[0], b[1]]) & !mask;
        let value = value | (len & mask);
        b[0..2].copy_from_slice(&value.to_le_bytes());
    }

    /// Set the [`NestedSubId`].
    pub fn set_sub_id(&mut self, id: NestedSubId) {
        let mask: u16 = if id.is_short() {
            0b0111_1111_0000_0000
        } else {
            0b0111_1000_0000_0000
        };

        let b = &mut self.data.as_mut()[0..2];
        let value = u16::from_le_bytes([b[0], b[1]]) & !mask;
        let value = value
            | match id {
                NestedSubId::Short(id) => (id as u16) << 8,
                NestedSubId::Long(id) => ((id as u16) << 11) | 0b1000_0000_0000_0000,
            };
        b[0..2].copy_from_slice(&value.to_le_bytes());
    }

    /// Return a mutable reference to the content of this Nested Information
    pub fn content_mut(&mut self) -> &mut [u8] {
        &mut self.data.as_mut()[2..]
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for NestedInformationElement<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.sub_id() {
            NestedSubId::Short(id) => match id {
                NestedSubIdShort::TschSynchronization => {
                    let Ok(ts) = TschSynchronization::new(self.content()) else {
                        return write!(f, "  {id}");
                    };
                    write!(f, "  {id} {ts}")
                }
                _ => write!(f, "  {:?}({:0x?})", id, self.content()),
            },
            NestedSubId::Long(id) => write!(f, "  {:?}({:0x?})", id, self.content()),
        }
    }
}

/// Nested Information Element ID.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum NestedSubId {
    /// Short Nested Information Element ID.
    Short(NestedSubIdShort),
    /// Long Nested Information Element ID.
    Long(NestedSubIdLong),
}

impl NestedSubId {
    /// Create a short [`NestedSubId`] from a `u8`.
    pub fn from_short(value: u8) -> Self {
        Self::Short(NestedSubIdShort::from(value))
    }

    /// Create a long [`NestedSubId`] from a `u8`.
    pub fn from_long(value: u8) -> Self {
        Self::Long(NestedSubIdLong::from(value))
    }

    /// Returns `true` when the Nested Information Element is a short type.
    pub fn is_short(&self) -> bool {
        matches!(self, Self::Short(_))
    }

    /// Returns `true` when the Nested Information Element is a long type.
    pub fn is_long(&self) -> bool {
        matches!(self, Self::Long(_))
    }
}

/// Short Nested Information Element ID.
///
/// Only the TSCH Synchronization sub-ID is named; every other wire value
/// is carried through as [`Unkown`](NestedSubIdShort::Unkown).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum NestedSubIdShort {
    /// TSCH Synchronization.
    TschSynchronization = 0x1a,
    /// Unknown.
    Unkown,
}

impl From<u8> for NestedSubIdShort {
    fn from(value: u8) -> Self {
        match value {
            0x1a => Self::TschSynchronization,
            _ => Self::Unkown,
        }
    }
}

impl core::fmt::Display for NestedSubIdShort {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TschSynchronization => write!(f, "TSCH Synchronization"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Long Nested Information Element ID.
///
/// No long-format nested IE is built or parsed by this crate; every wire
/// value is carried through as [`Unkown`](NestedSubIdLong::Unkown).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum NestedSubIdLong {
    /// Unnown.
    Unkown,
}

impl From<u8> for NestedSubIdLong {
    fn from(_value: u8) -> Self {
        Self::Unkown
    }
}

impl core::fmt::Display for NestedSubIdLong {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A reader/writer for the TSCH synchronization IE.
/// ```notrust
/// +-----+-------------+
/// | ASN | Join metric |
/// +-----+-------------+
/// 0     5             6
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TschSynchronization<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> TschSynchronization<T> {
    /// Create a new [`TschSynchronization`] reader/writer from a given buffer.
    pub fn new(data: T) -> Result<Self> {
        let ts = Self::new_unchecked(data);

        if !ts.check_len() {
            return Err(Error);
        }

        Ok(ts)
    }

    /// Returns `false` if the buffer is too short to contain a valid TSCH
    /// Synchronization IE.
    fn check_len(&self) -> bool {
        self.data.as_ref().len() >= 6
    }

    /// Create a new [`TschSynchronization`] reader/writer from a given buffer
    /// without length checking.
    pub fn new_unchecked(data: T) -> Self {
        Self { data }
    }

    /// Return the absolute slot number field.
    pub fn absolute_slot_number(&self) -> u64 {
        let data = self.data.as_ref();
        let mut asn = data[0] as u64;
        asn += (data[1] as u64) << 8;
        asn += (data[2] as u64) << 16;
        asn += (data[3] as u64) << 24;
        asn += (data[4] as u64) << 32;
        asn
    }

    /// Return the join metric field.
    pub fn join_metric(&self) -> u8 {
        self.data.as_ref()[5]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> TschSynchronization<T> {
    /// Set the absolute slot number field.
    pub fn set_absolute_slot_number(&mut self, asn: u64) {
        let data = self.data.as_mut();
        data[0] = (asn & 0xff) as u8;
        data[1] = ((asn >> 8) & 0xff) as u8;
        data[2] = ((asn >> 16) & 0xff) as u8;
        data[3] = ((asn >> 24) & 0xff) as u8;
        data[4] = ((asn >> 32) & 0xff) as u8;
    }

    /// Set the join metric field.
    pub fn set_join_metric(&mut self, join_metric: u8) {
        self.data.as_mut()[5] = join_metric;
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for TschSynchronization<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ASN: {}, join metric: {}",
            self.absolute_slot_number(),
            self.join_metric()
        )
    }
}

/// A TSCH time slot timings (figure 6-30 in IEEE 802.15.4-2020), relative
/// to the RX guard time that determines how wide the listening window
/// around the nominal RX offset has to be.
///
/// ```notrust
/// +------------+-----+-----------+-----------+--------------+--------------+---------+----------+---------+--------+------------------+
/// | CCA offset | CCA | TX offset | RX offset | RX ACK delay | TX ACK delay | RX wait | ACK wait | Max ACK | Max TX | Time slot length |
/// +------------+-----+-----------+-----------+--------------+--------------+---------+----------+---------+--------+------------------+
/// ```
#[derive(Debug)]
pub struct TschTimeslotTimings {
    /// Offset from the start of the time slot to the start of the CCA in
    /// microseconds.
    cca_offset: Duration,
    /// Duration of the CCA in microseconds.
    cca: Duration,

    /// Offset from the start of the time slot to the start of the TX in
    /// microseconds.
    tx_offset: Duration,
    /// Maximum transmission time for a frame in microseconds.
    max_tx: Duration,
    /// Wait time between the end of the TX and the start of the ACK RX in
    /// microseconds.
    rx_ack_delay: Duration,
    /// Maximum time to wait for receiving an ACK.
    ack_wait: Duration,

    /// Offset from the start of the time slot to the start of the RX in
    /// microseconds.
    rx_offset: Duration,
    /// Maximum time to wait for receiving a frame.
    rx_wait: Duration,
    /// Wait time between the end of the RX and the start of the ACK TX in
    /// microseconds.
    tx_ack_delay: Duration,
    /// Maximum transmission time for an ACK in microseconds.
    max_ack: Duration,

    /// Length of the time slot in microseconds.
    time_slot_length: Duration,
}

impl Default for TschTimeslotTimings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GUARD_TIME)
    }
}

impl TschTimeslotTimings {
    /// The default guard time (2200us) in microseconds.
    pub const DEFAULT_GUARD_TIME: Duration = Duration::from_us(2200);

    /// Create a new set of time slot timings with the given RX guard time.
    pub fn new(guard_time: Duration) -> Self {
        Self {
            cca_offset: Duration::from_us(1800),
            cca: Duration::from_us(128),
            tx_offset: Duration::from_us(2120),
            rx_offset: Duration::from_us(2120) - (guard_time / 2),
            rx_ack_delay: Duration::from_us(800),
            tx_ack_delay: Duration::from_us(1000),
            rx_wait: guard_time,
            ack_wait: Duration::from_us(400),
            max_ack: Duration::from_us(2400),
            max_tx: Duration::from_us(4256),
            time_slot_length: Duration::from_us(10000),
        }
    }

    /// Return the CCA offset in microseconds.
    pub const fn cca_offset(&self) -> Duration {
        self.cca_offset
    }

    /// Return the CCA duration in microseconds.
    pub const fn cca(&self) -> Duration {
        self.cca
    }

    /// Return the TX offset in microseconds.
    pub const fn tx_offset(&self) -> Duration {
        self.tx_offset
    }

    /// Return the RX offset in microseconds.
    pub const fn rx_offset(&self) -> Duration {
        self.rx_offset
    }

    /// Return the RX ACK delay in microseconds.
    pub const fn rx_ack_delay(&self) -> Duration {
        self.rx_ack_delay
    }

    /// Return the TX ACK delay in microseconds.
    pub const fn tx_ack_delay(&self) -> Duration {
        self.tx_ack_delay
    }

    /// Return the RX wait in microseconds.
    pub const fn rx_wait(&self) -> Duration {
        self.rx_wait
    }

    /// Return the ACK wait in microseconds.
    pub const fn ack_wait(&self) -> Duration {
        self.ack_wait
    }

    /// Return the maximum ACK in microseconds.
    pub const fn max_ack(&self) -> Duration {
        self.max_ack
    }

    /// Return the maximum TX in microseconds.
    pub const fn max_tx(&self) -> Duration {
        self.max_tx
    }

    /// Return the time slot length in microseconds.
    pub const fn time_slot_length(&self) -> Duration {
        self.time_slot_length
    }
}

bitflags! {
    /// TSCH link options bitfield.
    /// ```notrust
    /// +----+----+--------+--------------+----------+----------+
    /// | Tx | Rx | Shared | Time keeping | Priority | Reserved |
    /// +----+----+--------+--------------+----------+----------+
    /// ```
    #[derive(Copy, Clone)]
    pub struct TschLinkOption: u8 {
        /// Transmit.
        const Tx = 0b0000_0001;
        /// Receive.
        const Rx = 0b0000_0010;
        /// Shared.
        const Shared = 0b0000_0100;
        /// Time keeping.
        const TimeKeeping = 0b0000_1000;
        /// Priority.
        const Priority = 0b0001_0000;
    }
}

impl core::fmt::Debug for TschLinkOption {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// An [`Iterator`] over [`NestedInformationElement`].
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct NestedInformationElementsIterator<'f> {
    data: &'f [u8],
    offset: usize,
    terminated: bool,
}

impl<'f> NestedInformationElementsIterator<'f> {
    /// Create a new [`NestedInformationElementsIterator`].
    pub fn new(data: &'f [u8]) -> Self {
        Self {
            data,
            offset: 0,
            terminated: false,
        }
    }
}

impl<'f> Iterator for NestedInformationElementsIterator<'f> {
    type Item = NestedInformationElement<&'f [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.terminated {
            None
        } else {
            let Ok(nested) = NestedInformationElement::new(&self.data[self.offset..]) else {
                self.terminated = true;
                return None;
            };
            let len = nested.length() + 2;

            let nested = NestedInformationElement {
                data: &self.data[self.offset..][..len],
            };

            self.offset += len;

            if self.offset >= self.data.len() {
                self.terminated = true;
            }

            Some(nested)
        }
    }
}
