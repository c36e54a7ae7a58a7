//! Link-layer security hook.
//!
//! The engine never implements a cipher itself: it calls out to a
//! [`SecurityCodec`] implementation at the two points a frame crosses the
//! wire boundary, passing the ASN so implementations that mix it into the
//! nonce (see the Auxiliary Security Header's ASN-in-nonce bit in
//! `dot15d4_tsch_frame::aux_sec_header`) don't need a side channel for it.
//! [`LLSEC_ENABLED`](crate::config::LLSEC_ENABLED) gates whether the engine
//! calls through at all; when it's off, [`NoSecurity`] is wired in and the
//! hook costs nothing.

use crate::asn::Asn;
use crate::error::Result;

/// Encrypts/authenticates outgoing frames and decrypts/verifies incoming
/// ones in place, in the buffer the frame was already built into.
pub trait SecurityCodec {
    /// Number of trailing bytes [`secure_frame`](SecurityCodec::secure_frame)
    /// appends for the Message Integrity Code, given the frame's unsecured
    /// length. Callers reserve this much headroom in the frame buffer before
    /// building the frame.
    fn mic_len(&self) -> usize;

    /// Encrypt and/or authenticate the first `len` bytes of `buf` in place,
    /// appending the MIC within the `mic_len()` bytes of headroom after it.
    /// Returns the total length of the secured frame.
    fn secure_frame(&self, buf: &mut [u8], len: usize, asn: Asn) -> Result<usize>;

    /// Verify and/or decrypt a received frame's first `len` bytes in place.
    /// Returns the length of the frame with the MIC and any confidentiality
    /// padding removed.
    fn parse_frame(&self, buf: &mut [u8], len: usize, asn: Asn) -> Result<usize>;
}

/// The codec wired in when [`LLSEC_ENABLED`](crate::config::LLSEC_ENABLED) is
/// `false`: every frame passes through unmodified.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecurity;

impl SecurityCodec for NoSecurity {
    fn mic_len(&self) -> usize {
        0
    }

    fn secure_frame(&self, _buf: &mut [u8], len: usize, _asn: Asn) -> Result<usize> {
        Ok(len)
    }

    fn parse_frame(&self, _buf: &mut [u8], len: usize, _asn: Asn) -> Result<usize> {
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_security_passes_frames_through_unchanged() {
        let codec = NoSecurity;
        let mut buf = [1, 2, 3, 4];
        assert_eq!(codec.mic_len(), 0);
        assert_eq!(codec.secure_frame(&mut buf, 4, Asn::ZERO).unwrap(), 4);
        assert_eq!(codec.parse_frame(&mut buf, 4, Asn::ZERO).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
    }
}
