//! Owned frame buffers
//!
//! A [`Frame`] is the unit of ownership in the dataplane: a backend hands one
//! out on receive, and it must end its life in exactly one of two places -
//! consumed by a transmit call, or returned to the backend via release.
//! The type is deliberately not `Clone`; handing a frame somewhere moves it.

use std::fmt;

/// Length of one link-layer address.
pub const MAC_LEN: usize = 6;

/// Destination + source MAC pair at the start of every Ethernet frame.
pub const ETH_ADDR_HEADER_LEN: usize = 2 * MAC_LEN;

/// MAC address (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; MAC_LEN]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; MAC_LEN]);
    pub const ZERO: MacAddr = MacAddr([0; MAC_LEN]);

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One received Ethernet frame, backed by a pool buffer.
///
/// The buffer may be larger than the frame; `len` marks the valid prefix.
#[derive(Debug)]
pub struct Frame {
    buf: Vec<u8>,
    len: usize,
}

impl Frame {
    /// Wraps a pool buffer holding `len` valid bytes.
    pub fn new(buf: Vec<u8>, len: usize) -> Self {
        debug_assert!(len <= buf.len());
        Self { buf, len }
    }

    /// Builds a frame by copying `bytes` (test and backend convenience).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            buf: bytes.to_vec(),
            len: bytes.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn payload(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    /// Destination MAC, read from the first 6 payload bytes.
    ///
    /// Precondition: the frame holds at least the 12-byte address header.
    pub fn dst_mac(&self) -> MacAddr {
        MacAddr(self.buf[..MAC_LEN].try_into().unwrap())
    }

    /// Source MAC, read from payload bytes 6..12.
    ///
    /// Precondition: the frame holds at least the 12-byte address header.
    pub fn src_mac(&self) -> MacAddr {
        MacAddr(self.buf[MAC_LEN..ETH_ADDR_HEADER_LEN].try_into().unwrap())
    }

    /// Gives the backing buffer back to the backend for pooling.
    pub fn into_buf(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_len_tracks_valid_prefix() {
        let frame = Frame::new(vec![0u8; 2048], 60);
        assert_eq!(frame.len(), 60);
        assert_eq!(frame.payload().len(), 60);
        assert_eq!(frame.into_buf().len(), 2048);
    }

    #[test]
    fn test_mac_accessors() {
        let mut bytes = vec![0u8; 64];
        bytes[..6].copy_from_slice(&[0x02, 0, 0, 0, 0, 0xaa]);
        bytes[6..12].copy_from_slice(&[0x02, 0, 0, 0, 0, 0xbb]);
        let frame = Frame::from_bytes(&bytes);
        assert_eq!(frame.dst_mac(), MacAddr([0x02, 0, 0, 0, 0, 0xaa]));
        assert_eq!(frame.src_mac(), MacAddr([0x02, 0, 0, 0, 0, 0xbb]));
    }

    #[test]
    fn test_mac_display() {
        let mac = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(mac.to_string(), "00:11:22:33:44:55");
        assert!(!mac.is_multicast());
        assert!(MacAddr::BROADCAST.is_multicast());
    }
}
