//! MAC address swapper
//!
//! Exchanges the destination and source MAC fields at the front of each
//! frame, in place. Length and every other payload byte are untouched, so
//! applying the swap twice restores the original frame.
//!
//! Precondition: frames hold at least the 12-byte address header. Backends
//! discard runt frames on receive, so the dataplane does not re-validate.

use crate::port::{Frame, MAC_LEN};

/// Swaps the destination and source MAC addresses of one frame, in place.
#[inline]
pub fn swap_addrs(frame: &mut Frame) {
    let payload = frame.payload_mut();
    let (dst, rest) = payload.split_at_mut(MAC_LEN);
    dst.swap_with_slice(&mut rest[..MAC_LEN]);
}

/// Applies [`swap_addrs`] to every frame of a batch, preserving order.
pub fn swap_batch(batch: &mut [Frame]) {
    for frame in batch {
        swap_addrs(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MacAddr;

    fn frame_with_macs(dst: MacAddr, src: MacAddr) -> Frame {
        let mut bytes = vec![0u8; 64];
        bytes[..6].copy_from_slice(&dst.0);
        bytes[6..12].copy_from_slice(&src.0);
        // Recognizable payload beyond the header
        for (i, b) in bytes[12..].iter_mut().enumerate() {
            *b = i as u8;
        }
        Frame::from_bytes(&bytes)
    }

    #[test]
    fn test_swap_exchanges_addresses() {
        let dst = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
        let src = MacAddr([0x02, 0, 0, 0, 0, 0x02]);
        let mut frame = frame_with_macs(dst, src);

        swap_addrs(&mut frame);

        assert_eq!(frame.dst_mac(), src);
        assert_eq!(frame.src_mac(), dst);
    }

    #[test]
    fn test_swap_is_idempotent_under_double_application() {
        let dst = MacAddr([0xaa; 6]);
        let src = MacAddr([0xbb; 6]);
        let mut frame = frame_with_macs(dst, src);
        let original = frame.payload().to_vec();

        swap_addrs(&mut frame);
        swap_addrs(&mut frame);

        assert_eq!(frame.payload(), &original[..]);
    }

    #[test]
    fn test_swap_preserves_length_and_body() {
        let mut frame = frame_with_macs(MacAddr([1; 6]), MacAddr([2; 6]));
        let body: Vec<u8> = frame.payload()[12..].to_vec();
        let len = frame.len();

        swap_addrs(&mut frame);

        assert_eq!(frame.len(), len);
        assert_eq!(&frame.payload()[12..], &body[..]);
    }

    #[test]
    fn test_swap_batch_preserves_order() {
        let mut batch: Vec<Frame> = (0..4u8)
            .map(|i| frame_with_macs(MacAddr([i; 6]), MacAddr([i + 0x10; 6])))
            .collect();

        swap_batch(&mut batch);

        for (i, frame) in batch.iter().enumerate() {
            let i = i as u8;
            assert_eq!(frame.dst_mac(), MacAddr([i + 0x10; 6]));
            assert_eq!(frame.src_mac(), MacAddr([i; 6]));
        }
    }
}
