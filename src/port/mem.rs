//! In-memory port backend for tests
//!
//! Deterministic rings: tests seed per-port receive queues, bound the
//! transmit rings to model back-pressure, and inspect a ledger of every
//! released frame to assert the ownership contract.

use super::{Frame, LinkState, PortId, PortStats, Ports, ETH_ADDR_HEADER_LEN};
use std::collections::VecDeque;

/// Deterministic [`Ports`] implementation backed by plain queues.
pub struct MemPorts {
    ports: Vec<MemPort>,
    released: Vec<Vec<u8>>,
}

struct MemPort {
    rx_queue: VecDeque<Frame>,
    tx_ring: Vec<Frame>,
    tx_capacity: usize,
    link: LinkState,
    stats: PortStats,
}

impl MemPorts {
    /// Creates `count` ports with unbounded transmit rings and links up.
    pub fn new(count: usize) -> Self {
        let ports = (0..count)
            .map(|_| MemPort {
                rx_queue: VecDeque::new(),
                tx_ring: Vec::new(),
                tx_capacity: usize::MAX,
                link: LinkState::Up,
                stats: PortStats::default(),
            })
            .collect();
        Self {
            ports,
            released: Vec::new(),
        }
    }

    /// Caps the number of frames `port`'s transmit ring will ever hold.
    pub fn set_tx_capacity(&mut self, port: PortId, capacity: usize) {
        self.ports[port].tx_capacity = capacity;
    }

    pub fn set_link(&mut self, port: PortId, link: LinkState) {
        self.ports[port].link = link;
    }

    /// Queues a frame for the next receive burst on `port`.
    pub fn push_rx(&mut self, port: PortId, frame: Frame) {
        self.ports[port].rx_queue.push_back(frame);
    }

    /// Frames accepted by transmit on `port`, in acceptance order.
    pub fn tx_ring(&self, port: PortId) -> &[Frame] {
        &self.ports[port].tx_ring
    }

    /// Payloads of every frame released back to the pool, in release order.
    pub fn released(&self) -> &[Vec<u8>] {
        &self.released
    }
}

impl Ports for MemPorts {
    fn port_count(&self) -> usize {
        self.ports.len()
    }

    fn receive(&mut self, port: PortId, max: usize) -> Vec<Frame> {
        let p = &mut self.ports[port];
        if p.link == LinkState::Down {
            return Vec::new();
        }
        let mut batch = Vec::new();
        while batch.len() < max {
            let frame = match p.rx_queue.pop_front() {
                Some(frame) => frame,
                None => break,
            };
            // Same filtering contract as the AF_PACKET backend: frames
            // shorter than the address header never reach the dataplane.
            if frame.len() < ETH_ADDR_HEADER_LEN {
                p.stats.rx_dropped += 1;
                continue;
            }
            batch.push(frame);
        }
        p.stats.rx_frames += batch.len() as u64;
        batch
    }

    fn transmit(&mut self, port: PortId, frames: Vec<Frame>) -> Vec<Frame> {
        let p = &mut self.ports[port];
        let room = p.tx_capacity.saturating_sub(p.tx_ring.len());
        let accept = room.min(frames.len());

        let mut frames = frames.into_iter();
        for frame in frames.by_ref().take(accept) {
            p.tx_ring.push(frame);
        }
        p.stats.tx_frames += accept as u64;

        frames.collect()
    }

    fn release(&mut self, frame: Frame) {
        self.released.push(frame.payload().to_vec());
    }

    fn link_state(&self, port: PortId) -> LinkState {
        self.ports[port].link
    }

    fn stats(&self, port: PortId) -> PortStats {
        self.ports[port].stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: u8) -> Frame {
        Frame::from_bytes(&[tag; 64])
    }

    #[test]
    fn test_receive_respects_max_and_order() {
        let mut ports = MemPorts::new(2);
        for tag in 0..5 {
            ports.push_rx(0, frame(tag));
        }

        let batch = ports.receive(0, 3);
        assert_eq!(batch.len(), 3);
        for (i, f) in batch.iter().enumerate() {
            assert_eq!(f.payload()[0], i as u8);
        }

        let rest = ports.receive(0, 32);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].payload()[0], 3);
    }

    #[test]
    fn test_transmit_accepts_prefix_up_to_capacity() {
        let mut ports = MemPorts::new(2);
        ports.set_tx_capacity(1, 2);

        let batch = (0..5).map(frame).collect();
        let unsent = ports.transmit(1, batch);

        assert_eq!(ports.tx_ring(1).len(), 2);
        assert_eq!(ports.tx_ring(1)[0].payload()[0], 0);
        assert_eq!(ports.tx_ring(1)[1].payload()[0], 1);
        assert_eq!(unsent.len(), 3);
        assert_eq!(unsent[0].payload()[0], 2);
        assert_eq!(ports.stats(1).tx_frames, 2);
    }

    #[test]
    fn test_runt_frames_are_discarded_on_receive() {
        let mut ports = MemPorts::new(2);
        ports.push_rx(0, Frame::from_bytes(&[0xee; 5]));
        ports.push_rx(0, frame(1));

        let batch = ports.receive(0, 32);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].payload()[0], 1);
        assert_eq!(ports.stats(0).rx_frames, 1);
        assert_eq!(ports.stats(0).rx_dropped, 1);
    }

    #[test]
    fn test_down_port_receives_nothing() {
        let mut ports = MemPorts::new(2);
        ports.push_rx(0, frame(7));
        ports.set_link(0, LinkState::Down);
        assert!(ports.receive(0, 32).is_empty());
    }

    #[test]
    fn test_release_ledger() {
        let mut ports = MemPorts::new(2);
        ports.release(frame(9));
        assert_eq!(ports.released().len(), 1);
        assert_eq!(ports.released()[0][0], 9);
    }
}
