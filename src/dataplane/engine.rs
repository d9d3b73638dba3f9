//! Forwarding loop
//!
//! The hot path. One pass polls every port in ascending order: burst
//! receive, optional MAC swap, burst transmit to the XOR-1 partner, and an
//! explicit release for every frame the partner's ring refused. Nothing in
//! the pass blocks and nothing is retried; a frame that cannot go out this
//! pass is dropped, not queued.

use super::{pairing, swap};
use crate::port::{PortId, Ports};
use crate::shutdown::ShutdownToken;
use crate::stats;
use tracing::{debug, info};

/// Loop-side per-port accounting, indexed by receiving port.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortTally {
    /// Frames accepted by the paired port's transmit ring.
    pub forwarded: u64,
    /// Frames released because the paired ring refused them.
    pub dropped: u64,
}

/// The forwarding loop and its configuration, fixed at construction.
pub struct Engine<P: Ports> {
    ports: P,
    burst: usize,
    mac_swap: bool,
    token: ShutdownToken,
    tallies: Vec<PortTally>,
}

impl<P: Ports> Engine<P> {
    pub fn new(ports: P, burst: usize, mac_swap: bool, token: ShutdownToken) -> Self {
        let count = ports.port_count();
        Self {
            ports,
            burst,
            mac_swap,
            token,
            tallies: vec![PortTally::default(); count],
        }
    }

    /// Runs until shutdown is requested, then reports statistics once.
    ///
    /// The token is observed at pass granularity: a request landing mid-pass
    /// lets the current pass finish every port before the loop exits.
    pub fn run(&mut self) {
        info!(
            ports = self.ports.port_count(),
            burst = self.burst,
            mac_swap = self.mac_swap,
            "forwarding loop running"
        );

        while !self.token.is_requested() {
            self.poll_all_ports();
        }

        debug!("shutdown observed, forwarding loop stopped");
        info!("{}", stats::render(&self.ports, &self.tallies));
    }

    /// One full pass over every port. Exposed for single-pass tests.
    pub fn poll_all_ports(&mut self) {
        for port in 0..self.ports.port_count() {
            self.poll_port(port);
        }
    }

    fn poll_port(&mut self, port: PortId) {
        let mut batch = self.ports.receive(port, self.burst);
        if batch.is_empty() {
            // Idle or down, the common case under light load.
            return;
        }

        if self.mac_swap {
            swap::swap_batch(&mut batch);
        }

        let offered = batch.len();
        let unsent = self.ports.transmit(pairing::peer(port), batch);

        let dropped = unsent.len();
        for frame in unsent {
            self.ports.release(frame);
        }

        let tally = &mut self.tallies[port];
        tally.forwarded += (offered - dropped) as u64;
        tally.dropped += dropped as u64;
    }

    pub fn ports(&self) -> &P {
        &self.ports
    }

    pub fn tallies(&self) -> &[PortTally] {
        &self.tallies
    }

    /// Tears the engine apart for post-run inspection.
    pub fn into_parts(self) -> (P, Vec<PortTally>) {
        (self.ports, self.tallies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{Frame, MacAddr, MemPorts};

    fn frame_with_macs(dst: MacAddr, src: MacAddr, tag: u8) -> Frame {
        let mut bytes = vec![0u8; 64];
        bytes[..6].copy_from_slice(&dst.0);
        bytes[6..12].copy_from_slice(&src.0);
        bytes[12] = tag;
        Frame::from_bytes(&bytes)
    }

    fn tagged(tag: u8) -> Frame {
        frame_with_macs(MacAddr([0x0d; 6]), MacAddr([0x05; 6]), tag)
    }

    #[test]
    fn test_forward_with_swap_no_drops() {
        // 2 ports, swap enabled, 3 frames in, all accepted.
        let dst = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
        let src = MacAddr([0x02, 0, 0, 0, 0, 0x02]);
        let mut ports = MemPorts::new(2);
        for tag in 0..3 {
            ports.push_rx(0, frame_with_macs(dst, src, tag));
        }

        let mut engine = Engine::new(ports, 32, true, ShutdownToken::new());
        engine.poll_all_ports();

        let (ports, tallies) = engine.into_parts();
        assert_eq!(tallies[0].forwarded, 3);
        assert_eq!(tallies[0].dropped, 0);
        assert!(ports.released().is_empty());

        let ring = ports.tx_ring(1);
        assert_eq!(ring.len(), 3);
        for (i, frame) in ring.iter().enumerate() {
            assert_eq!(frame.dst_mac(), src);
            assert_eq!(frame.src_mac(), dst);
            assert_eq!(frame.payload()[12], i as u8);
        }
    }

    #[test]
    fn test_backpressure_releases_suffix_without_swap() {
        // 4 ports, swap disabled, 5 frames in on port 2, partner
        // ring holds 2. Frames 0-1 go out unmodified, 2-4 are released.
        let mut ports = MemPorts::new(4);
        ports.set_tx_capacity(3, 2);
        for tag in 0..5 {
            ports.push_rx(2, tagged(tag));
        }

        let mut engine = Engine::new(ports, 32, false, ShutdownToken::new());
        engine.poll_all_ports();

        let (ports, tallies) = engine.into_parts();
        assert_eq!(tallies[2].forwarded, 2);
        assert_eq!(tallies[2].dropped, 3);

        let ring = ports.tx_ring(3);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring[0].payload()[12], 0);
        assert_eq!(ring[1].payload()[12], 1);
        // No MAC change in pass-through mode
        assert_eq!(ring[0].dst_mac(), MacAddr([0x0d; 6]));

        let released = ports.released();
        assert_eq!(released.len(), 3);
        assert_eq!(released[0][12], 2);
        assert_eq!(released[1][12], 3);
        assert_eq!(released[2][12], 4);
    }

    #[test]
    fn test_runt_frame_never_reaches_the_swap() {
        // A 5-byte frame has no address header to swap. The backend must
        // discard it on receive so the swap's length precondition holds in
        // the hot loop.
        let mut ports = MemPorts::new(2);
        ports.push_rx(0, Frame::from_bytes(&[0xee; 5]));
        ports.push_rx(0, tagged(1));

        let mut engine = Engine::new(ports, 32, true, ShutdownToken::new());
        engine.poll_all_ports();

        let (ports, tallies) = engine.into_parts();
        assert_eq!(tallies[0].forwarded, 1);
        assert_eq!(ports.tx_ring(1).len(), 1);
        assert_eq!(ports.tx_ring(1)[0].payload()[12], 1);
        assert_eq!(ports.stats(0).rx_dropped, 1);
    }

    #[test]
    fn test_empty_ports_do_no_work() {
        let mut engine = Engine::new(MemPorts::new(4), 32, true, ShutdownToken::new());
        engine.poll_all_ports();

        let (ports, tallies) = engine.into_parts();
        assert!(tallies.iter().all(|t| t.forwarded == 0 && t.dropped == 0));
        for p in 0..4 {
            assert!(ports.tx_ring(p).is_empty());
        }
    }

    #[test]
    fn test_burst_limits_one_receive() {
        let mut ports = MemPorts::new(2);
        for tag in 0..10 {
            ports.push_rx(0, tagged(tag));
        }

        let mut engine = Engine::new(ports, 4, false, ShutdownToken::new());
        engine.poll_all_ports();
        assert_eq!(engine.tallies()[0].forwarded, 4);

        engine.poll_all_ports();
        assert_eq!(engine.tallies()[0].forwarded, 8);
    }

    #[test]
    fn test_run_exits_after_requested_pass() {
        // Token already cancelled: run must observe it before the first pass
        // and exit without touching any port.
        let token = ShutdownToken::new();
        token.request();

        let mut ports = MemPorts::new(2);
        ports.push_rx(0, tagged(1));
        let mut engine = Engine::new(ports, 32, false, token);
        engine.run();

        let (ports, tallies) = engine.into_parts();
        assert_eq!(tallies[0].forwarded, 0);
        assert!(ports.tx_ring(1).is_empty());
    }
}
