//! Port backends
//!
//! A port is one receive/transmit queue pair on a network interface. The
//! [`Ports`] trait is the burst-oriented surface the forwarding loop polls;
//! backends own all device setup, buffer pooling, and counters behind it.
//!
//! Backends:
//! - AF_PACKET: raw sockets, portable, no special setup required
//! - in-memory: deterministic rings for tests

mod af_packet;
mod frame;
mod mem;

pub use af_packet::AfPacketPorts;
pub use frame::{Frame, MacAddr, ETH_ADDR_HEADER_LEN, MAC_LEN};
pub use mem::MemPorts;

/// Port index, `0 <= id < port_count`.
pub type PortId = usize;

/// Upper bound on frames moved by one receive or transmit burst.
pub const MAX_BURST: usize = 32;

/// Advisory link state, checked once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
}

/// Cumulative per-port counters, owned by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortStats {
    /// Frames handed to the dataplane by receive.
    pub rx_frames: u64,
    /// Frames accepted by transmit.
    pub tx_frames: u64,
    /// Frames lost on the receive side (queue overrun, runt discard).
    pub rx_dropped: u64,
}

/// Burst receive/transmit surface polled by the forwarding loop.
///
/// All calls are non-blocking. Receive never fails: an unavailable or idle
/// port yields an empty batch and the loop moves on. Transmit consumes a
/// prefix of the offered batch and hands back the unaccepted suffix, in
/// order; every returned frame must be passed to [`Ports::release`] exactly
/// once.
pub trait Ports {
    /// Number of configured ports. Fixed for the process lifetime.
    fn port_count(&self) -> usize;

    /// Bursts up to `max` frames off `port`, in wire arrival order.
    fn receive(&mut self, port: PortId, max: usize) -> Vec<Frame>;

    /// Offers `frames` to `port`. Accepted frames are a prefix of the batch
    /// and are owned by the backend from then on; the unaccepted suffix is
    /// returned in its original order and stays owned by the caller.
    fn transmit(&mut self, port: PortId, frames: Vec<Frame>) -> Vec<Frame>;

    /// Returns one unaccepted frame to the backend's pool.
    fn release(&mut self, frame: Frame);

    /// Advisory link state.
    fn link_state(&self, port: PortId) -> LinkState;

    /// Cumulative counters for `port`.
    fn stats(&self, port: PortId) -> PortStats;
}
