//! Port pairing policy
//!
//! Ports forward to their XOR-1 partner: 0<->1, 2<->3, 4<->5, and so on.
//! Config validation guarantees an even port count of at least two before
//! the dataplane is built, so the function is total here.

use crate::port::PortId;

/// Transmit partner of receiving port `p`.
#[inline]
pub fn peer(p: PortId) -> PortId {
    p ^ 1
}
