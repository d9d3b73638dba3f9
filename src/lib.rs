//! Pairfwd - paired-port packet forwarder
//!
//! Receives Ethernet frames in bursts on each configured port, optionally
//! swaps the source/destination MAC addresses, and retransmits on the paired
//! port (0<->1, 2<->3, ...). Runs a tight polling loop on one designated
//! core until shutdown is requested, then reports per-port statistics once.

pub mod config;
pub mod dataplane;
pub mod error;
pub mod port;
pub mod shutdown;
pub mod stats;
pub mod telemetry;

pub use error::{Error, Result};
