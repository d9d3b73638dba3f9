//! Data plane components
//!
//! The forwarding loop and the pure helpers it composes: port pairing,
//! MAC address swapping, and the per-core role assignment.

mod dispatch;
mod engine;
mod pairing;
mod swap;

pub use dispatch::{run_on_core, CoreAssignment, CoreId, CoreRole, EngineSlot};
pub use engine::{Engine, PortTally};
pub use pairing::peer;
pub use swap::{swap_addrs, swap_batch};
