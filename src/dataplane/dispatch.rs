//! Per-core role assignment
//!
//! Exactly one core forwards; every other core is idle for the process
//! lifetime. The assignment table is built once at startup and consulted
//! once per core at entry, so there is no dynamic reassignment to reason
//! about.

use super::Engine;
use crate::port::Ports;
use std::sync::Mutex;
use tracing::debug;

/// Identity of one execution core.
pub type CoreId = usize;

/// What a core does when it reaches [`run_on_core`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreRole {
    Forwarder,
    Idle,
}

/// Core-to-role table, fixed at startup.
#[derive(Debug, Clone)]
pub struct CoreAssignment {
    forwarder: CoreId,
}

impl CoreAssignment {
    pub fn new(forwarder: CoreId) -> Self {
        Self { forwarder }
    }

    pub fn role(&self, core: CoreId) -> CoreRole {
        if core == self.forwarder {
            CoreRole::Forwarder
        } else {
            CoreRole::Idle
        }
    }

    pub fn forwarder(&self) -> CoreId {
        self.forwarder
    }
}

/// Shared slot the bootstrap parks the engine in until the designated core
/// claims it.
pub type EngineSlot<P> = Mutex<Option<Engine<P>>>;

/// Per-core entry point.
///
/// Idle cores return immediately without touching any port. The forwarder
/// core takes the engine out of the slot, runs it to completion, and parks
/// it again for post-run inspection. A second call on the forwarder core
/// finds the slot empty and returns.
pub fn run_on_core<P: Ports>(core: CoreId, assignment: &CoreAssignment, slot: &EngineSlot<P>) {
    match assignment.role(core) {
        CoreRole::Idle => {
            debug!(core, "idle core, nothing to do");
        }
        CoreRole::Forwarder => {
            let engine = slot.lock().unwrap().take();
            if let Some(mut engine) = engine {
                engine.run();
                *slot.lock().unwrap() = Some(engine);
            }
        }
    }
}
