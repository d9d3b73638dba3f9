//! Statistics reporting
//!
//! Two operator-facing diagnostics: a one-time per-port counter report,
//! emitted when the forwarding loop stops, and a best-effort link-state
//! advisory logged once at startup.

use crate::dataplane::PortTally;
use crate::port::{LinkState, Ports};
use tracing::{info, warn};

/// Renders the one-time shutdown report: backend counters per port plus the
/// loop's own forwarded/dropped tallies, indexed by receiving port.
pub fn render<P: Ports>(ports: &P, tallies: &[PortTally]) -> String {
    let mut out = String::from("port statistics:");
    let mut total_rx = 0u64;
    let mut total_tx = 0u64;
    let mut total_fwd = 0u64;
    let mut total_drop = 0u64;

    for port in 0..ports.port_count() {
        let s = ports.stats(port);
        let t = tallies.get(port).copied().unwrap_or_default();
        total_rx += s.rx_frames;
        total_tx += s.tx_frames;
        total_fwd += t.forwarded;
        total_drop += t.dropped;
        out.push_str(&format!(
            "\n  port {}: rx {} tx {} rx-dropped {} | forwarded {} dropped {}",
            port, s.rx_frames, s.tx_frames, s.rx_dropped, t.forwarded, t.dropped
        ));
    }

    out.push_str(&format!(
        "\n  total: rx {} tx {} forwarded {} dropped {}",
        total_rx, total_tx, total_fwd, total_drop
    ));
    out
}

/// Startup-only advisory: warns for every port whose link is down. Never
/// blocks startup and is not retried; a down port simply yields empty
/// bursts until it comes up.
pub fn log_link_state<P: Ports>(ports: &P) {
    for port in 0..ports.port_count() {
        match ports.link_state(port) {
            LinkState::Up => info!(port, "link up"),
            LinkState::Down => warn!(port, "link down, port will forward nothing until it recovers"),
        }
    }
}
