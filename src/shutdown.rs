//! Shutdown coordination
//!
//! A [`ShutdownToken`] carries the single cancellation flag shared between
//! the forwarding loop and whoever requests termination. The flag flips
//! false-to-true exactly once; the loop observes it at pass granularity.
//!
//! Signal wiring keeps async-signal context empty of work: SIGINT/SIGTERM
//! are blocked process-wide before any worker thread spawns, and a dedicated
//! thread `sigwait`s for them. When one arrives that thread just requests
//! shutdown on the token; the statistics report is produced by the loop
//! after it stops, never by a handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::info;

/// Cloneable handle on the process-wide shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Returns true only for the call that made the
    /// false-to-true transition; later calls are no-ops.
    pub fn request(&self) -> bool {
        self.requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Checked once per loop pass. A stale read costs at most one extra
    /// pass, never correctness.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// Blocks SIGINT and SIGTERM for the calling thread.
///
/// Call from the main thread before spawning workers so every thread
/// inherits the mask; only the listener thread ever consumes the signals.
pub fn block_termination_signals() {
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGINT);
        libc::sigaddset(&mut set, libc::SIGTERM);
        libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut());
    }
}

/// Spawns the thread that waits for SIGINT/SIGTERM and requests shutdown.
///
/// The thread keeps consuming repeated signals so they stay no-ops rather
/// than accumulating as pending.
pub fn spawn_signal_listener(token: ShutdownToken) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("signal-listener".into())
        .spawn(move || loop {
            let mut sig: libc::c_int = 0;
            let ret = unsafe {
                let mut set: libc::sigset_t = std::mem::zeroed();
                libc::sigemptyset(&mut set);
                libc::sigaddset(&mut set, libc::SIGINT);
                libc::sigaddset(&mut set, libc::SIGTERM);
                libc::sigwait(&set, &mut sig)
            };
            if ret != 0 {
                return;
            }
            if token.request() {
                info!(signal = sig, "shutdown requested");
            }
        })
        .expect("failed to spawn signal listener")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        let token = ShutdownToken::new();
        assert!(!token.is_requested());
    }

    #[test]
    fn test_request_is_idempotent() {
        let token = ShutdownToken::new();
        assert!(token.request());
        assert!(token.is_requested());
        // Only the first call reports the transition.
        assert!(!token.request());
        assert!(!token.request());
        assert!(token.is_requested());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let token = ShutdownToken::new();
        let observer = token.clone();
        token.request();
        assert!(observer.is_requested());
    }
}
