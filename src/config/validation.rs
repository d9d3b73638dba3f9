//! Configuration validation

use super::Config;
use crate::port::MAX_BURST;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

/// Validates a parsed config. Errors are fatal before the dataplane spawns.
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::default();

    let count = config.ports.len();
    if count < 2 {
        result.error(format!("need at least 2 ports, got {}", count));
    } else if count % 2 != 0 {
        result.error(format!(
            "port count must be even for XOR pairing, got {}",
            count
        ));
    }

    let mut seen = HashSet::new();
    for port in &config.ports {
        if !seen.insert(port.interface.as_str()) {
            result.error(format!(
                "interface {} listed more than once",
                port.interface
            ));
        }
    }

    if config.burst == 0 || config.burst > MAX_BURST {
        result.error(format!(
            "burst must be in 1..={}, got {}",
            MAX_BURST, config.burst
        ));
    }

    if config.pool_frames < config.burst * 2 {
        result.error(format!(
            "pool_frames {} too small for burst {} (need at least {})",
            config.pool_frames,
            config.burst,
            config.burst * 2
        ));
    }

    // Enough room for the 12-byte address header plus a minimal frame.
    if config.frame_cap < 64 {
        result.error(format!("frame_cap must be at least 64, got {}", config.frame_cap));
    }

    // Fatal: with the forwarder core outside the enumerated cores, every
    // worker would go idle and the process would exit having forwarded
    // nothing.
    if let Ok(cores) = std::thread::available_parallelism() {
        if config.forwarder_core >= cores.get() {
            result.error(format!(
                "forwarder_core {} not in the {} available cores",
                config.forwarder_core,
                cores.get()
            ));
        }
    }

    result
}
