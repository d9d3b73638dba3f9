//! Configuration types

use crate::dataplane::CoreId;
use crate::telemetry::LogConfig;
use serde::Deserialize;

/// Top-level config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Ordered port list; index in this list is the port id, so pairing is
    /// positional (entry 0 pairs with entry 1, and so on).
    #[serde(default)]
    pub ports: Vec<PortConfig>,

    /// Frames per receive/transmit burst.
    #[serde(default = "default_burst")]
    pub burst: usize,

    /// Swap source/destination MACs before retransmission.
    #[serde(default = "default_mac_swap")]
    pub mac_swap: bool,

    /// Core that runs the forwarding loop; all others stay idle.
    #[serde(default = "default_forwarder_core")]
    pub forwarder_core: CoreId,

    /// Buffers in the shared frame pool.
    #[serde(default = "default_pool_frames")]
    pub pool_frames: usize,

    /// Capacity of one pooled frame buffer in bytes.
    #[serde(default = "default_frame_cap")]
    pub frame_cap: usize,

    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortConfig {
    pub interface: String,
}

/// `[log]` section, mirrored into [`LogConfig`] at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
    pub format: String,
}

impl Default for LogSection {
    fn default() -> Self {
        let defaults = LogConfig::default();
        Self {
            level: defaults.level,
            format: defaults.format,
        }
    }
}

impl From<&LogSection> for LogConfig {
    fn from(section: &LogSection) -> Self {
        Self {
            level: section.level.clone(),
            format: section.format.clone(),
        }
    }
}

fn default_burst() -> usize {
    crate::port::MAX_BURST
}

fn default_mac_swap() -> bool {
    true
}

fn default_forwarder_core() -> CoreId {
    1
}

fn default_pool_frames() -> usize {
    8192
}

fn default_frame_cap() -> usize {
    2048
}
