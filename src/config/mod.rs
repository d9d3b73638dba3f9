//! Configuration
//!
//! A single TOML file describes the port set and the loop's fixed knobs.
//! Validation runs before any dataplane state is built; violations are
//! fatal at startup, never re-checked per iteration.

mod types;
mod validation;

pub use types::{Config, LogSection, PortConfig};
pub use validation::{validate, ValidationResult};

use crate::{Error, Result};
use std::path::Path;

/// Loads and parses a TOML config file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
    Ok(config)
}
