// Defaults, scan timing and per-cube configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// Every Circuit Cube advertises a local name containing this marker
pub const DEFAULT_NAME_MARKER: &str = "Tenka";

// How long discovery (and lookup of an explicit address) may scan
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 10;

// Payload written to TX to ask for the battery voltage
pub const BATTERY_QUERY: &[u8] = b"b";

pub const PROJECT_URL: &str = "https://github.com/simon-code-git/circuitcubes";

/// Settings for a single cube handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Connect to this address directly instead of scanning
    pub address: Option<String>,
    /// Substring matched against advertised names during discovery
    pub name_marker: String,
    pub scan_timeout_secs: u64,
    /// Log progress at info level (debug otherwise)
    pub verbose: bool,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            address: None,
            name_marker: DEFAULT_NAME_MARKER.to_string(),
            scan_timeout_secs: DEFAULT_SCAN_TIMEOUT_SECS,
            verbose: true,
        }
    }
}

impl CubeConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    /// The configured address, ignoring empty strings
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.is_empty())
    }
}
