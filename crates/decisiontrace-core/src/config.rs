//! TOML configuration for a decision log.
//!
//! ```toml
//! log_path = "logs/decision_log.jsonl"
//! durable = true
//! lock_timeout_ms = 5000
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::{path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use decisiontrace_contracts::error::{TraceError, TraceResult};

/// Where the log lives and how appends are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Path of the JSON Lines log file.
    pub log_path: PathBuf,

    /// Flush appended records to stable storage (`sync_data`) before an
    /// append returns.
    pub durable: bool,

    /// How long an appender waits for the exclusive file lock before giving
    /// up with `StoreWrite`.
    pub lock_timeout_ms: u64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("logs/decision_log.jsonl"),
            durable: true,
            lock_timeout_ms: 5_000,
        }
    }
}

impl TraceConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `TraceError::Config` if the TOML is malformed or carries
    /// unknown keys.
    pub fn from_toml_str(s: &str) -> TraceResult<Self> {
        toml::from_str(s).map_err(|e| TraceError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> TraceResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TraceError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
