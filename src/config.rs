//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! Specifically, we try to find a pdfscope.toml, and if present we load settings from there.
//! This provides the backend address, polling cadence, request timeout and log destination.

use facet::Facet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "pdfscope.toml";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILE: &str = "pdfscope.log";

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from pdfscope.toml or falling back to defaults.
pub struct Config {
    #[facet(default = DEFAULT_API_URL.to_string())]
    /// Base URL of the analysis backend.
    pub api_url: String,
    #[facet(default = DEFAULT_POLL_INTERVAL_MS)]
    /// Delay between document list refreshes while any document is still processing.
    pub poll_interval_ms: u64,
    #[facet(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    /// Upper bound on a single backend request.
    pub request_timeout_secs: u64,
    #[facet(default = DEFAULT_LOG_FILE.to_string())]
    /// Where tracing output goes, since the terminal belongs to the interface.
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from pdfscope.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from an explicit path, ignoring unreadable or malformed files.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                return config;
            }
        }
        Self::default()
    }

    #[must_use]
    /// Refresh cadence for the document list.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    /// Global timeout applied to every backend request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
