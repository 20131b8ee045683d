//! Configuration for keyrotate
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::RotateError;

/// Default location of the persisted index snapshot
pub const DEFAULT_INDEX_PATH: &str = "indexes.json";

/// Default header carrying API keys
pub const DEFAULT_API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Default period between background flushes
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Main configuration for a Rotator instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file holding the rotation index.
    /// The parent directory is created on startup if missing.
    pub index_path: PathBuf,

    /// How often the background flusher checks the dirty flag
    pub flush_interval: Duration,

    // -------------------------------------------------------------------------
    // Rotation Configuration
    // -------------------------------------------------------------------------
    /// How rotation counters are keyed across credential schemes
    pub key_scope: KeyScope,

    /// Trim each candidate and drop empty ones after splitting
    pub trim_candidates: bool,

    /// Header name carrying comma-separated API keys
    pub api_key_header: String,
}

/// How rotation counters are shared between credential schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    /// Authorization and API-key rotation share one counter per logical key.
    /// Both select with the position seen at the start of the request.
    #[default]
    Shared,

    /// Each scheme rotates independently (`<scheme>::<logical key>`)
    PerScheme,
}

impl FromStr for KeyScope {
    type Err = RotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per-scheme" | "per_scheme" | "perscheme" => Ok(Self::PerScheme),
            other => Err(RotateError::Config(format!("unknown key scope: {}", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            key_scope: KeyScope::Shared,
            trim_candidates: true,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Default config with an optional index path (None keeps the default)
    pub fn with_index_path(path: Option<impl Into<PathBuf>>) -> Self {
        let mut config = Self::default();
        if let Some(path) = path {
            config.index_path = path.into();
        }
        config
    }

    /// Reject settings the flusher cannot run with
    pub fn validate(&self) -> Result<(), RotateError> {
        if self.flush_interval.is_zero() {
            return Err(RotateError::Config(
                "flush interval must be greater than zero".to_string(),
            ));
        }
        if self.index_path.as_os_str().is_empty() {
            return Err(RotateError::Config("index path is empty".to_string()));
        }
        if self.api_key_header.trim().is_empty() {
            return Err(RotateError::Config("API key header name is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Set the background flush interval
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// Set how counters are keyed across schemes
    pub fn key_scope(mut self, scope: KeyScope) -> Self {
        self.config.key_scope = scope;
        self
    }

    /// Enable or disable per-candidate trimming
    pub fn trim_candidates(mut self, trim: bool) -> Self {
        self.config.trim_candidates = trim;
        self
    }

    /// Set the API key header name
    pub fn api_key_header(mut self, name: impl Into<String>) -> Self {
        self.config.api_key_header = name.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
