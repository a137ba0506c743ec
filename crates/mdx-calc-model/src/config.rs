//! Engine configuration
//!
//! A process-wide [`MdxConfig`] is held behind a lock; evaluators take a
//! snapshot when they are built, so changing the global configuration never
//! affects an execution already in progress.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// MDX engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MdxConfig {
    /// Whether property and member names are matched case-sensitively
    pub case_sensitive: bool,
    /// Whether set evaluation may be delegated to a native evaluator
    pub native_enabled: bool,
    /// Maximum number of tuples in a materialized list (0 = unlimited)
    pub result_limit: usize,
}

impl Default for MdxConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            native_enabled: true,
            result_limit: 0,
        }
    }
}

impl MdxConfig {
    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_native_enabled(mut self, native_enabled: bool) -> Self {
        self.native_enabled = native_enabled;
        self
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    /// Check a list size against the result limit
    pub fn within_limit(&self, size: usize) -> bool {
        self.result_limit == 0 || size <= self.result_limit
    }
}

static GLOBAL_CONFIG: Lazy<RwLock<MdxConfig>> = Lazy::new(|| RwLock::new(MdxConfig::default()));

/// Snapshot of the process-wide configuration
pub fn global() -> MdxConfig {
    GLOBAL_CONFIG.read().clone()
}

/// Replace the process-wide configuration
pub fn set_global(config: MdxConfig) {
    *GLOBAL_CONFIG.write() = config;
}

/// Modify the process-wide configuration in place
pub fn update_global(update: impl FnOnce(&mut MdxConfig)) {
    update(&mut GLOBAL_CONFIG.write());
}
