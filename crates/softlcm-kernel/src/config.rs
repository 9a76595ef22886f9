//! Resolver configuration, read from TOML.
//!
//! ```toml
//! [resolver]
//! valid_only = true
//! compliance = "preferred"
//!
//! [cache]
//! enabled = true
//! max_entries = 4096
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use crate::compliance::ComplianceMode;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub cache: CacheConfig,
}

/// How the resolver filters and checks rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Drop rules outside their validity window from every result.
    pub valid_only: bool,
    /// Rules an assignment must match to be compliant.
    pub compliance: ComplianceMode,
}

/// Resolution cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }
}
