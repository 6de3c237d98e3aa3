//! Adapter configuration.
//!
//! [`AdapterConfig`] controls commit policy and the default animations used
//! where the API does not take one. It can be built in code or read from
//! TOML:
//!
//! ```toml
//! auto_commit = true
//! default_row_animation = "fade"
//! default_section_animation = "automatic"
//! ```
//!
//! Missing keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tableflow_core::logging::targets;

use super::animation::Animation;
use crate::error::ConfigError;

/// Configuration of a [`ContentAdapter`](super::ContentAdapter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Commit implicitly at the end of every mutating call.
    pub auto_commit: bool,
    /// Animation for row changes that do not specify one.
    pub default_row_animation: Animation,
    /// Animation for section changes that do not specify one.
    pub default_section_animation: Animation,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            auto_commit: false,
            default_row_animation: Animation::Automatic,
            default_section_animation: Animation::Automatic,
        }
    }
}

impl AdapterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether mutations commit implicitly.
    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    /// Sets the default row animation.
    pub fn with_default_row_animation(mut self, animation: Animation) -> Self {
        self.default_row_animation = animation;
        self
    }

    /// Sets the default section animation.
    pub fn with_default_section_animation(mut self, animation: Animation) -> Self {
        self.default_section_animation = animation;
        self
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e: toml::de::Error| ConfigError::parse(e.message()))
    }

    /// Reads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: targets::ADAPTER,
            path = %path.display(),
            ?config,
            "loaded adapter configuration"
        );
        Ok(config)
    }

    /// Serializes the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}
