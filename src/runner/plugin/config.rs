//! Install configuration file parsing.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Names under which `install` publishes the bindings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BindingNames {
    /// The composition function.
    pub classes: String,
    /// The prototype-list introspection function.
    pub prototype_list: String,
}

impl Default for BindingNames {
    fn default() -> Self {
        BindingNames {
            classes: "classes".to_string(),
            prototype_list: "getPrototypeListOf".to_string(),
        }
    }
}

/// Complete install configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub bindings: BindingNames,
}

impl InstallConfig {
    /// Load configuration from a TOML file.
    ///
    /// Expected format:
    /// ```toml
    /// [bindings]
    /// classes = "classes"
    /// prototype_list = "getPrototypeListOf"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Missing keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
