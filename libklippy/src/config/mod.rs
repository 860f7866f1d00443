//! Application configuration.
//!
//! This module manages application configuration with sensible defaults,
//! loading from an optional YAML file layered over those defaults.

use crate::error::{KlippyError, Result};
use crate::reference::DEFAULT_REGISTRY;
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: Registry,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            // Add default values
            .add_source(ConfigRs::try_from(&Config::default())?)
            // Merge with YAML string
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// Without a path the defaults are returned. A path that is given must
    /// exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder()
            // Add default values
            .add_source(ConfigRs::try_from(&Config::default())?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        Self::from_builder(builder, path)
    }

    /// Creates a `Config` from a `config::ConfigBuilder`.
    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                KlippyError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

/// Registry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registry {
    /// Registry used when a reference has no resolvable registry host.
    #[serde(default = "default_registry")]
    pub default: String,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            default: default_registry(),
        }
    }
}

fn default_registry() -> String {
    DEFAULT_REGISTRY.to_string()
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Network {
    /// Request timeout in seconds. Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Output formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Output {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorChoice,
}

/// Enum for output formats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,

    Json,

    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!(
                "invalid output format '{}' (expected pretty, json or yaml)",
                other
            )),
        }
    }
}

/// Enum for color output choices.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,

    Always,

    Never,
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!(
                "invalid color choice '{}' (expected auto, always or never)",
                other
            )),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Log {
    /// Default log filter when neither `RUST_LOG` nor `-v` is given.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
