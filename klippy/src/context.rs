//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use crate::format::{self, ColorChoice, OutputFormat};
use libklippy::{Config, Klippy, KlippyError, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable naming the config file, read by the `--config` flag.
pub const CONFIG_ENV: &str = "KLIPPY_CONFIG";
/// Environment variable overriding `output.color`.
pub const COLOR_ENV: &str = "KLIPPY_COLOR";
/// Environment variable overriding `registry.default`.
pub const DEFAULT_REGISTRY_ENV: &str = "KLIPPY_DEFAULT_REGISTRY";

/// How chatty the CLI should be, from the `-v` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl VerbosityLevel {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Normal,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }

    /// Log filter for this level.
    pub fn filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
            VerbosityLevel::Trace => "trace",
        }
    }
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Resolved color choice
    pub color: ColorChoice,
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(
        cli_color: Option<ColorChoice>,
        verbosity: VerbosityLevel,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        // 1 + 2. Defaults merged with the config file, if any
        let config = Config::load(config_path.as_deref())?;

        // 3 + 4. Environment, then flags
        Self::from_config(config, cli_color, verbosity, |key| env::var(key).ok())
    }

    /// Applies environment and flag overrides to an already loaded config.
    pub fn from_config<F>(
        mut config: Config,
        cli_color: Option<ColorChoice>,
        verbosity: VerbosityLevel,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(registry) = env(DEFAULT_REGISTRY_ENV) {
            config.registry.default = registry;
        }
        if let Some(color) = env(COLOR_ENV) {
            config.output.color = color
                .parse()
                .map_err(|e: String| KlippyError::config(e, Some(COLOR_ENV.to_string())))?;
        }

        if let Some(color) = cli_color {
            config.output.color = color;
        }

        Ok(Self {
            color: config.output.color,
            config,
            verbosity,
        })
    }

    /// Creates the lookup facade from the resolved configuration.
    pub fn klippy(&self) -> Result<Klippy> {
        Klippy::from_config(&self.config)
    }

    /// Output format for a command: the `-f` flag, else the configured one.
    pub fn output_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or(self.config.output.format)
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> String {
        match self.verbosity {
            VerbosityLevel::Normal => self.config.log.level.clone(),
            level => level.filter().to_string(),
        }
    }

    pub fn use_color(&self) -> bool {
        format::should_color(self.color)
    }

    /// Color decision for diagnostics and log lines, which go to stderr.
    pub fn use_color_stderr(&self) -> bool {
        format::should_color_stderr(self.color)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
