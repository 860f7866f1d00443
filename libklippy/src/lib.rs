//! Klippy - Docker Registry v2 Image Inspection Library
//!
//! Klippy answers three questions about a container image without pulling
//! it: which tags exist, what its schema 1 manifest says, and which build
//! commands produced its layers.
//!
//! # Quick Start
//!
//! ```no_run
//! use libklippy::Klippy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let klippy = Klippy::new()?;
//!
//!     // Tags of a repository on the public registry
//!     for tag in klippy.list_tags("library/alpine").await? {
//!         println!("{}", tag);
//!     }
//!
//!     // Commands that built an image, newest layer first
//!     for command in klippy.build_commands("library/alpine:3.6").await? {
//!         println!("{}", command.text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! Every lookup runs the same stages, each feeding the next:
//!
//! 1. [`reference`] - resolve a free-form reference into registry, repository and tag
//! 2. [`auth`] - negotiate a read-only bearer token, if the registry asks for one
//! 3. [`client`] - fetch the tag list or the manifest
//! 4. [`history`] - decode the manifest history into build commands
//!
//! # Main Types
//!
//! - [`Klippy`] - Main entry point for image lookups
//! - [`KlippyBuilder`] - Builder for advanced configuration
//! - [`ImageReference`] - A resolved image reference
//! - [`Manifest`] - Schema 1 image manifest
//! - [`FormattedCommand`] - A reconstructed build command

#![warn(clippy::all)]

/// Returns the libklippy crate version.
///
/// This is useful for version reporting in CLI tools and debugging.
///
/// # Examples
///
/// ```
/// let version = libklippy::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// High-level public API (main entry point)
mod klippy;
pub use klippy::{AccessReport, ImageOverview, Klippy, KlippyBuilder};

// Re-export commonly used types for convenience
pub use auth::BearerToken;
pub use config::Config;
pub use error::{KlippyError, Result};
pub use history::FormattedCommand;
pub use manifest::Manifest;
pub use reference::ImageReference;

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod manifest;
pub mod reference;
