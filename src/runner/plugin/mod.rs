//! Host integration for the composition functions.
//!
//! A host that embeds this crate publishes `classes` and `getPrototypeListOf` into its
//! global object with [`install`]. The global is passed in explicitly, and the binding
//! names come from an [`InstallConfig`], which can be read from a TOML file.

pub mod config;
pub mod install;

pub use config::{ConfigError, InstallConfig};
pub use install::install;
