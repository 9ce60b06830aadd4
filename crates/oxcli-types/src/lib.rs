//! Foundation types for oxcli.
//!
//! Shared by every oxcli crate: the error enum, the TOML-backed CLI
//! configuration, and the network backend traits used by remote sessions.

pub mod backend;
pub mod config;
pub mod error;

pub use config::CliConfig;
pub use error::{CliError, Result};
