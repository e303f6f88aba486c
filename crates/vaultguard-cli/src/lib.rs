//! Vaultguard CLI - command-line front end for guarded accounts
//!
//! All presentation lives here; the core library only returns results.

pub mod commands;
pub mod config;
pub mod demo;
pub mod script;

pub use commands::*;
pub use config::{CliConfig, ConfigError};
pub use script::{Command, Outcome, Report, ScriptError, ScriptRunner};
