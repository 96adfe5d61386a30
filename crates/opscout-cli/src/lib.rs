//! Command-line front end for opscout.
//!
//! - [`cli`]: clap argument and subcommand definitions
//! - [`config`]: [`OpscoutConfig`] loading via `confyg`
//! - [`app`]: logging setup and command execution

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::OpscoutCli;
pub use cli::{CliArgs, Command};
pub use config::OpscoutConfig;
