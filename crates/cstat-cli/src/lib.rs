//! Contact sensor statistics CLI library.
//!
//! This crate provides the CLI interface over `cstat-core`: export file
//! loading, configuration, and the report/series commands.

mod cli;
pub mod commands;
mod config;
pub mod loader;

pub use cli::{Cli, Commands, WindowArg};
pub use config::Config;
