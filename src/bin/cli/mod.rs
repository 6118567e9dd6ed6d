//! CLI Module Organization
//!
//! - args: CLI argument structures
//! - commands: command execution
//! - config_builder: configuration loading
//! - output: terminal display

pub mod args;
pub mod commands;
pub mod config_builder;
pub mod output;

pub use args::*;
pub use commands::*;
