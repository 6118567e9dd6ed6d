//! CLI Command Implementations
//!
//! - classify: batch classification of all target objects
//! - review: single-object review
//! - index: object index export
//! - namespaces: namespace census
//! - export: ledger CSV export
//! - config: configuration management commands

pub mod classify;
pub mod config;
pub mod export;
pub mod index;
pub mod namespaces;
pub mod review;

pub use classify::classify_command;
pub use config::{init_config, print_default_config, validate_config};
pub use export::export_command;
pub use index::index_command;
pub use namespaces::namespaces_command;
pub use review::review_command;
pub use super::config_builder::load_configuration;
