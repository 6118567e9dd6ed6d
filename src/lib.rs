//! # Taxon-RS: Object Index & Namespace Resolution Engine
//!
//! Classifies the objects of several related AL code bases into a controlled
//! taxonomy of namespaces. The library provides:
//!
//! - **Object Index**: parallel scan of source roots into a frozen index
//!   keyed by object kind and name
//! - **Reference Resolution**: symbolic cross-references resolved against
//!   the index, with the known namespaces of referenced objects
//! - **Layered Assignment**: forced rules first, then allow-list constrained
//!   suggestions from a pluggable provider
//! - **Consistency**: majority vote across variants of the same logical object
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          API Layer                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Index      │  Resolve     │  Assign        │  I/O           │
//! │             │              │                │                │
//! │ • Discovery │ • References │ • Forced rules │ • Ledger       │
//! │ • Scanner   │ • Context    │ • Oracle       │ • CSV export   │
//! │ • Lookup    │              │ • Consensus    │ • Index export │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taxon_rs::{ClassifyOptions, TaxonConfig, TaxonEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TaxonConfig::from_yaml_file("taxon.yml")?;
//!     let engine = TaxonEngine::new(config)?.with_chat_oracle()?;
//!     let run = engine
//!         .classify(&["./src".into()], ClassifyOptions::default())
//!         .await?;
//!
//!     println!("{} objects classified", run.summary.targets);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Configuration, errors and name normalization
pub mod core {
    //! Configuration, error types and name normalization.

    pub mod config;
    pub mod errors;
    pub mod naming;
}

// Scanner and object index
pub mod index;

// Reference extraction and resolution
pub mod resolve;

// Forced rules, suggestion validation and consensus
pub mod assign;

// Suggestion providers
pub mod oracle;

// Retrieval neighbours
pub mod retrieval;

// Result persistence and exports
pub mod io {
    //! Result ledger and export formats.

    pub mod csv_export;
    pub mod index_export;
    pub mod ledger;
}

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
    pub mod results;
}

// Re-export primary types for convenience
pub use api::engine::{ClassifyOptions, TaxonEngine};
pub use api::results::{ClassificationRun, ClassifiedObject, NamespaceCensus, ReviewOutcome, RunSummary};
pub use assign::{NamespaceAssignment, AssignmentOrigin, AssignmentStatus};
pub use core::config::TaxonConfig;
pub use core::errors::{Result, TaxonError, TaxonResultExt};
pub use index::{ObjectIndex, ObjectKind, ObjectRecord};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
