//! Source scanning and the object index.
//!
//! Files under every source root are discovered with `walkdir`, recognized by
//! a line-oriented pattern recognizer, and merged into an [`ObjectIndex`]
//! keyed by kind and lowercased name.

pub mod discovery;
pub mod kind;
pub mod object_index;
pub mod record;
pub mod scanner;

pub use discovery::discover_files;
pub use kind::ObjectKind;
pub use object_index::{IndexStats, ObjectIndex};
pub use record::{content_fingerprint, normalize_path, ObjectKey, ObjectRecord};
pub use scanner::{declared_namespaces, recognize, scan_file, Declaration};
