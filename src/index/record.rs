//! Object records and their index keys.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::kind::ObjectKind;

/// Index key: kind plus lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Object kind
    pub kind: ObjectKind,
    /// Lowercased object name
    pub name: String,
}

impl ObjectKey {
    /// Create a key, normalizing the name.
    pub fn new(kind: ObjectKind, name: &str) -> Self {
        Self {
            kind,
            name: name.trim().to_lowercase(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.kind, self.name)
    }
}

/// One declared object extracted from a source file.
///
/// Records are created by the scanner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Declared kind
    pub kind: ObjectKind,
    /// Declared name, casing preserved
    pub name: String,
    /// Numeric object id, when declared
    pub id: Option<u32>,
    /// First namespace declaration found in the file
    pub declared_namespace: Option<String>,
    /// Name of the extended object for extension kinds
    pub extends: Option<String>,
    /// File the record was read from
    pub source_location: PathBuf,
    /// Full file content
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_text: String,
    /// Solution tag derived from the name prefix
    pub solution: Option<String>,
}

impl ObjectRecord {
    /// Index key of this record.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.kind, &self.name)
    }

    /// Directory containing the source file.
    pub fn directory(&self) -> &Path {
        self.source_location.parent().unwrap_or_else(|| Path::new(""))
    }

    /// SHA-256 of the raw text, hex encoded.
    pub fn fingerprint(&self) -> String {
        content_fingerprint(&self.raw_text)
    }
}

/// SHA-256 fingerprint of source content, hex encoded.
pub fn content_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Render a path with forward slashes regardless of platform.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
