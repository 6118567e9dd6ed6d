//! JSON dump of the object index.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TaxonError};
use crate::index::{normalize_path, ObjectIndex};

/// One exported index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexExportEntry {
    /// Declared namespace, `null` when absent
    pub namespace: Option<String>,
    /// Directory of the source file, forward slashes
    pub directory: String,
    /// Source file, forward slashes
    pub filepath: String,
}

/// Index entries keyed by `"<kind>|<declared name>"`.
pub fn export_entries(index: &ObjectIndex) -> BTreeMap<String, IndexExportEntry> {
    index
        .iter()
        .map(|record| {
            (
                format!("{}|{}", record.kind, record.name),
                IndexExportEntry {
                    namespace: record.declared_namespace.clone(),
                    directory: normalize_path(record.directory()),
                    filepath: normalize_path(&record.source_location),
                },
            )
        })
        .collect()
}

/// Render the index as pretty JSON.
pub fn render_index_json(index: &ObjectIndex) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_entries(index))?)
}

/// Write the index dump to `path`.
pub fn write_index_json(index: &ObjectIndex, path: &Path) -> Result<()> {
    let json = render_index_json(index)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| TaxonError::io(format!("Failed to create {}", parent.display()), e))?;
    }
    std::fs::write(path, json)
        .map_err(|e| TaxonError::io(format!("Failed to write index to {}", path.display()), e))
}
