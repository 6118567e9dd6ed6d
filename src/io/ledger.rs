//! The result ledger: one JSON line per classified object.
//!
//! The ledger is the persistent result sink. On load, later lines win over
//! earlier lines for the same object, so appending is always a valid update.
//! When a commit replaces existing entries the file is rewritten through a
//! temporary file and an atomic rename instead, keeping it free of stale lines.
//!
//! Any failure to read or write the ledger is fatal for a batch.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assign::NamespaceAssignment;
use crate::core::errors::{Result, TaxonError};
use crate::core::naming::GroupKey;
use crate::index::{ObjectKey, ObjectKind};

/// One persisted classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Object kind
    pub kind: ObjectKind,
    /// Declared object name
    pub name: String,
    /// Solution tag
    #[serde(default)]
    pub solution: Option<String>,
    /// Context group the object belonged to
    pub group: GroupKey,
    /// The decision
    pub assignment: NamespaceAssignment,
    /// Source file, forward slashes
    pub location: String,
    /// Content fingerprint of the source at classification time
    pub fingerprint: String,
    /// When the entry was written
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Object key of this entry.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.kind, &self.name)
    }
}

/// Loaded ledger with its backing file.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: IndexMap<ObjectKey, LedgerEntry>,
}

impl Ledger {
    /// Load the ledger at `path`; a missing file is an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut entries = IndexMap::new();

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| TaxonError::sink(path.display().to_string(), format!("read failed: {e}")))?;
            for (line_no, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let entry: LedgerEntry = serde_json::from_str(line).map_err(|e| {
                    TaxonError::sink(
                        path.display().to_string(),
                        format!("line {} is not a ledger entry: {e}", line_no + 1),
                    )
                })?;
                entries.insert(entry.key(), entry);
            }
            debug!("Loaded {} ledger entries from {}", entries.len(), path.display());
        }

        Ok(Self { path, entries })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry for `key`.
    pub fn get(&self, key: &ObjectKey) -> Option<&LedgerEntry> {
        self.entries.get(key)
    }

    /// Whether `key` is recorded with exactly this fingerprint.
    pub fn is_current(&self, key: &ObjectKey, fingerprint: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.fingerprint == fingerprint)
            .unwrap_or(false)
    }

    /// Entries whose name matches case-insensitively, any kind.
    pub fn find_by_name(&self, name: &str) -> Vec<&LedgerEntry> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .values()
            .filter(|entry| entry.name.to_lowercase() == wanted)
            .collect()
    }

    /// Entries in first-recorded order.
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    /// Number of recorded objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist `batch`. Each entry is written whole or the commit fails.
    pub fn commit(&mut self, batch: Vec<LedgerEntry>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let replaces_existing = batch.iter().any(|entry| self.entries.contains_key(&entry.key()));
        let count = batch.len();

        if replaces_existing {
            for entry in batch {
                self.entries.insert(entry.key(), entry);
            }
            self.rewrite()?;
        } else {
            self.append(&batch)?;
            for entry in batch {
                self.entries.insert(entry.key(), entry);
            }
        }

        info!("Recorded {} entries in {}", count, self.path.display());
        Ok(())
    }

    fn sink_err(&self, message: String) -> TaxonError {
        TaxonError::sink(self.path.display().to_string(), message)
    }

    fn ensure_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .map_err(|e| self.sink_err(format!("cannot create directory: {e}"))),
            _ => Ok(()),
        }
    }

    fn render(entries: &[&LedgerEntry]) -> Result<String> {
        let mut buf = String::new();
        for entry in entries {
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }
        Ok(buf)
    }

    fn append(&self, batch: &[LedgerEntry]) -> Result<()> {
        self.ensure_parent()?;
        let buf = Self::render(&batch.iter().collect::<Vec<_>>())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.sink_err(format!("open failed: {e}")))?;
        file.write_all(buf.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| self.sink_err(format!("write failed: {e}")))
    }

    fn rewrite(&self) -> Result<()> {
        self.ensure_parent()?;
        let buf = Self::render(&self.entries.values().collect::<Vec<_>>())?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, buf.as_bytes()).map_err(|e| self.sink_err(format!("write failed: {e}")))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.sink_err(format!("rename failed: {e}")))
    }
}
