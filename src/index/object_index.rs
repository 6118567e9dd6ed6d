//! The frozen object index.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::config::ScanConfig;
use crate::core::naming::NameNormalizer;

use super::discovery::discover_files;
use super::kind::ObjectKind;
use super::record::{ObjectKey, ObjectRecord};
use super::scanner::scan_file;

/// Counters collected while building an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Files handed to the scanner
    pub files_discovered: usize,
    /// Files that produced a record
    pub records_scanned: usize,
    /// Files that produced no record
    pub files_skipped: usize,
    /// Records replaced by a later file declaring the same key
    pub key_collisions: usize,
    /// Build duration in milliseconds
    pub elapsed_ms: u64,
}

/// Index of declared objects keyed by `(kind, lowercased name)`.
///
/// The index is built once per run and is read-only afterwards, so it can be
/// shared freely between concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct ObjectIndex {
    by_key: BTreeMap<ObjectKey, Arc<ObjectRecord>>,
    by_name: HashMap<String, Vec<ObjectKey>>,
    stats: IndexStats,
}

impl ObjectIndex {
    /// Walk `roots`, scan every candidate file in parallel and build the index.
    ///
    /// Files are scanned on a dedicated pool of `scan.workers` threads. The
    /// parallel results are merged by a single writer in sorted path order, so
    /// when two files declare the same key the later path wins on every run.
    pub fn build(roots: &[PathBuf], scan: &ScanConfig, naming: &NameNormalizer) -> Self {
        let started = Instant::now();
        let files = discover_files(roots, scan);
        let workers = scan.effective_workers();

        let scan_all = || -> Vec<Option<ObjectRecord>> {
            files.par_iter().map(|path| scan_file(path, naming)).collect()
        };
        let scanned = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(scan_all),
            Err(err) => {
                warn!("Falling back to the global thread pool: {}", err);
                scan_all()
            }
        };

        let mut index = Self::default();
        index.stats.files_discovered = files.len();
        for record in scanned {
            match record {
                Some(record) => index.insert(record),
                None => index.stats.files_skipped += 1,
            }
        }
        index.stats.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            "Indexed {} objects from {} files ({} skipped, {} key collisions) using {} workers in {}ms",
            index.len(),
            index.stats.files_discovered,
            index.stats.files_skipped,
            index.stats.key_collisions,
            workers,
            index.stats.elapsed_ms
        );
        index
    }

    /// Build an index from already scanned records, in order.
    pub fn from_records(records: impl IntoIterator<Item = ObjectRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.stats.files_discovered += 1;
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, record: ObjectRecord) {
        self.stats.records_scanned += 1;
        let key = record.key();
        let replaced = self.by_key.insert(key.clone(), Arc::new(record));
        match replaced {
            Some(previous) => {
                self.stats.key_collisions += 1;
                debug!(
                    "{} declared again in {}, replacing {}",
                    key,
                    self.by_key[&key].source_location.display(),
                    previous.source_location.display()
                );
            }
            None => {
                let keys = self.by_name.entry(key.name.clone()).or_default();
                keys.push(key);
                keys.sort();
            }
        }
    }

    /// Exact lookup by kind and name (case-insensitive).
    pub fn lookup(&self, kind: ObjectKind, name: &str) -> Option<&Arc<ObjectRecord>> {
        self.by_key.get(&ObjectKey::new(kind, name))
    }

    /// Lookup by key.
    pub fn get(&self, key: &ObjectKey) -> Option<&Arc<ObjectRecord>> {
        self.by_key.get(key)
    }

    /// Name-only lookup: the first match in kind order.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<ObjectRecord>> {
        self.lookup_all_by_name(name).into_iter().next()
    }

    /// Every record carrying `name`, ordered by kind.
    pub fn lookup_all_by_name(&self, name: &str) -> Vec<&Arc<ObjectRecord>> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|keys| keys.iter().filter_map(|key| self.by_key.get(key)).collect())
            .unwrap_or_default()
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the index holds no objects.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Records in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ObjectRecord>> {
        self.by_key.values()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.by_key.keys()
    }

    /// Build counters.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn naming() -> NameNormalizer {
        NameNormalizer::new(vec![("A", "AMed"), ("B", "BMed")], Vec::<&str>::new())
    }

    #[test]
    fn build_indexes_recognized_files_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "base/Customer.Table.al", "namespace Sales.Customer;\ntable 18 Customer\n{\n}\n");
        write(dir.path(), "a/Mgt.Codeunit.al", "codeunit 50100 \"AMedCustomerMgt\"\n{\n}\n");
        write(dir.path(), "a/notes.al", "// nothing declared here\n");

        let index = ObjectIndex::build(&[dir.path().to_path_buf()], &ScanConfig::default(), &naming());

        assert_eq!(index.len(), 2);
        assert_eq!(index.stats().files_discovered, 3);
        assert_eq!(index.stats().files_skipped, 1);

        let customer = index.lookup(ObjectKind::Table, "CUSTOMER").unwrap();
        assert_eq!(customer.declared_namespace.as_deref(), Some("Sales.Customer"));
        let mgt = index.lookup(ObjectKind::Codeunit, "amedcustomermgt").unwrap();
        assert_eq!(mgt.solution.as_deref(), Some("A"));
        assert!(index.lookup(ObjectKind::Page, "Customer").is_none());
    }

    #[test]
    fn rebuilding_unchanged_roots_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..40 {
            write(
                dir.path(),
                &format!("src/obj{i}.al"),
                &format!("codeunit {} \"Obj{}\"\n{{\n}}\n", 50000 + i, i),
            );
        }
        let roots = vec![dir.path().to_path_buf()];

        let first = ObjectIndex::build(&roots, &ScanConfig::default(), &naming());
        let second = ObjectIndex::build(&roots, &ScanConfig::default(), &naming());

        let first_keys: Vec<_> = first.keys().cloned().collect();
        let second_keys: Vec<_> = second.keys().cloned().collect();
        assert_eq!(first_keys, second_keys);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.as_ref(), b.as_ref());
        }
    }

    #[test]
    fn key_collisions_resolve_to_the_last_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/Customer.al", "table 18 Customer\n{\n}\n");
        write(dir.path(), "b/Customer.al", "namespace Override;\ntable 18 Customer\n{\n}\n");

        let scan = ScanConfig {
            workers: Some(2),
            ..ScanConfig::default()
        };
        for _ in 0..3 {
            let index = ObjectIndex::build(&[dir.path().to_path_buf()], &scan, &naming());
            assert_eq!(index.len(), 1);
            assert_eq!(index.stats().key_collisions, 1);
            let record = index.lookup(ObjectKind::Table, "Customer").unwrap();
            assert_eq!(record.declared_namespace.as_deref(), Some("Override"));
        }
    }

    #[test]
    fn name_only_lookup_orders_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "p.al", "page 21 Customer\n{\n}\n");
        write(dir.path(), "t.al", "table 18 Customer\n{\n}\n");

        let index = ObjectIndex::build(&[dir.path().to_path_buf()], &ScanConfig::default(), &naming());
        let all = index.lookup_all_by_name("customer");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, ObjectKind::Table);
        assert_eq!(index.lookup_by_name("Customer").unwrap().kind, ObjectKind::Table);
        assert!(index.lookup_by_name("Vendor").is_none());
    }
}
