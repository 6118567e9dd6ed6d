//! Main classification engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::api::results::{
    ClassificationRun, ClassifiedObject, NamespaceCensus, ReviewOutcome, RunSummary,
};
use crate::assign::{reconcile, AllowList, Assigner, NamespaceAssignment};
use crate::core::config::TaxonConfig;
use crate::core::errors::{Result, TaxonError};
use crate::core::naming::NameNormalizer;
use crate::index::{declared_namespaces, discover_files, ObjectIndex, ObjectRecord};
use crate::index::scanner::read_source;
use crate::io::csv_export::render_csv;
use crate::io::index_export::write_index_json;
use crate::io::ledger::Ledger;
use crate::oracle::{ChatOracle, SuggestionProvider};
use crate::retrieval::{IndexRetriever, Retriever};

/// Options for a batch classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Re-decide objects even when the ledger holds a current entry
    pub force: bool,
    /// Count the work without querying the provider or writing the ledger
    pub dry_run: bool,
}

/// Main taxon engine
pub struct TaxonEngine {
    /// Engine configuration
    config: Arc<TaxonConfig>,

    naming: NameNormalizer,
    provider: Option<Arc<dyn SuggestionProvider>>,
    retriever: Arc<dyn Retriever>,
}

impl TaxonEngine {
    /// Create an engine; the configuration is validated first.
    pub fn new(config: TaxonConfig) -> Result<Self> {
        config.validate()?;
        let naming = NameNormalizer::from_config(&config);
        let retriever: Arc<dyn Retriever> = Arc::new(IndexRetriever::new(naming.clone()));

        Ok(Self {
            config: Arc::new(config),
            naming,
            provider: None,
            retriever,
        })
    }

    /// Attach a suggestion provider.
    pub fn with_provider(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Attach the HTTP chat provider described by the `oracle` section.
    ///
    /// Credentials and Azure connection settings are read from the environment.
    pub fn with_chat_oracle(self) -> Result<Self> {
        let oracle_config = self.config.oracle.clone().with_env();
        oracle_config.validate()?;
        let oracle = ChatOracle::new(oracle_config, AllowList::from_config(&self.config.taxonomy))?;
        Ok(self.with_provider(Arc::new(oracle)))
    }

    /// Replace the retrieval collaborator.
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = retriever;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &TaxonConfig {
        &self.config
    }

    /// Name normalizer built from the configuration.
    pub fn naming(&self) -> &NameNormalizer {
        &self.naming
    }

    fn effective_roots(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let roots = if roots.is_empty() {
            self.config.scan.roots.clone()
        } else {
            roots.to_vec()
        };
        if roots.is_empty() {
            return Err(TaxonError::config_field(
                "no source roots given on the command line or in scan.roots",
                "scan.roots",
            ));
        }
        Ok(roots)
    }

    fn assigner(&self) -> Result<Assigner> {
        Assigner::new(&self.config, self.provider.clone(), self.retriever.clone())
    }

    /// Open the configured result ledger.
    pub fn open_ledger(&self) -> Result<Ledger> {
        Ledger::open(&self.config.ledger.path)
    }

    /// Build the object index from `roots` (or the configured roots).
    pub async fn build_index(&self, roots: &[PathBuf]) -> Result<ObjectIndex> {
        let roots = self.effective_roots(roots)?;
        let scan = self.config.scan.clone();
        let naming = self.naming.clone();

        tokio::task::spawn_blocking(move || ObjectIndex::build(&roots, &scan, &naming))
            .await
            .map_err(|e| TaxonError::pipeline("index", format!("scanner task failed: {e}")))
    }

    /// Build the index and write it as JSON to `output`.
    pub async fn export_index(&self, roots: &[PathBuf], output: &Path) -> Result<ObjectIndex> {
        let index = self.build_index(roots).await?;
        write_index_json(&index, output)?;
        info!("Wrote {} index entries to {}", index.len(), output.display());
        Ok(index)
    }

    /// Run the full pipeline over every target object.
    ///
    /// Targets are indexed objects carrying a configured solution tag; all
    /// other records only serve as reference context. Objects whose ledger
    /// entry matches the current content fingerprint are not re-decided, but
    /// they still take part in the consistency stage with their recorded label.
    pub async fn classify(&self, roots: &[PathBuf], options: ClassifyOptions) -> Result<ClassificationRun> {
        let start = Instant::now();
        let index = self.build_index(roots).await?;
        let assigner = self.assigner()?;
        let mut ledger = self.open_ledger()?;

        let mut summary = RunSummary {
            indexed: index.len(),
            ..RunSummary::default()
        };

        let mut slots: Vec<(Arc<ObjectRecord>, Option<NamespaceAssignment>, bool)> = Vec::new();
        let mut pending = Vec::new();
        for record in index.iter().filter(|record| record.solution.is_some()) {
            summary.targets += 1;
            let key = record.key();

            if !options.force && ledger.is_current(&key, &record.fingerprint()) {
                let recorded = ledger.get(&key).map(|entry| entry.assignment.clone());
                summary.skipped += 1;
                slots.push((record.clone(), recorded, true));
                continue;
            }

            match assigner.forced(record) {
                Some(assignment) => {
                    summary.count(&assignment);
                    slots.push((record.clone(), Some(assignment), false));
                }
                None => {
                    pending.push(slots.len());
                    slots.push((record.clone(), None, false));
                }
            }
        }

        info!(
            "{} targets: {} forced, {} from ledger, {} to suggest",
            summary.targets,
            summary.forced,
            summary.skipped,
            pending.len()
        );

        if options.dry_run {
            summary.would_query = pending.len();
            summary.elapsed_ms = start.elapsed().as_millis() as u64;
            let objects = slots
                .into_iter()
                .filter_map(|(record, assignment, skipped)| {
                    assignment.map(|assignment| self.classified(record, assignment, skipped))
                })
                .collect();
            return Ok(ClassificationRun {
                summary,
                objects,
                dry_run: true,
            });
        }

        if !pending.is_empty() && !assigner.has_provider() {
            warn!(
                "No suggestion provider configured; {} objects will be recorded without a suggestion",
                pending.len()
            );
        }

        let concurrency = self.config.oracle.max_concurrency.max(1);
        let suggestions: Vec<(usize, NamespaceAssignment)> = stream::iter(pending.iter().map(|&slot| {
            let record = slots[slot].0.clone();
            let assigner = &assigner;
            let index = &index;
            async move { (slot, assigner.suggest(&record, index).await) }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

        for (slot, assignment) in suggestions {
            summary.count(&assignment);
            slots[slot].1 = Some(assignment);
        }

        let mut objects: Vec<ClassifiedObject> = Vec::with_capacity(slots.len());
        for (record, assignment, skipped) in slots {
            let assignment = match assignment {
                Some(assignment) => assignment,
                None => {
                    return Err(TaxonError::internal(format!(
                        "no assignment produced for {}",
                        record.name
                    )))
                }
            };
            objects.push(self.classified(record, assignment, skipped));
        }

        let before: Vec<String> = objects
            .iter()
            .map(|object| object.assignment.namespace.clone())
            .collect();
        let report = reconcile(&mut objects);
        summary.adjusted = report.adjusted;

        let recorded_at = Utc::now();
        let batch: Vec<_> = objects
            .iter()
            .zip(&before)
            .filter(|(object, previous)| !object.skipped || object.assignment.namespace != **previous)
            .map(|(object, _)| object.to_ledger_entry(recorded_at))
            .collect();
        summary.recorded = batch.len();
        ledger.commit(batch)?;

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Classification finished in {}ms: {} suggested, {} invalid, {} without suggestion, {} adjusted",
            summary.elapsed_ms, summary.suggested, summary.invalid, summary.no_suggestion, summary.adjusted
        );

        Ok(ClassificationRun {
            summary,
            objects,
            dry_run: false,
        })
    }

    fn classified(
        &self,
        record: Arc<ObjectRecord>,
        assignment: NamespaceAssignment,
        skipped: bool,
    ) -> ClassifiedObject {
        ClassifiedObject {
            group: self.naming.group_key(record.kind, &record.name),
            record,
            assignment,
            skipped,
        }
    }

    /// Re-decide every object named `name` (any kind) and upsert the ledger.
    ///
    /// The consistency stage does not run for single-object reviews.
    pub async fn review(&self, roots: &[PathBuf], name: &str) -> Result<Vec<ReviewOutcome>> {
        let index = self.build_index(roots).await?;
        let matches: Vec<_> = index.lookup_all_by_name(name).into_iter().cloned().collect();
        if matches.is_empty() {
            return Err(TaxonError::validation(format!("no object named '{name}' in the index")));
        }

        let assigner = self.assigner()?;
        let mut ledger = self.open_ledger()?;
        let recorded_at = Utc::now();

        let mut outcomes = Vec::with_capacity(matches.len());
        let mut batch = Vec::with_capacity(matches.len());
        for record in matches {
            let previous = ledger.get(&record.key()).map(|entry| entry.assignment.clone());
            let assignment = assigner.assign(&record, &index).await;
            debug!("Reviewed {} {}: {}", record.kind, record.name, assignment.namespace);

            let object = self.classified(record, assignment, false);
            batch.push(object.to_ledger_entry(recorded_at));
            outcomes.push(ReviewOutcome {
                record: object.record,
                group: object.group,
                assignment: object.assignment,
                previous,
            });
        }

        ledger.commit(batch)?;
        Ok(outcomes)
    }

    /// Collect every namespace declared in any file under the roots.
    pub async fn namespace_census(&self, roots: &[PathBuf]) -> Result<NamespaceCensus> {
        let roots = self.effective_roots(roots)?;
        let scan = self.config.scan.clone();

        tokio::task::spawn_blocking(move || {
            let files = discover_files(&roots, &scan);
            let per_file: Vec<Vec<String>> = files
                .par_iter()
                .filter_map(|path| match read_source(path) {
                    Ok(text) => Some(declared_namespaces(&text)),
                    Err(err) => {
                        debug!("Skipping {}: {}", path.display(), err);
                        None
                    }
                })
                .collect();

            let mut census = NamespaceCensus {
                files_scanned: per_file.len(),
                ..NamespaceCensus::default()
            };
            for mut namespaces in per_file {
                namespaces.sort();
                namespaces.dedup();
                for namespace in namespaces {
                    *census.namespaces.entry(namespace).or_default() += 1;
                }
            }
            info!(
                "Found {} distinct namespaces in {} files",
                census.namespaces.len(),
                census.files_scanned
            );
            census
        })
        .await
        .map_err(|e| TaxonError::pipeline("census", format!("census task failed: {e}")))
    }

    /// Render the ledger as CSV.
    pub fn export_csv(&self) -> Result<String> {
        let ledger = self.open_ledger()?;
        let tags: Vec<String> = self.config.solutions.iter().map(|s| s.tag.clone()).collect();
        Ok(render_csv(ledger.entries(), &tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SolutionConfig;

    #[test]
    fn missing_roots_are_a_config_error() {
        let engine = TaxonEngine::new(TaxonConfig::default()).unwrap();
        let err = engine.effective_roots(&[]).unwrap_err();
        assert!(matches!(err, TaxonError::Config { .. }));
    }

    #[test]
    fn command_line_roots_win_over_configured_roots() {
        let mut config = TaxonConfig::default();
        config.scan.roots = vec![PathBuf::from("configured")];
        config.solutions = vec![SolutionConfig::new("A", "AMed")];
        let engine = TaxonEngine::new(config).unwrap();

        assert_eq!(engine.effective_roots(&[]).unwrap(), vec![PathBuf::from("configured")]);
        assert_eq!(
            engine.effective_roots(&[PathBuf::from("cli")]).unwrap(),
            vec![PathBuf::from("cli")]
        );
    }

    #[tokio::test]
    async fn census_counts_every_declaration() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.al"),
            "namespace Sales.Customer;\ncodeunit 50100 A {}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.al"),
            "namespace Sales.Customer;\nnamespace Finance;\ntable 50100 B {}\n",
        )
        .unwrap();

        let engine = TaxonEngine::new(TaxonConfig::default()).unwrap();
        let census = engine
            .namespace_census(&[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(census.files_scanned, 2);
        assert_eq!(census.namespaces["Sales.Customer"], 2);
        assert_eq!(census.names().collect::<Vec<_>>(), vec!["Finance", "Sales.Customer"]);
    }
}
