//! Namespace assignment engine.
//!
//! Per object the engine runs forced rules first and stops at the first one
//! that fires. Otherwise it builds a context packet (bounded source excerpt,
//! resolved references, retrieval neighbours), asks the suggestion provider,
//! and validates the answer against the allow-list. The consistency stage in
//! [`consensus`] runs afterwards over a whole batch.
//!
//! Nothing here returns an error per object: provider failures, timeouts and
//! unparseable answers all become an explicit "no valid suggestion" result.

pub mod allow_list;
pub mod consensus;
pub mod rules;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::config::{ResolveConfig, RetrievalConfig, TaxonConfig};
use crate::core::errors::Result;
use crate::core::naming::NameNormalizer;
use crate::index::{ObjectIndex, ObjectRecord};
use crate::oracle::{extract_first_object, ContextPacket, Extracted, SuggestionProvider, SuggestionResponse};
use crate::resolve::ReferenceResolver;
use crate::retrieval::{RetrievalQuery, Retriever};

pub use allow_list::AllowList;
pub use consensus::{reconcile, ConsensusReport, Grouped};
pub use rules::ForcedRules;
pub use types::{Alternative, AssignmentOrigin, AssignmentStatus, NamespaceAssignment};

/// Layered namespace decision for single objects.
pub struct Assigner {
    rules: ForcedRules,
    allow_list: AllowList,
    naming: NameNormalizer,
    resolve: ResolveConfig,
    retrieval: RetrievalConfig,
    excerpt_chars: usize,
    timeout: Duration,
    provider: Option<Arc<dyn SuggestionProvider>>,
    retriever: Arc<dyn Retriever>,
}

impl Assigner {
    /// Build an assigner from configuration and collaborators.
    pub fn new(
        config: &TaxonConfig,
        provider: Option<Arc<dyn SuggestionProvider>>,
        retriever: Arc<dyn Retriever>,
    ) -> Result<Self> {
        Ok(Self {
            rules: ForcedRules::from_config(&config.rules)?,
            allow_list: AllowList::from_config(&config.taxonomy),
            naming: NameNormalizer::from_config(config),
            resolve: config.resolve.clone(),
            retrieval: config.retrieval.clone(),
            excerpt_chars: config.oracle.excerpt_chars,
            timeout: Duration::from_secs(config.oracle.timeout_secs),
            provider,
            retriever,
        })
    }

    /// Name normalizer shared with the grouping stage.
    pub fn naming(&self) -> &NameNormalizer {
        &self.naming
    }

    /// The allow-list suggestions are validated against.
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Whether a suggestion provider is attached.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Forced-rule stage.
    pub fn forced(&self, record: &ObjectRecord) -> Option<NamespaceAssignment> {
        self.rules.evaluate(record, &self.naming)
    }

    /// Full per-object decision: forced rules, then suggestion.
    pub async fn assign(&self, record: &ObjectRecord, index: &ObjectIndex) -> NamespaceAssignment {
        match self.forced(record) {
            Some(assignment) => assignment,
            None => self.suggest(record, index).await,
        }
    }

    /// Assemble the context packet handed to the provider.
    pub async fn context_packet(&self, record: &ObjectRecord, index: &ObjectIndex) -> ContextPacket {
        let resolver = ReferenceResolver::new(index, &self.resolve);
        let references = resolver.context_for(record);

        let neighbors = if self.retrieval.enabled {
            let query = RetrievalQuery::for_record(record, self.retrieval.max_neighbors);
            match self.retriever.neighbors(&query, index).await {
                Ok(neighbors) => neighbors,
                Err(err) => {
                    warn!("Retrieval failed for {}: {}", record.name, err);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let (excerpt, truncated) = ContextPacket::excerpt_of(&record.raw_text, self.excerpt_chars);
        ContextPacket {
            kind: record.kind,
            name: record.name.clone(),
            solution: record.solution.clone(),
            excerpt,
            truncated,
            references,
            neighbors,
        }
    }

    /// Suggestion stage for one object. Never fails.
    pub async fn suggest(&self, record: &ObjectRecord, index: &ObjectIndex) -> NamespaceAssignment {
        let Some(provider) = self.provider.as_ref() else {
            return NamespaceAssignment::no_suggestion("no suggestion provider configured");
        };

        let packet = self.context_packet(record, index).await;
        debug!(
            "Suggesting namespace for {} {} with {} references and {} neighbours",
            record.kind,
            record.name,
            packet.references.len(),
            packet.neighbors.len()
        );

        match tokio::time::timeout(self.timeout, provider.suggest(&packet)).await {
            Ok(Ok(raw)) => self.interpret(&raw),
            Ok(Err(err)) => {
                warn!("{} failed for {}: {}", provider.name(), record.name, err);
                NamespaceAssignment::no_suggestion(err.to_string())
            }
            Err(_) => {
                warn!(
                    "{} timed out after {}s for {}",
                    provider.name(),
                    self.timeout.as_secs(),
                    record.name
                );
                NamespaceAssignment::no_suggestion(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                ))
            }
        }
    }

    /// Turn a provider's raw answer into an assignment.
    ///
    /// A label outside the allow-list is flagged `INVALID` with the proposal
    /// and reasoning kept; it is never replaced by an allowed label.
    pub fn interpret(&self, raw: &str) -> NamespaceAssignment {
        let response = match extract_first_object::<SuggestionResponse>(raw) {
            Extracted::Parsed(response) => response,
            Extracted::NoJson => {
                return NamespaceAssignment::no_suggestion("response contained no JSON object")
            }
            Extracted::Malformed(err) => {
                return NamespaceAssignment::no_suggestion(format!("unparseable response: {err}"))
            }
        };

        let namespace = response.namespace.trim();
        if namespace.is_empty() {
            return NamespaceAssignment::no_suggestion("response named no namespace");
        }

        let alternatives: Vec<Alternative> = response
            .alternatives
            .into_iter()
            .filter(|alt| !alt.namespace.trim().is_empty())
            .map(|alt| Alternative {
                namespace: alt.namespace.trim().to_string(),
                reason: alt.reason,
            })
            .collect();
        let foreign: Vec<String> = alternatives
            .iter()
            .filter(|alt| !self.allow_list.contains(&alt.namespace))
            .map(|alt| format!("alternative '{}' is not in the allow-list", alt.namespace))
            .collect();

        let mut assignment = if self.allow_list.contains(namespace) {
            NamespaceAssignment::suggested(namespace, response.reason, alternatives)
        } else {
            warn!("Provider proposed '{}', which is not in the allow-list", namespace);
            NamespaceAssignment::invalid(namespace, response.reason, alternatives)
        };
        assignment.notes.extend(foreign);
        assignment
    }
}
