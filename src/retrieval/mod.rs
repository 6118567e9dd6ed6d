//! Retrieval of similar, already-labelled objects.
//!
//! Retrieval is best-effort context for the suggestion stage. The built-in
//! [`IndexRetriever`] ranks declared-namespace objects of the frozen index by
//! shared name tokens; embedding-backed retrievers plug in behind the same
//! [`Retriever`] trait.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::Result;
use crate::core::naming::{name_tokens, NameNormalizer};
use crate::index::{normalize_path, ObjectIndex, ObjectKind, ObjectRecord};

/// Query describing the object neighbours are wanted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    /// Target kind
    pub kind: ObjectKind,
    /// Target name
    pub name: String,
    /// Target source directory, forward slashes
    pub directory: String,
    /// Upper bound on returned neighbours
    pub limit: usize,
}

impl RetrievalQuery {
    /// Query for `record`.
    pub fn for_record(record: &ObjectRecord, limit: usize) -> Self {
        Self {
            kind: record.kind,
            name: record.name.clone(),
            directory: normalize_path(record.directory()),
            limit,
        }
    }
}

/// A similar object with a known namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Kind
    pub kind: ObjectKind,
    /// Name
    pub name: String,
    /// Known namespace
    pub namespace: String,
    /// Source file, forward slashes
    pub location: String,
}

/// Source of retrieval neighbours.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Ordered neighbours for `query`, most similar first.
    async fn neighbors(&self, query: &RetrievalQuery, index: &ObjectIndex) -> Result<Vec<Neighbor>>;
}

/// Retriever that returns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetrieval;

#[async_trait]
impl Retriever for NoRetrieval {
    async fn neighbors(&self, _query: &RetrievalQuery, _index: &ObjectIndex) -> Result<Vec<Neighbor>> {
        Ok(Vec::new())
    }
}

/// Token-overlap retriever over the object index.
#[derive(Debug, Clone)]
pub struct IndexRetriever {
    naming: NameNormalizer,
}

impl IndexRetriever {
    /// Create a retriever that ignores solution prefixes when tokenizing.
    pub fn new(naming: NameNormalizer) -> Self {
        Self { naming }
    }

    fn tokens(&self, name: &str) -> HashSet<String> {
        name_tokens(self.naming.strip_solution_prefix(name))
            .into_iter()
            .collect()
    }

    /// Score every labelled record against `query`, synchronously.
    pub fn rank(&self, query: &RetrievalQuery, index: &ObjectIndex) -> Vec<Neighbor> {
        let query_tokens = self.tokens(&query.name);
        if query_tokens.is_empty() || query.limit == 0 {
            return Vec::new();
        }
        let query_key = crate::index::ObjectKey::new(query.kind, &query.name);

        let mut scored: Vec<(f64, &ObjectRecord, &str)> = index
            .iter()
            .filter_map(|record| {
                let namespace = record.declared_namespace.as_deref()?;
                if record.key() == query_key {
                    return None;
                }
                let tokens = self.tokens(&record.name);
                let shared = query_tokens.intersection(&tokens).count();
                if shared == 0 {
                    return None;
                }
                let union = query_tokens.union(&tokens).count();
                let mut score = shared as f64 / union as f64;
                if normalize_path(record.directory()) == query.directory {
                    score += 0.25;
                }
                if record.kind == query.kind {
                    score += 0.1;
                }
                Some((score, record.as_ref(), namespace))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.key().cmp(&b.1.key()))
        });

        scored
            .into_iter()
            .take(query.limit)
            .map(|(_, record, namespace)| Neighbor {
                kind: record.kind,
                name: record.name.clone(),
                namespace: namespace.to_string(),
                location: normalize_path(&record.source_location),
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn neighbors(&self, query: &RetrievalQuery, index: &ObjectIndex) -> Result<Vec<Neighbor>> {
        Ok(self.rank(query, index))
    }
}
