//! Reference extraction and resolution.
//!
//! Three reference forms are recognized in an object's text: the explicit
//! `Kind::"Name"` accessor, the `: Kind Name` type annotation, and the
//! `extends` clause of extension declarations. References that do not resolve
//! against the index are dropped without error; they usually denote platform
//! objects outside the scanned roots.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::ResolveConfig;
use crate::index::{normalize_path, ObjectIndex, ObjectKey, ObjectKind, ObjectRecord};

static EXPLICIT_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(Table|Database|Page|Codeunit|Report|XmlPort|Query|Enum|Interface)\s*::\s*(?:"([^"]+)"|(\w+))"#,
    )
    .expect("explicit reference pattern compiles")
});

static TYPED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i):\s*(Record|Page|Codeunit|Report|XmlPort|Query|Enum|Interface|TestPage)\s+(?:"([^"]+)"|(\w+))"#,
    )
    .expect("typed reference pattern compiles")
});

/// A symbolic reference to another object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolRef {
    /// Referenced kind
    pub kind: ObjectKind,
    /// Referenced name as written
    pub name: String,
}

impl SymbolRef {
    /// Create a reference.
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Index key this reference points at.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.kind, &self.name)
    }
}

/// Extract the de-duplicated references mentioned in `text`, in order of first appearance.
pub fn extract_references(text: &str) -> Vec<SymbolRef> {
    let mut hits: Vec<(usize, SymbolRef)> = Vec::new();
    for pattern in [&*EXPLICIT_REFERENCE, &*TYPED_REFERENCE] {
        for caps in pattern.captures_iter(text) {
            let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(kind) = ObjectKind::from_reference_keyword(keyword.as_str()) else {
                continue;
            };
            let Some(name) = caps.get(2).or_else(|| caps.get(3)) else {
                continue;
            };
            let name = name.as_str().trim();
            if !name.is_empty() {
                hits.push((whole.start(), SymbolRef::new(kind, name)));
            }
        }
    }
    hits.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    hits.into_iter()
        .map(|(_, reference)| reference)
        .filter(|reference| seen.insert(reference.key()))
        .collect()
}

/// All references of a record: text references plus its `extends` target.
pub fn record_references(record: &ObjectRecord) -> Vec<SymbolRef> {
    let mut refs = Vec::new();
    if let (Some(base_kind), Some(base_name)) = (record.kind.base_kind(), record.extends.as_deref()) {
        refs.push(SymbolRef::new(base_kind, base_name));
    }
    refs.extend(extract_references(&record.raw_text));

    let own_key = record.key();
    let mut seen = HashSet::new();
    refs.retain(|reference| {
        let key = reference.key();
        key != own_key && seen.insert(key)
    });
    refs
}

/// How a context object was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextOrigin {
    /// Exact kind and name match
    Exact,
    /// Name-only fallback match
    NameFallback,
}

/// A resolved reference as presented to the suggestion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextObject {
    /// Kind of the resolved object
    pub kind: ObjectKind,
    /// Declared name of the resolved object
    pub name: String,
    /// Namespace already known for it, if any
    pub namespace: Option<String>,
    /// Directory of its source file, forward slashes
    pub directory: String,
    /// How it was found
    pub origin: ContextOrigin,
}

/// Resolves references against a frozen index.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
    index: &'a ObjectIndex,
    max_context: usize,
    name_fallback: bool,
}

impl<'a> ReferenceResolver<'a> {
    /// Create a resolver over `index`.
    pub fn new(index: &'a ObjectIndex, config: &ResolveConfig) -> Self {
        Self {
            index,
            max_context: config.max_context_objects,
            name_fallback: config.name_fallback,
        }
    }

    /// Resolve each reference; unresolved ones are dropped.
    ///
    /// The result is bounded by `max_context_objects` and contains no duplicates.
    pub fn resolve(&self, refs: &[SymbolRef]) -> Vec<(Arc<ObjectRecord>, ContextOrigin)> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for reference in refs {
            if resolved.len() >= self.max_context {
                break;
            }
            let hit = match self.index.get(&reference.key()) {
                Some(record) => Some((Arc::clone(record), ContextOrigin::Exact)),
                None if self.name_fallback => self
                    .index
                    .lookup_by_name(&reference.name)
                    .map(|record| (Arc::clone(record), ContextOrigin::NameFallback)),
                None => None,
            };
            match hit {
                Some((record, origin)) => {
                    if seen.insert(record.key()) {
                        resolved.push((record, origin));
                    }
                }
                None => debug!("Unresolved reference {}::{}", reference.kind, reference.name),
            }
        }

        resolved
    }

    /// Resolved context objects for `record`.
    pub fn context_for(&self, record: &ObjectRecord) -> Vec<ContextObject> {
        let refs = record_references(record);
        self.resolve(&refs)
            .into_iter()
            .map(|(target, origin)| ContextObject {
                kind: target.kind,
                name: target.name.clone(),
                namespace: target.declared_namespace.clone(),
                directory: normalize_path(target.directory()),
                origin,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
