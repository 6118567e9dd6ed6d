//! Results returned by the engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assign::{AssignmentOrigin, AssignmentStatus, Grouped, NamespaceAssignment};
use crate::core::naming::GroupKey;
use crate::index::{normalize_path, ObjectRecord};
use crate::io::ledger::LedgerEntry;

/// One target object with its (possibly reconciled) assignment.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedObject {
    /// Scanned record
    pub record: Arc<ObjectRecord>,
    /// Context group
    pub group: GroupKey,
    /// Current decision
    pub assignment: NamespaceAssignment,
    /// Taken from the ledger instead of being decided in this run
    pub skipped: bool,
}

impl ClassifiedObject {
    /// Ledger entry for this object.
    pub fn to_ledger_entry(&self, recorded_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            kind: self.record.kind,
            name: self.record.name.clone(),
            solution: self.record.solution.clone(),
            group: self.group.clone(),
            assignment: self.assignment.clone(),
            location: normalize_path(&self.record.source_location),
            fingerprint: self.record.fingerprint(),
            recorded_at,
        }
    }
}

impl Grouped for ClassifiedObject {
    fn group_key(&self) -> &GroupKey {
        &self.group
    }

    fn assignment(&self) -> &NamespaceAssignment {
        &self.assignment
    }

    fn assignment_mut(&mut self) -> &mut NamespaceAssignment {
        &mut self.assignment
    }
}

/// Counters for one classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Objects in the index
    pub indexed: usize,
    /// Objects belonging to a configured solution
    pub targets: usize,
    /// Decided by a forced rule in this run
    pub forced: usize,
    /// Valid suggestions received
    pub suggested: usize,
    /// Suggestions outside the allow-list
    pub invalid: usize,
    /// Objects without a usable answer
    pub no_suggestion: usize,
    /// Objects that would be sent to the provider (dry run only)
    pub would_query: usize,
    /// Objects taken unchanged from the ledger
    pub skipped: usize,
    /// Labels changed by the consistency stage
    pub adjusted: usize,
    /// Ledger entries written
    pub recorded: usize,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Count one freshly decided assignment.
    pub fn count(&mut self, assignment: &NamespaceAssignment) {
        match (&assignment.origin, &assignment.status) {
            (origin, _) if origin.is_forced() => self.forced += 1,
            (AssignmentOrigin::Suggested, AssignmentStatus::Valid) => self.suggested += 1,
            (_, AssignmentStatus::Invalid { .. }) => self.invalid += 1,
            (_, AssignmentStatus::NoSuggestion { .. }) => self.no_suggestion += 1,
            _ => {}
        }
    }
}

/// Outcome of `classify`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRun {
    /// Counters
    pub summary: RunSummary,
    /// Target objects in index key order
    pub objects: Vec<ClassifiedObject>,
    /// Nothing was queried or recorded
    pub dry_run: bool,
}

impl ClassificationRun {
    /// Objects whose label is `namespace`.
    pub fn with_namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a ClassifiedObject> + 'a {
        self.objects
            .iter()
            .filter(move |object| object.assignment.namespace == namespace)
    }

    /// Object by declared name, case-insensitive.
    pub fn find(&self, name: &str) -> Option<&ClassifiedObject> {
        self.objects
            .iter()
            .find(|object| object.record.name.eq_ignore_ascii_case(name))
    }
}

/// Outcome of reviewing one object.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    /// Reviewed record
    pub record: Arc<ObjectRecord>,
    /// Context group
    pub group: GroupKey,
    /// Fresh decision
    pub assignment: NamespaceAssignment,
    /// Decision recorded before this review
    pub previous: Option<NamespaceAssignment>,
}

impl ReviewOutcome {
    /// Whether the label differs from the recorded one.
    pub fn label_changed(&self) -> bool {
        self.previous
            .as_ref()
            .map_or(true, |previous| previous.namespace != self.assignment.namespace)
    }
}

/// Every namespace declared anywhere under the roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceCensus {
    /// Files read
    pub files_scanned: usize,
    /// Namespace to number of files declaring it
    pub namespaces: BTreeMap<String, usize>,
}

impl NamespaceCensus {
    /// Namespaces in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }
}
