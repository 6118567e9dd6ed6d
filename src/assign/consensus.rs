//! Consistency stage: majority vote inside context groups.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::core::naming::GroupKey;

use super::types::NamespaceAssignment;

/// Anything that belongs to a context group and carries an assignment.
pub trait Grouped {
    /// Context group of this item.
    fn group_key(&self) -> &GroupKey;
    /// Current assignment.
    fn assignment(&self) -> &NamespaceAssignment;
    /// Mutable assignment.
    fn assignment_mut(&mut self) -> &mut NamespaceAssignment;
}

/// Outcome counters of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsensusReport {
    /// Groups with more than one member
    pub groups: usize,
    /// Members whose label was changed
    pub adjusted: usize,
}

/// Reconcile labels within every context group.
///
/// Only valid labels of non-forced members vote. The label with the highest
/// count wins, ties going to the label seen first in slice order. Every
/// non-forced member holding a different label is overwritten and annotated.
/// Forced members neither vote nor change. Groups without any voting member
/// are left as they are.
pub fn reconcile<T: Grouped>(items: &mut [T]) -> ConsensusReport {
    let mut groups: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
    for (idx, item) in items.iter().enumerate() {
        groups.entry(item.group_key().clone()).or_default().push(idx);
    }

    let mut report = ConsensusReport::default();
    for (key, members) in &groups {
        if members.len() < 2 {
            continue;
        }
        report.groups += 1;

        let Some(majority) = majority_label(items, members) else {
            continue;
        };

        for &idx in members {
            let assignment = items[idx].assignment_mut();
            if assignment.is_forced() || assignment.namespace == majority {
                continue;
            }
            debug!("{}: {} -> {}", key, assignment.namespace, majority);
            let previous = std::mem::replace(&mut assignment.namespace, majority.clone());
            assignment.notes.push(format!(
                "adjusted from '{previous}' to '{majority}' for consistency with group {key}"
            ));
            assignment.adjusted_from = Some(previous);
            report.adjusted += 1;
        }
    }

    if report.adjusted > 0 {
        info!(
            "Consistency stage adjusted {} objects across {} groups",
            report.adjusted, report.groups
        );
    }
    report
}

fn majority_label<T: Grouped>(items: &[T], members: &[usize]) -> Option<String> {
    let mut tally: IndexMap<&str, usize> = IndexMap::new();
    for &idx in members {
        let assignment = items[idx].assignment();
        if assignment.is_forced() || !assignment.is_valid() {
            continue;
        }
        *tally.entry(assignment.namespace.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in tally {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
}
