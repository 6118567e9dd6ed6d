//! Assignment result types.

use serde::{Deserialize, Serialize};

use crate::core::config::INVALID_LABEL;

/// A secondary label proposed alongside the chosen one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Proposed label
    pub namespace: String,
    /// Short justification
    #[serde(default)]
    pub reason: String,
}

/// Which stage produced an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssignmentOrigin {
    /// Explicit namespace declaration in the source
    Declared,
    /// Object-level obsolete marker
    Obsolete,
    /// Name marker rule
    NameMarker {
        /// Marker that matched
        marker: String,
    },
    /// Suggestion stage
    Suggested,
}

impl AssignmentOrigin {
    /// Whether this origin is a forced rule.
    pub fn is_forced(&self) -> bool {
        !matches!(self, AssignmentOrigin::Suggested)
    }
}

/// Validity of the chosen label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Label is usable
    Valid,
    /// Provider proposed a label outside the allow-list
    Invalid {
        /// The rejected label, kept for audit
        proposed: String,
    },
    /// The suggestion stage produced nothing usable
    NoSuggestion {
        /// Why
        reason: String,
    },
}

/// The namespace decision for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceAssignment {
    /// Assigned label (`INVALID` when no valid label exists)
    pub namespace: String,
    /// Justification
    pub reason: String,
    /// Secondary proposals in provider order
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    /// Producing stage
    pub origin: AssignmentOrigin,
    /// Validity
    pub status: AssignmentStatus,
    /// Diagnostic notes
    #[serde(default)]
    pub notes: Vec<String>,
    /// Label held before the consistency stage changed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_from: Option<String>,
}

impl NamespaceAssignment {
    /// A forced assignment.
    pub fn forced(
        namespace: impl Into<String>,
        reason: impl Into<String>,
        origin: AssignmentOrigin,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            reason: reason.into(),
            alternatives: Vec::new(),
            origin,
            status: AssignmentStatus::Valid,
            notes: Vec::new(),
            adjusted_from: None,
        }
    }

    /// A valid suggested assignment.
    pub fn suggested(
        namespace: impl Into<String>,
        reason: impl Into<String>,
        alternatives: Vec<Alternative>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            reason: reason.into(),
            alternatives,
            origin: AssignmentOrigin::Suggested,
            status: AssignmentStatus::Valid,
            notes: Vec::new(),
            adjusted_from: None,
        }
    }

    /// A suggestion outside the allow-list, flagged and kept for audit.
    pub fn invalid(
        proposed: impl Into<String>,
        reason: impl Into<String>,
        alternatives: Vec<Alternative>,
    ) -> Self {
        let proposed = proposed.into();
        Self {
            namespace: INVALID_LABEL.to_string(),
            reason: reason.into(),
            alternatives,
            origin: AssignmentOrigin::Suggested,
            notes: vec![format!("proposed label '{proposed}' is not in the allow-list")],
            status: AssignmentStatus::Invalid { proposed },
            adjusted_from: None,
        }
    }

    /// The explicit "processed, no answer" marker.
    pub fn no_suggestion(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            namespace: INVALID_LABEL.to_string(),
            reason: String::new(),
            alternatives: Vec::new(),
            origin: AssignmentOrigin::Suggested,
            notes: vec![format!("no valid suggestion: {reason}")],
            status: AssignmentStatus::NoSuggestion { reason },
            adjusted_from: None,
        }
    }

    /// Whether a forced rule produced this assignment.
    pub fn is_forced(&self) -> bool {
        self.origin.is_forced()
    }

    /// Whether the label is usable.
    pub fn is_valid(&self) -> bool {
        matches!(self.status, AssignmentStatus::Valid)
    }

    /// Short status word for tables and CSV.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            AssignmentStatus::Valid if self.is_forced() => "forced",
            AssignmentStatus::Valid => "suggested",
            AssignmentStatus::Invalid { .. } => "invalid",
            AssignmentStatus::NoSuggestion { .. } => "no-suggestion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_keeps_proposal_and_reason() {
        let a = NamespaceAssignment::invalid("NotInList", "looks like sales", Vec::new());
        assert_eq!(a.namespace, INVALID_LABEL);
        assert_eq!(a.reason, "looks like sales");
        assert_eq!(
            a.status,
            AssignmentStatus::Invalid {
                proposed: "NotInList".to_string()
            }
        );
        assert!(!a.is_valid());
        assert!(!a.is_forced());
    }

    #[test]
    fn forced_origins() {
        assert!(AssignmentOrigin::Declared.is_forced());
        assert!(AssignmentOrigin::NameMarker {
            marker: "UDI".to_string()
        }
        .is_forced());
        assert!(!AssignmentOrigin::Suggested.is_forced());
    }

    #[test]
    fn serializes_with_tagged_enums() {
        let a = NamespaceAssignment::no_suggestion("timeout");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["status"]["state"], "no_suggestion");
        assert_eq!(json["origin"]["type"], "suggested");
        let back: NamespaceAssignment = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }
}
