//! The namespace allow-list.

use indexmap::IndexSet;

use crate::core::config::{TaxonomyConfig, CUSTOM_LABEL, OBSOLETE_LABEL};

/// Ordered set of labels a suggestion may use.
///
/// Membership is exact. The reserved `Obsolete` and `Custom` labels are always
/// members; `INVALID` never is.
#[derive(Debug, Clone)]
pub struct AllowList {
    labels: IndexSet<String>,
    descriptions: Vec<(String, String)>,
}

impl AllowList {
    /// Build from the taxonomy section.
    pub fn from_config(config: &TaxonomyConfig) -> Self {
        let mut labels = IndexSet::new();
        let mut descriptions = Vec::new();
        for entry in &config.namespaces {
            if labels.insert(entry.name.clone()) {
                descriptions.push((entry.name.clone(), entry.description.clone()));
            }
        }
        for reserved in [OBSOLETE_LABEL, CUSTOM_LABEL] {
            labels.insert(reserved.to_string());
        }
        Self {
            labels,
            descriptions,
        }
    }

    /// Whether `label` is allowed.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Configured labels with descriptions, in configuration order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.descriptions
    }

    /// Every allowed label, reserved ones last.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of allowed labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the list is empty (never, since reserved labels are always present).
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{NamespaceEntry, INVALID_LABEL};

    #[test]
    fn membership_is_exact_and_reserved_labels_are_present() {
        let list = AllowList::from_config(&TaxonomyConfig {
            namespaces: vec![
                NamespaceEntry::new("Sales", "sales"),
                NamespaceEntry::new("CRM", "crm"),
            ],
        });
        assert!(list.contains("Sales"));
        assert!(!list.contains("sales"));
        assert!(list.contains("Custom"));
        assert!(list.contains("Obsolete"));
        assert!(!list.contains(INVALID_LABEL));
        assert_eq!(list.entries().len(), 2);
        assert_eq!(list.labels().last(), Some("Custom"));
    }
}
