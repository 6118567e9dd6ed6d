//! Forced-rule and grouping configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TaxonError};

use super::validation::{validate_not_blank, validate_positive_usize};

/// A name marker that forces a namespace when it occurs in an object name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMarkerRule {
    /// Exact (case-sensitive) substring searched in the object's base name
    pub marker: String,
    /// Namespace assigned when the marker matches
    pub namespace: String,
    /// Per-solution replacements for `namespace`, keyed by solution tag
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub solution_overrides: BTreeMap<String, String>,
}

impl NameMarkerRule {
    /// Namespace for an object belonging to `solution`.
    pub fn namespace_for(&self, solution: Option<&str>) -> &str {
        solution
            .and_then(|tag| self.solution_overrides.get(tag))
            .map(String::as_str)
            .unwrap_or(&self.namespace)
    }
}

/// Deterministic override rules evaluated before any suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Regular expressions identifying an object-level obsolete marker
    pub obsolete_markers: Vec<String>,
    /// Only this many leading lines are searched for obsolete markers
    pub obsolete_header_lines: usize,
    /// Name markers in priority order
    pub name_markers: Vec<NameMarkerRule>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let mut udi_overrides = BTreeMap::new();
        udi_overrides.insert("MTC".to_string(), "MDR".to_string());

        Self {
            obsolete_markers: vec![r"(?i)\bObsoleteState\s*=\s*(Pending|Removed)\b".to_string()],
            obsolete_header_lines: 40,
            name_markers: vec![
                NameMarkerRule {
                    marker: "MDR".to_string(),
                    namespace: "MDR".to_string(),
                    solution_overrides: BTreeMap::new(),
                },
                NameMarkerRule {
                    marker: "UDI".to_string(),
                    namespace: "UDI".to_string(),
                    solution_overrides: udi_overrides,
                },
                NameMarkerRule {
                    marker: "ECE".to_string(),
                    namespace: "ECE".to_string(),
                    solution_overrides: BTreeMap::new(),
                },
            ],
        }
    }
}

impl RulesConfig {
    /// Validate the rule table, including that every obsolete marker compiles.
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.obsolete_header_lines, "rules.obsolete_header_lines")?;
        for pattern in &self.obsolete_markers {
            regex::Regex::new(pattern).map_err(|e| {
                TaxonError::config_field(
                    format!("invalid obsolete marker '{pattern}': {e}"),
                    "rules.obsolete_markers",
                )
            })?;
        }
        for rule in &self.name_markers {
            validate_not_blank(&rule.marker, "rules.name_markers.marker")?;
            validate_not_blank(&rule.namespace, "rules.name_markers.namespace")?;
        }
        Ok(())
    }
}

/// Normalization table for context grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Structural suffixes stripped (case-insensitively) from base names
    pub suffixes: Vec<String>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            suffixes: [
                "EventSubscriber",
                "EventSubs",
                "Subscriber",
                "Subs",
                "Sub",
                "SingleInstance",
                "SI",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}

impl GroupingConfig {
    /// Validate the suffix table.
    pub fn validate(&self) -> Result<()> {
        for suffix in &self.suffixes {
            validate_not_blank(suffix, "grouping.suffixes")?;
        }
        Ok(())
    }
}
