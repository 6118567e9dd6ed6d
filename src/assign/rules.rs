//! Forced rules: deterministic overrides evaluated before any suggestion.

use aho_corasick::AhoCorasick;
use regex::Regex;
use tracing::debug;

use crate::core::config::{NameMarkerRule, RulesConfig, OBSOLETE_LABEL};
use crate::core::errors::{Result, TaxonError};
use crate::core::naming::NameNormalizer;
use crate::index::ObjectRecord;

use super::types::{AssignmentOrigin, NamespaceAssignment};

/// Compiled forced-rule table.
#[derive(Debug, Clone)]
pub struct ForcedRules {
    obsolete_markers: Vec<Regex>,
    header_lines: usize,
    name_markers: Vec<NameMarkerRule>,
    matcher: Option<AhoCorasick>,
}

impl ForcedRules {
    /// Compile the `rules` configuration section.
    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        let obsolete_markers = config
            .obsolete_markers
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let matcher = if config.name_markers.is_empty() {
            None
        } else {
            let patterns: Vec<&str> = config.name_markers.iter().map(|r| r.marker.as_str()).collect();
            Some(AhoCorasick::new(patterns).map_err(|e| {
                TaxonError::config_field(format!("invalid name markers: {e}"), "rules.name_markers")
            })?)
        };

        Ok(Self {
            obsolete_markers,
            header_lines: config.obsolete_header_lines,
            name_markers: config.name_markers.clone(),
            matcher,
        })
    }

    /// First forced rule that applies, in precedence order.
    ///
    /// 1. explicit namespace declaration
    /// 2. object-level obsolete marker
    /// 3. name marker, with solution overrides
    pub fn evaluate(&self, record: &ObjectRecord, naming: &NameNormalizer) -> Option<NamespaceAssignment> {
        if let Some(declared) = record.declared_namespace.as_deref() {
            return Some(NamespaceAssignment::forced(
                declared,
                "explicit declaration",
                AssignmentOrigin::Declared,
            ));
        }

        if self.is_obsolete(&record.raw_text) {
            return Some(NamespaceAssignment::forced(
                OBSOLETE_LABEL,
                "object is marked obsolete",
                AssignmentOrigin::Obsolete,
            ));
        }

        let stem = naming.strip_solution_prefix(&record.name);
        let rule = self.matching_marker(stem)?;
        let namespace = rule.namespace_for(record.solution.as_deref());
        debug!("{} matches name marker '{}' -> {}", record.name, rule.marker, namespace);
        Some(NamespaceAssignment::forced(
            namespace,
            format!("object name contains '{}'", rule.marker),
            AssignmentOrigin::NameMarker {
                marker: rule.marker.clone(),
            },
        ))
    }

    /// Whether an obsolete marker sits at object level within the header lines.
    ///
    /// Markers inside nested blocks (fields, actions, procedures) describe a
    /// member, not the object, and are ignored.
    pub fn is_obsolete(&self, text: &str) -> bool {
        if self.obsolete_markers.is_empty() {
            return false;
        }
        let mut depth: usize = 0;
        for line in text.lines().take(self.header_lines) {
            let code = code_only(line);
            if depth <= 1 && self.obsolete_markers.iter().any(|re| re.is_match(&code)) {
                return true;
            }
            for ch in code.chars() {
                match ch {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
        }
        false
    }

    /// Highest-priority name marker contained in `name`.
    fn matching_marker(&self, name: &str) -> Option<&NameMarkerRule> {
        let matcher = self.matcher.as_ref()?;
        matcher
            .find_overlapping_iter(name)
            .map(|m| m.pattern().as_usize())
            .min()
            .and_then(|id| self.name_markers.get(id))
    }
}

/// The code part of a line: `'...'` literals emptied, trailing `//` comment dropped.
///
/// A doubled quote inside a literal closes and reopens it, so it needs no
/// special case.
fn code_only(line: &str) -> String {
    let mut code = String::with_capacity(line.len());
    let mut in_string = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            in_string = !in_string;
            code.push(ch);
        } else if in_string {
            continue;
        } else if ch == '/' && chars.peek() == Some(&'/') {
            break;
        } else {
            code.push(ch);
        }
    }
    code
}
