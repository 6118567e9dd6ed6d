//! Object name normalization.
//!
//! All prefix and suffix handling lives here: solution tags are derived from
//! name prefixes, and context-group keys strip both the solution prefix and
//! the structural suffixes configured under `grouping`.

use serde::{Deserialize, Serialize};

use crate::core::config::TaxonConfig;
use crate::index::ObjectKind;

/// Key shared by all members of a context group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    /// Object kind
    pub kind: ObjectKind,
    /// Lowercased name without solution prefix and structural suffixes
    pub base_name: String,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.kind, self.base_name)
    }
}

/// Pure prefix/suffix normalizer built from configuration tables.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    /// `(tag, lowercased prefix)`, longest prefix first
    prefixes: Vec<(String, String)>,
    /// Lowercased suffixes, longest first
    suffixes: Vec<String>,
}

impl NameNormalizer {
    /// Create a normalizer from explicit `(tag, prefix)` pairs and suffixes.
    pub fn new<P, T, S>(prefixes: P, suffixes: S) -> Self
    where
        P: IntoIterator<Item = (T, T)>,
        T: Into<String>,
        S: IntoIterator<Item = T>,
    {
        let mut prefixes: Vec<(String, String)> = prefixes
            .into_iter()
            .map(|(tag, prefix)| (tag.into(), prefix.into().to_lowercase()))
            .filter(|(_, prefix)| !prefix.is_empty())
            .collect();
        // Stable sort keeps configuration order among equal lengths.
        prefixes.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut suffixes: Vec<String> = suffixes
            .into_iter()
            .map(|s| s.into().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        suffixes.sort_by(|a, b| b.len().cmp(&a.len()));
        suffixes.dedup();

        Self { prefixes, suffixes }
    }

    /// Build the normalizer from the `solutions` and `grouping` sections.
    pub fn from_config(config: &TaxonConfig) -> Self {
        Self::new(
            config
                .solutions
                .iter()
                .map(|s| (s.tag.clone(), s.prefix.clone())),
            config.grouping.suffixes.iter().cloned(),
        )
    }

    /// Solution tag whose prefix `name` carries, if any.
    pub fn solution_of(&self, name: &str) -> Option<&str> {
        self.match_prefix(name).map(|(tag, _)| tag)
    }

    /// `name` with a recognized solution prefix removed (original casing kept).
    pub fn strip_solution_prefix<'a>(&self, name: &'a str) -> &'a str {
        match self.match_prefix(name) {
            Some((_, len)) => &name[len..],
            None => name,
        }
    }

    /// Lowercased base name: solution prefix and structural suffixes removed.
    ///
    /// Suffixes are stripped repeatedly, longest first, but a name is never
    /// reduced to nothing.
    pub fn base_name(&self, name: &str) -> String {
        let mut base = self.strip_solution_prefix(name.trim()).to_lowercase();
        loop {
            let stripped = self
                .suffixes
                .iter()
                .find(|suffix| base.len() > suffix.len() && base.ends_with(suffix.as_str()));
            match stripped {
                Some(suffix) => {
                    let keep = base.len() - suffix.len();
                    base.truncate(keep);
                }
                None => break,
            }
        }
        base
    }

    /// Context-group key for an object.
    pub fn group_key(&self, kind: ObjectKind, name: &str) -> GroupKey {
        GroupKey {
            kind,
            base_name: self.base_name(name),
        }
    }

    fn match_prefix(&self, name: &str) -> Option<(&str, usize)> {
        let trimmed = name.trim_start();
        let offset = name.len() - trimmed.len();
        self.prefixes.iter().find_map(|(tag, prefix)| {
            let head = trimmed.get(..prefix.len())?;
            (head.to_lowercase() == *prefix).then(|| (tag.as_str(), offset + prefix.len()))
        })
    }
}

/// Split an object name into lowercase word tokens of at least three characters.
///
/// Splits on non-alphanumerics, lower-to-upper case changes and letter/digit
/// boundaries, so `"SalesInvoiceLine2"` yields `sales`, `invoice`, `line`.
pub fn name_tokens(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            flush_token(&mut current, &mut tokens);
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let case_break = p.is_lowercase() && ch.is_uppercase();
            let digit_break = p.is_ascii_digit() != ch.is_ascii_digit();
            if case_break || digit_break {
                flush_token(&mut current, &mut tokens);
            }
        }
        current.push(ch);
        prev = Some(ch);
    }
    flush_token(&mut current, &mut tokens);

    tokens
}

fn flush_token(current: &mut String, tokens: &mut Vec<String>) {
    if current.chars().count() >= 3 && !current.chars().all(|c| c.is_ascii_digit()) {
        let token = current.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> NameNormalizer {
        NameNormalizer::new(
            vec![("A", "AMed"), ("B", "BMed")],
            vec!["EventSubs", "Subs", "SI"],
        )
    }

    #[test]
    fn solution_tag_follows_prefix_case_insensitively() {
        let n = normalizer();
        assert_eq!(n.solution_of("AMedCustomerMgt"), Some("A"));
        assert_eq!(n.solution_of("bmedCustomerMgt"), Some("B"));
        assert_eq!(n.solution_of("Customer"), None);
    }

    #[test]
    fn longest_prefix_wins() {
        let n = NameNormalizer::new(vec![("S", "KVS"), ("M", "KVSMED")], Vec::<&str>::new());
        assert_eq!(n.solution_of("KVSMEDPatient"), Some("M"));
        assert_eq!(n.strip_solution_prefix("KVSMEDPatient"), "Patient");
        assert_eq!(n.solution_of("KVSPatient"), Some("S"));
    }

    #[test]
    fn variants_share_a_group_key() {
        let n = normalizer();
        let a = n.group_key(ObjectKind::Codeunit, "AMedCustomerMgt");
        let b = n.group_key(ObjectKind::Codeunit, "BMedCustomerMgt");
        assert_eq!(a, b);
        assert_eq!(a.base_name, "customermgt");
        assert_eq!(a.to_string(), "codeunit|customermgt");
    }

    #[test]
    fn structural_suffixes_are_stripped() {
        let n = normalizer();
        assert_eq!(n.base_name("AMedPostingEventSubs"), "posting");
        assert_eq!(n.base_name("BMedPostingSI"), "posting");
        assert_eq!(n.base_name("BMedPostingSubsSI"), "posting");
    }

    #[test]
    fn name_is_never_stripped_to_nothing() {
        let n = normalizer();
        assert_eq!(n.base_name("Subs"), "subs");
        assert_eq!(n.base_name("AMedSI"), "si");
    }

    #[test]
    fn different_kinds_never_share_a_key() {
        let n = normalizer();
        assert_ne!(
            n.group_key(ObjectKind::Table, "AMedCustomer"),
            n.group_key(ObjectKind::Page, "AMedCustomer")
        );
    }

    #[test]
    fn tokens_split_on_case_and_digits() {
        assert_eq!(
            name_tokens("SalesInvoiceLine2"),
            vec!["sales", "invoice", "line"]
        );
        assert_eq!(name_tokens("Cust. Ledger Entry"), vec!["cust", "ledger", "entry"]);
        assert!(name_tokens("A1 B2").is_empty());
    }
}
