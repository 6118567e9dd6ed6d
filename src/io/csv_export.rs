//! CSV export of the result ledger.
//!
//! Variants of the same logical object across solutions share a row: rows are
//! keyed by context group and assigned namespace, with one name column per
//! solution tag. The status column lists every distinct status in the row.

use indexmap::IndexMap;

use crate::core::naming::GroupKey;

use super::ledger::LedgerEntry;

#[derive(Default)]
struct Row<'a> {
    names: Vec<(Option<&'a str>, &'a str)>,
    statuses: Vec<&'a str>,
    reason: &'a str,
    alternatives: Vec<&'a str>,
    files: Vec<&'a str>,
    notes: Vec<&'a str>,
}

/// Render ledger entries as CSV with a name column per solution tag.
///
/// Entries without a solution tag land in the trailing `Name` column.
pub fn render_csv<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>, solution_tags: &[String]) -> String {
    let mut rows: IndexMap<(GroupKey, &'a str), Row<'a>> = IndexMap::new();

    for entry in entries {
        let row = rows
            .entry((entry.group.clone(), entry.assignment.namespace.as_str()))
            .or_default();
        if row.statuses.is_empty() {
            row.reason = entry.assignment.reason.as_str();
        }
        push_unique(&mut row.statuses, entry.assignment.status_label());
        let named = (entry.solution.as_deref(), entry.name.as_str());
        if !row.names.contains(&named) {
            row.names.push(named);
        }
        for alt in &entry.assignment.alternatives {
            push_unique(&mut row.alternatives, alt.namespace.as_str());
        }
        push_unique(&mut row.files, file_name(&entry.location));
        for note in &entry.assignment.notes {
            push_unique(&mut row.notes, note.as_str());
        }
    }

    let mut content = String::from("Kind");
    for tag in solution_tags {
        content.push(',');
        content.push_str(&header_field(&format!("Name {tag}")));
    }
    content.push_str(",Name,Namespace,Status,Reason,Alternatives,File,Notes\n");

    for ((group, namespace), row) in &rows {
        let mut fields = vec![group.kind.to_string()];
        for tag in solution_tags {
            let tagged: Vec<&str> = row
                .names
                .iter()
                .filter(|(t, _)| *t == Some(tag.as_str()))
                .map(|(_, name)| *name)
                .collect();
            fields.push(tagged.join("; "));
        }
        let untagged: Vec<&str> = row
            .names
            .iter()
            .filter(|(t, _)| t.map_or(true, |t| !solution_tags.iter().any(|s| s == t)))
            .map(|(_, name)| *name)
            .collect();
        fields.push(untagged.join("; "));
        fields.push((*namespace).to_string());
        fields.push(row.statuses.join("; "));
        fields.push(row.reason.to_string());
        fields.push(row.alternatives.join("; "));
        fields.push(row.files.join("; "));
        fields.push(row.notes.join("; "));

        let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        content.push_str(&line.join(","));
        content.push('\n');
    }

    content
}

fn push_unique<'a>(values: &mut Vec<&'a str>, value: &'a str) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

fn file_name(location: &str) -> &str {
    location.rsplit('/').next().unwrap_or(location)
}

fn header_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        escape_field(s)
    } else {
        s.to_string()
    }
}

/// Quote a field, doubling embedded quotes.
fn escape_field(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::assign::{Alternative, NamespaceAssignment};
    use crate::index::ObjectKind;

    fn entry(name: &str, solution: Option<&str>, namespace: &str, location: &str) -> LedgerEntry {
        LedgerEntry {
            kind: ObjectKind::Codeunit,
            name: name.to_string(),
            solution: solution.map(str::to_string),
            group: GroupKey {
                kind: ObjectKind::Codeunit,
                base_name: "customermgt".to_string(),
            },
            assignment: NamespaceAssignment::suggested(
                namespace,
                "uses \"Customer\"",
                vec![Alternative {
                    namespace: "CRM".to_string(),
                    reason: String::new(),
                }],
            ),
            location: location.to_string(),
            fingerprint: "f".to_string(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn variants_share_one_row() {
        let entries = vec![
            entry("AMedCustomerMgt", Some("A"), "Sales", "a/src/AMedCustomerMgt.al"),
            entry("BMedCustomerMgt", Some("B"), "Sales", "b/src/BMedCustomerMgt.al"),
        ];
        let csv = render_csv(&entries, &["A".to_string(), "B".to_string()]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Kind,Name A,Name B,Name,Namespace,Status,Reason,Alternatives,File,Notes"
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "\"codeunit\",\"AMedCustomerMgt\",\"BMedCustomerMgt\",\"\",\"Sales\",\"suggested\",\"uses \"\"Customer\"\"\",\"CRM\",\"AMedCustomerMgt.al; BMedCustomerMgt.al\",\"\""
        );
    }

    #[test]
    fn adjusted_invalid_member_keeps_its_flag_in_the_status_column() {
        let mut flagged = entry("BMedCustomerMgt", Some("B"), "Sales", "b/BMedCustomerMgt.al");
        flagged.assignment = NamespaceAssignment::invalid("NotInList", "guess", Vec::new());
        flagged.assignment.adjusted_from = Some(flagged.assignment.namespace.clone());
        flagged.assignment.namespace = "Sales".to_string();
        let entries = vec![entry("AMedCustomerMgt", Some("A"), "Sales", "a/AMedCustomerMgt.al"), flagged];

        let csv = render_csv(&entries, &["A".to_string(), "B".to_string()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(
            "\"codeunit\",\"AMedCustomerMgt\",\"BMedCustomerMgt\",\"\",\"Sales\",\"suggested; invalid\","
        ));
    }

    #[test]
    fn diverging_namespaces_split_rows_and_untagged_names_are_kept() {
        let entries = vec![
            entry("AMedCustomerMgt", Some("A"), "Sales", "a/x.al"),
            entry("CustomerMgt", None, "Finance", "base/y.al"),
        ];
        let csv = render_csv(&entries, &["A".to_string()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("\"codeunit\",\"\",\"CustomerMgt\",\"Finance\""));
    }
}
