use std::path::PathBuf;

use super::*;

fn record(kind: ObjectKind, name: &str, namespace: Option<&str>, text: &str) -> ObjectRecord {
    ObjectRecord {
        kind,
        name: name.to_string(),
        id: None,
        declared_namespace: namespace.map(str::to_string),
        extends: None,
        source_location: PathBuf::from(format!("base/{name}.al")),
        raw_text: text.to_string(),
        solution: None,
    }
}

fn base_index() -> ObjectIndex {
    ObjectIndex::from_records(vec![
        record(ObjectKind::Table, "Customer", Some("Sales.Customer"), ""),
        record(ObjectKind::Page, "Customer Card", Some("Sales.Customer"), ""),
        record(ObjectKind::Codeunit, "Sales-Post", Some("Sales.Posting"), ""),
    ])
}

#[test]
fn explicit_accessor_references_are_extracted() {
    let refs = extract_references("Cust.Get(); Page.Run(Page::\"Customer Card\"); Database::Customer");
    assert_eq!(
        refs,
        vec![
            SymbolRef::new(ObjectKind::Page, "Customer Card"),
            SymbolRef::new(ObjectKind::Table, "Customer"),
        ]
    );
}

#[test]
fn typed_declarations_are_extracted_and_deduplicated() {
    let text = "var\n    Cust: Record Customer;\n    Cust2: Record \"Customer\";\n    Post: Codeunit \"Sales-Post\";\n";
    let refs = extract_references(text);
    assert_eq!(
        refs,
        vec![
            SymbolRef::new(ObjectKind::Table, "Customer"),
            SymbolRef::new(ObjectKind::Codeunit, "Sales-Post"),
        ]
    );
}

#[test]
fn both_forms_merge_in_order_of_appearance() {
    let text = "X: Codeunit \"Sales-Post\";\nif Table::\"Customer\" = 0 then;\nY: Record Customer;";
    let refs = extract_references(text);
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].kind, ObjectKind::Codeunit);
    assert_eq!(refs[1].kind, ObjectKind::Table);
}

#[test]
fn accessor_reference_resolves_to_exactly_that_record() {
    let index = base_index();
    let resolver = ReferenceResolver::new(&index, &ResolveConfig::default());
    let refs = extract_references("Table::\"Customer\"");
    let resolved = resolver.resolve(&refs);

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].0.key(), ObjectKey::new(ObjectKind::Table, "customer"));
    assert_eq!(resolved[0].1, ContextOrigin::Exact);
}

#[test]
fn dangling_reference_resolves_to_nothing() {
    let index = base_index();
    let resolver = ReferenceResolver::new(&index, &ResolveConfig::default());
    let resolved = resolver.resolve(&extract_references("Table::\"Vendor\""));
    assert!(resolved.is_empty());
}

#[test]
fn name_fallback_is_opt_in() {
    let index = base_index();
    let refs = vec![SymbolRef::new(ObjectKind::Report, "Customer")];

    let strict = ReferenceResolver::new(&index, &ResolveConfig::default());
    assert!(strict.resolve(&refs).is_empty());

    let loose = ReferenceResolver::new(
        &index,
        &ResolveConfig {
            name_fallback: true,
            ..ResolveConfig::default()
        },
    );
    let resolved = loose.resolve(&refs);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].0.kind, ObjectKind::Table);
    assert_eq!(resolved[0].1, ContextOrigin::NameFallback);
}

#[test]
fn context_is_bounded() {
    let index = base_index();
    let resolver = ReferenceResolver::new(
        &index,
        &ResolveConfig {
            max_context_objects: 1,
            ..ResolveConfig::default()
        },
    );
    let target = record(
        ObjectKind::Codeunit,
        "AMedMgt",
        None,
        "Table::Customer; Page::\"Customer Card\";",
    );
    assert_eq!(resolver.context_for(&target).len(), 1);
}

#[test]
fn extends_clause_and_self_references() {
    let mut ext = record(
        ObjectKind::TableExtension,
        "AMed Customer Ext",
        None,
        "tableextension 50100 \"AMed Customer Ext\" extends Customer\n{ x: Codeunit \"Sales-Post\"; }",
    );
    ext.extends = Some("Customer".to_string());
    let refs = record_references(&ext);
    assert_eq!(refs[0], SymbolRef::new(ObjectKind::Table, "Customer"));

    let index = base_index();
    let resolver = ReferenceResolver::new(&index, &ResolveConfig::default());
    let context = resolver.context_for(&ext);
    assert_eq!(context.len(), 2);
    assert_eq!(context[0].namespace.as_deref(), Some("Sales.Customer"));
    assert_eq!(context[0].directory, "base");

    let selfish = record(ObjectKind::Codeunit, "Loop", None, "Codeunit::Loop; Codeunit::\"Sales-Post\"");
    assert_eq!(
        record_references(&selfish),
        vec![SymbolRef::new(ObjectKind::Codeunit, "Sales-Post")]
    );
}
