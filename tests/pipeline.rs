//! End-to-end tests of the classification pipeline with a scripted provider.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::{tempdir, TempDir};

use taxon_rs::core::config::{SolutionConfig, INVALID_LABEL};
use taxon_rs::oracle::{ContextPacket, SuggestionProvider};
use taxon_rs::{
    AssignmentStatus, ClassifyOptions, ObjectIndex, Result, TaxonConfig, TaxonEngine, TaxonError,
};

/// Provider answering by object name.
#[derive(Default)]
struct Scripted {
    answers: HashMap<String, std::result::Result<String, String>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<ContextPacket>>,
}

impl Scripted {
    fn answer(mut self, name: &str, namespace: &str) -> Self {
        self.answers.insert(
            name.to_string(),
            Ok(format!(
                "Here you go:\n{{\"namespace\": \"{namespace}\", \"reason\": \"picked {namespace}\", \"alternatives\": []}}"
            )),
        );
        self
    }

    fn fail(mut self, name: &str, message: &str) -> Self {
        self.answers.insert(name.to_string(), Err(message.to_string()));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionProvider for Scripted {
    async fn suggest(&self, packet: &ContextPacket) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(packet.clone());
        match self.answers.get(&packet.name) {
            Some(Ok(answer)) => Ok(answer.clone()),
            Some(Err(message)) => Err(TaxonError::oracle(message.clone())),
            None => Ok("no idea".to_string()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempdir().unwrap(),
        };
        ws.write(
            "base/Sales/Customer.Table.al",
            "namespace Sales.Customer;\n\ntable 18 Customer\n{\n}\n",
        );
        ws.write(
            "med/src/AMedCustomerMgt.Codeunit.al",
            "codeunit 50100 \"AMedCustomerMgt\"\n{\n    procedure Touch()\n    var\n        Cust: Record Customer;\n    begin\n        Page.Run(Page::\"Customer Card\");\n        Cust.Get(Table::\"Customer\");\n    end;\n}\n",
        );
        ws.write(
            "mtc/src/BMedCustomerMgt.Codeunit.al",
            "codeunit 50200 \"BMedCustomerMgt\"\n{\n    var\n        Cust: Record \"Customer\";\n}\n",
        );
        ws
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn roots(&self) -> Vec<PathBuf> {
        vec![
            self.root().join("base"),
            self.root().join("med"),
            self.root().join("mtc"),
        ]
    }

    fn config(&self) -> TaxonConfig {
        let mut config = TaxonConfig::default();
        config.solutions = vec![
            SolutionConfig::new("A", "AMed"),
            SolutionConfig::new("B", "BMed"),
            SolutionConfig::new("C", "CMed"),
        ];
        config.ledger.path = self.root().join(".taxon/ledger.jsonl");
        config
    }

    fn engine(&self, provider: Arc<Scripted>) -> TaxonEngine {
        TaxonEngine::new(self.config()).unwrap().with_provider(provider)
    }
}

#[tokio::test]
async fn variants_converge_on_the_first_seen_label() {
    let ws = Workspace::new();
    let provider = Arc::new(
        Scripted::default()
            .answer("AMedCustomerMgt", "Sales")
            .answer("BMedCustomerMgt", "CRM"),
    );

    let run = ws
        .engine(provider.clone())
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();

    assert_eq!(run.summary.indexed, 3);
    assert_eq!(run.summary.targets, 2);
    assert_eq!(run.summary.suggested, 2);
    assert_eq!(run.summary.adjusted, 1);
    assert_eq!(provider.calls(), 2);

    let a = run.find("AMedCustomerMgt").unwrap();
    let b = run.find("BMedCustomerMgt").unwrap();
    assert_eq!(a.assignment.namespace, "Sales");
    assert_eq!(b.assignment.namespace, "Sales");
    assert_eq!(a.group, b.group);
    assert_eq!(b.assignment.adjusted_from.as_deref(), Some("CRM"));
    assert!(b
        .assignment
        .notes
        .iter()
        .any(|note| note.contains("adjusted from 'CRM' to 'Sales'")));
    assert!(a.assignment.notes.is_empty());

    // Both packets carried the referenced table with its declared namespace.
    let seen = provider.seen.lock().unwrap();
    for packet in seen.iter() {
        assert!(packet
            .references
            .iter()
            .any(|r| r.name == "Customer" && r.namespace.as_deref() == Some("Sales.Customer")));
    }
}

#[tokio::test]
async fn unchanged_objects_are_skipped_on_rerun() {
    let ws = Workspace::new();
    let provider = Arc::new(
        Scripted::default()
            .answer("AMedCustomerMgt", "Sales")
            .answer("BMedCustomerMgt", "CRM"),
    );
    let engine = ws.engine(provider.clone());

    engine
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();
    let second = engine
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();

    assert_eq!(provider.calls(), 2);
    assert_eq!(second.summary.skipped, 2);
    assert_eq!(second.summary.recorded, 0);
    assert!(second.with_namespace("Sales").count() == 2);

    // A content change re-queries exactly that object.
    ws.write(
        "med/src/AMedCustomerMgt.Codeunit.al",
        "codeunit 50100 \"AMedCustomerMgt\"\n{\n    // touched\n}\n",
    );
    let third = engine
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();
    assert_eq!(provider.calls(), 3);
    assert_eq!(third.summary.skipped, 1);

    // --force re-queries everything.
    engine
        .classify(
            &ws.roots(),
            ClassifyOptions {
                force: true,
                dry_run: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(provider.calls(), 5);
}

#[tokio::test]
async fn forced_members_are_isolated_from_the_vote() {
    let ws = Workspace::new();
    ws.write(
        "other/CMedCustomerMgt.Codeunit.al",
        "namespace Finance.Receivables;\ncodeunit 50300 \"CMedCustomerMgt\"\n{\n}\n",
    );
    let provider = Arc::new(
        Scripted::default()
            .answer("AMedCustomerMgt", "Sales")
            .answer("BMedCustomerMgt", "Sales")
            .answer("CMedCustomerMgt", "CRM"),
    );

    let mut roots = ws.roots();
    roots.push(ws.root().join("other"));
    let run = ws
        .engine(provider.clone())
        .classify(&roots, ClassifyOptions::default())
        .await
        .unwrap();

    let c = run.find("CMedCustomerMgt").unwrap();
    assert_eq!(c.assignment.namespace, "Finance.Receivables");
    assert!(c.assignment.is_forced());
    assert_eq!(run.find("AMedCustomerMgt").unwrap().assignment.namespace, "Sales");
    assert_eq!(run.find("BMedCustomerMgt").unwrap().assignment.namespace, "Sales");
    assert_eq!(run.summary.forced, 1);
    assert_eq!(run.summary.adjusted, 0);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn labels_outside_the_allow_list_are_flagged() {
    let ws = Workspace::new();
    let provider = Arc::new(
        Scripted::default()
            .answer("AMedCustomerMgt", "NotInList")
            .answer("BMedCustomerMgt", "NotInList"),
    );

    let run = ws
        .engine(provider)
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();

    assert_eq!(run.summary.invalid, 2);
    for object in &run.objects {
        assert_eq!(object.assignment.namespace, INVALID_LABEL);
        assert_eq!(object.assignment.reason, "picked NotInList");
        assert_eq!(
            object.assignment.status,
            AssignmentStatus::Invalid {
                proposed: "NotInList".to_string()
            }
        );
    }
}

#[tokio::test]
async fn provider_failures_are_recorded_per_object() {
    let ws = Workspace::new();
    let provider = Arc::new(
        Scripted::default()
            .fail("AMedCustomerMgt", "connection refused")
            .answer("BMedCustomerMgt", "CRM"),
    );
    let engine = ws.engine(provider);

    let run = engine
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();
    assert_eq!(run.summary.no_suggestion, 1);
    assert_eq!(run.summary.suggested, 1);

    // The failed object joins the majority of its group but keeps its status.
    let a = run.find("AMedCustomerMgt").unwrap();
    assert_eq!(a.assignment.namespace, "CRM");
    assert!(matches!(a.assignment.status, AssignmentStatus::NoSuggestion { .. }));

    let ledger = engine.open_ledger().unwrap();
    assert_eq!(ledger.len(), 2);
}

#[tokio::test]
async fn dry_run_neither_queries_nor_records() {
    let ws = Workspace::new();
    ws.write(
        "med/src/AMedOldThing.Codeunit.al",
        "codeunit 50101 \"AMedOldThing\"\n{\n    ObsoleteState = Pending;\n}\n",
    );
    let provider = Arc::new(Scripted::default());
    let engine = ws.engine(provider.clone());

    let run = engine
        .classify(
            &ws.roots(),
            ClassifyOptions {
                force: false,
                dry_run: true,
            },
        )
        .await
        .unwrap();

    assert!(run.dry_run);
    assert_eq!(run.summary.targets, 3);
    assert_eq!(run.summary.forced, 1);
    assert_eq!(run.summary.would_query, 2);
    assert_eq!(run.objects.len(), 1);
    assert_eq!(run.objects[0].assignment.namespace, "Obsolete");
    assert_eq!(provider.calls(), 0);
    assert!(!ws.root().join(".taxon/ledger.jsonl").exists());
}

#[tokio::test]
async fn review_upserts_and_reports_the_previous_label() {
    let ws = Workspace::new();
    let first = Arc::new(Scripted::default().answer("AMedCustomerMgt", "CRM"));
    let outcomes = ws
        .engine(first)
        .review(&ws.roots(), "amedcustomermgt")
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].previous.is_none());

    let second = Arc::new(Scripted::default().answer("AMedCustomerMgt", "Sales"));
    let engine = ws.engine(second);
    let outcomes = engine.review(&ws.roots(), "AMedCustomerMgt").await.unwrap();
    assert_eq!(outcomes[0].previous.as_ref().unwrap().namespace, "CRM");
    assert_eq!(outcomes[0].assignment.namespace, "Sales");
    assert!(outcomes[0].label_changed());

    let ledger = engine.open_ledger().unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entries().next().unwrap().assignment.namespace, "Sales");

    let err = engine.review(&ws.roots(), "Nope").await.unwrap_err();
    assert!(matches!(err, TaxonError::Validation { .. }));
}

#[tokio::test]
async fn csv_export_puts_variants_on_one_row() {
    let ws = Workspace::new();
    let provider = Arc::new(
        Scripted::default()
            .answer("AMedCustomerMgt", "Sales")
            .answer("BMedCustomerMgt", "CRM"),
    );
    let engine = ws.engine(provider);
    engine
        .classify(&ws.roots(), ClassifyOptions::default())
        .await
        .unwrap();

    let csv = engine.export_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Kind,Name A,Name B,Name C,Name,Namespace,Status,Reason,Alternatives,File,Notes"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("\"codeunit\",\"AMedCustomerMgt\",\"BMedCustomerMgt\",\"\",\"\",\"Sales\""));
}

#[test]
fn indexing_is_idempotent() {
    let ws = Workspace::new();
    let config = ws.config();
    let naming = taxon_rs::core::naming::NameNormalizer::from_config(&config);

    let first = ObjectIndex::build(&ws.roots(), &config.scan, &naming);
    let second = ObjectIndex::build(&ws.roots(), &config.scan, &naming);

    assert_eq!(first.keys().collect::<Vec<_>>(), second.keys().collect::<Vec<_>>());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a, b);
    }
    assert_eq!(
        first
            .lookup(taxon_rs::ObjectKind::Table, "CUSTOMER")
            .and_then(|r| r.declared_namespace.as_deref()),
        Some("Sales.Customer")
    );
}
