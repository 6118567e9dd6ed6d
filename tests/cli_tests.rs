//! Integration tests for the taxon CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use taxon_rs::core::config::SolutionConfig;
use taxon_rs::TaxonConfig;

fn taxon_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("taxon").unwrap();
    cmd.current_dir(cwd)
        .env_remove("TAXON_CONFIG")
        .env_remove("RUST_LOG")
        .env_remove("AZURE_OPENAI_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("AZURE_OPENAI_ENDPOINT");
    cmd
}

fn create_sources(root: &Path) {
    let files = [
        (
            "base/Customer.Table.al",
            "namespace Sales.Customer;\ntable 18 Customer\n{\n}\n",
        ),
        (
            "base/Vendor.Table.al",
            "table 23 Vendor\n{\n}\n",
        ),
        (
            "med/AMedCustomerMgt.Codeunit.al",
            "codeunit 50100 \"AMedCustomerMgt\"\n{\n    var\n        Cust: Record Customer;\n}\n",
        ),
        (
            "med/AMedUDIExport.Codeunit.al",
            "codeunit 50101 \"AMedUDIExport\"\n{\n}\n",
        ),
    ];
    for (relative, content) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn write_config(root: &Path) {
    let mut config = TaxonConfig::default();
    config.solutions = vec![SolutionConfig::new("MED", "AMed")];
    config.scan.roots = vec![root.join("base"), root.join("med")];
    config.ledger.path = root.join("ledger.jsonl");
    config.to_yaml_file(root.join("taxon.yml")).unwrap();
}

#[test]
fn help_lists_the_commands() {
    let dir = tempdir().unwrap();
    taxon_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("namespaces"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn init_then_validate_config() {
    let dir = tempdir().unwrap();
    taxon_cmd(dir.path())
        .args(["init-config", "--output", "taxon.yml"])
        .assert()
        .success();
    assert!(dir.path().join("taxon.yml").exists());

    taxon_cmd(dir.path())
        .args(["init-config", "--output", "taxon.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    taxon_cmd(dir.path())
        .args(["validate-config", "taxon.yml", "--details"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("Sales"));
}

#[test]
fn validate_rejects_broken_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.yml"), "scan: [not, a, map]\n").unwrap();
    taxon_cmd(dir.path())
        .args(["validate-config", "bad.yml"])
        .assert()
        .failure();
}

#[test]
fn index_writes_json_dump() {
    let dir = tempdir().unwrap();
    create_sources(dir.path());
    write_config(dir.path());

    taxon_cmd(dir.path())
        .args(["index", "--output", "out/al_index.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed"));

    let dump: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/al_index.json")).unwrap())
            .unwrap();
    assert_eq!(dump["table|Customer"]["namespace"], "Sales.Customer");
    assert!(dump["table|Vendor"]["namespace"].is_null());
    assert!(dump["codeunit|AMedCustomerMgt"]["filepath"]
        .as_str()
        .unwrap()
        .ends_with("med/AMedCustomerMgt.Codeunit.al"));
}

#[test]
fn namespaces_lists_declarations() {
    let dir = tempdir().unwrap();
    create_sources(dir.path());

    taxon_cmd(dir.path())
        .args(["namespaces", "base", "med"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales.Customer"));
}

#[test]
fn scanning_without_roots_fails() {
    let dir = tempdir().unwrap();
    taxon_cmd(dir.path())
        .arg("namespaces")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no source roots"));
}

#[test]
fn classify_without_provider_needs_offline() {
    let dir = tempdir().unwrap();
    create_sources(dir.path());
    write_config(dir.path());

    taxon_cmd(dir.path())
        .arg("classify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--offline"));
}

#[test]
fn offline_classify_then_export() {
    let dir = tempdir().unwrap();
    create_sources(dir.path());
    write_config(dir.path());

    taxon_cmd(dir.path())
        .args(["classify", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert!(!dir.path().join("ledger.jsonl").exists());

    taxon_cmd(dir.path())
        .args(["classify", "--offline", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"targets\": 2"));
    assert!(dir.path().join("ledger.jsonl").exists());

    taxon_cmd(dir.path())
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Kind,Name MED,Name,Namespace"))
        .stdout(predicate::str::contains("\"AMedUDIExport\""))
        .stdout(predicate::str::contains("\"UDI\",\"forced\""))
        .stdout(predicate::str::contains("no-suggestion"));
}
