//! Best-effort structural recognizer for AL source files.
//!
//! The recognizer never tries to parse the language. It looks for the first
//! object declaration line and the first namespace declaration, and gives up
//! quietly on anything it does not understand.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::core::errors::{Result, TaxonError};
use crate::core::naming::NameNormalizer;

use super::kind::ObjectKind;
use super::record::ObjectRecord;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^(tableextension|table|pageextension|page|codeunit|reportextension|report|xmlport|query|enumextension|enumvalue|enum|interface|controladdin|profile|dotnet|entitlementsetextension|entitlementset|entitlement|permissionsetextension|permissionset)\s+(?:(\d+)\s+)?(?:"([^"]+)"|(\w+))(?:\s+extends\s+(?:"([^"]+)"|(\w+)))?"#,
    )
    .expect("declaration pattern compiles")
});

static NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:\bNamespace\s*=\s*"([\w.]+)"|\bnamespace\s+([\w.]+)\s*;)"#)
        .expect("namespace pattern compiles")
});

/// Structural facts recognized in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared kind
    pub kind: ObjectKind,
    /// Numeric id, if present
    pub id: Option<u32>,
    /// Declared name without quotes
    pub name: String,
    /// `extends` target on the declaration line
    pub extends: Option<String>,
    /// First namespace declaration anywhere in the file
    pub namespace: Option<String>,
}

/// Recognize the first object declaration and the first namespace declaration.
///
/// Returns `None` when no declaration line exists.
pub fn recognize(text: &str) -> Option<Declaration> {
    let mut declaration: Option<Declaration> = None;
    let mut namespace: Option<String> = None;

    for line in text.lines() {
        if declaration.is_none() {
            declaration = match_declaration(line.trim());
        }
        if namespace.is_none() {
            namespace = match_namespace(line);
        }
        if declaration.is_some() && namespace.is_some() {
            break;
        }
    }

    declaration.map(|mut decl| {
        decl.namespace = namespace;
        decl
    })
}

/// Every namespace declared in `text`, in order of appearance.
pub fn declared_namespaces(text: &str) -> Vec<String> {
    NAMESPACE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn match_declaration(line: &str) -> Option<Declaration> {
    let caps = DECLARATION.captures(line)?;
    let kind = ObjectKind::from_keyword(caps.get(1)?.as_str())?;
    let id = caps.get(2).and_then(|m| m.as_str().parse().ok());
    let name = caps
        .get(3)
        .or_else(|| caps.get(4))?
        .as_str()
        .trim()
        .to_string();
    if name.is_empty() {
        return None;
    }
    let extends = caps
        .get(5)
        .or_else(|| caps.get(6))
        .map(|m| m.as_str().trim().to_string());

    Some(Declaration {
        kind,
        id,
        name,
        extends,
        namespace: None,
    })
}

fn match_namespace(line: &str) -> Option<String> {
    let caps = NAMESPACE.captures(line)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Read a file and decode it as UTF-8, dropping a leading byte-order mark.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| TaxonError::io(format!("Failed to read {}", path.display()), e))?;
    let text = String::from_utf8(bytes).map_err(|e| TaxonError::Parse {
        message: format!("not valid UTF-8: {e}"),
        file_path: Some(path.display().to_string()),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Read one file into an object record.
pub fn read_record(path: &Path, naming: &NameNormalizer) -> Result<ObjectRecord> {
    let raw_text = read_source(path)?;
    let decl = recognize(&raw_text).ok_or_else(|| TaxonError::Parse {
        message: "no object declaration".to_string(),
        file_path: Some(path.display().to_string()),
    })?;

    Ok(ObjectRecord {
        solution: naming.solution_of(&decl.name).map(str::to_string),
        kind: decl.kind,
        name: decl.name,
        id: decl.id,
        declared_namespace: decl.namespace,
        extends: decl.extends,
        source_location: path.to_path_buf(),
        raw_text,
    })
}

/// Scan one file. Any failure means "no record" and is only logged.
pub fn scan_file(path: &Path, naming: &NameNormalizer) -> Option<ObjectRecord> {
    match read_record(path, naming) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!("Skipping {}: {}", path.display(), err);
            None
        }
    }
}
