//! Declarable object kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::TaxonError;

/// Kind of a declared source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// `table`
    Table,
    /// `page`
    Page,
    /// `codeunit`
    Codeunit,
    /// `report`
    Report,
    /// `xmlport`
    XmlPort,
    /// `query`
    Query,
    /// `enum`
    Enum,
    /// `interface`
    Interface,
    /// `controladdin`
    ControlAddIn,
    /// `pageextension`
    PageExtension,
    /// `tableextension`
    TableExtension,
    /// `enumextension`
    EnumExtension,
    /// `reportextension`
    ReportExtension,
    /// `profile`
    Profile,
    /// `dotnet`
    DotNet,
    /// `entitlement`
    Entitlement,
    /// `permissionset`
    PermissionSet,
    /// `permissionsetextension`
    PermissionSetExtension,
    /// `enumvalue`
    EnumValue,
    /// `entitlementset`
    EntitlementSet,
    /// `entitlementsetextension`
    EntitlementSetExtension,
}

impl ObjectKind {
    /// Every kind, in declaration order.
    pub const ALL: [ObjectKind; 21] = [
        ObjectKind::Table,
        ObjectKind::Page,
        ObjectKind::Codeunit,
        ObjectKind::Report,
        ObjectKind::XmlPort,
        ObjectKind::Query,
        ObjectKind::Enum,
        ObjectKind::Interface,
        ObjectKind::ControlAddIn,
        ObjectKind::PageExtension,
        ObjectKind::TableExtension,
        ObjectKind::EnumExtension,
        ObjectKind::ReportExtension,
        ObjectKind::Profile,
        ObjectKind::DotNet,
        ObjectKind::Entitlement,
        ObjectKind::PermissionSet,
        ObjectKind::PermissionSetExtension,
        ObjectKind::EnumValue,
        ObjectKind::EntitlementSet,
        ObjectKind::EntitlementSetExtension,
    ];

    /// Lowercase keyword as written in a declaration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::Page => "page",
            ObjectKind::Codeunit => "codeunit",
            ObjectKind::Report => "report",
            ObjectKind::XmlPort => "xmlport",
            ObjectKind::Query => "query",
            ObjectKind::Enum => "enum",
            ObjectKind::Interface => "interface",
            ObjectKind::ControlAddIn => "controladdin",
            ObjectKind::PageExtension => "pageextension",
            ObjectKind::TableExtension => "tableextension",
            ObjectKind::EnumExtension => "enumextension",
            ObjectKind::ReportExtension => "reportextension",
            ObjectKind::Profile => "profile",
            ObjectKind::DotNet => "dotnet",
            ObjectKind::Entitlement => "entitlement",
            ObjectKind::PermissionSet => "permissionset",
            ObjectKind::PermissionSetExtension => "permissionsetextension",
            ObjectKind::EnumValue => "enumvalue",
            ObjectKind::EntitlementSet => "entitlementset",
            ObjectKind::EntitlementSetExtension => "entitlementsetextension",
        }
    }

    /// Parse a declaration keyword, case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(keyword))
    }

    /// Map a keyword used in a reference to the kind it denotes.
    ///
    /// `Record` and `Database` point at tables, `TestPage` at pages.
    pub fn from_reference_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "record" | "database" => Some(ObjectKind::Table),
            "testpage" => Some(ObjectKind::Page),
            other => Self::from_keyword(other),
        }
    }

    /// Whether this kind extends another object.
    pub fn is_extension(&self) -> bool {
        self.base_kind().is_some()
    }

    /// Kind an extension object extends.
    pub fn base_kind(&self) -> Option<ObjectKind> {
        match self {
            ObjectKind::TableExtension => Some(ObjectKind::Table),
            ObjectKind::PageExtension => Some(ObjectKind::Page),
            ObjectKind::EnumExtension => Some(ObjectKind::Enum),
            ObjectKind::ReportExtension => Some(ObjectKind::Report),
            ObjectKind::PermissionSetExtension => Some(ObjectKind::PermissionSet),
            ObjectKind::EntitlementSetExtension => Some(ObjectKind::EntitlementSet),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = TaxonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s.trim())
            .ok_or_else(|| TaxonError::validation(format!("unknown object kind '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_keyword(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::from_keyword("TableExtension"), Some(ObjectKind::TableExtension));
        assert_eq!(ObjectKind::from_keyword("tablex"), None);
    }

    #[test]
    fn reference_keywords_map_to_declared_kinds() {
        assert_eq!(ObjectKind::from_reference_keyword("Record"), Some(ObjectKind::Table));
        assert_eq!(ObjectKind::from_reference_keyword("Database"), Some(ObjectKind::Table));
        assert_eq!(ObjectKind::from_reference_keyword("TestPage"), Some(ObjectKind::Page));
        assert_eq!(ObjectKind::from_reference_keyword("XmlPort"), Some(ObjectKind::XmlPort));
    }

    #[test]
    fn extensions_know_their_base() {
        assert_eq!(ObjectKind::TableExtension.base_kind(), Some(ObjectKind::Table));
        assert!(ObjectKind::PageExtension.is_extension());
        assert!(!ObjectKind::Codeunit.is_extension());
    }

    #[test]
    fn serde_uses_lowercase_keywords() {
        let json = serde_json::to_string(&ObjectKind::PermissionSetExtension).unwrap();
        assert_eq!(json, "\"permissionsetextension\"");
        let parsed: ObjectKind = "Codeunit".parse().unwrap();
        assert_eq!(parsed, ObjectKind::Codeunit);
    }
}
