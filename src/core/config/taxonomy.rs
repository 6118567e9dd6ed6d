//! Namespace allow-list configuration.

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;

use super::validation::{validate_not_blank, validate_unique_ci};

/// Reserved label for objects marked obsolete at object level.
pub const OBSOLETE_LABEL: &str = "Obsolete";
/// Reserved label the suggestion provider may pick when nothing on the list fits.
pub const CUSTOM_LABEL: &str = "Custom";
/// Reserved label for suggestions outside the allow-list and failed suggestions.
pub const INVALID_LABEL: &str = "INVALID";

/// One allowed namespace label with a short description for prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    /// Label as it must appear in an assignment
    pub name: String,
    /// Human-readable description handed to the suggestion provider
    #[serde(default)]
    pub description: String,
}

impl NamespaceEntry {
    /// Create a new entry.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Ordered allow-list of namespace labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Allowed labels in presentation order
    pub namespaces: Vec<NamespaceEntry>,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        let namespaces = DEFAULT_NAMESPACES
            .iter()
            .map(|(name, description)| NamespaceEntry::new(*name, *description))
            .collect();
        Self { namespaces }
    }
}

impl TaxonomyConfig {
    /// Validate the allow-list.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.namespaces {
            validate_not_blank(&entry.name, "taxonomy.namespaces.name")?;
        }
        validate_unique_ci(
            self.namespaces.iter().map(|e| e.name.as_str()),
            "taxonomy.namespaces",
        )
    }
}

const DEFAULT_NAMESPACES: &[(&str, &str)] = &[
    ("API", "Programming interfaces and external access"),
    ("Assembly", "Assembly orders and assembled items"),
    ("Bank", "Bank accounts and payment traffic"),
    ("CashFlow", "Cash flow forecasting and liquidity planning"),
    ("CostAccounting", "Cost accounting, cost centers and allocations"),
    ("CRM", "Customer relationship management, contacts and interactions"),
    ("EDocument", "Electronic documents"),
    ("EServices", "Electronic services and online interfaces"),
    ("Finance", "General ledger, postings and accounts"),
    ("FixedAssets", "Fixed asset accounting"),
    ("Foundation", "Base components shared by all areas"),
    ("HumanResources", "Employee administration"),
    ("Integration", "Interfaces and connections to external systems"),
    ("Inventory", "Item inventory and stock keeping"),
    ("Invoicing", "Invoicing and billing"),
    ("Manufacturing", "Production orders, routings and BOMs"),
    ("OtherCapabilities", "Other capabilities and add-on functions"),
    ("Pricing", "Price lists, price calculation and discounts"),
    ("Profile", "User profiles and settings"),
    ("Projects", "Project management and planning"),
    ("Purchases", "Purchasing documents and processes"),
    ("RoleCenters", "Role centers and role-specific UI"),
    ("Sales", "Sales documents and processes"),
    ("Service", "Service orders, service items and service processes"),
    ("System", "System objects and technical infrastructure"),
    ("Utilities", "Helper functions and technical tools"),
    ("Warehouse", "Warehouse management and logistics"),
    ("UDI", "Unique device identification for medical devices"),
    ("Call", "Service calls and field service tickets"),
    ("LIF", "Label handling and supplier integration"),
    ("OrderQuote", "Quotes and order quotes"),
    ("InventorySummary", "Inventory overview and summaries"),
    ("Common", "Shared root components of the product lines"),
    ("ECE", "Electronic data exchange and cost estimation"),
    ("MDR", "Medical device regulation requirements"),
];
