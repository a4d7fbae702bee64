// 🃏 Data Model - Raw rows, inventory items, catalog entries, output rows
//
// Flow: RawRecord → (normalizer) → InventoryRecord / CatalogEntry
//       → (reconciliation) → PortfolioRow

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::fields::LOCATION_FIELDS;

// ============================================================================
// RAW RECORD
// ============================================================================

/// RawRecord - One row of unknown shape, as read from a tabular source
///
/// Column names are kept exactly as the source spelled them (after header
/// trimming). Values are always text: card numbers like "004" must never be
/// coerced to integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub fields: HashMap<String, String>,

    // Provenance
    pub source_file: String,
    pub line_number: usize,
}

impl RawRecord {
    pub fn new(source_file: impl Into<String>, line_number: usize) -> Self {
        RawRecord {
            fields: HashMap::new(),
            source_file: source_file.into(),
            line_number,
        }
    }

    /// Builder pattern: add one column value
    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|v| v.as_str())
    }
}

// ============================================================================
// INVENTORY RECORD
// ============================================================================

/// InventoryRecord - One physical card held by the owner
///
/// Authoritative for identity (`set_id`, `card_number`) and location.
/// Duplicate physical copies share a `card_id` and stay separate records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// `set_id-card_number`, None when either part is missing
    pub card_id: Option<String>,
    pub set_id: Option<String>,
    pub card_number: Option<String>,
    pub card_name: Option<String>,

    /// Every column not consumed by a canonical field, passed through as-is
    #[serde(default)]
    pub extras: HashMap<String, String>,

    pub source_file: String,
    pub line_number: usize,
}

impl InventoryRecord {
    pub fn extra(&self, column: &str) -> Option<&str> {
        self.extras.get(column).map(|v| v.as_str())
    }

    pub fn binder_name(&self) -> Option<&str> {
        self.extra("binder_name")
    }

    pub fn page_number(&self) -> Option<&str> {
        self.extra("page_number")
    }

    pub fn slot_number(&self) -> Option<&str> {
        self.extra("slot_number")
    }

    /// True when the source carried at least one location column for this row
    pub fn has_location_data(&self) -> bool {
        LOCATION_FIELDS.iter().any(|c| self.extras.contains_key(*c))
    }
}

// ============================================================================
// CATALOG ENTRY
// ============================================================================

/// CatalogEntry - Reference identity and market pricing for one card
///
/// `prices` maps a priced variant ("normal", "holofoil", ...) to its market
/// value. Only variants the source actually priced are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub card_id: Option<String>,
    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub set_id: Option<String>,
    pub set_name: Option<String>,

    #[serde(default)]
    pub prices: BTreeMap<String, f64>,

    /// Filled by the price resolver; None means "unknown", not zero
    pub card_market_value: Option<f64>,

    pub source_file: String,
}

impl CatalogEntry {
    pub fn new(source_file: impl Into<String>) -> Self {
        CatalogEntry {
            source_file: source_file.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: set the canonical key directly
    pub fn with_card_id(mut self, card_id: impl Into<String>) -> Self {
        self.card_id = Some(card_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.card_name = Some(name.into());
        self
    }

    pub fn with_set_name(mut self, set_name: impl Into<String>) -> Self {
        self.set_name = Some(set_name.into());
        self
    }

    /// Builder pattern: record the market price of one variant
    pub fn with_price(mut self, variant: impl Into<String>, market: f64) -> Self {
        self.prices.insert(variant.into(), market);
        self
    }

    pub fn price(&self, variant: &str) -> Option<f64> {
        self.prices.get(variant).copied()
    }
}

// ============================================================================
// PORTFOLIO ROW
// ============================================================================

/// PortfolioRow - One output line, one per inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub card_id: Option<String>,
    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub set_id: Option<String>,
    pub set_name: String,
    pub card_market_value: f64,

    // Location extras, empty when the source row had none
    pub binder_name: String,
    pub page_number: String,
    pub slot_number: String,
    pub index: String,
}
