// ⚖️ Reconciliation Engine - Inventory ⟕ catalog on card_id
//
// Left join: every inventory record yields exactly one row, matched or not.
// Catalog entries are reference data only and never add rows, except when
// there is no inventory at all (catalog-only mode).
//
// Field policy (first non-empty wins):
//   card_name          inventory → catalog → none
//   card_number/set_id inventory only
//   set_name           catalog → "NOT_FOUND"
//   card_market_value  catalog (resolved) → 0.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fields::{first_present, non_empty_owned};
use crate::location::{apply_location, empty_location_index};
use crate::portfolio::Portfolio;
use crate::pricing::ResolvedCatalog;
use crate::record::{CatalogEntry, InventoryRecord, PortfolioRow};

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const DEFAULT_MARKET_VALUE: f64 = 0.0;

// ============================================================================
// ROW SOURCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSource {
    /// Normal run: one row per inventory record
    Inventory,

    /// No inventory, catalog entries become the rows
    CatalogOnly,

    /// Nothing loaded anywhere: header-only output
    Empty,
}

impl RowSource {
    pub fn name(&self) -> &str {
        match self {
            RowSource::Inventory => "inventory",
            RowSource::CatalogOnly => "catalog-only",
            RowSource::Empty => "empty",
        }
    }
}

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub mode: RowSource,
    pub inventory_records: usize,
    pub catalog_entries: usize,

    /// Catalog entries discarded by deduplication before the join
    pub catalog_duplicates_dropped: usize,
    pub rows: usize,

    /// Inventory rows whose card_id found a catalog entry
    pub matched: usize,

    /// Keyed inventory rows with no catalog entry
    pub unmatched: usize,

    /// Inventory rows without a card_id (missing set_id or card_number)
    pub unkeyed: usize,

    pub include_location: bool,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "Reconciled {} rows ({}): {} inventory records, {} catalog entries, {} matched, {} unmatched, {} without key",
            self.rows,
            self.mode.name(),
            self.inventory_records,
            self.catalog_entries,
            self.matched,
            self.unmatched,
            self.unkeyed
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    /// set_name used when the catalog has nothing (default: "NOT_FOUND")
    pub not_found_label: String,

    /// card_market_value used when no price resolved (default: 0.0)
    pub default_market_value: f64,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        ReconciliationEngine {
            not_found_label: NOT_FOUND.to_string(),
            default_market_value: DEFAULT_MARKET_VALUE,
        }
    }

    /// Builder pattern: set_name for rows without catalog data
    pub fn with_not_found_label(mut self, label: impl Into<String>) -> Self {
        self.not_found_label = label.into();
        self
    }

    /// Build the portfolio table
    ///
    /// `catalog` must already be priced and deduplicated, so the join can
    /// never inflate the row count.
    pub fn reconcile(
        &self,
        inventory: &[InventoryRecord],
        catalog: &ResolvedCatalog,
    ) -> (Portfolio, ReconciliationReport) {
        let mode = if !inventory.is_empty() {
            RowSource::Inventory
        } else if !catalog.is_empty() {
            RowSource::CatalogOnly
        } else {
            RowSource::Empty
        };

        let mut matched = 0;
        let mut unmatched = 0;
        let mut unkeyed = 0;

        let rows: Vec<PortfolioRow> = match mode {
            RowSource::Inventory => inventory
                .iter()
                .map(|record| {
                    let entry = match record.card_id.as_deref() {
                        Some(card_id) => {
                            let entry = catalog.lookup(card_id);
                            if entry.is_some() {
                                matched += 1;
                            } else {
                                unmatched += 1;
                            }
                            entry
                        }
                        None => {
                            unkeyed += 1;
                            None
                        }
                    };
                    self.inventory_row(record, entry)
                })
                .collect(),
            RowSource::CatalogOnly => catalog
                .entries()
                .iter()
                .map(|entry| self.catalog_row(entry))
                .collect(),
            RowSource::Empty => Vec::new(),
        };

        let include_location = inventory.iter().any(InventoryRecord::has_location_data);

        let report = ReconciliationReport {
            mode,
            inventory_records: inventory.len(),
            catalog_entries: catalog.len(),
            catalog_duplicates_dropped: catalog.duplicates_dropped,
            rows: rows.len(),
            matched,
            unmatched,
            unkeyed,
            include_location,
            reconciled_at: Utc::now(),
        };
        info!("{}", report.summary());

        (Portfolio::new(rows, include_location), report)
    }

    /// Row for one inventory record, filled from its catalog match if any
    fn inventory_row(&self, record: &InventoryRecord, entry: Option<&CatalogEntry>) -> PortfolioRow {
        let card_name = first_present([
            non_empty_owned(record.card_name.as_deref()),
            entry.and_then(|e| non_empty_owned(e.card_name.as_deref())),
        ]);

        let mut row = PortfolioRow {
            card_id: record.card_id.clone(),
            card_name,
            card_number: record.card_number.clone(),
            set_id: record.set_id.clone(),
            set_name: self.set_name(entry),
            card_market_value: self.market_value(entry),
            binder_name: String::new(),
            page_number: String::new(),
            slot_number: String::new(),
            index: String::new(),
        };
        apply_location(&mut row, record);
        row
    }

    /// Row for one catalog entry (catalog-only mode)
    fn catalog_row(&self, entry: &CatalogEntry) -> PortfolioRow {
        PortfolioRow {
            card_id: entry.card_id.clone(),
            card_name: non_empty_owned(entry.card_name.as_deref()),
            card_number: entry.card_number.clone(),
            set_id: entry.set_id.clone(),
            set_name: self.set_name(Some(entry)),
            card_market_value: self.market_value(Some(entry)),
            binder_name: String::new(),
            page_number: String::new(),
            slot_number: String::new(),
            index: empty_location_index(),
        }
    }

    fn set_name(&self, entry: Option<&CatalogEntry>) -> String {
        entry
            .and_then(|e| non_empty_owned(e.set_name.as_deref()))
            .unwrap_or_else(|| self.not_found_label.clone())
    }

    fn market_value(&self, entry: Option<&CatalogEntry>) -> f64 {
        entry
            .and_then(|e| e.card_market_value)
            .unwrap_or(self.default_market_value)
    }
}
