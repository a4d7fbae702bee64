// 🔁 Pipeline - load → normalize/key → price → dedup → reconcile → index → write
//
// Single pass, no shared state: every stage hands an owned table to the next.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PortfolioError, Result};
use crate::parser::{load_catalog_dirs, load_inventory_dirs, LoadReport};
use crate::portfolio::{Portfolio, WriteSummary};
use crate::pricing::{PriceResolver, DEFAULT_PRICE_PREFERENCE};
use crate::reconciliation::{ReconciliationEngine, ReconciliationReport, NOT_FOUND};
use crate::record::{CatalogEntry, InventoryRecord};

pub const CATALOG_DIR_NAMES: [&str; 2] = ["card_set_lookup", "card_set_lookup_test"];
pub const INVENTORY_DIR_NAMES: [&str; 2] = ["card_inventory", "card_inventory_test"];
pub const OUTPUT_FILE_NAME: &str = "portfolio.csv";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// PipelineConfig - Where to read, where to write, how to resolve
///
/// Every key is optional in a config file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Catalog directories, read in this order
    pub catalog_dirs: Vec<PathBuf>,

    /// Inventory directories, read in this order
    pub inventory_dirs: Vec<PathBuf>,

    pub output_path: PathBuf,

    /// Priced variants, most preferred first
    pub price_preference: Vec<String>,

    pub not_found_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl PipelineConfig {
    /// Default layout under `base_dir`
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref();
        PipelineConfig {
            catalog_dirs: CATALOG_DIR_NAMES.iter().map(|d| base.join(d)).collect(),
            inventory_dirs: INVENTORY_DIR_NAMES.iter().map(|d| base.join(d)).collect(),
            output_path: base.join(OUTPUT_FILE_NAME),
            price_preference: DEFAULT_PRICE_PREFERENCE.iter().map(|v| v.to_string()).collect(),
            not_found_label: NOT_FOUND.to_string(),
        }
    }

    /// Load a JSON config file
    ///
    /// Relative paths inside the file resolve against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_err = |source: anyhow::Error| PortfolioError::Config {
            path: path.to_path_buf(),
            source,
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))
            .map_err(config_err)?;

        let config: PipelineConfig = serde_json::from_str(&content)
            .context("Failed to parse pipeline config JSON")
            .map_err(config_err)?;

        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(root))
    }

    fn relative_to(mut self, root: &Path) -> Self {
        let resolve = |p: &PathBuf| if p.is_relative() { root.join(p) } else { p.clone() };
        self.catalog_dirs = self.catalog_dirs.iter().map(resolve).collect();
        self.inventory_dirs = self.inventory_dirs.iter().map(resolve).collect();
        self.output_path = resolve(&self.output_path);
        self
    }

    pub fn with_catalog_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.catalog_dirs = dirs;
        self
    }

    pub fn with_inventory_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.inventory_dirs = dirs;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_price_preference(mut self, preference: Vec<String>) -> Self {
        self.price_preference = preference;
        self
    }

    pub fn with_not_found_label(mut self, label: impl Into<String>) -> Self {
        self.not_found_label = label.into();
        self
    }

    pub fn price_resolver(&self) -> PriceResolver {
        PriceResolver::with_preference(self.price_preference.iter().cloned())
    }

    pub fn reconciliation_engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new().with_not_found_label(self.not_found_label.clone())
    }
}

// ============================================================================
// RUN
// ============================================================================

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub write: WriteSummary,
    pub reconciliation: ReconciliationReport,
    pub catalog_load: LoadReport,
    pub inventory_load: LoadReport,
}

impl PipelineOutcome {
    pub fn rows_written(&self) -> usize {
        self.write.rows_written
    }

    pub fn output_path(&self) -> &Path {
        &self.write.path
    }
}

/// In-memory core: price + dedup the catalog, then reconcile
pub fn build_portfolio(
    inventory: &[InventoryRecord],
    catalog: Vec<CatalogEntry>,
    config: &PipelineConfig,
) -> (Portfolio, ReconciliationReport) {
    let resolved = config.price_resolver().consolidate(catalog);
    info!(
        entries = resolved.len(),
        duplicates_dropped = resolved.duplicates_dropped,
        "catalog resolved"
    );
    config.reconciliation_engine().reconcile(inventory, &resolved)
}

/// Full run from configured directories to the output file
///
/// Only an unwritable destination is fatal; unreadable sources are
/// reported in the outcome's load reports.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome> {
    info!(output = %config.output_path.display(), "starting portfolio update");

    let catalog = load_catalog_dirs(&config.catalog_dirs);
    let inventory = load_inventory_dirs(&config.inventory_dirs);

    let (portfolio, reconciliation) = build_portfolio(&inventory.records, catalog.records, config);

    let write = portfolio.write_csv(&config.output_path)?;
    info!(
        rows = write.rows_written,
        path = %write.path.display(),
        sha256 = %write.sha256,
        "portfolio written"
    );

    Ok(PipelineOutcome {
        write,
        reconciliation,
        catalog_load: catalog.report,
        inventory_load: inventory.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Keyed;

    #[test]
    fn test_default_layout() {
        let config = PipelineConfig::new("/data/pokemon");
        assert_eq!(
            config.catalog_dirs,
            vec![
                PathBuf::from("/data/pokemon/card_set_lookup"),
                PathBuf::from("/data/pokemon/card_set_lookup_test"),
            ]
        );
        assert_eq!(
            config.inventory_dirs,
            vec![
                PathBuf::from("/data/pokemon/card_inventory"),
                PathBuf::from("/data/pokemon/card_inventory_test"),
            ]
        );
        assert_eq!(config.output_path, PathBuf::from("/data/pokemon/portfolio.csv"));
        assert_eq!(config.price_preference, vec!["holofoil", "normal"]);
        assert_eq!(config.not_found_label, "NOT_FOUND");
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let config = PipelineConfig {
            catalog_dirs: vec![PathBuf::from("lookup"), PathBuf::from("/abs/lookup")],
            ..PipelineConfig::default()
        }
        .relative_to(Path::new("/etc/portfolio"));

        assert_eq!(config.catalog_dirs[0], PathBuf::from("/etc/portfolio/lookup"));
        assert_eq!(config.catalog_dirs[1], PathBuf::from("/abs/lookup"));
        assert_eq!(config.output_path, PathBuf::from("/etc/portfolio/portfolio.csv"));
    }

    #[test]
    fn test_partial_config_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "not_found_label": "MISSING" }"#).unwrap();
        assert_eq!(config.not_found_label, "MISSING");
        assert_eq!(config.price_preference, vec!["holofoil", "normal"]);
    }

    #[test]
    fn test_config_overrides_reach_engines() {
        let config = PipelineConfig::default()
            .with_price_preference(vec!["normal".to_string(), "holofoil".to_string()])
            .with_not_found_label("MISSING");

        let inventory = vec![
            InventoryRecord {
                set_id: Some("SM1".to_string()),
                card_number: Some("001".to_string()),
                ..Default::default()
            }
            .keyed(),
            InventoryRecord {
                set_id: Some("XY9".to_string()),
                card_number: Some("050".to_string()),
                ..Default::default()
            }
            .keyed(),
        ];
        let catalog = vec![CatalogEntry::new("lookup.json")
            .with_card_id("SM1-001")
            .with_set_name("Sun & Moon")
            .with_price("normal", 1.20)
            .with_price("holofoil", 5.50)];

        let (portfolio, _) = build_portfolio(&inventory, catalog, &config);

        assert_eq!(portfolio.rows()[0].card_market_value, 1.20);
        assert_eq!(portfolio.rows()[1].set_name, "MISSING");
    }

    #[test]
    fn test_build_portfolio_end_to_end_scenario() {
        let mut record = InventoryRecord {
            set_id: Some("SM1".to_string()),
            card_number: Some("001".to_string()),
            ..Default::default()
        };
        record.extras.insert("binder_name".to_string(), "A".to_string());
        record.extras.insert("page_number".to_string(), "1".to_string());
        record.extras.insert("slot_number".to_string(), "2".to_string());
        let record = record.keyed();

        let catalog = vec![CatalogEntry::new("lookup.json")
            .with_card_id("SM1-001")
            .with_name("Bulbasaur")
            .with_set_name("Sun & Moon")
            .with_price("normal", 1.20)];

        let (portfolio, report) = build_portfolio(&[record], catalog, &PipelineConfig::default());
        let row = &portfolio.rows()[0];

        assert_eq!(report.rows, 1);
        assert_eq!(row.card_id.as_deref(), Some("SM1-001"));
        assert_eq!(row.card_name.as_deref(), Some("Bulbasaur"));
        assert_eq!(row.card_number.as_deref(), Some("001"));
        assert_eq!(row.set_id.as_deref(), Some("SM1"));
        assert_eq!(row.set_name, "Sun & Moon");
        assert_eq!(row.card_market_value, 1.20);
        assert_eq!(row.binder_name, "A");
        assert_eq!(row.page_number, "1");
        assert_eq!(row.slot_number, "2");
        assert_eq!(row.index, "A-1-2");
    }
}
