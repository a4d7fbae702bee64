// Card Portfolio - Core Library
// Reconciles card inventory against catalog pricing into one portfolio table

pub mod error;
pub mod fields;
pub mod key;
pub mod location;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod portfolio;
pub mod pricing;
pub mod reconciliation;
pub mod record;
pub mod summary;

// Re-export commonly used types
pub use error::{PortfolioError, Result};
pub use fields::{first_present, FieldAliases};
pub use key::{synthesize_card_id, Keyed};
pub use location::location_index;
pub use normalizer::{normalize_catalog_object, normalize_catalog_row, normalize_inventory};
pub use parser::{
    detect_catalog_format, get_catalog_parser, load_catalog_dir, load_catalog_dirs,
    load_inventory_dir, load_inventory_dirs, CatalogParser, FileValidator, InventoryCsvParser,
    JsonCatalogParser, LoadReport, Loaded, SkippedSource, SourceFormat, TabularCatalogParser,
};
pub use pipeline::{build_portfolio, run, PipelineConfig, PipelineOutcome};
pub use portfolio::{Portfolio, WriteSummary, BASE_COLUMNS, LOCATION_COLUMNS};
pub use pricing::{PriceResolver, ResolvedCatalog};
pub use reconciliation::{ReconciliationEngine, ReconciliationReport, RowSource};
pub use record::{CatalogEntry, InventoryRecord, PortfolioRow, RawRecord};
pub use summary::{summarize_file, MostValuable, PortfolioSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
