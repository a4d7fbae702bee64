// 🏗️ Source Parsers - Inventory CSV, catalog JSON, catalog tabular
//
// A bad file never aborts a run: the directory loaders log it, record it
// in the LoadReport, and move on to the next file.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::normalizer::{normalize_catalog_object, normalize_catalog_row, normalize_inventory};
use crate::record::{CatalogEntry, InventoryRecord, RawRecord};

/// Bytes inspected when sniffing a catalog file's format
const SNIFF_LEN: u64 = 2048;

const BOM: char = '\u{feff}';

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Inventory rows, one physical card per line
    InventoryCsv,

    /// API-style card objects (`{"data": [...]}`, `[...]`, or one object)
    CatalogJson,

    /// Flat lookup rows, whatever the file extension says
    CatalogTabular,
}

impl SourceFormat {
    pub fn name(&self) -> &str {
        match self {
            SourceFormat::InventoryCsv => "inventory CSV",
            SourceFormat::CatalogJson => "catalog JSON",
            SourceFormat::CatalogTabular => "catalog tabular",
        }
    }
}

/// A file that contributed nothing because it could not be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub files_loaded: usize,
    pub records_loaded: usize,
    pub skipped: Vec<SkippedSource>,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.files_loaded += other.files_loaded;
        self.records_loaded += other.records_loaded;
        self.skipped.extend(other.skipped);
    }

    fn record_skip(&mut self, path: &Path, error: &anyhow::Error) {
        warn!(file = %path.display(), "skipping source file: {:#}", error);
        self.skipped.push(SkippedSource {
            path: path.to_path_buf(),
            reason: format!("{:#}", error),
        });
    }
}

/// Records plus the bookkeeping of how they were loaded
#[derive(Debug, Clone, Default)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub report: LoadReport,
}

impl<T> Loaded<T> {
    fn absorb(&mut self, other: Loaded<T>) {
        self.records.extend(other.records);
        self.report.merge(other.report);
    }
}

// ============================================================================
// PARSER TRAITS
// ============================================================================

/// CatalogParser - Turns one lookup file into normalized catalog entries
pub trait CatalogParser: Send + Sync {
    fn parse(&self, file_path: &Path) -> Result<Vec<CatalogEntry>>;

    fn format(&self) -> SourceFormat;
}

/// FileValidator - Cheap check whether a parser wants a file at all
pub trait FileValidator {
    fn can_parse(&self, file_path: &Path) -> bool;
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Detect a catalog file's format from its content, not its name
///
/// Lookup files are sometimes CSV saved with a `.json` extension, so the
/// first bytes decide: `{` or `[` after leading whitespace means JSON.
pub fn detect_catalog_format(file_path: &Path) -> Result<SourceFormat> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let mut head = Vec::new();
    file.take(SNIFF_LEN)
        .read_to_end(&mut head)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

    let text = String::from_utf8_lossy(&head);
    let start = text.trim_start_matches(|c: char| c.is_whitespace() || c == BOM);

    if start.starts_with('{') || start.starts_with('[') {
        Ok(SourceFormat::CatalogJson)
    } else {
        Ok(SourceFormat::CatalogTabular)
    }
}

/// Parser for a catalog format
pub fn get_catalog_parser(format: SourceFormat) -> Result<Box<dyn CatalogParser>> {
    match format {
        SourceFormat::CatalogJson => Ok(Box::new(JsonCatalogParser::new())),
        SourceFormat::CatalogTabular => Ok(Box::new(TabularCatalogParser::new())),
        SourceFormat::InventoryCsv => bail!("{} is not a catalog format", format.name()),
    }
}

// ============================================================================
// TABULAR READING
// ============================================================================

/// Read a CSV file as string-typed rows keyed by (trimmed) header
///
/// Short rows are fine: missing trailing cells read as empty, so every
/// header column is present on every row.
pub fn read_tabular(file_path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let filename = display_name(file_path);

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header in {}", filename))?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, filename)
        })?;

        let mut raw = RawRecord::new(filename.clone(), line_num + 2);
        for (i, column) in headers.iter().enumerate() {
            if column.is_empty() {
                continue;
            }
            let value = record.get(i).unwrap_or("");
            raw.fields
                .entry(column.clone())
                .or_insert_with(|| value.to_string());
        }
        rows.push(raw);
    }

    Ok(rows)
}

fn display_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ============================================================================
// PARSERS
// ============================================================================

/// Inventory CSV parser (`*.csv`, any case)
#[derive(Debug, Default)]
pub struct InventoryCsvParser;

impl InventoryCsvParser {
    pub fn new() -> Self {
        InventoryCsvParser
    }

    pub fn parse(&self, file_path: &Path) -> Result<Vec<InventoryRecord>> {
        let rows = read_tabular(file_path)?;
        Ok(rows.iter().map(normalize_inventory).collect())
    }

    pub fn format(&self) -> SourceFormat {
        SourceFormat::InventoryCsv
    }
}

impl FileValidator for InventoryCsvParser {
    fn can_parse(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }
}

/// Catalog JSON parser (pokemontcg.io style card objects)
#[derive(Debug, Default)]
pub struct JsonCatalogParser;

impl JsonCatalogParser {
    pub fn new() -> Self {
        JsonCatalogParser
    }
}

impl CatalogParser for JsonCatalogParser {
    fn parse(&self, file_path: &Path) -> Result<Vec<CatalogEntry>> {
        let content = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let json: Value = serde_json::from_str(content.trim_start_matches(BOM))
            .with_context(|| format!("Failed to parse JSON from {}", file_path.display()))?;

        let filename = display_name(file_path);

        // API returns { "data": [...] }; exports may be a bare list or one card
        let items: Vec<&Value> = match &json {
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => items.iter().collect(),
                _ => vec![&json],
            },
            Value::Array(items) => items.iter().collect(),
            other => bail!(
                "Unexpected top-level JSON in {}: expected object or array, found {}",
                filename,
                json_kind(other)
            ),
        };

        let mut entries = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match normalize_catalog_object(item, &filename) {
                Some(entry) => entries.push(entry),
                None => warn!(
                    file = %filename,
                    element = idx,
                    "skipping catalog element: expected object, found {}",
                    json_kind(item)
                ),
            }
        }

        Ok(entries)
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::CatalogJson
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Catalog tabular parser (flat lookup rows, no pricing)
#[derive(Debug, Default)]
pub struct TabularCatalogParser;

impl TabularCatalogParser {
    pub fn new() -> Self {
        TabularCatalogParser
    }
}

impl CatalogParser for TabularCatalogParser {
    fn parse(&self, file_path: &Path) -> Result<Vec<CatalogEntry>> {
        let rows = read_tabular(file_path)?;
        Ok(rows.iter().map(normalize_catalog_row).collect())
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::CatalogTabular
    }
}

// ============================================================================
// DIRECTORY LOADING
// ============================================================================

/// Regular files directly inside `dir`, sorted by name
///
/// A missing directory yields nothing. Hidden files are ignored.
pub fn list_source_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "source directory not found, skipping");
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), "cannot list directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.into_path());
    }
    files
}

/// Load every inventory CSV in one directory
pub fn load_inventory_dir(dir: &Path) -> Loaded<InventoryRecord> {
    let parser = InventoryCsvParser::new();
    let mut loaded = Loaded::default();

    for path in list_source_files(dir) {
        if !parser.can_parse(&path) {
            debug!(file = %path.display(), "not an inventory CSV, ignoring");
            continue;
        }

        match parser.parse(&path) {
            Ok(records) => {
                debug!(file = %path.display(), records = records.len(), "loaded inventory file");
                loaded.report.files_loaded += 1;
                loaded.report.records_loaded += records.len();
                loaded.records.extend(records);
            }
            Err(e) => loaded.report.record_skip(&path, &e),
        }
    }

    loaded
}

/// Load every catalog file in one directory, JSON or tabular
pub fn load_catalog_dir(dir: &Path) -> Loaded<CatalogEntry> {
    let mut loaded = Loaded::default();

    for path in list_source_files(dir) {
        let parsed = detect_catalog_format(&path)
            .and_then(get_catalog_parser)
            .and_then(|parser| parser.parse(&path));

        match parsed {
            Ok(entries) => {
                debug!(file = %path.display(), entries = entries.len(), "loaded catalog file");
                loaded.report.files_loaded += 1;
                loaded.report.records_loaded += entries.len();
                loaded.records.extend(entries);
            }
            Err(e) => loaded.report.record_skip(&path, &e),
        }
    }

    loaded
}

/// Load inventory directories in the order given
pub fn load_inventory_dirs(dirs: &[PathBuf]) -> Loaded<InventoryRecord> {
    let mut loaded = Loaded::default();
    for dir in dirs {
        loaded.absorb(load_inventory_dir(dir));
    }
    info!(
        records = loaded.records.len(),
        files = loaded.report.files_loaded,
        skipped = loaded.report.skipped.len(),
        "inventory loaded"
    );
    loaded
}

/// Load catalog directories in the order given
pub fn load_catalog_dirs(dirs: &[PathBuf]) -> Loaded<CatalogEntry> {
    let mut loaded = Loaded::default();
    for dir in dirs {
        loaded.absorb(load_catalog_dir(dir));
    }
    info!(
        entries = loaded.records.len(),
        files = loaded.report.files_loaded,
        skipped = loaded.report.skipped.len(),
        "catalog loaded"
    );
    loaded
}
