// 📒 Portfolio Table - Canonical columns + CSV output
//
// Columns: card_id, card_name, card_number, set_id, set_name, card_market_value
// plus binder_name, page_number, slot_number, index when any inventory
// record carried location data (all-or-nothing per run).

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::{PortfolioError, Result};
use crate::record::PortfolioRow;

pub const BASE_COLUMNS: [&str; 6] = [
    "card_id",
    "card_name",
    "card_number",
    "set_id",
    "set_name",
    "card_market_value",
];

pub const LOCATION_COLUMNS: [&str; 4] = ["binder_name", "page_number", "slot_number", "index"];

/// Portfolio - The reconciled output table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    rows: Vec<PortfolioRow>,
    include_location: bool,
}

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows_written: usize,

    /// SHA-256 of the bytes written, hex encoded
    pub sha256: String,
}

impl Portfolio {
    pub fn new(rows: Vec<PortfolioRow>, include_location: bool) -> Self {
        Portfolio {
            rows,
            include_location,
        }
    }

    pub fn rows(&self) -> &[PortfolioRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn include_location(&self) -> bool {
        self.include_location
    }

    /// Header for this run
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = BASE_COLUMNS.to_vec();
        if self.include_location {
            columns.extend_from_slice(&LOCATION_COLUMNS);
        }
        columns
    }

    /// Serialize to CSV; the header is written even with zero rows
    pub fn to_csv_bytes(&self) -> std::result::Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.columns())?;

        for row in &self.rows {
            writer.write_record(self.cells(row))?;
        }

        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    /// Write the table to `path`, replacing any existing file
    ///
    /// The CSV is fully encoded before the destination is touched.
    pub fn write_csv(&self, path: &Path) -> Result<WriteSummary> {
        let bytes = self.to_csv_bytes().map_err(|source| PortfolioError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;

        std::fs::write(path, &bytes).map_err(|source| PortfolioError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(WriteSummary {
            path: path.to_path_buf(),
            rows_written: self.rows.len(),
            sha256: format!("{:x}", Sha256::digest(&bytes)),
        })
    }

    fn cells(&self, row: &PortfolioRow) -> Vec<String> {
        let mut cells = vec![
            row.card_id.clone().unwrap_or_default(),
            row.card_name.clone().unwrap_or_default(),
            row.card_number.clone().unwrap_or_default(),
            row.set_id.clone().unwrap_or_default(),
            row.set_name.clone(),
            format_market_value(row.card_market_value),
        ];
        if self.include_location {
            cells.push(row.binder_name.clone());
            cells.push(row.page_number.clone());
            cells.push(row.slot_number.clone());
            cells.push(row.index.clone());
        }
        cells
    }
}

/// Shortest round-trip decimal, always with a fractional part ("0.0", "1.2")
pub fn format_market_value(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}
