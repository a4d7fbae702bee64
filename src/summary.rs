// 📊 Portfolio Summary - Total value and most valuable card
//
// Works on in-memory rows or on a portfolio CSV read back from disk.
// Unparseable market values count as 0.0.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PortfolioError, Result};
use crate::fields::non_empty;
use crate::record::PortfolioRow;

const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostValuable {
    pub card_name: String,
    pub card_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub row_count: usize,
    pub total_value: f64,
    pub most_valuable: Option<MostValuable>,

    /// Portfolio file the summary was read from, if any
    pub source_path: Option<PathBuf>,
}

impl PortfolioSummary {
    pub fn from_rows(rows: &[PortfolioRow]) -> Self {
        Self::from_values(rows.iter().map(|row| {
            (
                row.card_name.as_deref(),
                row.card_id.as_deref(),
                row.card_market_value,
            )
        }))
    }

    /// Summarize (name, id, value) triples; the first maximum wins
    fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>, f64)>,
    {
        let mut row_count = 0;
        let mut total_value = 0.0;
        let mut most_valuable: Option<MostValuable> = None;

        for (name, id, value) in values {
            let value = if value.is_finite() { value } else { 0.0 };
            row_count += 1;
            total_value += value;

            let beats = most_valuable
                .as_ref()
                .map(|best| value > best.value)
                .unwrap_or(true);
            if beats {
                most_valuable = Some(MostValuable {
                    card_name: non_empty(name).unwrap_or(UNKNOWN).to_string(),
                    card_id: non_empty(id).unwrap_or(UNKNOWN).to_string(),
                    value,
                });
            }
        }

        PortfolioSummary {
            row_count,
            total_value,
            most_valuable,
            source_path: None,
        }
    }

    /// Builder pattern: remember which file was summarized
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Human-readable report
    pub fn render(&self) -> String {
        if self.row_count == 0 {
            return "Portfolio contains no data.".to_string();
        }

        let mut out = format!("Loaded portfolio with {} rows", self.row_count);
        if let Some(path) = &self.source_path {
            out.push_str(&format!(" from: {}", path.display()));
        }
        out.push_str(&format!(
            "\nTotal Portfolio Value: ${}\n",
            format_currency(self.total_value)
        ));

        if let Some(best) = &self.most_valuable {
            out.push_str("\nMost Valuable Card:\n");
            out.push_str(&format!("  Name: {}\n", best.card_name));
            out.push_str(&format!("  ID: {}\n", best.card_id));
            out.push_str(&format!("  Value: ${}\n", format_currency(best.value)));
        }
        out
    }
}

/// Read a portfolio CSV back and summarize it
pub fn summarize_file(path: &Path) -> Result<PortfolioSummary> {
    if !path.is_file() {
        return Err(PortfolioError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let read_err = |source: csv::Error| PortfolioError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let name_col = column("card_name");
    let id_col = column("card_id");
    let value_col = column("card_market_value");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        let cell = |col: Option<usize>| col.and_then(|i| record.get(i)).map(str::to_string);
        rows.push((cell(name_col), cell(id_col), coerce_value(cell(value_col).as_deref())));
    }

    Ok(PortfolioSummary::from_values(
        rows.iter()
            .map(|(name, id, value)| (name.as_deref(), id.as_deref(), *value)),
    )
    .with_source_path(path))
}

/// Numeric cell or 0.0
fn coerce_value(cell: Option<&str>) -> f64 {
    non_empty(cell)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// `1234567.891` → `1,234,567.89`
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}
