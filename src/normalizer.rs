// 🧭 Source Normalizer - Heterogeneous sources → canonical records
//
// Two source families:
// - Inventory: tabular rows, `number`/`set` accepted as aliases
// - Catalog: (a) API-style nested JSON objects with tcgplayer pricing
//            (b) flat tabular rows without any pricing
//
// Every record leaves here keyed (see key.rs).

use serde_json::Value;
use std::collections::BTreeMap;

use crate::fields::{
    non_empty, non_empty_owned, FieldAliases, CATALOG_CARD_NAME, CATALOG_CARD_NUMBER,
    CATALOG_SET_ID, CATALOG_SET_NAME, INVENTORY_CARD_NAME, INVENTORY_CARD_NUMBER,
    INVENTORY_FIELDS, INVENTORY_SET_ID,
};
use crate::key::Keyed;
use crate::record::{CatalogEntry, InventoryRecord, RawRecord};

/// Column that would carry a precomputed key; always recomputed instead
const CARD_ID_COLUMN: &str = "card_id";

// ============================================================================
// INVENTORY FAMILY
// ============================================================================

/// Map one inventory row onto the canonical schema
///
/// Unknown columns survive in `extras` untouched so the location indexer
/// can use them later.
pub fn normalize_inventory(raw: &RawRecord) -> InventoryRecord {
    let extras = raw
        .fields
        .iter()
        .filter(|(column, _)| !is_inventory_canonical(column))
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect();

    InventoryRecord {
        card_id: None,
        set_id: INVENTORY_SET_ID.resolve_owned(raw),
        card_number: INVENTORY_CARD_NUMBER.resolve_owned(raw),
        card_name: INVENTORY_CARD_NAME.resolve_owned(raw),
        extras,
        source_file: raw.source_file.clone(),
        line_number: raw.line_number,
    }
    .keyed()
}

fn is_inventory_canonical(column: &str) -> bool {
    column == CARD_ID_COLUMN || INVENTORY_FIELDS.iter().any(|f: &FieldAliases| f.consumes(column))
}

// ============================================================================
// CATALOG FAMILY - shape (a): nested API objects
// ============================================================================

/// Map one API-style card object onto a catalog entry
///
/// Expected shape (every part optional):
/// ```json
/// {
///   "id": "sm1-1", "name": "Bulbasaur", "number": "1",
///   "set": { "id": "sm1", "name": "Sun & Moon" },
///   "tcgplayer": { "prices": { "normal": { "market": 0.12 },
///                              "holofoil": { "market": 1.05 } } }
/// }
/// ```
/// Returns None when `value` is not a JSON object.
pub fn normalize_catalog_object(value: &Value, source_file: &str) -> Option<CatalogEntry> {
    let obj = value.as_object()?;
    let set = obj.get("set").and_then(Value::as_object);

    let entry = CatalogEntry {
        card_id: None,
        card_name: obj.get("name").and_then(json_text),
        card_number: obj.get("number").and_then(json_text),
        set_id: set.and_then(|s| s.get("id")).and_then(json_text),
        set_name: set.and_then(|s| s.get("name")).and_then(json_text),
        prices: extract_prices(value),
        card_market_value: None,
        source_file: source_file.to_string(),
    };

    Some(entry.keyed())
}

/// Collect `tcgplayer.prices.<variant>.market` for every priced variant
fn extract_prices(value: &Value) -> BTreeMap<String, f64> {
    let variants = value
        .get("tcgplayer")
        .and_then(|t| t.get("prices"))
        .and_then(Value::as_object);

    let mut prices = BTreeMap::new();
    if let Some(variants) = variants {
        for (variant, detail) in variants {
            if let Some(market) = detail.get("market").and_then(market_value) {
                prices.insert(variant.clone(), market);
            }
        }
    }
    prices
}

/// Scalar JSON value as trimmed text; numbers keep their literal form
fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty_owned(Some(s.as_str())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Market price as a non-negative finite decimal
///
/// Accepts a JSON number or a numeric string. Anything else is absent.
pub fn market_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => non_empty(Some(s.as_str())).and_then(|s| s.parse::<f64>().ok()),
        _ => None,
    }?;

    if parsed.is_finite() && parsed >= 0.0 {
        Some(parsed)
    } else {
        None
    }
}

// ============================================================================
// CATALOG FAMILY - shape (b): flat tabular rows
// ============================================================================

/// Map one flat lookup row onto a catalog entry
///
/// Tabular lookup files carry no pricing: `prices` stays empty.
pub fn normalize_catalog_row(raw: &RawRecord) -> CatalogEntry {
    CatalogEntry {
        card_id: None,
        card_name: CATALOG_CARD_NAME.resolve_owned(raw),
        card_number: CATALOG_CARD_NUMBER.resolve_owned(raw),
        set_id: CATALOG_SET_ID.resolve_owned(raw),
        set_name: CATALOG_SET_NAME.resolve_owned(raw),
        prices: BTreeMap::new(),
        card_market_value: None,
        source_file: raw.source_file.clone(),
    }
    .keyed()
}
