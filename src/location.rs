// 📍 Location Indexer - "binder-page-slot" display key
//
//   index = trim(binder_name) + "-" + trim(page_number) + "-" + trim(slot_number)
//
// Missing parts become "", so the result always has exactly two separators.

use crate::record::{InventoryRecord, PortfolioRow};

/// Location index from three optional attributes
pub fn location_index(
    binder_name: Option<&str>,
    page_number: Option<&str>,
    slot_number: Option<&str>,
) -> String {
    let part = |value: Option<&str>| value.map(str::trim).unwrap_or("").to_string();
    format!(
        "{}-{}-{}",
        part(binder_name),
        part(page_number),
        part(slot_number)
    )
}

/// Copy an inventory record's location onto its output row and index it
pub fn apply_location(row: &mut PortfolioRow, record: &InventoryRecord) {
    row.binder_name = record.binder_name().unwrap_or("").to_string();
    row.page_number = record.page_number().unwrap_or("").to_string();
    row.slot_number = record.slot_number().unwrap_or("").to_string();
    row.index = location_index(
        record.binder_name(),
        record.page_number(),
        record.slot_number(),
    );
}

/// Index for a row that never had inventory location data
pub fn empty_location_index() -> String {
    location_index(None, None, None)
}
