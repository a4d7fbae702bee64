// 🔤 Field Aliases - Tolerant column mapping
//
// Each canonical field owns an ordered list of candidate column names.
// Resolution walks the list once and takes the first non-empty value.

use crate::record::RawRecord;

/// Location columns carried through from inventory sources
pub const LOCATION_FIELDS: [&str; 3] = ["binder_name", "page_number", "slot_number"];

/// Candidate column names for one canonical field, highest priority first
///
/// The canonical spelling is always the first candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub candidates: &'static [&'static str],
}

impl FieldAliases {
    /// First candidate column holding a non-empty value (trimmed)
    pub fn resolve<'a>(&self, record: &'a RawRecord) -> Option<&'a str> {
        first_present(self.candidates.iter().map(|c| non_empty(record.get(c))))
    }

    /// Same as `resolve`, owned
    pub fn resolve_owned(&self, record: &RawRecord) -> Option<String> {
        self.resolve(record).map(str::to_string)
    }

    /// Whether `column` is one of this field's spellings
    pub fn consumes(&self, column: &str) -> bool {
        self.candidates.iter().any(|c| *c == column)
    }
}

// Inventory family
pub const INVENTORY_SET_ID: FieldAliases = FieldAliases {
    candidates: &["set_id", "set"],
};

pub const INVENTORY_CARD_NUMBER: FieldAliases = FieldAliases {
    candidates: &["card_number", "number"],
};

pub const INVENTORY_CARD_NAME: FieldAliases = FieldAliases {
    candidates: &["card_name"],
};

pub const INVENTORY_FIELDS: [FieldAliases; 3] =
    [INVENTORY_SET_ID, INVENTORY_CARD_NUMBER, INVENTORY_CARD_NAME];

// Catalog family, flat tabular shape
pub const CATALOG_CARD_NAME: FieldAliases = FieldAliases {
    candidates: &["card_name", "name"],
};

pub const CATALOG_CARD_NUMBER: FieldAliases = FieldAliases {
    candidates: &["card_number", "number"],
};

pub const CATALOG_SET_ID: FieldAliases = FieldAliases {
    candidates: &["set_id", "set"],
};

pub const CATALOG_SET_NAME: FieldAliases = FieldAliases {
    candidates: &["set_name"],
};

// ============================================================================
// COMBINATORS
// ============================================================================

/// First `Some` in priority order
///
/// Shared by alias resolution, price variant preference, and the
/// reconciler's inventory-over-catalog field policy.
pub fn first_present<T, I>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    candidates.into_iter().flatten().next()
}

/// Trimmed value, or None when absent or blank
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn non_empty_owned(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .fold(RawRecord::new("test.csv", 2), |r, (k, v)| r.with_field(*k, *v))
    }

    #[test]
    fn test_canonical_name_wins_over_alias() {
        let record = create_test_record(&[("card_number", "004"), ("number", "9")]);
        assert_eq!(INVENTORY_CARD_NUMBER.resolve(&record), Some("004"));
    }

    #[test]
    fn test_alias_used_when_canonical_missing() {
        let record = create_test_record(&[("set", " base1 ")]);
        assert_eq!(INVENTORY_SET_ID.resolve(&record), Some("base1"));
    }

    #[test]
    fn test_blank_canonical_falls_through_to_alias() {
        let record = create_test_record(&[("card_number", "  "), ("number", "12")]);
        assert_eq!(INVENTORY_CARD_NUMBER.resolve(&record), Some("12"));
    }

    #[test]
    fn test_no_candidate_present() {
        let record = create_test_record(&[("binder_name", "A")]);
        assert_eq!(INVENTORY_SET_ID.resolve(&record), None);
        assert!(INVENTORY_SET_ID.consumes("set"));
        assert!(!INVENTORY_SET_ID.consumes("binder_name"));
    }

    #[test]
    fn test_first_present_order() {
        assert_eq!(first_present([None, Some(2), Some(3)]), Some(2));
        assert_eq!(first_present::<i32, _>([None, None]), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ")), Some("x"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
