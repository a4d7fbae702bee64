// 💲 Price Resolver - One market value per catalog entry, one entry per key
//
// 1. Resolve: walk the variant preference list (default holofoil → normal),
//    first priced variant wins. No priced variant = None ("unknown"), never 0.0.
// 2. Deduplicate: one entry survives per card_id, the highest resolved value.
//    None ranks lowest; ties keep the first entry seen.

use std::collections::HashMap;
use tracing::debug;

use crate::fields::first_present;
use crate::record::CatalogEntry;

pub const DEFAULT_PRICE_PREFERENCE: [&str; 2] = ["holofoil", "normal"];

// ============================================================================
// RESOLVED CATALOG
// ============================================================================

/// ResolvedCatalog - Deduplicated, priced, read-only lookup table
///
/// Entry order is the order in which each key was first seen. Entries
/// without a key are kept (they can never match inventory, but they still
/// become rows when the catalog is the only row source).
#[derive(Debug, Clone, Default)]
pub struct ResolvedCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,

    /// Entries discarded because a better-priced entry shares their key
    pub duplicates_dropped: usize,
}

impl ResolvedCatalog {
    pub fn lookup(&self, card_id: &str) -> Option<&CatalogEntry> {
        self.index.get(card_id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// PRICE RESOLVER
// ============================================================================

#[derive(Debug, Clone)]
pub struct PriceResolver {
    /// Variant names, most preferred first
    pub preference: Vec<String>,
}

impl Default for PriceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceResolver {
    /// Resolver with the default preference (holofoil, then normal)
    pub fn new() -> Self {
        PriceResolver {
            preference: DEFAULT_PRICE_PREFERENCE.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn with_preference<I, S>(preference: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PriceResolver {
            preference: preference.into_iter().map(Into::into).collect(),
        }
    }

    /// Market value of the most preferred priced variant
    pub fn resolve(&self, entry: &CatalogEntry) -> Option<f64> {
        first_present(self.preference.iter().map(|variant| entry.price(variant)))
    }

    /// Resolve every entry, then deduplicate by key
    pub fn consolidate(&self, entries: Vec<CatalogEntry>) -> ResolvedCatalog {
        let priced = entries.into_iter().map(|mut entry| {
            entry.card_market_value = self.resolve(&entry);
            entry
        });
        deduplicate(priced)
    }
}

/// Keep the highest-valued entry per card_id, stable on ties
///
/// Expects `card_market_value` to be resolved already.
pub fn deduplicate<I>(entries: I) -> ResolvedCatalog
where
    I: IntoIterator<Item = CatalogEntry>,
{
    let mut catalog = ResolvedCatalog::default();

    for entry in entries {
        let Some(key) = entry.card_id.clone() else {
            catalog.entries.push(entry);
            continue;
        };

        match catalog.index.get(&key) {
            Some(&slot) => {
                let incumbent = &catalog.entries[slot];
                if outranks(entry.card_market_value, incumbent.card_market_value) {
                    debug!(
                        card_id = %key,
                        kept = ?entry.card_market_value,
                        dropped = ?incumbent.card_market_value,
                        "replacing lower-valued catalog entry"
                    );
                    catalog.entries[slot] = entry;
                } else {
                    debug!(card_id = %key, source = %entry.source_file, "dropping duplicate catalog entry");
                }
                catalog.duplicates_dropped += 1;
            }
            None => {
                catalog.index.insert(key, catalog.entries.len());
                catalog.entries.push(entry);
            }
        }
    }

    catalog
}

/// Strictly greater, with None below every known value
fn outranks(candidate: Option<f64>, incumbent: Option<f64>) -> bool {
    match (candidate, incumbent) {
        (Some(c), Some(i)) => c > i,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
