// 🔑 Key Synthesizer - Canonical `card_id` for inventory and catalog alike
//
//   card_id = trim(set_id) + "-" + trim(card_number)
//
// Both parts stay text: "004" keeps its leading zeros.

use crate::fields::non_empty;
use crate::record::{CatalogEntry, InventoryRecord};

/// Build the canonical key, or None when either part is missing/blank
pub fn synthesize_card_id(set_id: Option<&str>, card_number: Option<&str>) -> Option<String> {
    let set_id = non_empty(set_id)?;
    let card_number = non_empty(card_number)?;
    Some(format!("{}-{}", set_id, card_number))
}

/// Keyed - Anything joinable on `card_id`
///
/// `rekey` always recomputes from the two source fields; an incoming
/// `card_id` is never trusted on its own.
pub trait Keyed {
    fn key_parts(&self) -> (Option<&str>, Option<&str>);
    fn set_card_id(&mut self, card_id: Option<String>);

    fn rekey(&mut self) {
        let (set_id, card_number) = self.key_parts();
        let card_id = synthesize_card_id(set_id, card_number);
        self.set_card_id(card_id);
    }

    fn keyed(mut self) -> Self
    where
        Self: Sized,
    {
        self.rekey();
        self
    }
}

impl Keyed for InventoryRecord {
    fn key_parts(&self) -> (Option<&str>, Option<&str>) {
        (self.set_id.as_deref(), self.card_number.as_deref())
    }

    fn set_card_id(&mut self, card_id: Option<String>) {
        self.card_id = card_id;
    }
}

impl Keyed for CatalogEntry {
    fn key_parts(&self) -> (Option<&str>, Option<&str>) {
        (self.set_id.as_deref(), self.card_number.as_deref())
    }

    fn set_card_id(&mut self, card_id: Option<String>) {
        self.card_id = card_id;
    }
}
