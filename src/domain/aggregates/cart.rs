//! Cart Aggregate
//!
//! Carts are stored as a schema-less list. Two shapes exist in stored data:
//! legacy carts are a bare list of product ids where every repetition is one
//! more unit, current carts hold `{product, quantity}` pairs. Loading a cart
//! classifies every stored entry on its own, folds repeated products into a
//! single entry and remembers whether the stored form has to be rewritten.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{ProductRef, Quantity};

/// One stored cart entry, in either historical shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawCartEntry {
    Legacy(ProductRef),
    Current { product: ProductRef, quantity: Quantity },
}

impl RawCartEntry {
    /// Classifies a stored value. Anything without a `product` or `quantity`
    /// field is a bare legacy id. Returns `None` for values that carry no
    /// usable product reference.
    pub fn classify(value: &Value) -> Option<Self> {
        match value {
            Value::Object(doc) if doc.contains_key("product") || doc.contains_key("quantity") => {
                let product = ProductRef::from_value(doc.get("product")?)?;
                let quantity = doc.get("quantity").map_or(Quantity::ONE, Quantity::from_value);
                Some(Self::Current { product, quantity })
            }
            _ => ProductRef::from_value(value).map(Self::Legacy),
        }
    }

    pub fn quantity(&self) -> Quantity {
        match self {
            Self::Legacy(_) => Quantity::ONE,
            Self::Current { quantity, .. } => *quantity,
        }
    }
}

impl From<CartEntry> for RawCartEntry {
    fn from(entry: CartEntry) -> Self {
        Self::Current { product: entry.product, quantity: entry.quantity }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product: ProductRef,
    pub quantity: Quantity,
}

impl CartEntry {
    pub fn new(product: ProductRef, quantity: Quantity) -> Self { Self { product, quantity } }

    fn to_stored(&self) -> Value {
        json!({ "product": self.product.as_str(), "quantity": self.quantity.value() })
    }
}

/// Folds raw entries into one entry per product, keeping first-seen order.
pub fn normalize<I>(raw: I) -> Vec<CartEntry>
where
    I: IntoIterator<Item = RawCartEntry>,
{
    let mut positions: HashMap<ProductRef, usize> = HashMap::new();
    let mut entries: Vec<CartEntry> = Vec::new();
    for item in raw {
        let quantity = item.quantity();
        let product = match item {
            RawCartEntry::Legacy(product) | RawCartEntry::Current { product, .. } => product,
        };
        match positions.get(&product) {
            Some(&idx) => entries[idx].quantity = entries[idx].quantity.add(quantity),
            None => {
                positions.insert(product.clone(), entries.len());
                entries.push(CartEntry::new(product, quantity));
            }
        }
    }
    entries
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    entries: Vec<CartEntry>,
    dirty: bool,
    events: Vec<DomainEvent>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    /// Builds a cart from the stored list. A `None` list is an empty cart.
    pub fn from_stored(stored: Option<&[Value]>) -> Self {
        let stored = stored.unwrap_or_default();
        let raw: Vec<RawCartEntry> = stored
            .iter()
            .filter_map(|value| {
                let entry = RawCartEntry::classify(value);
                if entry.is_none() { tracing::warn!(?value, "dropping malformed cart entry"); }
                entry
            })
            .collect();
        let legacy = raw.iter().filter(|e| matches!(e, RawCartEntry::Legacy(_))).count();
        let mut cart = Self { entries: normalize(raw), dirty: false, events: vec![] };
        if cart.to_stored() != stored {
            cart.dirty = true;
            cart.raise_event(DomainEvent::Cart(CartEvent::Migrated {
                stored_entries: stored.len(),
                legacy_entries: legacy,
                entries: cart.entries.len(),
            }));
        }
        cart
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CartEntry>) -> Self {
        Self { entries: normalize(entries.into_iter().map(RawCartEntry::from)), dirty: false, events: vec![] }
    }

    pub fn entries(&self) -> &[CartEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    /// Whether the in-memory cart differs from what was loaded.
    pub fn is_dirty(&self) -> bool { self.dirty }
    pub fn mark_clean(&mut self) { self.dirty = false; }

    /// Sum of quantities across all entries.
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity.value())).sum()
    }

    /// Adds one unit of `product` and returns its new quantity.
    pub fn add_item(&mut self, product: ProductRef) -> Quantity {
        let quantity = match self.entries.iter_mut().find(|e| e.product == product) {
            Some(existing) => {
                existing.quantity = existing.quantity.increment();
                existing.quantity
            }
            None => {
                self.entries.push(CartEntry::new(product.clone(), Quantity::ONE));
                Quantity::ONE
            }
        };
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { product, quantity }));
        quantity
    }

    /// Drops the whole entry for `product`. Absent products are a no-op.
    pub fn remove_item(&mut self, product: &ProductRef) -> Option<CartEntry> {
        let idx = self.entries.iter().position(|e| &e.product == product)?;
        let removed = self.entries.remove(idx);
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { product: product.clone() }));
        Some(removed)
    }

    pub fn set_quantity(&mut self, product: &ProductRef, requested: Quantity) -> Result<Quantity, CartError> {
        let item = self.entries.iter_mut().find(|e| &e.product == product).ok_or(CartError::NotInCart)?;
        item.quantity = requested;
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged { product: product.clone(), quantity: requested }));
        Ok(requested)
    }

    /// Removes entries whose products no longer exist.
    pub fn prune(&mut self, stale: &[ProductRef]) {
        if stale.is_empty() { return; }
        self.entries.retain(|e| !stale.contains(&e.product));
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::StalePruned { products: stale.to_vec() }));
    }

    /// Stored representation: always the current shape.
    pub fn to_stored(&self) -> Vec<Value> {
        self.entries.iter().map(CartEntry::to_stored).collect()
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.dirty = true; }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Item not found in cart")]
    NotInCart,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ProductRef { ProductRef::new(id).unwrap() }

    fn raw(values: Value) -> Vec<RawCartEntry> {
        values.as_array().unwrap().iter().filter_map(RawCartEntry::classify).collect()
    }

    fn quantities(entries: &[CartEntry]) -> Vec<(&str, u32)> {
        entries.iter().map(|e| (e.product.as_str(), e.quantity.value())).collect()
    }

    #[test]
    fn test_legacy_cart_counts_repetitions() {
        let entries = normalize(raw(json!(["A", "B", "A", "A"])));
        assert_eq!(quantities(&entries), vec![("A", 3), ("B", 1)]);
    }

    #[test]
    fn test_current_cart_sums_quantities() {
        let entries = normalize(raw(json!([
            {"product": "A", "quantity": 2},
            {"product": "B", "quantity": 1},
            {"product": "A", "quantity": 1}
        ])));
        assert_eq!(quantities(&entries), vec![("A", 3), ("B", 1)]);
    }

    #[test]
    fn test_mixed_shapes_classified_per_entry() {
        let entries = normalize(raw(json!([
            {"product": "A", "quantity": 2},
            "A",
            "B",
            {"product": {"_id": "B", "price": 10}, "quantity": "3"}
        ])));
        assert_eq!(quantities(&entries), vec![("A", 3), ("B", 4)]);
    }

    #[test]
    fn test_invalid_quantities_clamped() {
        let entries = normalize(raw(json!([
            {"product": "A", "quantity": -4},
            {"product": "B"},
            {"product": "C", "quantity": "lots"},
            {"product": "D", "quantity": 0}
        ])));
        assert!(entries.iter().all(|e| e.quantity.value() == 1));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            json!(["A", "B", "A", "A"]),
            json!([{"product": "A", "quantity": 2}, {"product": "B", "quantity": 1}, {"product": "A", "quantity": 1}]),
            json!([{"product": "X", "quantity": 0}, "Y", "X"]),
            json!([]),
        ];
        for input in inputs {
            let once = normalize(raw(input));
            let twice = normalize(once.clone().into_iter().map(RawCartEntry::from));
            assert_eq!(once, twice);
            let mut seen = std::collections::HashSet::new();
            assert!(once.iter().all(|e| seen.insert(e.product.clone())));
        }
    }

    #[test]
    fn test_from_stored_flags_migration() {
        let stored = json!(["A", "A", null, {"quantity": 3}]);
        let mut cart = Cart::from_stored(stored.as_array().map(Vec::as_slice));
        assert!(cart.is_dirty());
        assert_eq!(cart.to_stored(), vec![json!({"product": "A", "quantity": 2})]);
        assert!(matches!(cart.take_events().as_slice(), [DomainEvent::Cart(CartEvent::Migrated { legacy_entries: 2, .. })]));

        let reloaded = Cart::from_stored(Some(cart.to_stored().as_slice()));
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn test_non_string_legacy_ids_kept() {
        let stored = json!([{"$oid": "A"}, {"$oid": "A"}, 7, 7, {"_id": "B", "price": 10}]);
        let cart = Cart::from_stored(stored.as_array().map(Vec::as_slice));
        assert_eq!(quantities(cart.entries()), vec![("A", 2), ("7", 2), ("B", 1)]);
        assert!(cart.is_dirty());

        let reloaded = Cart::from_stored(Some(cart.to_stored().as_slice()));
        assert_eq!(reloaded.entries(), cart.entries());
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn test_missing_cart_is_empty() {
        let cart = Cart::from_stored(None);
        assert!(cart.is_empty());
        assert!(!cart.is_dirty());
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(p("p1")).value(), 1);
        assert_eq!(quantities(cart.entries()), vec![("p1", 1)]);

        let mut cart = Cart::from_entries([CartEntry::new(p("p1"), Quantity::clamped(2))]);
        cart.add_item(p("p1"));
        assert_eq!(quantities(cart.entries()), vec![("p1", 3)]);
        cart.add_item(p("p2"));
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_remove_item_removes_fully() {
        let mut cart = Cart::from_entries([CartEntry::new(p("p1"), Quantity::clamped(5))]);
        assert!(cart.remove_item(&p("p1")).is_some());
        assert!(cart.is_empty());
        assert!(cart.remove_item(&p("p1")).is_none());
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::from_entries([CartEntry::new(p("p1"), Quantity::ONE)]);
        assert_eq!(cart.set_quantity(&p("p1"), Quantity::clamped(-3)), Ok(Quantity::ONE));
        assert_eq!(cart.set_quantity(&p("p1"), Quantity::parse("7")).unwrap().value(), 7);
        assert_eq!(cart.set_quantity(&p("nope"), Quantity::ONE), Err(CartError::NotInCart));
        assert_eq!(quantities(cart.entries()), vec![("p1", 7)]);
    }

    #[test]
    fn test_prune() {
        let mut cart = Cart::from_entries([CartEntry::new(p("p1"), Quantity::ONE), CartEntry::new(p("ghost"), Quantity::ONE)]);
        cart.prune(&[p("ghost")]);
        assert_eq!(quantities(cart.entries()), vec![("p1", 1)]);
        assert!(cart.is_dirty());
    }
}
