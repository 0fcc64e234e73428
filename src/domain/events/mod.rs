//! Domain events
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::{ProductRef, Quantity};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Product(ProductEvent),
    Store(StoreEvent),
}

impl DomainEvent {
    /// NATS subject suffix, e.g. `cart.item_added`.
    pub fn subject(&self) -> String {
        let (aggregate, kind) = match self {
            Self::Cart(e) => ("cart", e.kind()),
            Self::Product(e) => ("product", e.kind()),
            Self::Store(e) => ("store", e.kind()),
        };
        format!("{aggregate}.{kind}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    Migrated { stored_entries: usize, legacy_entries: usize, entries: usize },
    ItemAdded { product: ProductRef, quantity: Quantity },
    ItemRemoved { product: ProductRef },
    QuantityChanged { product: ProductRef, quantity: Quantity },
    StalePruned { products: Vec<ProductRef> },
}

impl CartEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Migrated { .. } => "migrated",
            Self::ItemAdded { .. } => "item_added",
            Self::ItemRemoved { .. } => "item_removed",
            Self::QuantityChanged { .. } => "quantity_changed",
            Self::StalePruned { .. } => "stale_pruned",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid },
    Updated { product_id: Uuid },
    Deleted { product_id: Uuid },
}

impl ProductEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    GalleryImageAdded { filename: String },
    GalleryImageRemoved { filename: String },
    FlashSaleScheduled { start_time: Option<DateTime<Utc>>, end_time: Option<DateTime<Utc>>, is_active: bool },
}

impl StoreEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::GalleryImageAdded { .. } => "gallery_image_added",
            Self::GalleryImageRemoved { .. } => "gallery_image_removed",
            Self::FlashSaleScheduled { .. } => "flash_sale_scheduled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_payload() {
        let event = DomainEvent::Cart(CartEvent::ItemAdded { product: ProductRef::new("p1").unwrap(), quantity: Quantity::ONE });
        assert_eq!(event.subject(), "cart.item_added");
        let payload = serde_json::to_value(&event).unwrap();
        assert_eq!(payload["aggregate"], "cart");
        assert_eq!(payload["event"]["type"], "item_added");
        assert_eq!(payload["event"]["quantity"], 1);
    }
}
