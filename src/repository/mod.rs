//! PostgreSQL persistence.
//!
//! Carts live in a schema-less JSONB column on the shopper row and are only
//! ever written as a whole; the last write wins.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

pub mod owners;
pub mod products;
pub mod shoppers;
pub mod store;

pub use owners::{OwnerAccount, PgOwnerRepository};
pub use products::PgProductRepository;
pub use shoppers::{PgShopperRepository, ProfileChanges, ShopperProfile};
pub use store::PgStoreSettingsRepository;

/// Raw access to a shopper's stored cart field.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// `Ok(None)` when the field is absent or not a list.
    async fn load_cart(&self, shopper: Uuid) -> crate::Result<Option<Vec<Value>>>;
    /// Replaces the whole stored cart.
    async fn save_cart(&self, shopper: Uuid, cart: &[Value]) -> crate::Result<()>;
}
