//! Request-scoped cart operations: load, migrate once, mutate, write back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::aggregates::{compute_invoice, Cart, CartEntry, CartError, Invoice, ProductResolver};
use crate::domain::value_objects::{ProductRef, Quantity};
use crate::events::EventPublisher;
use crate::repository::CartStore;
use crate::Result;

pub type DynCartStore = Arc<dyn CartStore>;
pub type DynProductResolver = Arc<dyn ProductResolver>;

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub entries: Vec<CartEntry>,
    pub invoice: Invoice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuantityUpdate {
    Updated { quantity: Quantity, invoice: Invoice },
    NotInCart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub before: usize,
    pub after: usize,
}

#[derive(Clone)]
pub struct CartService {
    store: DynCartStore,
    resolver: DynProductResolver,
    events: EventPublisher,
}

impl CartService {
    pub fn new(store: DynCartStore, resolver: DynProductResolver, events: EventPublisher) -> Self {
        Self { store, resolver, events }
    }

    /// Loads the cart and writes the migrated form back if the stored one was
    /// legacy-shaped, held duplicates or carried bad quantities.
    async fn load(&self, shopper: Uuid) -> Result<(Cart, usize)> {
        let stored = self.store.load_cart(shopper).await?;
        let stored_len = stored.as_ref().map_or(0, Vec::len);
        let mut cart = Cart::from_stored(stored.as_deref());
        if cart.is_dirty() {
            info!(%shopper, stored = stored_len, entries = cart.len(), "migrating stored cart");
            self.persist(shopper, &mut cart).await?;
        }
        Ok((cart, stored_len))
    }

    async fn persist(&self, shopper: Uuid, cart: &mut Cart) -> Result<()> {
        if !cart.is_dirty() { return Ok(()); }
        self.store.save_cart(shopper, &cart.to_stored()).await?;
        cart.mark_clean();
        self.events.publish(&shopper.to_string(), cart.take_events()).await;
        Ok(())
    }

    /// Adds one unit and returns the cart's total item count.
    #[instrument(skip(self, product), fields(product = %product))]
    pub async fn add(&self, shopper: Uuid, product: ProductRef) -> Result<u64> {
        let (mut cart, _) = self.load(shopper).await?;
        cart.add_item(product);
        self.persist(shopper, &mut cart).await?;
        Ok(cart.total_quantity())
    }

    /// Removes the entry entirely. Returns whether anything was removed.
    #[instrument(skip(self, product), fields(product = %product))]
    pub async fn remove(&self, shopper: Uuid, product: &ProductRef) -> Result<bool> {
        let (mut cart, _) = self.load(shopper).await?;
        let removed = cart.remove_item(product).is_some();
        self.persist(shopper, &mut cart).await?;
        Ok(removed)
    }

    #[instrument(skip(self, product, requested), fields(product = %product, requested = requested.value()))]
    pub async fn update_quantity(&self, shopper: Uuid, product: &ProductRef, requested: Quantity) -> Result<QuantityUpdate> {
        let (mut cart, _) = self.load(shopper).await?;
        let quantity = match cart.set_quantity(product, requested) {
            Ok(quantity) => quantity,
            Err(CartError::NotInCart) => return Ok(QuantityUpdate::NotInCart),
        };
        let invoice = compute_invoice(&mut cart, self.resolver.as_ref()).await?;
        self.persist(shopper, &mut cart).await?;
        Ok(QuantityUpdate::Updated { quantity, invoice })
    }

    /// Cart page and checkout: bills the cart and prunes deleted products.
    #[instrument(skip(self))]
    pub async fn view(&self, shopper: Uuid) -> Result<CartView> {
        let (mut cart, _) = self.load(shopper).await?;
        let invoice = compute_invoice(&mut cart, self.resolver.as_ref()).await?;
        self.persist(shopper, &mut cart).await?;
        Ok(CartView { entries: cart.entries().to_vec(), invoice })
    }

    /// Consolidates the stored cart and reports stored vs consolidated entry counts.
    #[instrument(skip(self))]
    pub async fn cleanup(&self, shopper: Uuid) -> Result<CleanupReport> {
        let (cart, before) = self.load(shopper).await?;
        Ok(CleanupReport { before, after: cart.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::PricedProduct;
    use crate::domain::value_objects::Money;
    use crate::StorefrontError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        carts: Mutex<HashMap<Uuid, Value>>,
        writes: AtomicUsize,
        offline: bool,
    }

    impl MemoryStore {
        fn with(shopper: Uuid, cart: Value) -> Arc<Self> {
            let store = Self::default();
            store.carts.lock().unwrap().insert(shopper, cart);
            Arc::new(store)
        }
        fn stored(&self, shopper: Uuid) -> Value { self.carts.lock().unwrap()[&shopper].clone() }
        fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }
    }

    #[async_trait]
    impl CartStore for MemoryStore {
        async fn load_cart(&self, shopper: Uuid) -> Result<Option<Vec<Value>>> {
            if self.offline { return Err(StorefrontError::Database(sqlx::Error::PoolTimedOut)); }
            let carts = self.carts.lock().unwrap();
            let cart = carts.get(&shopper).ok_or(StorefrontError::ShopperNotFound)?;
            Ok(cart.as_array().cloned())
        }

        async fn save_cart(&self, shopper: Uuid, cart: &[Value]) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.carts.lock().unwrap().insert(shopper, Value::Array(cart.to_vec()));
            Ok(())
        }
    }

    struct Catalog;

    #[async_trait]
    impl ProductResolver for Catalog {
        async fn resolve(&self, product: &ProductRef) -> Result<Option<PricedProduct>> {
            let priced = |price: i64, discount: i64| PricedProduct {
                id: product.clone(),
                name: Some(product.to_string()),
                price: Some(Decimal::from(price)),
                discount: Some(Decimal::from(discount)),
            };
            Ok(match product.as_str() {
                "p1" => Some(priced(100, 15)),
                "p2" => Some(priced(40, 0)),
                _ => None,
            })
        }
    }

    fn service(store: Arc<MemoryStore>) -> CartService {
        CartService::new(store, Arc::new(Catalog), EventPublisher::default())
    }

    fn p(id: &str) -> ProductRef { ProductRef::new(id).unwrap() }

    #[tokio::test]
    async fn test_legacy_cart_migrated_once() {
        let shopper = Uuid::new_v4();
        let store = MemoryStore::with(shopper, json!(["p1", "p2", "p1"]));
        let svc = service(store.clone());

        let report = svc.cleanup(shopper).await.unwrap();
        assert_eq!(report, CleanupReport { before: 3, after: 2 });
        assert_eq!(store.stored(shopper), json!([{"product": "p1", "quantity": 2}, {"product": "p2", "quantity": 1}]));
        assert_eq!(store.writes(), 1);

        let report = svc.cleanup(shopper).await.unwrap();
        assert_eq!(report, CleanupReport { before: 2, after: 2 });
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_add_reports_total_quantity() {
        let shopper = Uuid::new_v4();
        let store = MemoryStore::with(shopper, Value::Null);
        let svc = service(store.clone());
        assert_eq!(svc.add(shopper, p("p1")).await.unwrap(), 1);
        assert_eq!(svc.add(shopper, p("p1")).await.unwrap(), 2);
        assert_eq!(svc.add(shopper, p("p2")).await.unwrap(), 3);
        assert_eq!(store.stored(shopper), json!([{"product": "p1", "quantity": 2}, {"product": "p2", "quantity": 1}]));
    }

    #[tokio::test]
    async fn test_add_on_legacy_cart() {
        let shopper = Uuid::new_v4();
        let store = MemoryStore::with(shopper, json!(["p1", "p1"]));
        let svc = service(store.clone());
        assert_eq!(svc.add(shopper, p("p1")).await.unwrap(), 3);
        assert_eq!(store.stored(shopper), json!([{"product": "p1", "quantity": 3}]));
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let shopper = Uuid::new_v4();
        let store = MemoryStore::with(shopper, json!([{"product": "p1", "quantity": 5}]));
        let svc = service(store.clone());
        assert!(!svc.remove(shopper, &p("p2")).await.unwrap());
        assert_eq!(store.writes(), 0);
        assert!(svc.remove(shopper, &p("p1")).await.unwrap());
        assert_eq!(store.stored(shopper), json!([]));
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let shopper = Uuid::new_v4();
        let store = MemoryStore::with(shopper, json!([{"product": "p1", "quantity": 1}]));
        let svc = service(store.clone());

        match svc.update_quantity(shopper, &p("p1"), Quantity::clamped(3)).await.unwrap() {
            QuantityUpdate::Updated { quantity, invoice } => {
                assert_eq!(quantity.value(), 3);
                assert_eq!(invoice.total, Money::from_units(275));
            }
            QuantityUpdate::NotInCart => panic!("expected update"),
        }
        assert_eq!(svc.update_quantity(shopper, &p("p2"), Quantity::ONE).await.unwrap(), QuantityUpdate::NotInCart);
        assert_eq!(store.stored(shopper), json!([{"product": "p1", "quantity": 3}]));
    }

    #[tokio::test]
    async fn test_view_prunes_deleted_products() {
        let shopper = Uuid::new_v4();
        let store = MemoryStore::with(shopper, json!([{"product": "p1", "quantity": 2}, {"product": "ghost", "quantity": 1}]));
        let svc = service(store.clone());
        let view = svc.view(shopper).await.unwrap();
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.invoice.total, Money::from_units(190));
        assert_eq!(store.stored(shopper), json!([{"product": "p1", "quantity": 2}]));

        store.carts.lock().unwrap().insert(shopper, json!([]));
        assert_eq!(svc.view(shopper).await.unwrap().invoice.total, Money::ZERO);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(MemoryStore { offline: true, ..Default::default() });
        let svc = service(store);
        assert!(matches!(svc.view(Uuid::new_v4()).await, Err(StorefrontError::Database(_))));
    }
}
