//! Invoice derived from a cart. Never persisted.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::{Money, ProductRef, Quantity};

/// Flat fee added once to every non-empty cart.
pub const PLATFORM_FEE: Money = Money::whole(20);

/// Price data needed to bill a cart line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricedProduct {
    pub id: ProductRef,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
}

impl PricedProduct {
    pub fn unit_price(&self) -> Money {
        Money::lenient(self.price) - Money::lenient(self.discount)
    }
}

/// Catalog lookup by product reference. `Ok(None)` means the product is gone.
#[async_trait]
pub trait ProductResolver: Send + Sync {
    async fn resolve(&self, product: &ProductRef) -> crate::Result<Option<PricedProduct>>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvoiceLine {
    pub product: ProductRef,
    pub name: Option<String>,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Invoice {
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub platform_fee: Money,
    pub total: Money,
}

impl Invoice {
    pub fn from_lines(lines: Vec<InvoiceLine>) -> Self {
        let subtotal = lines.iter().fold(Money::ZERO, |acc, l| acc + l.line_total);
        let platform_fee = if lines.is_empty() { Money::ZERO } else { PLATFORM_FEE };
        Self { lines, subtotal, platform_fee, total: subtotal + platform_fee }
    }
}

/// Bills `cart` against the catalog. Entries whose product no longer
/// resolves are dropped from the cart as well as from the invoice.
pub async fn compute_invoice<R>(cart: &mut Cart, resolver: &R) -> crate::Result<Invoice>
where
    R: ProductResolver + ?Sized,
{
    let mut lines = Vec::with_capacity(cart.len());
    let mut stale = Vec::new();
    for entry in cart.entries() {
        match resolver.resolve(&entry.product).await? {
            Some(product) => {
                let unit_price = product.unit_price();
                lines.push(InvoiceLine {
                    product: entry.product.clone(),
                    name: product.name,
                    quantity: entry.quantity,
                    unit_price,
                    line_total: unit_price.multiply(entry.quantity),
                });
            }
            None => stale.push(entry.product.clone()),
        }
    }
    if !stale.is_empty() {
        tracing::warn!(count = stale.len(), "pruning cart entries for deleted products");
        cart.prune(&stale);
    }
    Ok(Invoice::from_lines(lines))
}
