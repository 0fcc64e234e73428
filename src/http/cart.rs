use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::{Money, ProductRef, Quantity};
use crate::http::session::ShopperSession;
use crate::http::AppState;
use crate::repository::ShopperProfile;
use crate::service::{CartView, QuantityUpdate};
use crate::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedToCart {
    pub success: bool,
    pub message: &'static str,
    pub cart_count: u64,
}

#[derive(Debug, Serialize)]
pub struct CartPage {
    pub user: ShopperProfile,
    #[serde(flatten)]
    pub cart: CartView,
    /// Amount due, platform fee included.
    pub bill: Money,
}

#[derive(Debug, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub product_id: String,
    #[serde(default)]
    pub quantity: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateQuantityResponse {
    Updated { success: bool, quantity: Quantity, bill: Money },
    Failed(Outcome),
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub before: usize,
    pub after: usize,
}

pub async fn add(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Path(product_id): Path<String>,
) -> Result<Json<AddedToCart>> {
    let cart_count = s.carts.add(user.id, ProductRef::new(product_id)?).await?;
    Ok(Json(AddedToCart { success: true, message: "Added to cart", cart_count }))
}

pub async fn view(State(s): State<AppState>, ShopperSession(user): ShopperSession) -> Result<Json<CartPage>> {
    let cart = s.carts.view(user.id).await?;
    let bill = cart.invoice.total;
    Ok(Json(CartPage { user, cart, bill }))
}

/// Same summary as the cart page; the checkout view renders it differently.
pub async fn checkout(state: State<AppState>, session: ShopperSession) -> Result<Json<CartPage>> {
    view(state, session).await
}

pub async fn remove(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Path(product_id): Path<String>,
) -> Result<Json<Outcome>> {
    let removed = s.carts.remove(user.id, &ProductRef::new(product_id)?).await?;
    if !removed { tracing::debug!(shopper = %user.id, "remove requested for product not in cart"); }
    Ok(Json(Outcome { success: true, message: "Item removed from cart".to_string() }))
}

pub async fn update_quantity(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<UpdateQuantityResponse>> {
    let product = ProductRef::new(req.product_id)?;
    let requested = Quantity::from_value(&req.quantity);
    Ok(Json(match s.carts.update_quantity(user.id, &product, requested).await? {
        QuantityUpdate::Updated { quantity, invoice } => {
            UpdateQuantityResponse::Updated { success: true, quantity, bill: invoice.total }
        }
        QuantityUpdate::NotInCart => {
            UpdateQuantityResponse::Failed(Outcome { success: false, message: "Item not found in cart".to_string() })
        }
    }))
}

pub async fn cleanup(State(s): State<AppState>, ShopperSession(user): ShopperSession) -> Result<Json<CleanupResponse>> {
    let report = s.carts.cleanup(user.id).await?;
    Ok(Json(CleanupResponse {
        success: true,
        message: format!("Cart cleaned! Reduced from duplicates to {} unique items", report.after),
        before: report.before,
        after: report.after,
    }))
}
