use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::domain::aggregates::WishlistAction;
use crate::domain::value_objects::ProductRef;
use crate::http::session::ShopperSession;
use crate::http::AppState;
use crate::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<WishlistAction>,
    pub wishlist_count: usize,
}

pub async fn toggle(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Path(product_id): Path<String>,
) -> Result<Json<WishlistResponse>> {
    let product = ProductRef::new(product_id)?;
    let mut wishlist = s.shoppers.load_wishlist(user.id).await?;
    let action = wishlist.toggle(product);
    s.shoppers.save_wishlist(user.id, &wishlist).await?;
    tracing::info!(shopper = %user.id, ?action, "wishlist toggled");
    Ok(Json(WishlistResponse { success: true, message: action.message(), action: Some(action), wishlist_count: wishlist.len() }))
}

pub async fn remove(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Path(product_id): Path<String>,
) -> Result<Json<WishlistResponse>> {
    let product = ProductRef::new(product_id)?;
    let mut wishlist = s.shoppers.load_wishlist(user.id).await?;
    if wishlist.remove(&product) {
        s.shoppers.save_wishlist(user.id, &wishlist).await?;
    }
    Ok(Json(WishlistResponse {
        success: true,
        message: WishlistAction::Removed.message(),
        action: None,
        wishlist_count: wishlist.len(),
    }))
}
