//! HTTP surface: shopper storefront routes and the owner admin routes.

use std::sync::Arc;

use axum::{routing::{get, post}, Json, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::events::EventPublisher;
use crate::repository::{PgOwnerRepository, PgProductRepository, PgShopperRepository, PgStoreSettingsRepository};
use crate::service::CartService;
use crate::Config;

mod cart;
mod error;
mod owner;
mod profile;
pub mod session;
mod shop;
mod wishlist;

#[derive(Clone)]
pub struct AppState {
    pub carts: CartService,
    pub shoppers: PgShopperRepository,
    pub owners: PgOwnerRepository,
    pub products: PgProductRepository,
    pub settings: PgStoreSettingsRepository,
    pub events: EventPublisher,
}

impl AppState {
    pub fn new(db: PgPool, config: &Config, nats: Option<async_nats::Client>) -> Self {
        let shoppers = PgShopperRepository::new(db.clone());
        let products = PgProductRepository::new(db.clone());
        let events = EventPublisher::new(nats);
        Self {
            carts: CartService::new(Arc::new(shoppers.clone()), Arc::new(products.clone()), events.clone()),
            shoppers,
            owners: PgOwnerRepository::new(db.clone()),
            products,
            settings: PgStoreSettingsRepository::new(db, config.store_id.clone()),
            events,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let owners = Router::new()
        .route("/logout", get(owner::logout))
        .route("/admin", get(owner::dashboard))
        .route("/admin/products", post(owner::create_product))
        .route("/admin/product/edit/:id", get(owner::edit_product))
        .route("/admin/product/update/:id", post(owner::update_product))
        .route("/admin/product/delete/:id", get(owner::delete_product))
        .route("/admin/gallery/upload", post(owner::gallery_upload))
        .route("/admin/gallery/delete/:filename", get(owner::gallery_delete))
        .route("/admin/flashsale/update", post(owner::flash_sale_update));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront"})) }))
        .route("/shop", get(shop::shop))
        .route("/category/:name", get(shop::category))
        .route("/account", get(shop::account))
        .route("/logout", get(shop::logout))
        .route("/update-profile", post(profile::update_profile))
        .route("/update-profile-picture", post(profile::update_picture))
        .route("/addtocart/:product_id", get(cart::add).post(cart::add))
        .route("/cart", get(cart::view))
        .route("/cart/delete/:product_id", get(cart::remove))
        .route("/cart/updatequantity", post(cart::update_quantity))
        .route("/cleanup-cart", get(cart::cleanup))
        .route("/checkout", get(cart::checkout))
        .route("/addtowishlist/:product_id", get(wishlist::toggle))
        .route("/removefromwishlist/:product_id", get(wishlist::remove))
        .nest("/owners", owners)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
