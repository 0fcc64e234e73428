use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::{CookieJar, Query};
use chrono::Utc;
use serde::Serialize;

use crate::domain::aggregates::{Collection, FlashSale, Product};
use crate::domain::catalog::{CatalogParams, CatalogQuery, Page};
use crate::http::session::{Realm, ShopperSession};
use crate::http::AppState;
use crate::repository::ShopperProfile;
use crate::Result;

#[derive(Debug, Serialize)]
pub struct StoreView {
    pub gallery_images: Vec<String>,
    pub flash_sale: FlashSale,
    pub flash_sale_running: bool,
}

#[derive(Debug, Serialize)]
pub struct Shelf {
    pub collection: Collection,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPage {
    pub user: ShopperProfile,
    pub products: Page<Product>,
    pub flash_sale_products: Vec<Product>,
    pub collections: Vec<Shelf>,
    pub store: StoreView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPage {
    pub user: ShopperProfile,
    pub category_name: String,
    pub products: Page<Product>,
}

#[derive(Debug, Serialize)]
pub struct AccountPage {
    pub user: ShopperProfile,
    pub wishlist: Vec<Product>,
}

pub async fn shop(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Query(params): Query<CatalogParams>,
) -> Result<Json<ShopPage>> {
    let query = CatalogQuery::from_params(&params);
    let products = s.products.search(&query).await?;
    let flash_sale_products = s.products.flash_sale().await?;
    let mut collections = Vec::with_capacity(Collection::ALL.len());
    for collection in Collection::ALL {
        collections.push(Shelf { collection, products: s.products.in_collection(collection).await? });
    }
    let settings = s.settings.load().await?;
    let store = StoreView {
        gallery_images: settings.gallery_images().to_vec(),
        flash_sale: settings.flash_sale().clone(),
        flash_sale_running: settings.flash_sale().is_running(Utc::now()),
    };
    Ok(Json(ShopPage { user, products, flash_sale_products, collections, store }))
}

pub async fn category(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Path(name): Path<String>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CategoryPage>> {
    let query = CatalogQuery::for_category(&params, &name);
    let products = s.products.search(&query).await?;
    Ok(Json(CategoryPage { user, category_name: name, products }))
}

pub async fn account(State(s): State<AppState>, ShopperSession(user): ShopperSession) -> Result<Json<AccountPage>> {
    let wishlist = s.shoppers.load_wishlist(user.id).await?;
    let wishlist = if wishlist.is_empty() { vec![] } else { s.products.find_many(wishlist.items()).await? };
    Ok(Json(AccountPage { user, wishlist }))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    Realm::Shopper.sign_out(jar, "/")
}
