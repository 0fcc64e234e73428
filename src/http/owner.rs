use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::aggregates::{Collection, FlashSale, FlashSaleForm, Palette, Product, ProductDraft, StoreSettings};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::http::session::{OwnerSession, Realm};
use crate::http::AppState;
use crate::repository::OwnerAccount;
use crate::Result;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub owner: OwnerAccount,
    pub products: Vec<Product>,
    pub store: StoreSettings,
    pub flash_sale_running: bool,
}

#[derive(Debug, Serialize)]
pub struct Done {
    pub success: bool,
    pub message: &'static str,
}

fn done(message: &'static str) -> Json<Done> { Json(Done { success: true, message }) }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

fn non_negative(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() { return Err(ValidationError::new("negative")); }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub image: Option<String>,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[validate(custom = "non_negative")]
    pub discount: Option<Decimal>,
    pub bgcolor: Option<String>,
    pub panelcolor: Option<String>,
    pub textcolor: Option<String>,
    #[serde(default)]
    pub flash_sale: Value,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub collections: Option<OneOrMany>,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft> {
        self.validate()?;
        let tags = self.collections.map(OneOrMany::into_vec).unwrap_or_default();
        Ok(ProductDraft {
            name: self.name,
            image: self.image,
            price: self.price,
            discount: self.discount,
            palette: Palette { bgcolor: self.bgcolor, panelcolor: self.panelcolor, textcolor: self.textcolor },
            flash_sale: matches!(&self.flash_sale, Value::Bool(true)) || self.flash_sale.as_str() == Some("true"),
            category: self.category,
            brand: self.brand,
            collections: Collection::parse_all(tags.as_slice())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GalleryUpload {
    pub filename: String,
}

pub async fn dashboard(State(s): State<AppState>, OwnerSession(owner): OwnerSession) -> Result<Json<Dashboard>> {
    let products = s.products.all().await?;
    let store = s.settings.load().await?;
    let flash_sale_running = store.flash_sale().is_running(Utc::now());
    Ok(Json(Dashboard { owner, products, store, flash_sale_running }))
}

pub async fn create_product(
    State(s): State<AppState>,
    _: OwnerSession,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = Product::create(req.into_draft()?);
    s.products.insert(&product).await?;
    s.events.publish(&product.id.to_string(), vec![DomainEvent::Product(ProductEvent::Created { product_id: product.id })]).await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn edit_product(State(s): State<AppState>, _: OwnerSession, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    Ok(Json(s.products.get(id).await?))
}

pub async fn update_product(
    State(s): State<AppState>,
    _: OwnerSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>> {
    let draft = req.into_draft()?;
    let mut product = s.products.get(id).await?;
    product.apply(draft);
    s.products.update(&product).await?;
    s.events.publish(&id.to_string(), vec![DomainEvent::Product(ProductEvent::Updated { product_id: id })]).await;
    Ok(Json(product))
}

pub async fn delete_product(State(s): State<AppState>, _: OwnerSession, Path(id): Path<Uuid>) -> Result<Json<Done>> {
    s.products.delete(id).await?;
    s.events.publish(&id.to_string(), vec![DomainEvent::Product(ProductEvent::Deleted { product_id: id })]).await;
    Ok(done("Product deleted successfully."))
}

async fn save_settings(s: &AppState, mut settings: StoreSettings) -> Result<()> {
    s.settings.save(&settings).await?;
    let id = settings.id().to_string();
    s.events.publish(&id, settings.take_events()).await;
    Ok(())
}

pub async fn gallery_upload(
    State(s): State<AppState>,
    _: OwnerSession,
    Json(req): Json<GalleryUpload>,
) -> Result<Json<Done>> {
    let mut settings = s.settings.load().await?;
    settings.add_gallery_image(&req.filename)?;
    save_settings(&s, settings).await?;
    Ok(done("Gallery image uploaded."))
}

pub async fn gallery_delete(State(s): State<AppState>, _: OwnerSession, Path(filename): Path<String>) -> Result<Json<Done>> {
    let mut settings = s.settings.load().await?;
    if settings.remove_gallery_image(&filename) > 0 {
        save_settings(&s, settings).await?;
    }
    Ok(done("Image removed from gallery."))
}

pub async fn flash_sale_update(
    State(s): State<AppState>,
    _: OwnerSession,
    Json(form): Json<FlashSaleForm>,
) -> Result<Json<Done>> {
    let flash_sale = FlashSale::from_form(&form)?;
    let mut settings = s.settings.load().await?;
    settings.schedule_flash_sale(flash_sale);
    save_settings(&s, settings).await?;
    Ok(done("Flash sale settings updated successfully."))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    Realm::Owner.sign_out(jar, Realm::Owner.login_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorefrontError;
    use serde_json::json;

    fn request(body: Value) -> ProductRequest { serde_json::from_value(body).unwrap() }

    #[test]
    fn test_product_request_defaults() {
        let draft = request(json!({"name": "Tote", "price": 100, "flashSale": "true", "collections": "flash-deals"})).into_draft().unwrap();
        assert!(draft.flash_sale);
        assert_eq!(draft.collections, vec![Collection::FlashDeals]);
        assert_eq!(draft.discount, None);
    }

    #[test]
    fn test_product_request_rejections() {
        let negative = request(json!({"name": "Tote", "price": -1}));
        assert!(matches!(negative.into_draft(), Err(StorefrontError::Validation(_))));
        let unnamed = request(json!({"name": "", "price": 1}));
        assert!(matches!(unnamed.into_draft(), Err(StorefrontError::Validation(_))));
        let unknown = request(json!({"name": "Tote", "price": 1, "collections": ["clearance"]}));
        assert!(matches!(unknown.into_draft(), Err(StorefrontError::InvalidProduct(_))));
    }
}
