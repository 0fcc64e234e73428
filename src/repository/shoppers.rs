use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::domain::aggregates::Wishlist;
use crate::repository::CartStore;
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShopperProfile {
    pub id: Uuid,
    pub fullname: Option<String>,
    pub email: String,
    pub username: Option<String>,
    pub contact: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub picture: Option<String>,
}

/// Editable profile fields. Every field is written; `None` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub fullname: Option<String>,
    pub email: String,
    pub username: Option<String>,
    pub contact: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone)]
pub struct PgShopperRepository {
    db: PgPool,
}

impl PgShopperRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }

    pub async fn find_by_session(&self, token: &str) -> Result<Option<ShopperProfile>> {
        let shopper = sqlx::query_as::<_, ShopperProfile>(
            "SELECT id, fullname, email, username, contact, dob, address, city, state, country, picture FROM shoppers WHERE session_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;
        Ok(shopper)
    }

    pub async fn update_profile(&self, shopper: Uuid, changes: &ProfileChanges) -> Result<()> {
        let done = sqlx::query("UPDATE shoppers SET fullname = $2, email = $3, username = $4, contact = $5, dob = $6, address = $7, city = $8, state = $9, country = $10 WHERE id = $1")
            .bind(shopper).bind(&changes.fullname).bind(&changes.email).bind(&changes.username).bind(&changes.contact)
            .bind(changes.dob).bind(&changes.address).bind(&changes.city).bind(&changes.state).bind(&changes.country)
            .execute(&self.db)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StorefrontError::EmailTaken,
                _ => StorefrontError::Database(e),
            })?;
        if done.rows_affected() == 0 { return Err(StorefrontError::ShopperNotFound); }
        tracing::info!(%shopper, "profile updated");
        Ok(())
    }

    pub async fn update_picture(&self, shopper: Uuid, filename: &str) -> Result<()> {
        let done = sqlx::query("UPDATE shoppers SET picture = $2 WHERE id = $1")
            .bind(shopper)
            .bind(filename)
            .execute(&self.db)
            .await?;
        if done.rows_affected() == 0 { return Err(StorefrontError::ShopperNotFound); }
        Ok(())
    }

    pub async fn load_wishlist(&self, shopper: Uuid) -> Result<Wishlist> {
        let row: Option<(Vec<String>,)> = sqlx::query_as("SELECT wishlist FROM shoppers WHERE id = $1")
            .bind(shopper)
            .fetch_optional(&self.db)
            .await?;
        let (stored,) = row.ok_or(StorefrontError::ShopperNotFound)?;
        Ok(Wishlist::from_stored(stored.as_slice()))
    }

    pub async fn save_wishlist(&self, shopper: Uuid, wishlist: &Wishlist) -> Result<()> {
        let done = sqlx::query("UPDATE shoppers SET wishlist = $2 WHERE id = $1")
            .bind(shopper)
            .bind(wishlist.to_stored())
            .execute(&self.db)
            .await?;
        if done.rows_affected() == 0 { return Err(StorefrontError::ShopperNotFound); }
        Ok(())
    }
}

#[async_trait]
impl CartStore for PgShopperRepository {
    async fn load_cart(&self, shopper: Uuid) -> Result<Option<Vec<Value>>> {
        let row: Option<(Option<Json<Value>>,)> = sqlx::query_as("SELECT cart FROM shoppers WHERE id = $1")
            .bind(shopper)
            .fetch_optional(&self.db)
            .await?;
        let (cart,) = row.ok_or(StorefrontError::ShopperNotFound)?;
        Ok(match cart.map(|Json(v)| v) {
            Some(Value::Array(entries)) => Some(entries),
            _ => None,
        })
    }

    async fn save_cart(&self, shopper: Uuid, cart: &[Value]) -> Result<()> {
        let done = sqlx::query("UPDATE shoppers SET cart = $2 WHERE id = $1")
            .bind(shopper)
            .bind(Json(cart))
            .execute(&self.db)
            .await?;
        if done.rows_affected() == 0 { return Err(StorefrontError::ShopperNotFound); }
        tracing::debug!(%shopper, entries = cart.len(), "cart saved");
        Ok(())
    }
}
