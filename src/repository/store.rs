use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::aggregates::{FlashSale, StoreSettings};
use crate::Result;

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    id: String,
    gallery_images: Vec<String>,
    flash_sale_start: Option<DateTime<Utc>>,
    flash_sale_end: Option<DateTime<Utc>>,
    flash_sale_active: bool,
}

/// The store settings record, addressed by the configured store id.
#[derive(Clone)]
pub struct PgStoreSettingsRepository {
    db: PgPool,
    store_id: String,
}

impl PgStoreSettingsRepository {
    pub fn new(db: PgPool, store_id: impl Into<String>) -> Self { Self { db, store_id: store_id.into() } }

    /// Loads the settings, creating an empty record on first use.
    pub async fn load(&self) -> Result<StoreSettings> {
        sqlx::query("INSERT INTO store_settings (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(&self.store_id)
            .execute(&self.db)
            .await?;
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT id, gallery_images, flash_sale_start, flash_sale_end, flash_sale_active FROM store_settings WHERE id = $1",
        )
        .bind(&self.store_id)
        .fetch_one(&self.db)
        .await?;
        Ok(StoreSettings::restore(
            row.id,
            row.gallery_images,
            FlashSale { start_time: row.flash_sale_start, end_time: row.flash_sale_end, is_active: row.flash_sale_active },
        ))
    }

    pub async fn save(&self, settings: &StoreSettings) -> Result<()> {
        let sale = settings.flash_sale();
        sqlx::query("UPDATE store_settings SET gallery_images = $2, flash_sale_start = $3, flash_sale_end = $4, flash_sale_active = $5 WHERE id = $1")
            .bind(settings.id())
            .bind(settings.gallery_images())
            .bind(sale.start_time)
            .bind(sale.end_time)
            .bind(sale.is_active)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
