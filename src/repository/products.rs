use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::aggregates::{Collection, Palette, PricedProduct, Product, ProductResolver};
use crate::domain::catalog::{CatalogQuery, Page, SortOrder};
use crate::domain::value_objects::ProductRef;
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    image: Option<String>,
    price: Option<Decimal>,
    discount: Option<Decimal>,
    bgcolor: Option<String>,
    panelcolor: Option<String>,
    textcolor: Option<String>,
    flash_sale: bool,
    category: String,
    brand: String,
    collections: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        let collections = r
            .collections
            .iter()
            .filter_map(|tag| match tag.parse::<Collection>() {
                Ok(c) => Some(c),
                Err(_) => {
                    tracing::warn!(product = %r.id, tag = %tag, "ignoring unknown collection tag");
                    None
                }
            })
            .collect();
        Product {
            id: r.id,
            name: r.name,
            image: r.image,
            price: r.price,
            discount: r.discount,
            palette: Palette { bgcolor: r.bgcolor, panelcolor: r.panelcolor, textcolor: r.textcolor },
            flash_sale: r.flash_sale,
            category: r.category,
            brand: r.brand,
            collections,
            created_at: r.created_at,
        }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &CatalogQuery) {
    qb.push(" WHERE TRUE");
    if let Some(category) = &q.category { qb.push(" AND category = ").push_bind(category.clone()); }
    if !q.brands.is_empty() { qb.push(" AND brand = ANY(").push_bind(q.brands.clone()).push(")"); }
    if let Some(min) = q.min_price { qb.push(" AND price >= ").push_bind(min); }
    if let Some(max) = q.max_price { qb.push(" AND price <= ").push_bind(max); }
}

fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Catalog => " ORDER BY created_at ASC, id ASC",
        SortOrder::Popular => " ORDER BY discount DESC NULLS LAST, id ASC",
        SortOrder::Newest => " ORDER BY created_at DESC, id DESC",
        SortOrder::PriceLow => " ORDER BY price ASC NULLS LAST, id ASC",
        SortOrder::PriceHigh => " ORDER BY price DESC NULLS LAST, id ASC",
    }
}

#[derive(Clone)]
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }

    pub async fn search(&self, q: &CatalogQuery) -> Result<Page<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count, q);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        push_filters(&mut select, q);
        select.push(order_clause(q.sort));
        select.push(" LIMIT ").push_bind(q.limit()).push(" OFFSET ").push_bind(q.offset());
        let rows: Vec<ProductRow> = select.build_query_as().fetch_all(&self.db).await?;

        Ok(Page::new(rows.into_iter().map(Product::from).collect(), total, q.page))
    }

    pub async fn all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products flagged with the legacy flash-sale switch.
    pub async fn flash_sale(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE flash_sale ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn in_collection(&self, collection: Collection) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE $1 = ANY(collections) ORDER BY created_at ASC, id ASC")
            .bind(collection.as_str())
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(Product::from)
            .ok_or(StorefrontError::ProductNotFound)
    }

    /// Fetches the products behind `refs`, in the order given. Unknown refs are skipped.
    pub async fn find_many(&self, refs: &[ProductRef]) -> Result<Vec<Product>> {
        let ids: Vec<Uuid> = refs.iter().filter_map(|r| Uuid::parse_str(r.as_str()).ok()).collect();
        if ids.is_empty() { return Ok(vec![]); }
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.db)
            .await?;
        let mut products: Vec<Product> = rows.into_iter().map(Product::from).collect();
        products.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
        Ok(products)
    }

    pub async fn insert(&self, p: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, name, image, price, discount, bgcolor, panelcolor, textcolor, flash_sale, category, brand, collections, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)")
            .bind(p.id).bind(&p.name).bind(&p.image).bind(p.price).bind(p.discount)
            .bind(&p.palette.bgcolor).bind(&p.palette.panelcolor).bind(&p.palette.textcolor)
            .bind(p.flash_sale).bind(&p.category).bind(&p.brand).bind(collection_tags(&p.collections)).bind(p.created_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn update(&self, p: &Product) -> Result<()> {
        let done = sqlx::query("UPDATE products SET name = $2, image = $3, price = $4, discount = $5, bgcolor = $6, panelcolor = $7, textcolor = $8, flash_sale = $9, category = $10, brand = $11, collections = $12 WHERE id = $1")
            .bind(p.id).bind(&p.name).bind(&p.image).bind(p.price).bind(p.discount)
            .bind(&p.palette.bgcolor).bind(&p.palette.panelcolor).bind(&p.palette.textcolor)
            .bind(p.flash_sale).bind(&p.category).bind(&p.brand).bind(collection_tags(&p.collections))
            .execute(&self.db)
            .await?;
        if done.rows_affected() == 0 { return Err(StorefrontError::ProductNotFound); }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.db).await?;
        if done.rows_affected() == 0 { return Err(StorefrontError::ProductNotFound); }
        Ok(())
    }
}

fn collection_tags(collections: &[Collection]) -> Vec<String> {
    collections.iter().map(|c| c.as_str().to_string()).collect()
}

#[async_trait]
impl ProductResolver for PgProductRepository {
    async fn resolve(&self, product: &ProductRef) -> Result<Option<PricedProduct>> {
        let Ok(id) = Uuid::parse_str(product.as_str()) else { return Ok(None) };
        let row: Option<(String, Option<Decimal>, Option<Decimal>)> =
            sqlx::query_as("SELECT name, price, discount FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(|(name, price, discount)| PricedProduct { id: product.clone(), name: Some(name), price, discount }))
    }
}
