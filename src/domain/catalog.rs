//! Catalog listing: filters, sort order and pagination for the shop pages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const PRODUCTS_PER_PAGE: u32 = 6;

/// Name used by the shop page for "no category filter".
const ALL_CATEGORIES: &str = "All";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Catalog,
    /// Biggest discount first.
    Popular,
    Newest,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("popular") => Self::Popular,
            Some("newest") => Self::Newest,
            Some("price_low") => Self::PriceLow,
            Some("price_high") => Self::PriceHigh,
            _ => Self::Catalog,
        }
    }
}

/// Query-string parameters of `/shop` and `/category/:name`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub sortby: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Vec<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub brands: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortOrder,
    pub page: u32,
}

impl CatalogQuery {
    pub fn from_params(params: &CatalogParams) -> Self {
        let category = params
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        let brands = params.brand.iter().map(|b| b.trim()).filter(|b| !b.is_empty()).map(str::to_string).collect();
        Self {
            category,
            brands,
            min_price: parse_price(params.min_price.as_deref()),
            max_price: parse_price(params.max_price.as_deref()),
            sort: SortOrder::parse(params.sortby.as_deref()),
            page: parse_page(params.page.as_deref()),
        }
    }

    /// Category pages take the category from the path and ignore the query one.
    pub fn for_category(params: &CatalogParams, category: &str) -> Self {
        Self { category: Some(category.to_string()), ..Self::from_params(params) }
    }

    pub fn limit(&self) -> i64 { i64::from(PRODUCTS_PER_PAGE) }
    pub fn offset(&self) -> i64 { i64::from(self.page.max(1) - 1) * self.limit() }
}

fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim).filter(|s| !s.is_empty()).and_then(|s| Decimal::from_str(s).ok())
}

fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map_or(1, |p| p.clamp(1, i64::from(u32::MAX)) as u32)
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, current_page: u32) -> Self {
        let total_pages = (total.max(0) as u64).div_ceil(u64::from(PRODUCTS_PER_PAGE)) as u32;
        Self { items, total, current_page, total_pages }
    }
}
