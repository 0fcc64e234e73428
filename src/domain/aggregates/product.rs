//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_BRAND: &str = "Other";

/// Curated shelves shown on the shop page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    FlashDeals,
    TodaysForYou,
    ElegantFashion,
    SimilarItems,
}

impl Collection {
    pub const ALL: [Collection; 4] = [Self::FlashDeals, Self::TodaysForYou, Self::ElegantFashion, Self::SimilarItems];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashDeals => "flash-deals",
            Self::TodaysForYou => "todays-for-you",
            Self::ElegantFashion => "elegant-fashion",
            Self::SimilarItems => "similar-items",
        }
    }

    /// Parses a list of collection tags, rejecting the first unknown one.
    pub fn parse_all<S: AsRef<str>>(tags: &[S]) -> Result<Vec<Collection>, ProductError> {
        let mut out = Vec::with_capacity(tags.len());
        for tag in tags {
            let collection = tag.as_ref().parse()?;
            if !out.contains(&collection) { out.push(collection); }
        }
        Ok(out)
    }
}

impl FromStr for Collection {
    type Err = ProductError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s.trim()).ok_or_else(|| ProductError::UnknownCollection(s.to_string()))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub bgcolor: Option<String>,
    pub panelcolor: Option<String>,
    pub textcolor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub palette: Palette,
    pub flash_sale: bool,
    pub category: String,
    pub brand: String,
    pub collections: Vec<Collection>,
    pub created_at: DateTime<Utc>,
}

/// Fields an owner supplies when creating or editing a product.
#[derive(Clone, Debug, Default)]
pub struct ProductDraft {
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub palette: Palette,
    pub flash_sale: bool,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub collections: Vec<Collection>,
}

impl Product {
    pub fn create(draft: ProductDraft) -> Self {
        let mut product = Self {
            id: Uuid::now_v7(),
            name: String::new(),
            image: None,
            price: None,
            discount: None,
            palette: Palette::default(),
            flash_sale: false,
            category: DEFAULT_CATEGORY.to_string(),
            brand: DEFAULT_BRAND.to_string(),
            collections: vec![],
            created_at: Utc::now(),
        };
        product.apply(draft);
        product
    }

    /// Applies an edit. The image is only replaced when the draft carries one.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name.trim().to_string();
        if let Some(image) = draft.image.filter(|i| !i.trim().is_empty()) { self.image = Some(image); }
        self.price = Some(draft.price);
        self.discount = Some(draft.discount.unwrap_or(Decimal::ZERO));
        self.palette = draft.palette;
        self.flash_sale = draft.flash_sale;
        self.category = non_blank(draft.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        self.brand = non_blank(draft.brand).unwrap_or_else(|| DEFAULT_BRAND.to_string());
        self.collections = draft.collections;
    }

}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}
