//! Storefront
//!
//! Server-side storefront: shoppers browse the catalog, keep a cart and a
//! wishlist and check out; the store owner manages products, the gallery and
//! the flash-sale schedule.
//!
//! ## Features
//! - Cart reconciliation (legacy list carts migrated to quantity-bearing carts)
//! - Invoice computation with stale product pruning
//! - Catalog filtering, sorting and pagination
//! - Wishlist
//! - Store settings: gallery images and flash-sale schedule

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod events;
pub mod http;
pub mod repository;
pub mod service;

pub use config::Config;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Shopper not found")]
    ShopperNotFound,

    #[error("Email already in use")]
    EmailTaken,

    #[error(transparent)]
    InvalidProduct(#[from] domain::aggregates::ProductError),

    #[error("Invalid flash sale schedule: {0}")]
    InvalidSchedule(#[from] domain::aggregates::ScheduleError),

    #[error("Invalid gallery image: {0}")]
    InvalidGalleryImage(#[from] domain::aggregates::GalleryError),

    #[error("Invalid product reference")]
    InvalidProductRef(#[from] domain::value_objects::ProductRefError),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
