//! Aggregates module
pub mod cart;
pub mod invoice;
pub mod product;
pub mod store;
pub mod wishlist;

pub use cart::{normalize, Cart, CartEntry, CartError, RawCartEntry};
pub use invoice::{compute_invoice, Invoice, InvoiceLine, PricedProduct, ProductResolver, PLATFORM_FEE};
pub use product::{Collection, Palette, Product, ProductDraft, ProductError};
pub use store::{FlashSale, FlashSaleForm, GalleryError, ScheduleError, StoreSettings};
pub use wishlist::{Wishlist, WishlistAction};
