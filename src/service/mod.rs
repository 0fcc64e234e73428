pub mod cart;

pub use cart::{CartService, CartView, CleanupReport, DynCartStore, DynProductResolver, QuantityUpdate};
