//! Wishlist Aggregate

use serde::Serialize;

use crate::domain::value_objects::ProductRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistAction {
    Added,
    Removed,
}

impl WishlistAction {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Added => "Added to wishlist",
            Self::Removed => "Removed from wishlist",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wishlist {
    items: Vec<ProductRef>,
}

impl Wishlist {
    /// Builds a wishlist from stored references, dropping blanks and repeats.
    pub fn from_stored<S: AsRef<str>>(stored: &[S]) -> Self {
        let mut items: Vec<ProductRef> = Vec::with_capacity(stored.len());
        for product in stored.iter().filter_map(|s| ProductRef::new(s.as_ref()).ok()) {
            if !items.contains(&product) { items.push(product); }
        }
        Self { items }
    }

    pub fn items(&self) -> &[ProductRef] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn toggle(&mut self, product: ProductRef) -> WishlistAction {
        if self.remove(&product) {
            WishlistAction::Removed
        } else {
            self.items.push(product);
            WishlistAction::Added
        }
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, product: &ProductRef) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p != product);
        self.items.len() != before
    }

    pub fn to_stored(&self) -> Vec<String> {
        self.items.iter().map(|p| p.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ProductRef { ProductRef::new(id).unwrap() }

    #[test]
    fn test_toggle() {
        let mut wishlist = Wishlist::default();
        assert_eq!(wishlist.toggle(p("a")), WishlistAction::Added);
        assert_eq!(wishlist.toggle(p("b")), WishlistAction::Added);
        assert_eq!(wishlist.toggle(p("a")), WishlistAction::Removed);
        assert_eq!(wishlist.to_stored(), vec!["b".to_string()]);
    }

    #[test]
    fn test_stored_duplicates_collapsed() {
        let mut wishlist = Wishlist::from_stored(["a", "a", " ", "b"].as_slice());
        assert_eq!(wishlist.len(), 2);
        assert!(wishlist.remove(&p("a")));
        assert!(!wishlist.remove(&p("a")));
        assert_eq!(wishlist.len(), 1);
    }
}
