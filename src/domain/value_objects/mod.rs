//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{Add, Sub};

/// Opaque product reference as stored in carts and wishlists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(String);

impl ProductRef {
    pub fn new(value: impl Into<String>) -> Result<Self, ProductRefError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(ProductRefError::Empty); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }

    /// Reads a reference out of a stored value: a bare string or number, an
    /// extended-json `{"$oid"}` or a populated product document carrying `_id`
    /// or `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()).ok(),
            Value::Number(n) => Self::new(n.to_string()).ok(),
            Value::Object(doc) => match doc.get("$oid") {
                Some(oid) => oid.as_str().and_then(|s| Self::new(s).ok()),
                None => doc.get("_id").or_else(|| doc.get("id")).and_then(|id| match id {
                    Value::Object(_) | Value::String(_) | Value::Number(_) => Self::from_value(id),
                    _ => None,
                }),
            },
            _ => None,
        }
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProductRefError {
    #[error("product reference empty")]
    Empty,
}

/// Cart line quantity. Never below one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(1, i64::from(u32::MAX)) as u32)
    }

    /// Lenient read of a stored or requested quantity. Numbers are truncated,
    /// numeric strings are parsed, anything else counts as one.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::clamped(i),
                None => n.as_f64().filter(|f| f.is_finite()).map_or(Self::ONE, |f| Self::clamped(f.trunc() as i64)),
            },
            Value::String(s) => Self::parse(s),
            _ => Self::ONE,
        }
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() { return Self::clamped(i); }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::clamped(f.trunc() as i64),
            _ => Self::ONE,
        }
    }

    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
    pub fn increment(&self) -> Self { self.add(Self::ONE) }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

/// Money value object. Amounts are plain decimals in the store currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub const fn whole(units: u32) -> Self { Self(Decimal::from_parts(units, 0, 0, false, 0)) }
    pub fn from_units(units: i64) -> Self { Self(Decimal::from(units)) }
    /// Missing amounts count as zero.
    pub fn lenient(amount: Option<Decimal>) -> Self { Self(amount.unwrap_or(Decimal::ZERO)) }
    pub fn amount(&self) -> Decimal { self.0 }
    /// Saturates at the decimal range instead of overflowing.
    pub fn multiply(&self, qty: Quantity) -> Money { Money(self.0.saturating_mul(Decimal::from(qty.value()))) }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money { Money(self.0.saturating_add(rhs.0)) }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money { Money(self.0.saturating_sub(rhs.0)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_ref() {
        assert_eq!(ProductRef::new("  p1 ").unwrap().as_str(), "p1");
        assert!(ProductRef::new("   ").is_err());
        assert_eq!(ProductRef::from_value(&json!({"_id": "abc", "price": 10})).unwrap().as_str(), "abc");
        assert_eq!(ProductRef::from_value(&json!({"_id": {"$oid": "def"}})).unwrap().as_str(), "def");
        assert_eq!(ProductRef::from_value(&json!(42)).unwrap().as_str(), "42");
        assert_eq!(ProductRef::from_value(&json!({"$oid": "ghi"})).unwrap().as_str(), "ghi");
        assert!(ProductRef::from_value(&json!(null)).is_none());
        assert!(ProductRef::from_value(&json!({"price": 10})).is_none());
    }

    #[test]
    fn test_quantity_leniency() {
        assert_eq!(Quantity::from_value(&json!(3)).value(), 3);
        assert_eq!(Quantity::from_value(&json!(-3)).value(), 1);
        assert_eq!(Quantity::from_value(&json!(0)).value(), 1);
        assert_eq!(Quantity::from_value(&json!("4")).value(), 4);
        assert_eq!(Quantity::from_value(&json!(2.9)).value(), 2);
        assert_eq!(Quantity::from_value(&json!("abc")).value(), 1);
        assert_eq!(Quantity::from_value(&Value::Null).value(), 1);
    }

    #[test]
    fn test_money_arithmetic() {
        let unit = Money::from_units(100) - Money::from_units(15);
        assert_eq!(unit.multiply(Quantity::clamped(3)), Money::from_units(255));
        assert_eq!(Money::lenient(None), Money::ZERO);
    }

    #[test]
    fn test_money_saturates() {
        let huge = Money(Decimal::MAX);
        let line = huge.multiply(Quantity::clamped(i64::from(u32::MAX)));
        assert_eq!(line, Money(Decimal::MAX));
        assert_eq!(line + huge, Money(Decimal::MAX));
        assert_eq!(Money(Decimal::MIN) - huge, Money(Decimal::MIN));
    }
}
