//! Cart Aggregate
//!
//! The cart is a plain collection keyed by line identity, not a state
//! machine. Two lines merge only when every identity field matches; a
//! difference in any one of them keeps them as separate lines.

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

/// Identity key of a cart line: same key means "the same purchasable
/// configuration" and the lines merge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub custom_text: Option<String>,
    pub custom_image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub image: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub custom_text: Option<String>,
    /// Data URI or external reference to an uploaded customization image.
    #[serde(default)]
    pub custom_image: Option<String>,
}

impl CartLine {
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
            custom_text: self.custom_text.clone(),
            custom_image: self.custom_image.clone(),
        }
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

/// Immutable point-in-time copy of the cart, used by checkout to decouple
/// its computations from later mutations.
#[derive(Clone, Debug)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total: Money,
}

#[derive(Clone, Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: String,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { lines: vec![], currency: currency.to_string() }
    }

    /// Rebuilds a cart from previously persisted lines. Quantities below 1
    /// are clamped back to 1 to restore the invariant.
    pub fn from_lines(lines: Vec<CartLine>, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        cart.lines = lines;
        for line in &mut cart.lines {
            line.quantity = line.quantity.max(1);
        }
        cart
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Adds a line. A line matching the full identity key has its quantity
    /// incremented by 1 and keeps its stored price and attributes; otherwise
    /// the line is appended with quantity 1.
    pub fn add(&mut self, line: CartLine) {
        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.key() == key) {
            existing.quantity += 1;
        } else {
            self.lines.push(CartLine { quantity: 1, ..line });
        }
    }

    /// Sets the quantity of the line addressed by `key`, clamped to a
    /// minimum of 1. Removal is only ever explicit via [`Cart::remove`].
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i32) -> Result<(), CartError> {
        let line = self.lines.iter_mut().find(|l| l.key() == *key).ok_or(CartError::LineNotFound)?;
        line.quantity = quantity.max(1) as u32;
        Ok(())
    }

    /// Removes the line addressed by `key`. A miss is a no-op, not an error.
    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|l| l.key() != *key);
    }

    pub fn clear(&mut self) { self.lines.clear(); }

    pub fn total(&self) -> Money {
        self.lines.iter().fold(Money::zero(&self.currency), |acc, l| acc.add(&l.line_total()).unwrap_or(acc))
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot { lines: self.lines.clone(), total: self.total() }
    }
}

#[derive(Debug, Clone)] pub enum CartError { LineNotFound }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Line not found") }
}
