//! Catalog records
//!
//! Products and categories are admin-owned reference data. The cart and
//! order core only reads product id, price, and display attributes; it does
//! not validate catalog membership.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    /// Slug of the owning category; products are listed per category page.
    pub category: Option<String>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn slugify(name: &str) -> String { name.trim().to_lowercase().replace(' ', "-") }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_slugify() {
        assert_eq!(Category::slugify("Coffee Mugs"), "coffee-mugs");
        assert_eq!(Category::slugify("  T Shirts "), "t-shirts");
    }
}
