use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::features::categories::models::Category;

/// Toy row without its category associations
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ToySummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub image: Option<String>,
}

/// Category as seen from a toy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
}

impl CategoryRef {
    pub fn url(&self) -> String {
        Category::url_for(self.id)
    }
}

/// Toy with its resolved categories, ordered by name
#[derive(Debug, Clone, PartialEq)]
pub struct Toy {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub image: Option<String>,
    pub categories: Vec<CategoryRef>,
}

impl Toy {
    pub fn from_summary(summary: ToySummary, categories: Vec<CategoryRef>) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            description: summary.description,
            price: summary.price,
            quantity_in_stock: summary.quantity_in_stock,
            image: summary.image,
            categories,
        }
    }

    /// Canonical URL of a toy page
    pub fn url_for(id: i32) -> String {
        format!("/catalog/toys/{}", id)
    }

    pub fn url(&self) -> String {
        Self::url_for(self.id)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }
}

impl ToySummary {
    pub fn url(&self) -> String {
        Toy::url_for(self.id)
    }
}

/// Validated toy fields ready to be written.
///
/// `categories` holds category names. On update, `image: None` keeps the
/// stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct NewToy {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub image: Option<String>,
    pub categories: Vec<String>,
}
