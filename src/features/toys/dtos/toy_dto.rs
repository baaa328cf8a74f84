use serde::Serialize;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::features::toys::models::{NewToy, Toy, ToySummary};
use crate::modules::storage::ImageUpload;
use crate::shared::validation::{
    error_messages, parse_price, parse_quantity, validate_name_length, validate_price,
    validate_quantity,
};

/// Submitted toy form, also echoed back when re-rendering.
///
/// Price and quantity stay as text so a rejected value is shown exactly as
/// it was typed.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ToyForm {
    #[validate(
        length(min = 3, message = "Name must be at least 3 letters long"),
        custom(function = "validate_name_length")
    )]
    pub name: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,

    #[validate(custom(function = "validate_price"))]
    pub price: String,

    #[validate(custom(function = "validate_quantity"))]
    pub quantity_in_stock: String,

    /// Category names
    pub category: Vec<String>,
}

impl ToyForm {
    const FIELDS: &'static [&'static str] = &["name", "description", "price", "quantity_in_stock"];

    /// Trim every field; drop blank and repeated category names
    pub fn normalize(self) -> Self {
        let mut category: Vec<String> = Vec::with_capacity(self.category.len());
        for name in self.category {
            let name = name.trim();
            if !name.is_empty() && !category.iter().any(|c| c == name) {
                category.push(name.to_string());
            }
        }

        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            quantity_in_stock: self.quantity_in_stock.trim().to_string(),
            category,
        }
    }

    /// Typed toy fields, or every error message in form order.
    ///
    /// The returned [`NewToy`] has no image; the caller attaches one after
    /// uploading it.
    pub fn parse(&self) -> Result<NewToy, Vec<String>> {
        if let Err(e) = self.validate() {
            return Err(error_messages(&e, Self::FIELDS));
        }

        let price = parse_price(&self.price).map_err(|e| vec![message_of(&e)])?;
        let quantity_in_stock =
            parse_quantity(&self.quantity_in_stock).map_err(|e| vec![message_of(&e)])?;

        Ok(NewToy {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            quantity_in_stock,
            image: None,
            categories: self.category.clone(),
        })
    }
}

fn message_of(error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

impl From<&Toy> for ToyForm {
    fn from(toy: &Toy) -> Self {
        Self {
            name: toy.name.clone(),
            description: toy.description.clone(),
            price: toy.price.to_string(),
            quantity_in_stock: toy.quantity_in_stock.to_string(),
            category: toy.category_names(),
        }
    }
}

/// Allowed MIME types for toy images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum image size in bytes (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

pub fn image_errors(image: &ImageUpload) -> Vec<String> {
    let mut errors = Vec::new();

    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        errors.push("Image must be a JPEG, PNG, GIF or WebP file".to_string());
    }
    if image.data.len() > MAX_IMAGE_SIZE {
        errors.push(format!(
            "Image is too large. Maximum size is {} MB",
            MAX_IMAGE_SIZE / 1024 / 1024
        ));
    }

    errors
}

/// A category checkbox on the toy form
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub selected: bool,
}

/// Pair every category with whether `selected` names it
pub fn category_options(categories: &[Category], selected: &[String]) -> Vec<CategoryOption> {
    let selected: Vec<String> = selected.iter().map(|s| s.to_lowercase()).collect();

    categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id,
            name: c.name.clone(),
            url: c.url(),
            selected: selected.contains(&c.name.to_lowercase()),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryLinkView {
    pub name: String,
    pub url: String,
}

/// Toy as rendered in templates
#[derive(Debug, Clone, Serialize)]
pub struct ToyView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity_in_stock: i32,
    pub image: Option<String>,
    pub url: String,
    pub categories: Vec<CategoryLinkView>,
}

impl From<&Toy> for ToyView {
    fn from(toy: &Toy) -> Self {
        Self {
            id: toy.id,
            name: toy.name.clone(),
            description: toy.description.clone(),
            price: toy.price.to_string(),
            quantity_in_stock: toy.quantity_in_stock,
            image: toy.image.clone(),
            url: toy.url(),
            categories: toy
                .categories
                .iter()
                .map(|c| CategoryLinkView {
                    name: c.name.clone(),
                    url: c.url(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToySummaryView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub quantity_in_stock: i32,
    pub url: String,
}

impl From<&ToySummary> for ToySummaryView {
    fn from(toy: &ToySummary) -> Self {
        Self {
            id: toy.id,
            name: toy.name.clone(),
            price: toy.price.to_string(),
            quantity_in_stock: toy.quantity_in_stock,
            url: toy.url(),
        }
    }
}
