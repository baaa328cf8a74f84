use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::{error_messages, validate_name_length};

/// Submitted category form, also echoed back when re-rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryForm {
    #[serde(default)]
    #[validate(
        length(min = 3, message = "Category must have at least 3 letters"),
        custom(function = "validate_name_length")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Category must have a description"))]
    pub description: String,
}

impl CategoryForm {
    const FIELDS: &'static [&'static str] = &["name", "description"];

    /// Trim every field
    pub fn normalize(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }

    /// Error messages in form order; empty when the form is valid
    pub fn errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => error_messages(&e, Self::FIELDS),
        }
    }
}

impl From<&Category> for CategoryForm {
    fn from(c: &Category) -> Self {
        Self {
            name: c.name.clone(),
            description: c.description.clone(),
        }
    }
}

/// Category as rendered in templates
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub url: String,
}

impl From<&Category> for CategoryView {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone(),
            url: c.url(),
        }
    }
}
