use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl Category {
    /// Canonical URL of a category page
    pub fn url_for(id: i32) -> String {
        format!("/catalog/categories/{}", id)
    }

    pub fn url(&self) -> String {
        Self::url_for(self.id)
    }
}
