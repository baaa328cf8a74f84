/// Landing page
pub const CATALOG_URL: &str = "/catalog";

/// Toy list page, where a deleted toy redirects to
pub const TOYS_URL: &str = "/catalog/toys";

/// Category list page, where a deleted category redirects to
pub const CATEGORIES_URL: &str = "/catalog/categories";
