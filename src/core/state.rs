use std::sync::Arc;

use crate::modules::catalog::CatalogStore;
use crate::modules::storage::ImageStore;

/// Shared handles every catalog handler needs
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }
}
