//! In-memory doubles and an HTTP harness for handler tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum_test::TestServer;
use base64::prelude::*;
use rust_decimal::Decimal;

use crate::core::app::build_app;
use crate::core::error::{AppError, Result};
use crate::core::state::AppState;
use crate::features::auth::{Authorizer, StaticCredentials};
use crate::features::categories::models::Category;
use crate::features::toys::models::{CategoryRef, NewToy, Toy, ToySummary};
use crate::modules::catalog::CatalogStore;
use crate::modules::storage::{ImageStore, ImageUpload};

pub const ADMIN_USERNAME: &str = "gav";
pub const ADMIN_PASSWORD: &str = "password1";

/// `Authorization` header value for HTTP Basic credentials
pub fn basic_auth(username: &str, password: &str) -> HeaderValue {
    let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
    HeaderValue::from_str(&format!("Basic {}", encoded)).expect("valid header value")
}

/// Header carrying the admin credentials the test app accepts
pub fn admin_auth() -> HeaderValue {
    basic_auth(ADMIN_USERNAME, ADMIN_PASSWORD)
}

#[derive(Default)]
struct Catalog {
    next_toy_id: i32,
    next_category_id: i32,
    toys: Vec<ToySummary>,
    categories: Vec<Category>,
    /// (toy_id, category_id)
    links: BTreeSet<(i32, i32)>,
}

impl Catalog {
    fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.to_lowercase() == name.to_lowercase())
    }

    fn resolve(&self, names: &[String]) -> Result<Vec<i32>> {
        names
            .iter()
            .map(|name| {
                self.category_by_name(name)
                    .map(|c| c.id)
                    .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", name)))
            })
            .collect()
    }

    fn toy(&self, id: i32) -> Option<Toy> {
        let summary = self.toys.iter().find(|t| t.id == id)?.clone();
        let mut categories: Vec<CategoryRef> = self
            .links
            .iter()
            .filter(|(toy_id, _)| *toy_id == id)
            .filter_map(|(_, category_id)| self.categories.iter().find(|c| c.id == *category_id))
            .map(|c| CategoryRef {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Some(Toy::from_summary(summary, categories))
    }

    fn name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.category_by_name(name)
            .is_some_and(|c| Some(c.id) != except)
    }
}

/// [`CatalogStore`] backed by plain collections.
///
/// Mirrors the PostgreSQL store: name ordering, case-insensitive category
/// names, and all-or-nothing toy writes.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    inner: Mutex<Catalog>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn catalog(&self) -> MutexGuard<'_, Catalog> {
        self.inner.lock().expect("catalog lock poisoned")
    }

    /// Every (toy_id, category_id) association
    pub fn links(&self) -> Vec<(i32, i32)> {
        self.catalog().links.iter().copied().collect()
    }

    pub fn category_count(&self) -> usize {
        self.catalog().categories.len()
    }

    pub fn toy_count(&self) -> usize {
        self.catalog().toys.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_toys(&self) -> Result<Vec<Toy>> {
        let catalog = self.catalog();
        let mut toys: Vec<Toy> = catalog.toys.iter().filter_map(|t| catalog.toy(t.id)).collect();
        toys.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(toys)
    }

    async fn get_toy(&self, id: i32) -> Result<Option<Toy>> {
        Ok(self.catalog().toy(id))
    }

    async fn create_toy(&self, toy: NewToy) -> Result<Toy> {
        let mut catalog = self.catalog();
        let category_ids = catalog.resolve(&toy.categories)?;

        catalog.next_toy_id += 1;
        let id = catalog.next_toy_id;
        catalog.toys.push(ToySummary {
            id,
            name: toy.name,
            description: toy.description,
            price: toy.price,
            quantity_in_stock: toy.quantity_in_stock,
            image: toy.image,
        });
        for category_id in category_ids {
            catalog.links.insert((id, category_id));
        }

        catalog
            .toy(id)
            .ok_or_else(|| AppError::Internal("toy vanished".to_string()))
    }

    async fn update_toy(&self, id: i32, toy: NewToy) -> Result<Toy> {
        let mut catalog = self.catalog();
        if !catalog.toys.iter().any(|t| t.id == id) {
            return Err(AppError::NotFound(format!("Toy {} not found", id)));
        }
        let category_ids = catalog.resolve(&toy.categories)?;

        if let Some(row) = catalog.toys.iter_mut().find(|t| t.id == id) {
            row.name = toy.name;
            row.description = toy.description;
            row.price = toy.price;
            row.quantity_in_stock = toy.quantity_in_stock;
            if toy.image.is_some() {
                row.image = toy.image;
            }
        }
        catalog.links.retain(|(toy_id, _)| *toy_id != id);
        for category_id in category_ids {
            catalog.links.insert((id, category_id));
        }

        catalog
            .toy(id)
            .ok_or_else(|| AppError::NotFound(format!("Toy {} not found", id)))
    }

    async fn delete_toy(&self, id: i32) -> Result<()> {
        let mut catalog = self.catalog();
        let before = catalog.toys.len();
        catalog.toys.retain(|t| t.id != id);
        if catalog.toys.len() == before {
            return Err(AppError::NotFound(format!("Toy {} not found", id)));
        }
        catalog.links.retain(|(toy_id, _)| *toy_id != id);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.catalog().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>> {
        Ok(self.catalog().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self.catalog().category_by_name(name).cloned())
    }

    async fn create_category(&self, name: &str, description: &str) -> Result<Category> {
        let mut catalog = self.catalog();
        if catalog.name_taken(name, None) {
            return Err(AppError::Conflict(format!(
                "A category named '{}' already exists",
                name
            )));
        }

        catalog.next_category_id += 1;
        let category = Category {
            id: catalog.next_category_id,
            name: name.to_string(),
            description: description.to_string(),
        };
        catalog.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i32, name: &str, description: &str) -> Result<Category> {
        let mut catalog = self.catalog();
        if catalog.name_taken(name, Some(id)) {
            return Err(AppError::Conflict(format!(
                "A category named '{}' already exists",
                name
            )));
        }

        let category = catalog
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
        category.name = name.to_string();
        category.description = description.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i32) -> Result<()> {
        let mut catalog = self.catalog();
        // The join table's foreign key refuses this in PostgreSQL
        if catalog.links.iter().any(|(_, category_id)| *category_id == id) {
            return Err(AppError::Conflict(format!("Category {} still has toys", id)));
        }
        let before = catalog.categories.len();
        catalog.categories.retain(|c| c.id != id);
        if catalog.categories.len() == before {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }

    async fn toys_in_category(&self, category_id: i32) -> Result<Vec<ToySummary>> {
        let catalog = self.catalog();
        let mut toys: Vec<ToySummary> = catalog
            .toys
            .iter()
            .filter(|t| catalog.links.contains(&(t.id, category_id)))
            .cloned()
            .collect();
        toys.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(toys)
    }

    async fn count_toys(&self) -> Result<i64> {
        Ok(self.catalog().toys.len() as i64)
    }

    async fn count_categories(&self) -> Result<i64> {
        Ok(self.catalog().categories.len() as i64)
    }
}

/// [`ImageStore`] that remembers what it was asked to do
#[derive(Default)]
pub struct FakeImageStore {
    uploads: Mutex<Vec<ImageUpload>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeImageStore {
    pub fn uploads(&self) -> Vec<ImageUpload> {
        self.uploads.lock().expect("uploads lock poisoned").clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("deleted lock poisoned").clone()
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(&self, image: ImageUpload) -> Result<String> {
        let mut uploads = self.uploads.lock().expect("uploads lock poisoned");
        uploads.push(image);
        Ok(format!(
            "https://images.test/toy-inventory/toy_photos/{}.img",
            uploads.len()
        ))
    }

    async fn delete_by_url(&self, url: &str) -> Result<()> {
        self.deleted
            .lock()
            .expect("deleted lock poisoned")
            .push(url.to_string());
        Ok(())
    }
}

/// The full router wired to in-memory doubles
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryCatalogStore>,
    pub images: Arc<FakeImageStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryCatalogStore::new());
        let images = Arc::new(FakeImageStore::default());
        let authorizer: Arc<dyn Authorizer> =
            Arc::new(StaticCredentials::new(ADMIN_USERNAME, ADMIN_PASSWORD));

        let state = AppState::new(store.clone(), images.clone());
        let app = build_app(state, authorizer, 8 * 1024 * 1024);
        let server = TestServer::new(app).expect("failed to build test server");

        Self {
            server,
            store,
            images,
        }
    }

    /// Sports, Water and Outdoor, plus a Ball in Sports and a Water Gun in
    /// Water and Outdoor
    pub async fn seeded() -> Self {
        let app = Self::new();
        for (name, description) in [
            ("Sports", "Toys for playing sports"),
            ("Water", "Toys for playing in water"),
            ("Outdoor", "Toys for playing outside"),
        ] {
            app.store
                .create_category(name, description)
                .await
                .expect("seed category");
        }
        app.store
            .create_toy(new_toy("Ball", "10.99", &["Sports"]))
            .await
            .expect("seed toy");
        app.store
            .create_toy(new_toy("Water Gun", "5.99", &["Water", "Outdoor"]))
            .await
            .expect("seed toy");
        app
    }
}

/// A valid toy with the given name, price and category names
pub fn new_toy(name: &str, price: &str, categories: &[&str]) -> NewToy {
    NewToy {
        name: name.to_string(),
        description: format!("{} for testing purposes", name),
        price: price.parse::<Decimal>().expect("valid price"),
        quantity_in_stock: 10,
        image: None,
        categories: categories.iter().map(|c| c.to_string()).collect(),
    }
}
