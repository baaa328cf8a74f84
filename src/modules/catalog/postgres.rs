use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};

use super::CatalogStore;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::toys::models::{CategoryRef, NewToy, Toy, ToySummary};

/// One toy-to-category link with the category name resolved
#[derive(Debug, Clone, FromRow)]
struct ToyCategoryRow {
    toy_id: i32,
    category_id: i32,
    category_name: String,
}

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn links_for(&self, toy_id: Option<i32>) -> Result<Vec<ToyCategoryRow>> {
        let links = sqlx::query_as::<_, ToyCategoryRow>(
            r#"
            SELECT tc.toy_id, c.id AS category_id, c.name AS category_name
            FROM toy_categories tc
            JOIN categories c ON c.id = tc.category_id
            WHERE $1::int4 IS NULL OR tc.toy_id = $1
            ORDER BY c.name, c.id
            "#,
        )
        .bind(toy_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load toy categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(links)
    }
}

/// Group category links under their toys, keeping the toys' order
fn attach_categories(toys: Vec<ToySummary>, links: Vec<ToyCategoryRow>) -> Vec<Toy> {
    let mut by_toy: HashMap<i32, Vec<CategoryRef>> = HashMap::new();
    for link in links {
        by_toy.entry(link.toy_id).or_default().push(CategoryRef {
            id: link.category_id,
            name: link.category_name,
        });
    }

    toys.into_iter()
        .map(|toy| {
            let categories = by_toy.remove(&toy.id).unwrap_or_default();
            Toy::from_summary(toy, categories)
        })
        .collect()
}

/// Resolve category names (case-insensitive) to ids.
///
/// Fails with `NotFound` naming the first unknown category.
async fn resolve_category_ids(conn: &mut PgConnection, names: &[String]) -> Result<Vec<i32>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let rows: Vec<(i32, String)> = sqlx::query_as(
        "SELECT id, LOWER(name) FROM categories WHERE LOWER(name) = ANY($1)",
    )
    .bind(&lowered)
    .fetch_all(&mut *conn)
    .await?;

    let mut ids = Vec::with_capacity(names.len());
    for (name, lower) in names.iter().zip(&lowered) {
        let id = rows
            .iter()
            .find(|(_, n)| n == lower)
            .map(|(id, _)| *id)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", name)))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

async fn link_categories(conn: &mut PgConnection, toy_id: i32, category_ids: &[i32]) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO toy_categories (toy_id, category_id)
        SELECT $1, UNNEST($2::int4[])
        ON CONFLICT (toy_id, category_id) DO NOTHING
        "#,
    )
    .bind(toy_id)
    .bind(category_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn category_write_error(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict(format!("A category named '{}' already exists", name));
        }
    }
    tracing::error!("Failed to write category: {:?}", e);
    AppError::Database(e)
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_toys(&self) -> Result<Vec<Toy>> {
        let toys = sqlx::query_as::<_, ToySummary>(
            r#"
            SELECT id, name, description, price, quantity_in_stock, image
            FROM toys
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list toys: {:?}", e);
            AppError::Database(e)
        })?;

        let links = self.links_for(None).await?;
        Ok(attach_categories(toys, links))
    }

    async fn get_toy(&self, id: i32) -> Result<Option<Toy>> {
        let toy = sqlx::query_as::<_, ToySummary>(
            r#"
            SELECT id, name, description, price, quantity_in_stock, image
            FROM toys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get toy {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        let Some(toy) = toy else {
            return Ok(None);
        };

        let links = self.links_for(Some(id)).await?;
        Ok(attach_categories(vec![toy], links).pop())
    }

    async fn create_toy(&self, toy: NewToy) -> Result<Toy> {
        let mut tx = self.pool.begin().await?;

        let category_ids = resolve_category_ids(&mut tx, &toy.categories).await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO toys (name, description, price, quantity_in_stock, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&toy.name)
        .bind(&toy.description)
        .bind(toy.price)
        .bind(toy.quantity_in_stock)
        .bind(&toy.image)
        .fetch_one(&mut *tx)
        .await?;

        link_categories(&mut tx, id, &category_ids).await?;

        tx.commit().await?;

        tracing::info!(
            "Toy created: id={}, name={}, categories={:?}",
            id,
            toy.name,
            category_ids
        );

        self.get_toy(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Toy {} vanished after insert", id)))
    }

    async fn update_toy(&self, id: i32, toy: NewToy) -> Result<Toy> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE toys
            SET name = $1, description = $2, price = $3, quantity_in_stock = $4,
                image = COALESCE($5, image)
            WHERE id = $6
            "#,
        )
        .bind(&toy.name)
        .bind(&toy.description)
        .bind(toy.price)
        .bind(toy.quantity_in_stock)
        .bind(&toy.image)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Toy {} not found", id)));
        }

        let category_ids = resolve_category_ids(&mut tx, &toy.categories).await?;

        sqlx::query(
            r#"
            DELETE FROM toy_categories
            WHERE toy_id = $1 AND NOT (category_id = ANY($2::int4[]))
            "#,
        )
        .bind(id)
        .bind(&category_ids)
        .execute(&mut *tx)
        .await?;

        link_categories(&mut tx, id, &category_ids).await?;

        tx.commit().await?;

        tracing::info!(
            "Toy updated: id={}, name={}, categories={:?}",
            id,
            toy.name,
            category_ids
        );

        self.get_toy(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Toy {} not found", id)))
    }

    async fn delete_toy(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM toy_categories WHERE toy_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM toys WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Toy {} not found", id)));
        }

        tx.commit().await?;

        tracing::info!("Toy deleted: id={}", id);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description
            FROM categories
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(category)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find category by name: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(category)
    }

    async fn create_category(&self, name: &str, description: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| category_write_error(e, name))?;

        tracing::info!(
            "Category created: id={}, name={}",
            category.id,
            category.name
        );

        Ok(category)
    }

    async fn update_category(&self, id: i32, name: &str, description: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| category_write_error(e, name))?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!(
            "Category updated: id={}, name={}",
            category.id,
            category.name
        );

        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return AppError::Conflict(format!("Category {} still has toys", id));
                    }
                }
                tracing::error!("Failed to delete category {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }

    async fn toys_in_category(&self, category_id: i32) -> Result<Vec<ToySummary>> {
        let toys = sqlx::query_as::<_, ToySummary>(
            r#"
            SELECT t.id, t.name, t.description, t.price, t.quantity_in_stock, t.image
            FROM toys t
            JOIN toy_categories tc ON tc.toy_id = t.id
            WHERE tc.category_id = $1
            ORDER BY t.name, t.id
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list toys in category {}: {:?}", category_id, e);
            AppError::Database(e)
        })?;

        Ok(toys)
    }

    async fn count_toys(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM toys")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_categories(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
