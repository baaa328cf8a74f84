use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

const SEED_CATEGORIES: &[(&str, &str)] = &[
    ("Water", "Toys for to in the water"),
    ("Sports", "Moving and not getting cholesterol"),
    ("Dolls", "Playing god"),
    (
        "Art",
        "Creating art with no hint of perspective or proportion",
    ),
    ("Politics", "Children are the future"),
];

/// (name, description, price, quantity, category names)
const SEED_TOYS: &[(&str, &str, &str, i32, &[&str])] = &[
    (
        "Action Man",
        "A doll but called an action figure because men are insecure.",
        "19.99",
        65,
        &["Dolls"],
    ),
    ("Ball", "It's just a ball. You kick it.", "10.99", 103, &["Sports"]),
    ("Art Set", "For painting n that", "21.99", 43, &["Art"]),
    (
        "Water Gun",
        "For squirting tourists who have driven up rents to the point of unsustainability.",
        "5.99",
        12,
        &["Water"],
    ),
    (
        "Leftist Barbie",
        "Because capitalism assimilates and defangs everything.",
        "69.99",
        43,
        &["Dolls", "Politics"],
    ),
];

/// Insert the demo catalog when the database holds no categories yet.
///
/// Returns `true` when rows were written.
pub async fn seed_demo_data(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    for (name, description) in SEED_CATEGORIES {
        sqlx::query("INSERT INTO categories (name, description) VALUES ($1, $2)")
            .bind(name)
            .bind(description)
            .execute(&mut *tx)
            .await?;
    }

    for (name, description, price, quantity, categories) in SEED_TOYS {
        let price: rust_decimal::Decimal = price
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let toy_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO toys (name, description, price, quantity_in_stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        let names: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO toy_categories (toy_id, category_id)
            SELECT $1, id FROM categories WHERE name = ANY($2)
            "#,
        )
        .bind(toy_id)
        .bind(&names)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}
