use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::auth::password::PasswordService;
use crate::error::ApiError;
use crate::seed::{self, DEMO_PASSWORD};

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
///
/// # Returns
/// * `Result<DbPool>` - Configured connection pool or error
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Load the demo dataset in one transaction
///
/// Does nothing when the catalog already has products. Sequences are moved
/// past the fixed demo ids so later inserts do not collide.
///
/// # Returns
/// * `Result<bool, ApiError>` - True if the dataset was inserted
pub async fn seed_demo_data(pool: &PgPool) -> Result<bool, ApiError> {
    let mut tx = pool.begin().await?;

    let has_products: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products)")
        .fetch_one(&mut *tx)
        .await?;
    if has_products {
        tracing::debug!("Catalog not empty, skipping demo data");
        return Ok(false);
    }

    let dataset = seed::demo_dataset()?;
    let password_hash = PasswordService::hash_password(DEMO_PASSWORD)?;

    for category in &dataset.categories {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(category.id)
            .bind(&category.name)
            .execute(&mut *tx)
            .await?;
    }

    for product in &dataset.products {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, img_url) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.img_url)
        .execute(&mut *tx)
        .await?;

        for category in &product.categories {
            sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
                .bind(product.id)
                .bind(category.id)
                .execute(&mut *tx)
                .await?;
        }
    }

    for user in &dataset.users {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(&password_hash)
        .bind(user.role)
        .execute(&mut *tx)
        .await?;
    }

    for seeded in &dataset.orders {
        sqlx::query("INSERT INTO orders (id, moment, status, client_id) VALUES ($1, $2, $3, $4)")
            .bind(seeded.id)
            .bind(seeded.order.moment)
            .bind(seeded.order.status)
            .bind(seeded.order.client_id)
            .execute(&mut *tx)
            .await?;

        for item in &seeded.order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(seeded.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(moment) = seeded.payment_moment {
            sqlx::query("INSERT INTO payments (order_id, moment) VALUES ($1, $2)")
                .bind(seeded.id)
                .bind(moment)
                .execute(&mut *tx)
                .await?;
        }
    }

    for table in ["categories", "products", "users", "orders"] {
        sqlx::query(&format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), (SELECT COALESCE(MAX(id), 1) FROM {table}))"
        ))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        "Seeded demo data: {} products, {} users, {} orders",
        dataset.products.len(),
        dataset.users.len(),
        dataset.orders.len()
    );
    Ok(true)
}
