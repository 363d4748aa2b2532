use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::ApiError;
use crate::pagination::{Page, PageRequest};
use crate::products::models::{Category, NewProduct, Product, ProductRow};

/// Result of a delete guarded by the dependent-resource check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Product is referenced by at least one order line item
    Referenced,
}

/// Repository trait for product data access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Page of products filtered by case-insensitive name substring
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Product>, ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ApiError>;

    /// Products for the given ids; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ApiError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, ApiError>;

    /// Replace a product's fields and categories; `None` when the id is unknown
    async fn update(&self, id: i32, product: NewProduct) -> Result<Option<Product>, ApiError>;

    /// Existence check, dependency check and delete as one atomic step
    async fn delete(&self, id: i32) -> Result<DeleteOutcome, ApiError>;
}

/// Repository trait for category data access
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Category>, ApiError>;

    /// Categories for the given ids; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError>;
}

/// PostgreSQL-backed product repository
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load category links for a batch of product rows, preserving row order
    async fn attach_categories(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, ApiError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let links = sqlx::query_as::<_, (i32, i32, String)>(
            r#"
            SELECT pc.product_id, c.id, c.name
            FROM product_categories pc
            JOIN categories c ON c.id = pc.category_id
            WHERE pc.product_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_product: HashMap<i32, Vec<Category>> = HashMap::new();
        for (product_id, id, name) in links {
            by_product.entry(product_id).or_default().push(Category { id, name });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categories = by_product.remove(&row.id).unwrap_or_default();
                row.with_categories(categories)
            })
            .collect())
    }
}

fn push_name_filter(builder: &mut QueryBuilder<'_, Postgres>, name: Option<&str>) {
    if let Some(name) = name {
        builder
            .push(" WHERE UPPER(name) LIKE UPPER(")
            .push_bind(format!("%{}%", escape_like(name)))
            .push(")");
    }
}

/// Escape LIKE metacharacters so the filter is a plain substring match
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn insert_category_links(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    product_id: i32,
    category_ids: &[i32],
) -> Result<(), ApiError> {
    for category_id in category_ids {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(category_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Product>, ApiError> {
        let name = request.name.as_deref();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_name_filter(&mut count, name);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new("SELECT id, name, description, price, img_url FROM products");
        push_name_filter(&mut select, name);
        // id breaks ties so identical requests page identically
        select.push(format!(
            " ORDER BY {} {}, id ASC",
            request.sort_field.column(),
            request.sort_order.keyword()
        ));
        select
            .push(" LIMIT ")
            .push_bind(i64::from(request.size))
            .push(" OFFSET ")
            .push_bind(request.offset() as i64);

        let rows: Vec<ProductRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let products = self.attach_categories(rows).await?;

        Ok(Page::new(products, request, total.max(0) as u64))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ApiError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, img_url FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_categories(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ApiError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, img_url FROM products WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        self.attach_categories(rows).await
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, ApiError> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, description, price, img_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.img_url)
        .fetch_one(&mut *tx)
        .await?;

        insert_category_links(&mut tx, id, &product.category_ids).await?;
        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Product {} vanished after insert", id)))
    }

    async fn update(&self, id: i32, product: NewProduct) -> Result<Option<Product>, ApiError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET name = $1, description = $2, price = $3, img_url = $4
            WHERE id = $5
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.img_url)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            // Transaction is rolled back when tx is dropped
            return Ok(None);
        }

        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_category_links(&mut tx, id, &product.category_ids).await?;
        tx.commit().await?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<DeleteOutcome, ApiError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps new order items from referencing the product mid-check
        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if referenced {
            return Ok(DeleteOutcome::Referenced);
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {
                tx.commit().await?;
                Ok(DeleteOutcome::Deleted)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Ok(DeleteOutcome::Referenced)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// PostgreSQL-backed category repository
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
