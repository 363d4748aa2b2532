use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;
use crate::orders::models::{NewOrder, Order, OrderClient, OrderItem, OrderStatus, Payment};

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Order with its client, payment and line items
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, ApiError>;

    /// Store an order and its lines atomically
    async fn insert(&self, order: NewOrder) -> Result<Order, ApiError>;
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i32,
    moment: DateTime<Utc>,
    status: OrderStatus,
    client_id: i32,
    client_name: String,
    payment_moment: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    product_id: i32,
    name: String,
    price: Decimal,
    quantity: i32,
    img_url: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            img_url: row.img_url,
        }
    }
}

/// PostgreSQL-backed order repository
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, ApiError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.moment, o.status, o.client_id, u.name AS client_name,
                   p.moment AS payment_moment
            FROM orders o
            JOIN users u ON u.id = o.client_id
            LEFT JOIN payments p ON p.order_id = o.id
            WHERE o.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT oi.product_id, p.name, oi.price, oi.quantity, p.img_url
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.product_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Order {
            id: row.id,
            moment: row.moment,
            status: row.status,
            client: OrderClient {
                id: row.client_id,
                name: row.client_name,
            },
            payment: row.payment_moment.map(|moment| Payment { moment }),
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, ApiError> {
        let mut tx = self.pool.begin().await?;

        // Shared locks keep the referenced products from being deleted before commit
        let product_ids: Vec<i32> = order.items.iter().map(|item| item.product_id).collect();
        let locked: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = ANY($1) FOR SHARE")
                .bind(&product_ids)
                .fetch_all(&mut *tx)
                .await?;
        if let Some(missing) = product_ids.iter().find(|id| !locked.contains(id)) {
            return Err(ApiError::not_found("Product", missing));
        }

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (moment, status, client_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(order.moment)
        .bind(order.status)
        .bind(order.client_id)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Order {} vanished after insert", id)))
    }
}
