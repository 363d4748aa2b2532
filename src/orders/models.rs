use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ApiError, FieldMessage};
use crate::validation;

/// Order status enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    WaitingPayment,
    Paid,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::WaitingPayment => "WAITING_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::WaitingPayment
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The client an order belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClient {
    pub id: i32,
    pub name: String,
}

/// Payment registered against an order; shares the order's id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub moment: DateTime<Utc>,
}

/// One line of an order with the price captured when the order was placed
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: i32,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub img_url: Option<String>,
}

impl OrderItem {
    /// `None` when price times quantity leaves the decimal range
    pub fn sub_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Domain model of an order with its full graph loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i32,
    pub moment: DateTime<Utc>,
    pub status: OrderStatus,
    pub client: OrderClient,
    pub payment: Option<Payment>,
    /// Sorted by product id
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total(&self) -> Option<Decimal> {
        checked_total(self.items.iter().map(OrderItem::sub_total))
    }
}

/// Sum of line amounts, `None` as soon as one line or the running sum overflows
pub fn checked_total(amounts: impl IntoIterator<Item = Option<Decimal>>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount?))
}

/// Order data handed to the repository after prices were resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub client_id: i32,
    pub moment: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderItem {
    pub fn sub_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Request body for POST /orders
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[schema(example = 3)]
    pub product_id: i32,
    #[schema(example = 1)]
    pub quantity: i32,
}

impl CreateOrderRequest {
    /// Check item count and per-line quantities, reporting every violation
    pub fn check(&self) -> Result<(), ApiError> {
        let mut fields: Vec<FieldMessage> = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => validation::field_messages(&errors),
        };

        for (index, item) in self.items.iter().enumerate() {
            if item.quantity < 1 {
                fields.push(FieldMessage::new(
                    format!("items[{}].quantity", index),
                    "Quantity must be at least 1",
                ));
            }
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationFailed(fields))
        }
    }

    /// Product ids and summed quantities, one entry per distinct product
    pub fn merged_lines(&self) -> Vec<(i32, i32)> {
        let mut lines: Vec<(i32, i32)> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match lines.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some(line) => line.1 = line.1.saturating_add(item.quantity),
                None => lines.push((item.product_id, item.quantity)),
            }
        }
        lines
    }
}

/// Client reference in an order response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Maria Brown")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(value_type = String, example = "2022-07-25T15:00:00Z")]
    pub moment: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    #[schema(example = 1)]
    pub product_id: i32,
    #[schema(example = "The Lord of the Rings")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 90.5)]
    pub price: Decimal,
    #[schema(example = 2)]
    pub quantity: i32,
    pub img_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 181.0)]
    pub sub_total: Decimal,
}

impl TryFrom<OrderItem> for OrderItemDto {
    type Error = ApiError;

    fn try_from(item: OrderItem) -> Result<Self, Self::Error> {
        let sub_total = item.sub_total().ok_or_else(|| {
            ApiError::Internal(format!("Subtotal of product {} overflows", item.product_id))
        })?;
        Ok(Self {
            sub_total,
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            img_url: item.img_url,
        })
    }
}

/// Full order representation returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(value_type = String, example = "2022-07-25T13:00:00Z")]
    pub moment: DateTime<Utc>,
    pub status: OrderStatus,
    pub client: ClientDto,
    /// `null` until the order is paid
    pub payment: Option<PaymentDto>,
    pub items: Vec<OrderItemDto>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1431.0)]
    pub total: Decimal,
}

impl TryFrom<Order> for OrderDto {
    type Error = ApiError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        let total = order
            .total()
            .ok_or_else(|| ApiError::Internal(format!("Total of order {} overflows", order.id)))?;
        let items = order
            .items
            .into_iter()
            .map(OrderItemDto::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: order.id,
            moment: order.moment,
            status: order.status,
            client: ClientDto {
                id: order.client.id,
                name: order.client.name,
            },
            payment: order.payment.map(|payment| PaymentDto {
                id: order.id,
                moment: payment.moment,
            }),
            items,
            total,
        })
    }
}
