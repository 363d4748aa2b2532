use std::sync::Arc;

use chrono::Utc;

use crate::access::{authorize, Operation, Resource};
use crate::auth::Principal;
use crate::error::ApiError;
use crate::orders::models::{checked_total, CreateOrderRequest, NewOrder, NewOrderItem, OrderDto, OrderStatus};
use crate::orders::repository::OrderRepository;
use crate::products::ProductRepository;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { orders, products }
    }

    /// Load an order and apply the ownership check
    ///
    /// Existence is checked before ownership, so an unknown id is a 404
    /// for every principal and a foreign order is a 403.
    pub async fn find_by_id(&self, id: i32, principal: &Principal) -> Result<OrderDto, ApiError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", id))?;

        authorize(
            Some(principal),
            Operation::Read,
            Resource::Order { client_id: order.client.id },
        )
        .into_result()?;

        tracing::debug!("User {} read order {}", principal.user_id, id);
        OrderDto::try_from(order)
    }

    /// Place an order for the calling principal
    ///
    /// Each line captures the product's current price. Repeated product ids
    /// are merged into one line.
    pub async fn insert(&self, request: CreateOrderRequest, principal: &Principal) -> Result<OrderDto, ApiError> {
        request.check()?;

        let lines = request.merged_lines();
        let ids: Vec<i32> = lines.iter().map(|(id, _)| *id).collect();
        let products = self.products.find_by_ids(&ids).await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product_id, quantity) in lines {
            let product = products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| ApiError::not_found("Product", product_id))?;
            items.push(NewOrderItem {
                product_id,
                quantity,
                price: product.price,
            });
        }
        if checked_total(items.iter().map(NewOrderItem::sub_total)).is_none() {
            return Err(ApiError::invalid_field("items", "Order total is out of range"));
        }

        let order = self
            .orders
            .insert(NewOrder {
                client_id: principal.user_id,
                moment: Utc::now(),
                status: OrderStatus::WaitingPayment,
                items,
            })
            .await?;

        tracing::info!("User {} placed order {}", principal.user_id, order.id);
        OrderDto::try_from(order)
    }
}
