// Orders module
// Order lookup with ownership checks and order placement

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::{get_order_handler, insert_order_handler};
pub use models::{
    CreateOrderRequest, NewOrder, NewOrderItem, Order, OrderClient, OrderDto, OrderItem,
    OrderItemRequest, OrderStatus, Payment,
};
pub use repository::{OrderRepository, PgOrderRepository};
pub use service::OrderService;
