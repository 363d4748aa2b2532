// Commerce API
// Product catalog and order service with bearer-token access control

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod orders;
pub mod pagination;
pub mod products;
pub mod seed;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{AuthService, PgUserRepository, TokenService, UserRepository};
use crate::memory::MemoryStore;
use crate::orders::{OrderRepository, OrderService, PgOrderRepository};
use crate::products::{
    CategoryRepository, PgCategoryRepository, PgProductRepository, ProductRepository, ProductService,
};

/// Bearer token security scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        products::handlers::list_products_handler,
        products::handlers::get_product_handler,
        products::handlers::insert_product_handler,
        products::handlers::update_product_handler,
        products::handlers::delete_product_handler,
        products::handlers::list_categories_handler,
        orders::handlers::get_order_handler,
        orders::handlers::insert_order_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
    ),
    components(
        schemas(
            products::ProductDto,
            products::ProductMinDto,
            products::CategoryDto,
            products::Category,
            pagination::ProductPage,
            orders::OrderDto,
            orders::models::OrderItemDto,
            orders::models::ClientDto,
            orders::models::PaymentDto,
            orders::OrderStatus,
            orders::CreateOrderRequest,
            orders::OrderItemRequest,
            auth::LoginRequest,
            auth::TokenResponse,
            auth::UserResponse,
            auth::Role,
            error::ErrorResponse,
            error::FieldMessage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "products", description = "Product catalog"),
        (name = "orders", description = "Customer orders"),
        (name = "auth", description = "Login and account")
    ),
    info(
        title = "Commerce API",
        version = "1.0.0",
        description = "RESTful API for a product catalog and customer orders"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
    pub order_service: OrderService,
    pub auth_service: AuthService,
    pub tokens: Arc<TokenService>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// One implementation per repository seam
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            products: Arc::new(PgProductRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            products: store.clone(),
            categories: store.clone(),
            orders: store.clone(),
            users: store,
        }
    }
}

impl AppState {
    pub fn new(repos: Repositories, tokens: Arc<TokenService>) -> Self {
        Self {
            product_service: ProductService::new(repos.products.clone(), repos.categories),
            order_service: OrderService::new(repos.orders, repos.products),
            auth_service: AuthService::new(repos.users, tokens.clone()),
            tokens,
        }
    }
}

/// Build the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Catalog
        .route(
            "/products",
            get(products::list_products_handler).post(products::insert_product_handler),
        )
        .route(
            "/products/:id",
            get(products::get_product_handler)
                .put(products::update_product_handler)
                .delete(products::delete_product_handler),
        )
        .route("/categories", get(products::list_categories_handler))
        // Orders
        .route("/orders", post(orders::insert_order_handler))
        .route("/orders/:id", get(orders::get_order_handler))
        // Auth
        .route("/auth/login", post(auth::login_handler))
        .route("/users/me", get(auth::me_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
