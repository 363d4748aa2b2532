// HTTP handlers for product and category endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::access::{authorize, Operation, Resource};
use crate::auth::MaybePrincipal;
use crate::error::ApiError;
use crate::pagination::{Page, PageRequest, ProductQuery};
use crate::products::models::{Category, ProductDto, ProductMinDto};
use crate::AppState;

/// Handler for GET /products
/// Public, paged search by name
#[utoipa::path(
    get,
    path = "/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of matching products", body = ProductPage),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Page<ProductMinDto>>, ApiError> {
    authorize(None, Operation::Read, Resource::Catalog).into_result()?;

    let request = PageRequest::from_query(query)?;
    let page = state.product_service.find_by_name(&request).await?;
    Ok(Json(page))
}

/// Handler for GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDto>, ApiError> {
    authorize(None, Operation::Read, Resource::Catalog).into_result()?;

    let product = state.product_service.find_by_id(id).await?;
    Ok(Json(product))
}

/// Handler for POST /products
/// ADMIN only
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductDto,
    responses(
        (status = 201, description = "Product created", body = ProductDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 422, description = "Invalid product data", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn insert_product_handler(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    payload: Result<Json<ProductDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    authorize(principal.as_ref(), Operation::Create, Resource::Catalog).into_result()?;
    let Json(dto) = payload?;

    let created = state.product_service.insert(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /products/{id}
/// ADMIN only
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ProductDto,
    responses(
        (status = 200, description = "Product updated", body = ProductDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Invalid product data", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    Path(id): Path<i32>,
    payload: Result<Json<ProductDto>, JsonRejection>,
) -> Result<Json<ProductDto>, ApiError> {
    authorize(principal.as_ref(), Operation::Update, Resource::Catalog).into_result()?;
    let Json(dto) = payload?;

    let updated = state.product_service.update(id, dto).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /products/{id}
/// ADMIN only; refused while any order references the product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Product is referenced by orders", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    authorize(principal.as_ref(), Operation::Delete, Resource::Catalog).into_result()?;

    state.product_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories", body = [Category])
    ),
    tag = "products"
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    authorize(None, Operation::Read, Resource::Catalog).into_result()?;

    let categories = state.product_service.find_all_categories().await?;
    Ok(Json(categories))
}
