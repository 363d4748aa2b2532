// Product service - catalog business logic

use std::sync::Arc;

use validator::Validate;

use crate::error::ApiError;
use crate::pagination::{Page, PageRequest};
use crate::products::models::{Category, NewProduct, ProductDto, ProductMinDto};
use crate::products::repository::{CategoryRepository, DeleteOutcome, ProductRepository};

/// Service for catalog reads and admin-side product maintenance
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { products, categories }
    }

    /// Paged product summaries whose name contains `request.name`
    pub async fn find_by_name(&self, request: &PageRequest) -> Result<Page<ProductMinDto>, ApiError> {
        let page = self.products.find_page(request).await?;
        tracing::debug!(
            "Product search {:?} page {} returned {} of {}",
            request.name,
            request.page,
            page.number_of_elements,
            page.total_elements
        );
        Ok(page.map(ProductMinDto::from))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<ProductDto, ApiError> {
        self.products
            .find_by_id(id)
            .await?
            .map(ProductDto::from)
            .ok_or_else(|| ApiError::not_found("Product", id))
    }

    /// Validate and store a new product
    ///
    /// Every referenced category must exist; unknown ids fail validation
    /// on the `categories` field.
    pub async fn insert(&self, dto: ProductDto) -> Result<ProductDto, ApiError> {
        let dto = dto.normalized();
        dto.validate()?;
        let product = self.resolve(dto).await?;

        let created = self.products.insert(product).await?;
        tracing::info!("Created product {} ({})", created.id, created.name);
        Ok(created.into())
    }

    /// Replace an existing product; the id is checked before the payload
    pub async fn update(&self, id: i32, dto: ProductDto) -> Result<ProductDto, ApiError> {
        if self.products.find_by_id(id).await?.is_none() {
            return Err(ApiError::not_found("Product", id));
        }

        let dto = dto.normalized();
        dto.validate()?;
        let product = self.resolve(dto).await?;

        let updated = self
            .products
            .update(id, product)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", id))?;
        tracing::info!("Updated product {}", id);
        Ok(updated.into())
    }

    /// Delete a product that no order refers to
    pub async fn delete(&self, id: i32) -> Result<(), ApiError> {
        match self.products.delete(id).await? {
            DeleteOutcome::Deleted => {
                tracing::info!("Deleted product {}", id);
                Ok(())
            }
            DeleteOutcome::NotFound => Err(ApiError::not_found("Product", id)),
            DeleteOutcome::Referenced => Err(ApiError::Conflict(format!(
                "Product {} is referenced by existing orders",
                id
            ))),
        }
    }

    pub async fn find_all_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.categories.find_all().await
    }

    async fn resolve(&self, dto: ProductDto) -> Result<NewProduct, ApiError> {
        let product = dto.into_new_product()?;
        let found = self.categories.find_by_ids(&product.category_ids).await?;

        let missing: Vec<String> = product
            .category_ids
            .iter()
            .filter(|id| !found.iter().any(|c| c.id == **id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::invalid_field(
                "categories",
                format!("Unknown category id(s): {}", missing.join(", ")),
            ));
        }

        Ok(product)
    }
}
