// Products module
// Catalog search, admin-side product maintenance and categories

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::{
    delete_product_handler, get_product_handler, insert_product_handler, list_categories_handler,
    list_products_handler, update_product_handler,
};
pub use models::{Category, CategoryDto, NewProduct, Product, ProductDto, ProductMinDto};
pub use repository::{
    CategoryRepository, DeleteOutcome, PgCategoryRepository, PgProductRepository, ProductRepository,
};
pub use service::ProductService;
