// In-memory store
// Implements every repository trait over data guarded by one RwLock.
// Used by the test suite and when no DATABASE_URL is configured.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::password::PasswordService;
use crate::auth::{User, UserRepository};
use crate::error::ApiError;
use crate::orders::{NewOrder, Order, OrderClient, OrderItem, OrderRepository, Payment};
use crate::pagination::{Page, PageRequest, SortField, SortOrder};
use crate::products::{
    Category, CategoryRepository, DeleteOutcome, NewProduct, Product, ProductRepository,
};
use crate::seed::{self, Dataset, DEMO_PASSWORD};

#[derive(Debug, Clone)]
struct OrderRecord {
    id: i32,
    order: NewOrder,
    payment: Option<Payment>,
}

#[derive(Debug, Default)]
struct Data {
    categories: Vec<Category>,
    products: BTreeMap<i32, Product>,
    users: Vec<User>,
    orders: BTreeMap<i32, OrderRecord>,
    next_product_id: i32,
    next_order_id: i32,
}

impl Data {
    fn categories_for(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError> {
        ids.iter()
            .map(|id| {
                self.categories
                    .iter()
                    .find(|c| c.id == *id)
                    .cloned()
                    .ok_or_else(|| ApiError::invalid_field("categories", format!("Unknown category id(s): {}", id)))
            })
            .collect()
    }

    fn build_product(&self, id: i32, product: NewProduct) -> Result<Product, ApiError> {
        let mut categories = self.categories_for(&product.category_ids)?;
        categories.sort_by_key(|c| c.id);
        Ok(Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            img_url: product.img_url,
            categories,
        })
    }

    fn load_order(&self, record: &OrderRecord) -> Result<Order, ApiError> {
        let client = self
            .users
            .iter()
            .find(|u| u.id == record.order.client_id)
            .ok_or_else(|| ApiError::Internal(format!("Order {} has no client", record.id)))?;

        let mut items = Vec::with_capacity(record.order.items.len());
        for line in &record.order.items {
            let product = self
                .products
                .get(&line.product_id)
                .ok_or_else(|| ApiError::Internal(format!("Order {} references a missing product", record.id)))?;
            items.push(OrderItem {
                product_id: line.product_id,
                name: product.name.clone(),
                price: line.price,
                quantity: line.quantity,
                img_url: product.img_url.clone(),
            });
        }
        items.sort_by_key(|item| item.product_id);

        Ok(Order {
            id: record.id,
            moment: record.order.moment,
            status: record.order.status,
            client: OrderClient {
                id: client.id,
                name: client.name.clone(),
            },
            payment: record.payment.clone(),
            items,
        })
    }

    fn is_referenced(&self, product_id: i32) -> bool {
        self.orders
            .values()
            .any(|record| record.order.items.iter().any(|item| item.product_id == product_id))
    }
}

/// Store backed by process memory; every operation sees a consistent snapshot
#[derive(Debug)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            data: RwLock::new(Data {
                next_product_id: 1,
                next_order_id: 1,
                ..Data::default()
            }),
        }
    }
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the demo dataset
    pub fn seeded() -> Result<Self, ApiError> {
        let password_hash = PasswordService::hash_password(DEMO_PASSWORD)?;
        Ok(Self::with_dataset(seed::demo_dataset()?, &password_hash))
    }

    /// Store holding `dataset`, every account sharing `password_hash`
    pub fn with_dataset(dataset: Dataset, password_hash: &str) -> Self {
        let next_product_id = dataset.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let next_order_id = dataset.orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;

        let data = Data {
            categories: dataset.categories,
            products: dataset.products.into_iter().map(|p| (p.id, p)).collect(),
            users: dataset
                .users
                .into_iter()
                .map(|u| User {
                    id: u.id,
                    name: u.name.to_string(),
                    email: u.email.to_string(),
                    password_hash: password_hash.to_string(),
                    role: u.role,
                })
                .collect(),
            orders: dataset
                .orders
                .into_iter()
                .map(|o| {
                    let record = OrderRecord {
                        id: o.id,
                        order: o.order,
                        payment: o.payment_moment.map(|moment| Payment { moment }),
                    };
                    (o.id, record)
                })
                .collect(),
            next_product_id,
            next_order_id,
        };

        Self { data: RwLock::new(data) }
    }
}

fn compare_products(a: &Product, b: &Product, field: SortField, order: SortOrder) -> Ordering {
    let primary = match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Price => a.price.cmp(&b.price),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Product>, ApiError> {
        let data = self.data.read().await;
        let needle = request.name.as_deref().map(str::to_uppercase);

        let mut matches: Vec<&Product> = data
            .products
            .values()
            .filter(|p| match &needle {
                Some(needle) => p.name.to_uppercase().contains(needle.as_str()),
                None => true,
            })
            .collect();
        matches.sort_by(|a, b| compare_products(a, b, request.sort_field, request.sort_order));

        let total = matches.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content: Vec<Product> = matches
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, request, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ApiError> {
        Ok(self.data.read().await.products.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ApiError> {
        let data = self.data.read().await;
        Ok(data
            .products
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, ApiError> {
        let mut data = self.data.write().await;
        let id = data.next_product_id;
        let product = data.build_product(id, product)?;

        data.next_product_id += 1;
        data.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i32, product: NewProduct) -> Result<Option<Product>, ApiError> {
        let mut data = self.data.write().await;
        if !data.products.contains_key(&id) {
            return Ok(None);
        }

        let product = data.build_product(id, product)?;
        data.products.insert(id, product.clone());
        Ok(Some(product))
    }

    async fn delete(&self, id: i32) -> Result<DeleteOutcome, ApiError> {
        let mut data = self.data.write().await;
        if !data.products.contains_key(&id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if data.is_referenced(id) {
            return Ok(DeleteOutcome::Referenced);
        }

        data.products.remove(&id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Category>, ApiError> {
        let mut categories = self.data.read().await.categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError> {
        let data = self.data.read().await;
        Ok(data
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, ApiError> {
        let data = self.data.read().await;
        match data.orders.get(&id) {
            Some(record) => Ok(Some(data.load_order(record)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, ApiError> {
        let mut data = self.data.write().await;
        if let Some(missing) = order
            .items
            .iter()
            .find(|item| !data.products.contains_key(&item.product_id))
        {
            return Err(ApiError::not_found("Product", missing.product_id));
        }

        let id = data.next_order_id;
        let record = OrderRecord { id, order, payment: None };
        let loaded = data.load_order(&record)?;

        data.next_order_id += 1;
        data.orders.insert(id, record);
        Ok(loaded)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let email = email.to_lowercase();
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.email.to_lowercase() == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError> {
        Ok(self.data.read().await.users.iter().find(|u| u.id == id).cloned())
    }
}
