// Demo dataset shared by the in-memory store and database seeding

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::auth::Role;
use crate::error::ApiError;
use crate::orders::{NewOrder, NewOrderItem, OrderStatus};
use crate::products::{Category, Product};

/// Password of every demo account
pub const DEMO_PASSWORD: &str = "123456";

const DESCRIPTION: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

const CATEGORIES: [(i32, &str); 3] = [(1, "Livros"), (2, "Eletrônicos"), (3, "Computadores")];

// (name, price in cents, category id)
const PRODUCTS: [(&str, i64, i32); 25] = [
    ("The Lord of the Rings", 9050, 1),
    ("Smart TV", 219000, 2),
    ("Macbook Pro", 125000, 3),
    ("PC Gamer", 120000, 3),
    ("Rails for Dummies", 10099, 1),
    ("PC Gamer Ex", 135000, 3),
    ("PC Gamer X", 135000, 3),
    ("PC Gamer Alfa", 185000, 3),
    ("PC Gamer Tera", 195000, 3),
    ("PC Gamer Y", 170000, 3),
    ("PC Gamer Nitro", 145000, 3),
    ("PC Gamer Card", 185000, 3),
    ("PC Gamer Plus", 135000, 3),
    ("PC Gamer Hera", 225000, 3),
    ("PC Gamer Weed", 220000, 3),
    ("PC Gamer Max", 234000, 3),
    ("PC Gamer Turbo", 128000, 3),
    ("PC Gamer Hot", 145000, 3),
    ("PC Gamer Ez", 175000, 3),
    ("PC Gamer Tr", 165000, 3),
    ("PC Gamer Tx", 168000, 3),
    ("PC Gamer Er", 185000, 3),
    ("PC Gamer Min", 225000, 3),
    ("PC Gamer Boo", 235000, 3),
    ("PC Gamer Foo", 417000, 3),
];

/// Demo account without its password hash
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub id: i32,
    pub name: &'static str,
    pub email: &'static str,
    pub role: Role,
}

/// Demo order with a fixed id and optional payment
#[derive(Debug, Clone)]
pub struct SeedOrder {
    pub id: i32,
    pub order: NewOrder,
    pub payment_moment: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub users: Vec<SeedUser>,
    pub orders: Vec<SeedOrder>,
}

/// Build the demo catalog, accounts and orders
pub fn demo_dataset() -> Result<Dataset, ApiError> {
    let categories: Vec<Category> = CATEGORIES
        .iter()
        .map(|(id, name)| Category { id: *id, name: name.to_string() })
        .collect();

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (index, (name, cents, category_id)) in PRODUCTS.iter().enumerate() {
        let id = index as i32 + 1;
        let category = categories
            .iter()
            .find(|c| c.id == *category_id)
            .cloned()
            .ok_or_else(|| ApiError::Internal(format!("Unknown demo category {}", category_id)))?;
        products.push(Product {
            id,
            name: name.to_string(),
            description: DESCRIPTION.to_string(),
            price: Decimal::new(*cents, 2),
            img_url: Some(format!("https://cdn.example.com/products/{}-big.jpg", id)),
            categories: vec![category],
        });
    }

    let users = vec![
        SeedUser { id: 1, name: "Maria Brown", email: "maria@gmail.com", role: Role::Client },
        SeedUser { id: 2, name: "Alex Green", email: "alex@gmail.com", role: Role::Admin },
    ];

    let price_of = |product_id: i32| -> Result<Decimal, ApiError> {
        products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.price)
            .ok_or_else(|| ApiError::Internal(format!("Unknown demo product {}", product_id)))
    };
    let item = |product_id: i32, quantity: i32| -> Result<NewOrderItem, ApiError> {
        Ok(NewOrderItem { product_id, quantity, price: price_of(product_id)? })
    };

    let orders = vec![
        SeedOrder {
            id: 1,
            order: NewOrder {
                client_id: 1,
                moment: moment("2022-07-25T13:00:00Z")?,
                status: OrderStatus::Paid,
                items: vec![item(1, 2)?, item(3, 1)?],
            },
            payment_moment: Some(moment("2022-07-25T15:00:00Z")?),
        },
        SeedOrder {
            id: 2,
            order: NewOrder {
                client_id: 2,
                moment: moment("2022-07-29T15:50:00Z")?,
                status: OrderStatus::Delivered,
                items: vec![item(3, 1)?],
            },
            payment_moment: Some(moment("2022-07-30T11:00:00Z")?),
        },
        SeedOrder {
            id: 3,
            order: NewOrder {
                client_id: 1,
                moment: moment("2022-08-03T14:20:00Z")?,
                status: OrderStatus::WaitingPayment,
                items: vec![item(1, 1)?],
            },
            payment_moment: None,
        },
    ];

    Ok(Dataset { categories, products, users, orders })
}

fn moment(s: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Internal(format!("Invalid demo timestamp {}: {}", s, e)))
}
