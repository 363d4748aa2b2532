use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::validation::{validate_not_blank, validate_positive_price};

/// Missing and `null` both become the type's default, so the field fails
/// validation instead of deserialization
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Computadores")]
    pub name: String,
}

/// Domain model of a product with its categories
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_url: Option<String>,
    pub categories: Vec<Category>,
}

/// Product row as stored, without category links
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_url: Option<String>,
}

impl ProductRow {
    pub fn with_categories(self, categories: Vec<Category>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            img_url: self.img_url,
            categories,
        }
    }
}

/// Validated product data handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_url: Option<String>,
    pub category_ids: Vec<i32>,
}

/// Category reference inside a product payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    #[schema(example = 3)]
    pub id: i32,
    /// Ignored on input
    #[serde(default)]
    #[schema(example = "Computadores")]
    pub name: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Full product representation, used for both input and output
///
/// `id` is ignored on input. Validation rules, applied after trimming:
/// - name: non-blank, 3 to 80 characters
/// - description: non-blank, at least 10 characters
/// - price: required, strictly positive, at most 9999999999.99 with two decimals
/// - categories: at least one
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(default)]
    #[schema(example = 3)]
    pub id: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        length(min = 3, max = 80, message = "Name must have 3 to 80 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Macbook Pro")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        length(min = 10, message = "Description must have at least 10 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.")]
    pub description: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(required(message = "Price is required"), custom = "validate_positive_price")]
    #[schema(value_type = f64, example = 1250.0)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(length(min = 1, message = "Product must have at least one category"))]
    pub categories: Vec<CategoryDto>,
}

impl ProductDto {
    /// Category ids in payload order, without duplicates
    pub fn category_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            if !ids.contains(&category.id) {
                ids.push(category.id);
            }
        }
        ids
    }

    /// Trims name and description; call before `validate`
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self
    }

    pub fn into_new_product(self) -> Result<NewProduct, ApiError> {
        let category_ids = self.category_ids();
        let price = self
            .price
            .ok_or_else(|| ApiError::invalid_field("price", "Price is required"))?;
        Ok(NewProduct {
            name: self.name,
            description: self.description,
            price,
            img_url: self.img_url.filter(|url| !url.trim().is_empty()),
            category_ids,
        })
    }
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name,
            description: product.description,
            price: Some(product.price),
            img_url: product.img_url,
            categories: product.categories.into_iter().map(CategoryDto::from).collect(),
        }
    }
}

/// Summary view used in product listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMinDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "The Lord of the Rings")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 90.5)]
    pub price: Decimal,
    pub img_url: Option<String>,
}

impl From<Product> for ProductMinDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            img_url: product.img_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn valid_dto() -> ProductDto {
        ProductDto {
            id: None,
            name: "Console PlayStation 5".to_string(),
            description: "Lorem ipsum, dolor sit amet consectetur adipisicing elit.".to_string(),
            price: Some(dec!(3999.90)),
            img_url: Some("https://cdn.example.com/products/ps5.jpg".to_string()),
            categories: vec![CategoryDto { id: 2, name: String::new() }],
        }
    }

    fn invalid_fields(dto: &ProductDto) -> Vec<String> {
        let errors = dto.validate().unwrap_err();
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        fields
    }

    #[test]
    fn test_valid_product_passes() {
        assert!(valid_dto().validate().is_ok());
    }

    #[test]
    fn test_each_constraint_fails_independently() {
        let mut dto = valid_dto();
        dto.name = String::new();
        assert_eq!(invalid_fields(&dto), vec!["name"]);

        let mut dto = valid_dto();
        dto.description = "as".to_string();
        assert_eq!(invalid_fields(&dto), vec!["description"]);

        let mut dto = valid_dto();
        dto.price = Some(dec!(0.0));
        assert_eq!(invalid_fields(&dto), vec!["price"]);

        let mut dto = valid_dto();
        dto.price = Some(dec!(-10.0));
        assert_eq!(invalid_fields(&dto), vec!["price"]);

        let mut dto = valid_dto();
        dto.price = None;
        assert_eq!(invalid_fields(&dto), vec!["price"]);

        let mut dto = valid_dto();
        dto.price = Some(dec!(50000000000000000000000000000));
        assert_eq!(invalid_fields(&dto), vec!["price"]);

        let mut dto = valid_dto();
        dto.categories.clear();
        assert_eq!(invalid_fields(&dto), vec!["categories"]);
    }

    #[test]
    fn test_blank_name_of_valid_length_fails() {
        let mut dto = valid_dto();
        dto.name = "     ".to_string();
        assert_eq!(invalid_fields(&dto), vec!["name"]);
    }

    #[test]
    fn test_deserializes_camel_case_with_numeric_price() {
        let dto: ProductDto = serde_json::from_value(json!({
            "name": "Macbook Pro",
            "description": "Lorem ipsum dolor sit amet",
            "price": 1250.0,
            "imgUrl": "https://cdn.example.com/products/3-big.jpg",
            "categories": [{ "id": 3 }, { "id": 3, "name": "Computadores" }]
        }))
        .unwrap();

        assert_eq!(dto.id, None);
        assert_eq!(dto.price, Some(dec!(1250)));
        assert_eq!(dto.category_ids(), vec![3]);
    }

    #[test]
    fn test_missing_and_null_fields_fail_validation_not_parsing() {
        let dto: ProductDto = serde_json::from_value(json!({
            "name": null,
            "price": null
        }))
        .unwrap();

        assert_eq!(dto.name, "");
        assert!(dto.categories.is_empty());
        assert_eq!(invalid_fields(&dto), vec!["categories", "description", "name", "price"]);
    }

    #[test]
    fn test_name_is_trimmed_before_validation() {
        let mut dto = valid_dto();
        dto.name = "  ab  ".to_string();
        assert_eq!(invalid_fields(&dto.normalized()), vec!["name"]);

        let mut dto = valid_dto();
        dto.name = "  Macbook Pro  ".to_string();
        let product = dto.normalized().into_new_product().unwrap();
        assert_eq!(product.name, "Macbook Pro");
    }

    #[test]
    fn test_min_dto_serializes_price_as_number() {
        let dto = ProductMinDto {
            id: 1,
            name: "The Lord of the Rings".to_string(),
            price: dec!(90.5),
            img_url: None,
        };
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["price"].as_f64(), Some(90.5));
        assert!(json.get("imgUrl").is_some());
    }
}
