use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::products::models::ProductMinDto;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for the product listing
/// All fields are optional to support flexible querying
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name; empty means no filter
    pub name: Option<String>,
    /// Zero-based page number (defaults to 0)
    pub page: Option<u32>,
    /// Items per page (defaults to 12, at most 100)
    pub size: Option<u32>,
    /// `field` or `field,asc|desc`; field is `id`, `name` or `price`
    pub sort: Option<String>,
}

/// Sortable product columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Price,
}

impl SortField {
    /// ORDER BY expression; names sort case-insensitively
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "LOWER(name)",
            SortField::Price => "price",
        }
    }
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated and normalized listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Trimmed name filter, `None` when absent or blank
    pub name: Option<String>,
    pub page: u32,
    pub size: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            name: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_field: SortField::Id,
            sort_order: SortOrder::Asc,
        }
    }
}

impl PageRequest {
    /// Validates and normalizes query parameters
    pub fn from_query(query: ProductQuery) -> Result<Self, ApiError> {
        let name = query.name.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        });

        let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ApiError::BadRequest(format!(
                "size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let (sort_field, sort_order) = match query.sort {
            Some(sort) if !sort.trim().is_empty() => Self::parse_sort(&sort)?,
            _ => (SortField::Id, SortOrder::Asc),
        };

        Ok(Self {
            name,
            page: query.page.unwrap_or(0),
            size,
            sort_field,
            sort_order,
        })
    }

    /// Parses `field` or `field,direction`
    fn parse_sort(s: &str) -> Result<(SortField, SortOrder), ApiError> {
        let mut parts = s.split(',').map(str::trim);

        let field = match parts.next().unwrap_or_default().to_lowercase().as_str() {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "price" => SortField::Price,
            other => {
                return Err(ApiError::BadRequest(format!(
                    "Invalid sort field '{}'. Must be 'id', 'name' or 'price'",
                    other
                )))
            }
        };

        let order = match parts.next().map(str::to_lowercase).as_deref() {
            None | Some("") | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "Invalid sort direction '{}'. Must be 'asc' or 'desc'",
                    other
                )))
            }
        };

        if parts.next().is_some() {
            return Err(ApiError::BadRequest(format!("Invalid sort expression '{}'", s)));
        }

        Ok((field, order))
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the metadata clients page with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[aliases(ProductPage = Page<ProductMinDto>)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// Zero-based page number
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = (total_elements + size - 1) / size;
        let number_of_elements = content.len();

        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
            number_of_elements,
            first: request.page == 0,
            last: u64::from(request.page) + 1 >= total_pages,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
