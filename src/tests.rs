// HTTP tests for the Commerce API
// Every test runs the full router against an in-memory store holding the demo dataset

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use super::*;
use crate::auth::Role;
use crate::seed::demo_dataset;

// ============================================================================
// Test Helpers
// ============================================================================

const SECRET: &str = "test-secret";

struct TestApp {
    server: TestServer,
    tokens: Arc<TokenService>,
}

impl TestApp {
    fn maria_token(&self) -> String {
        self.tokens
            .generate_access_token(1, "maria@gmail.com", Role::Client)
            .unwrap()
    }

    fn alex_token(&self) -> String {
        self.tokens
            .generate_access_token(2, "alex@gmail.com", Role::Admin)
            .unwrap()
    }
}

fn build_app(store: MemoryStore) -> TestApp {
    let tokens = Arc::new(TokenService::new(SECRET, 3600));
    let state = AppState::new(Repositories::memory(Arc::new(store)), tokens.clone());

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        tokens,
    }
}

/// Demo data without real password hashes, for tests that mint tokens directly
fn create_test_app() -> TestApp {
    build_app(MemoryStore::with_dataset(demo_dataset().unwrap(), "not-a-hash"))
}

/// Demo data with hashed passwords, for tests that go through /auth/login
fn create_login_app() -> TestApp {
    build_app(MemoryStore::seeded().unwrap())
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn valid_product_payload() -> Value {
    json!({
        "name": "Console PlayStation 5",
        "description": "Lorem ipsum, dolor sit amet consectetur adipisicing elit.",
        "imgUrl": "https://cdn.example.com/products/ps5.jpg",
        "price": 3999.90,
        "categories": [{ "id": 2 }, { "id": 3 }]
    })
}

fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["fieldName"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Product search
// ============================================================================

#[tokio::test]
async fn test_find_by_name_returns_first_page_when_name_empty() {
    let app = create_test_app();

    let response = app.server.get("/products").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["content"][0]["id"], 1);
    assert_eq!(body["content"][0]["name"], "The Lord of the Rings");
    assert_eq!(body["content"][0]["price"].as_f64(), Some(90.5));
    assert_eq!(body["content"].as_array().unwrap().len(), 12);
    assert_eq!(body["totalElements"], 25);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["first"], true);
}

#[tokio::test]
async fn test_find_by_name_matches_case_insensitive_substring() {
    let app = create_test_app();

    let response = app
        .server
        .get("/products")
        .add_query_param("name", "MacBook")
        .add_query_param("sort", "name")
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["content"][0]["id"], 3);
    assert_eq!(body["content"][0]["name"], "Macbook Pro");
    assert_eq!(body["totalElements"], 1);
}

#[tokio::test]
async fn test_find_by_name_rejects_bad_paging() {
    let app = create_test_app();

    let response = app.server.get("/products").add_query_param("size", "0").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app.server.get("/products").add_query_param("sort", "rating").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_find_product_by_id() {
    let app = create_test_app();

    let response = app.server.get("/products/3").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["name"], "Macbook Pro");
    assert_eq!(body["categories"][0]["name"], "Computadores");

    let response = app.server.get("/products/1000").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_find_all_categories() {
    let app = create_test_app();

    let response = app.server.get("/categories").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["name"], "Livros");
}

// ============================================================================
// Product insert
// ============================================================================

#[tokio::test]
async fn test_insert_returns_created_when_admin_and_data_valid() {
    let app = create_test_app();

    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .json(&valid_product_payload())
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 26);
    assert_eq!(body["name"], "Console PlayStation 5");
    assert_eq!(body["price"].as_f64(), Some(3999.9));
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);

    let response = app.server.get("/products/26").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_insert_returns_unprocessable_entity_for_each_invalid_field() {
    let app = create_test_app();
    let token = app.alex_token();

    let cases = [
        ("name", json!("ab")),
        ("name", json!("    ")),
        ("name", json!("  ab  ")),
        ("description", json!("as")),
        ("price", json!(-50.0)),
        ("price", json!(0.0)),
        ("price", json!(5.0e28)),
        ("price", json!(10000000000.0)),
        ("price", json!(null)),
        ("categories", json!([])),
        ("categories", json!(null)),
    ];

    for (field, value) in cases {
        let mut payload = valid_product_payload();
        payload[field] = value;

        let response = app
            .server
            .post("/products")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&payload)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert_eq!(error_fields(&body), vec![field.to_string()], "payload {}", payload);
    }
}

#[tokio::test]
async fn test_insert_with_missing_fields_lists_each_field() {
    let app = create_test_app();
    let token = app.alex_token();

    let mut payload = valid_product_payload();
    payload.as_object_mut().unwrap().remove("categories");
    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&payload)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&response.json()), vec!["categories".to_string()]);

    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    // an empty name or description breaks two rules each
    let mut fields = error_fields(&response.json());
    fields.dedup();
    assert_eq!(fields, vec!["categories", "description", "name", "price"]);
}

#[tokio::test]
async fn test_insert_with_unknown_category_is_unprocessable() {
    let app = create_test_app();
    let mut payload = valid_product_payload();
    payload["categories"] = json!([{ "id": 42 }]);

    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .json(&payload)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&response.json()), vec!["categories".to_string()]);
}

#[tokio::test]
async fn test_insert_returns_forbidden_when_client() {
    let app = create_test_app();

    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&app.maria_token()))
        .json(&valid_product_payload())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_insert_returns_unauthorized_when_not_logged() {
    let app = create_test_app();

    let response = app.server.post("/products").json(&valid_product_payload()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    // Authentication is decided before the body is looked at
    let response = app.server.post("/products").text("{not json").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_insert_with_non_json_body_is_rejected_after_auth() {
    let app = create_test_app();

    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .text("{not json")
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_invalid_tokens_are_unauthorized() {
    let app = create_test_app();
    let other = TokenService::new("another-secret", 3600)
        .generate_access_token(2, "alex@gmail.com", Role::Admin)
        .unwrap();

    for header in ["Bearer null", "Bearer ", "Basic YWxleDoxMjM0NTY=", "Bearer garbage.token.value"] {
        let response = app
            .server
            .post("/products")
            .add_header(AUTHORIZATION, HeaderValue::from_static(header))
            .json(&valid_product_payload())
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    let response = app
        .server
        .post("/products")
        .add_header(AUTHORIZATION, bearer(&other))
        .json(&valid_product_payload())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Product update
// ============================================================================

#[tokio::test]
async fn test_update_product() {
    let app = create_test_app();
    let mut payload = valid_product_payload();
    payload["name"] = json!("Macbook Pro M3");

    let response = app
        .server
        .put("/products/3")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .json(&payload)
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], 3);
    assert_eq!(body["name"], "Macbook Pro M3");

    let response = app
        .server
        .put("/products/1000")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .json(&payload)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .put("/products/3")
        .add_header(AUTHORIZATION, bearer(&app.maria_token()))
        .json(&payload)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Product delete
// ============================================================================

#[tokio::test]
async fn test_delete_returns_no_content_when_admin_and_id_exists() {
    let app = create_test_app();

    let response = app
        .server
        .delete("/products/4")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get("/products/4").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_returns_not_found_when_admin_and_id_does_not_exist() {
    let app = create_test_app();

    let response = app
        .server
        .delete("/products/1000")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_returns_bad_request_when_product_has_orders() {
    let app = create_test_app();

    let response = app
        .server
        .delete("/products/1")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error_code"], "INTEGRITY_VIOLATION");

    let response = app.server.get("/products/1").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_delete_checks_access_first() {
    let app = create_test_app();

    let response = app
        .server
        .delete("/products/4")
        .add_header(AUTHORIZATION, bearer(&app.maria_token()))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app.server.delete("/products/4").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app.server.delete("/products/1000").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_find_order_returns_order_when_admin() {
    let app = create_test_app();

    let response = app
        .server
        .get("/orders/1")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["moment"], "2022-07-25T13:00:00Z");
    assert_eq!(body["status"], "PAID");
    assert_eq!(body["client"]["name"], "Maria Brown");
    assert_eq!(body["payment"]["moment"], "2022-07-25T15:00:00Z");
    assert_eq!(body["items"][0]["name"], "The Lord of the Rings");
    assert_eq!(body["items"][0]["subTotal"].as_f64(), Some(181.0));
    assert_eq!(body["items"][1]["productId"], 3);
    assert_eq!(body["total"].as_f64(), Some(1431.0));
}

#[tokio::test]
async fn test_find_order_returns_order_when_client_owns_it() {
    let app = create_test_app();

    let response = app
        .server
        .get("/orders/1")
        .add_header(AUTHORIZATION, bearer(&app.maria_token()))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["client"]["id"], 1);
    assert_eq!(body["total"].as_f64(), Some(1431.0));
}

#[tokio::test]
async fn test_find_order_returns_forbidden_when_client_does_not_own_it() {
    let app = create_test_app();

    let response = app
        .server
        .get("/orders/2")
        .add_header(AUTHORIZATION, bearer(&app.maria_token()))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error_code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_find_order_returns_not_found_when_id_does_not_exist() {
    let app = create_test_app();

    for token in [app.alex_token(), app.maria_token()] {
        let response = app
            .server
            .get("/orders/999")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_find_order_returns_unauthorized_when_not_logged() {
    let app = create_test_app();

    let response = app
        .server
        .get("/orders/1")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer null"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app.server.get("/orders/999").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_insert_order_belongs_to_caller() {
    let app = create_test_app();
    let token = app.maria_token();

    let response = app
        .server
        .post("/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "items": [{ "productId": 3, "quantity": 2 }] }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 4);
    assert_eq!(body["status"], "WAITING_PAYMENT");
    assert_eq!(body["client"]["id"], 1);
    assert!(body["payment"].is_null());
    assert_eq!(body["total"].as_f64(), Some(2500.0));

    let response = app
        .server
        .get("/orders/4")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);

    // The new order now depends on product 3
    let response = app
        .server
        .delete("/products/3")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_insert_order_validation_and_lookup_failures() {
    let app = create_test_app();
    let token = app.maria_token();

    let response = app
        .server
        .post("/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "items": [] }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&response.json()), vec!["items".to_string()]);

    let response = app
        .server
        .post("/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "items": [{ "productId": 1, "quantity": 0 }] }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&response.json()), vec!["items[0].quantity".to_string()]);

    let response = app
        .server
        .post("/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "items": [{ "productId": 1000, "quantity": 1 }] }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .post("/orders")
        .json(&json!({ "items": [{ "productId": 1, "quantity": 1 }] }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_insert_order_with_extreme_quantities_stays_in_range() {
    let app = create_test_app();
    let token = app.maria_token();

    // repeated lines saturate at i32::MAX; a bounded price keeps the total representable
    let response = app
        .server
        .post("/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "items": [
            { "productId": 25, "quantity": 2147483647 },
            { "productId": 25, "quantity": 2147483647 }
        ] }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["items"][0]["quantity"], 2147483647);
    assert_eq!(body["total"].as_f64(), Some(4170.0 * 2147483647.0));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_login_issues_token_for_valid_credentials() {
    let app = create_login_app();

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "maria@gmail.com", "password": "123456" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "Bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let response = app
        .server
        .get("/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["email"], "maria@gmail.com");
    assert_eq!(body["role"], "CLIENT");

    let response = app
        .server
        .get("/orders/1")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = create_login_app();

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "maria@gmail.com", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "nobody@gmail.com", "password": "123456" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({ "email": "not-an-email", "password": "123456" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = create_test_app();

    let response = app.server.get("/users/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/users/me")
        .add_header(AUTHORIZATION, bearer(&app.alex_token()))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["name"], "Alex Green");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app();

    let response = app.server.get("/api-docs/openapi.json").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"]["/orders/{id}"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
    // response bodies are referenced by schema name
    assert!(body["components"]["schemas"]["ErrorResponse"].is_object());
    assert!(body["components"]["schemas"]["ProductPage"].is_object());
    let listing = &body["paths"]["/products"]["get"]["responses"]["200"];
    assert_eq!(
        listing["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ProductPage"
    );
}
