mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn create_and_fetch_a_priced_cart() {
    let app = TestApp::new().await;
    let user = app.seed_user("alice@example.com").await;
    let product = app.seed_product("Keyboard", dec!(100.00)).await;

    let (status, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(user.id),
            Some(json!({"product_id": product.id, "quantity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, priced) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}", cart_id),
            Some(user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(priced["pricing"]["subtotal"], json!("200.00"));
    // Subtotal plus the flat service fee; no discount applies at quantity 2.
    assert_eq!(priced["pricing"]["total_payable"], json!("1200.00"));
}

#[tokio::test]
async fn second_active_cart_of_same_type_conflicts() {
    let app = TestApp::new().await;
    let user = app.seed_user("bob@example.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));

    // A different type is still allowed.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "VIP"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn adding_the_same_product_merges_quantities() {
    let app = TestApp::new().await;
    let user = app.seed_user("carol@example.com").await;
    let product = app.seed_product("Mouse", dec!(25.00)).await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();
    let items_uri = format!("/api/v1/carts/{}/items", cart_id);

    for _ in 0..2 {
        let (status, _) = app
            .request(
                Method::POST,
                &items_uri,
                Some(user.id),
                Some(json!({"product_id": product.id, "quantity": 3})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, priced) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}", cart_id),
            Some(user.id),
            None,
        )
        .await;
    let items = priced["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], json!(6));
}

#[tokio::test]
async fn updating_quantity_to_zero_removes_the_item() {
    let app = TestApp::new().await;
    let user = app.seed_user("dave@example.com").await;
    let product = app.seed_product("Cable", dec!(10.00)).await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (_, item) = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(user.id),
            Some(json!({"product_id": product.id, "quantity": 2})),
        )
        .await;
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/carts/{}/items/{}", cart_id, item_id),
            Some(user.id),
            Some(json!({"quantity": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, priced) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}", cart_id),
            Some(user.id),
            None,
        )
        .await;
    assert!(priced["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn another_users_cart_reads_as_not_found() {
    let app = TestApp::new().await;
    let owner = app.seed_user("owner@example.com").await;
    let stranger = app.seed_user("stranger@example.com").await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(owner.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}", cart_id),
            Some(stranger.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            None,
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn adding_an_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user = app.seed_user("erin@example.com").await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(user.id),
            Some(json!({"product_id": Uuid::new_v4(), "quantity": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_quantity_add_is_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("frank@example.com").await;
    let product = app.seed_product("Stand", dec!(40.00)).await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(user.id),
            Some(json!({"product_id": product.id, "quantity": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_an_active_cart_removes_it() {
    let app = TestApp::new().await;
    let user = app.seed_user("grace@example.com").await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/carts/{}", cart_id),
            Some(user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}", cart_id),
            Some(user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
