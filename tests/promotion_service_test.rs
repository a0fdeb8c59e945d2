mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

async fn create_promotion(
    app: &TestApp,
    start: &str,
    end: &str,
    description: &str,
    amount: &str,
) -> StatusCode {
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/promotions",
            None,
            Some(json!({
                "start_date": start,
                "end_date": end,
                "description": description,
                "discount_amount": amount
            })),
        )
        .await;
    status
}

#[tokio::test]
async fn promotion_window_is_inclusive_on_both_ends() {
    let app = TestApp::new().await;
    assert_eq!(
        create_promotion(&app, "2025-12-20", "2025-12-26", "Holidays", "300.00").await,
        StatusCode::CREATED
    );

    for date in ["2025-12-20", "2025-12-23", "2025-12-26"] {
        let (status, active) = app
            .request(
                Method::GET,
                &format!("/api/v1/promotions?date={}", date),
                None,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(active.as_array().unwrap().len(), 1, "date {}", date);
    }

    for date in ["2025-12-19", "2025-12-27"] {
        let (_, active) = app
            .request(
                Method::GET,
                &format!("/api/v1/promotions?date={}", date),
                None,
                None,
            )
            .await;
        assert!(active.as_array().unwrap().is_empty(), "date {}", date);
    }
}

#[tokio::test]
async fn overlapping_promotions_apply_the_highest_discount() {
    let app = TestApp::new().await;
    create_promotion(&app, "2025-11-01", "2025-11-30", "Small", "100.00").await;
    create_promotion(&app, "2025-11-10", "2025-11-20", "Big", "400.00").await;

    let user = app.seed_user("alice@example.com").await;
    let product = app.seed_product("Blender", dec!(900.00)).await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "SPECIAL_DATE"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(user.id),
            Some(json!({"product_id": product.id, "quantity": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, priced) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}?date=2025-11-15", cart_id),
            Some(user.id),
            None,
        )
        .await;
    // 900 - 400 (highest overlapping discount) + 1000 fee.
    assert_eq!(priced["pricing"]["total_payable"], json!("1500.00"));

    let discounts = priced["pricing"]["discounts_applied"].as_array().unwrap();
    assert!(discounts
        .iter()
        .any(|d| d["kind"] == json!("special_date") && d["amount"] == json!("400.00")));
}

#[tokio::test]
async fn vip_carts_ignore_special_date_promotions() {
    let app = TestApp::new().await;
    create_promotion(&app, "2025-11-01", "2025-11-30", "November", "400.00").await;

    let user = app.seed_user("bob@example.com").await;
    let product = app.seed_product("Speaker", dec!(2000.00)).await;

    let (_, cart) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(user.id),
            Some(json!({"cart_type": "VIP"})),
        )
        .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(user.id),
            Some(json!({"product_id": product.id, "quantity": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, priced) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}?date=2025-11-15", cart_id),
            Some(user.id),
            None,
        )
        .await;
    // 2000 - 500 (general VIP only; quantity 1 skips the free unit) + 1000.
    assert_eq!(priced["pricing"]["total_payable"], json!("2500.00"));

    let discounts = priced["pricing"]["discounts_applied"].as_array().unwrap();
    assert!(!discounts.iter().any(|d| d["kind"] == json!("special_date")));
}

#[tokio::test]
async fn an_inverted_window_is_rejected() {
    let app = TestApp::new().await;
    assert_eq!(
        create_promotion(&app, "2025-12-26", "2025-12-20", "Backwards", "100.00").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn a_negative_discount_is_rejected() {
    let app = TestApp::new().await;
    assert_eq!(
        create_promotion(&app, "2025-12-01", "2025-12-31", "Negative", "-5.00").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn a_malformed_simulated_date_falls_back_to_today() {
    let app = TestApp::new().await;
    let user = app.seed_user("carol@example.com").await;
    let product = app.seed_product("Kettle", dec!(80.00)).await;

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
            Some(json!({"product_id": product.id, "quantity": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, priced) = app
        .request(
            Method::GET,
            &format!("/api/v1/carts/{}?date=not-a-date", cart_id),
            Some(user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(priced["pricing"]["total_payable"], json!("1080.00"));
}

#[tokio::test]
async fn unknown_user_in_header_cannot_create_a_cart() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/carts",
            Some(Uuid::new_v4()),
            Some(json!({"cart_type": "COMMON"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
