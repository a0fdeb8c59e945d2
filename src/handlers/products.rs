use crate::handlers::common::{created_response, map_service_error, success_response};
use crate::{errors::ApiError, services::products::CreateProductInput, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

/// Create a product
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let input = CreateProductInput {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
    };

    let product = state
        .services
        .products
        .create_product(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product))
}

/// List the catalog, newest first
async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_products()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Get a single product
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

#[derive(Debug, Deserialize)]
struct CreateProductRequest {
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
}
