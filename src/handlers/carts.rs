use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    EffectiveDate,
};
use crate::{
    auth::AuthenticatedUser,
    entities::cart::CartType,
    errors::ApiError,
    services::carts::AddItemInput,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_cart))
        .route("/", get(list_carts))
        .route("/{id}", get(get_cart))
        .route("/{id}", delete(delete_cart))
        .route("/{id}/items", post(add_item))
        .route("/{id}/items/{item_id}", put(update_item))
        .route("/{id}/items/{item_id}", delete(remove_item))
}

/// Create a new cart
async fn create_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCartRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .create_cart(user.0, payload.cart_type)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(cart))
}

/// List the caller's carts
async fn list_carts(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let carts = state
        .services
        .cart
        .list_carts(user.0)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(carts))
}

/// Get a cart with its items and pricing breakdown
async fn get_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    effective_date: EffectiveDate,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let priced = state
        .services
        .cart
        .get_cart(user.0, id, effective_date.0)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(priced))
}

/// Delete an active cart
async fn delete_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .cart
        .delete_cart(user.0, id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Add an item to a cart
async fn add_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = AddItemInput {
        product_id: payload.product_id,
        quantity: payload.quantity,
    };

    let item = state
        .services
        .cart
        .add_item(user.0, id, input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(item))
}

/// Set a cart item's quantity (zero removes it)
async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .update_item_quantity(user.0, cart_id, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    match item {
        Some(item) => Ok(success_response(item)),
        None => Ok(no_content_response()),
    }
}

/// Remove an item from a cart
async fn remove_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(user.0, cart_id, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

#[derive(Debug, Deserialize)]
struct CreateCartRequest {
    cart_type: CartType,
}

#[derive(Debug, Deserialize, Validate)]
struct AddItemRequest {
    product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateQuantityRequest {
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    quantity: i32,
}
