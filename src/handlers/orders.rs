use crate::handlers::common::{
    created_response, map_service_error, success_response, EffectiveDate,
};
use crate::{
    auth::AuthenticatedUser,
    entities::cart::CartType,
    errors::ApiError,
    services::orders::OrderFilter,
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for order endpoints
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

/// Finalize a cart into an order
async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    effective_date: EffectiveDate,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let receipt = state
        .services
        .orders
        .create_order(user.0, payload.cart_id, effective_date.0, Utc::now())
        .await
        .map_err(map_service_error)?;

    Ok(created_response(receipt))
}

/// List orders with optional filters
async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<OrderListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = OrderFilter {
        user_id: query.mine.unwrap_or(true).then_some(user.0),
        cart_type: query.cart_type,
        start: query.start,
        end: query.end,
    };

    let orders = state
        .services
        .orders
        .list_orders(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Get one of the caller's orders
async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(user.0, id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    cart_id: Uuid,
}

/// Filters for the order list. `mine` defaults to true; passing
/// `mine=false` widens the listing to all users.
#[derive(Debug, Deserialize)]
struct OrderListQuery {
    mine: Option<bool>,
    cart_type: Option<CartType>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}
