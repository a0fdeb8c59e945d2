use crate::handlers::common::{
    created_response, map_service_error, success_response, EffectiveDate,
};
use crate::{errors::ApiError, services::promotions::CreatePromotionInput, AppState};
use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// Creates the router for promotion endpoints
pub fn promotions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_promotion))
        .route("/", get(list_active_promotions))
}

/// Create a special-date promotion
async fn create_promotion(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePromotionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let input = CreatePromotionInput {
        start_date: payload.start_date,
        end_date: payload.end_date,
        description: payload.description,
        discount_amount: payload.discount_amount,
    };

    let promotion = state
        .services
        .promotions
        .create_promotion(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(promotion))
}

/// List promotions active on the effective date, best discount first
async fn list_active_promotions(
    State(state): State<Arc<AppState>>,
    effective_date: EffectiveDate,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let promotions = state
        .services
        .promotions
        .list_active(effective_date.0)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(promotions))
}

#[derive(Debug, Deserialize)]
struct CreatePromotionRequest {
    start_date: NaiveDate,
    end_date: NaiveDate,
    description: String,
    discount_amount: Decimal,
}
