use crate::errors::{ApiError, ServiceError};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::convert::Infallible;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// The date pricing and promotion lookups run against.
///
/// Taken from the `?date=YYYY-MM-DD` query parameter when present, so that
/// special-date behavior can be exercised without waiting for the calendar;
/// otherwise today's UTC date. A malformed value falls back to today rather
/// than failing the request.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveDate(pub NaiveDate);

impl<S> FromRequestParts<S> for EffectiveDate
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(EffectiveDate(effective_date_from_query(parts.uri.query())))
    }
}

fn effective_date_from_query(query: Option<&str>) -> NaiveDate {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| pair.strip_prefix("date="))
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive())
}
