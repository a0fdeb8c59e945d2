use crate::{
    entities::{promotion, Promotion, PromotionModel},
    errors::ServiceError,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Special-date promotion lookup and management.
#[derive(Clone)]
pub struct PromotionService {
    db: Arc<DatabaseConnection>,
}

impl PromotionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates a promotion. The window is inclusive on both ends.
    #[instrument(skip(self))]
    pub async fn create_promotion(
        &self,
        input: CreatePromotionInput,
    ) -> Result<PromotionModel, ServiceError> {
        if input.end_date < input.start_date {
            return Err(ServiceError::ValidationError(
                "end_date must not precede start_date".to_string(),
            ));
        }
        if input.discount_amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "discount_amount must not be negative".to_string(),
            ));
        }

        let promotion = promotion::ActiveModel {
            id: Set(Uuid::new_v4()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            description: Set(input.description),
            discount_amount: Set(input.discount_amount),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let promotion = promotion.insert(&*self.db).await?;
        info!("Created promotion: {}", promotion.id);
        Ok(promotion)
    }

    /// Highest-discount promotion active on the given date, if any.
    pub async fn find_active(
        &self,
        effective_date: NaiveDate,
    ) -> Result<Option<PromotionModel>, ServiceError> {
        find_active_on(&*self.db, effective_date).await
    }

    /// All promotions active on the given date, best discount first.
    pub async fn list_active(
        &self,
        effective_date: NaiveDate,
    ) -> Result<Vec<PromotionModel>, ServiceError> {
        Promotion::find()
            .filter(promotion::Column::StartDate.lte(effective_date))
            .filter(promotion::Column::EndDate.gte(effective_date))
            .order_by_desc(promotion::Column::DiscountAmount)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }
}

/// Connection-generic lookup so the pricing engine can run inside an open
/// transaction. Overlapping windows tie-break on the largest discount.
pub async fn find_active_on(
    conn: &impl ConnectionTrait,
    effective_date: NaiveDate,
) -> Result<Option<PromotionModel>, ServiceError> {
    Promotion::find()
        .filter(promotion::Column::StartDate.lte(effective_date))
        .filter(promotion::Column::EndDate.gte(effective_date))
        .order_by_desc(promotion::Column::DiscountAmount)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Input for creating a promotion
#[derive(Debug, Deserialize)]
pub struct CreatePromotionInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub discount_amount: Decimal,
}
