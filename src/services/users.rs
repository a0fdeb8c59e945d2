use crate::{
    entities::{user_profile, UserProfile, UserProfileModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// User profiles and the read side of VIP status. The transition itself
/// lives in [`super::vip`] and runs during order finalization.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Registers a profile. New users always start as non-VIP.
    #[instrument(skip(self))]
    pub async fn create_user(
        &self,
        input: CreateUserInput,
    ) -> Result<UserProfileModel, ServiceError> {
        let existing = UserProfile::find()
            .filter(user_profile::Column::Email.eq(input.email.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A user with email {} already exists",
                input.email
            )));
        }

        let profile = user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            display_name: Set(input.display_name),
            is_vip: Set(false),
            vip_since: Set(None),
            vip_until: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let profile = profile.insert(&*self.db).await?;
        info!("Created user: {}", profile.id);
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfileModel, ServiceError> {
        UserProfile::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    /// Current VIP users, most recently promoted first.
    pub async fn list_vip_users(&self) -> Result<Vec<UserProfileModel>, ServiceError> {
        UserProfile::find()
            .filter(user_profile::Column::IsVip.eq(true))
            .order_by_desc(user_profile::Column::VipSince)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }
}

/// Input for registering a user
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub display_name: String,
}
