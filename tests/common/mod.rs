use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use storefront_api::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::{product, user_profile, ProductModel, UserProfileModel},
    events::{self, EventSender},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // A single connection keeps the in-memory database alive and shared.
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let cfg = AppConfig {
            database_url: db_config.url.clone(),
            host: "127.0.0.1".to_string(),
            port: 18080,
            environment: "test".to_string(),
            log_level: "warn".to_string(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: Vec::new(),
        };

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(Arc::new(pool), cfg, event_sender));
        let router = storefront_api::app_routes().with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Sends a request as the given user and returns status plus parsed body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("X-User-Id", user_id.to_string());
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn seed_user(&self, email: &str) -> UserProfileModel {
        self.seed_user_with_vip(email, false, None).await
    }

    pub async fn seed_vip_user(&self, email: &str, since: DateTime<Utc>) -> UserProfileModel {
        self.seed_user_with_vip(email, true, Some(since)).await
    }

    async fn seed_user_with_vip(
        &self,
        email: &str,
        is_vip: bool,
        vip_since: Option<DateTime<Utc>>,
    ) -> UserProfileModel {
        let profile = user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            display_name: Set(email.split('@').next().unwrap_or("user").to_string()),
            is_vip: Set(is_vip),
            vip_since: Set(vip_since),
            vip_until: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };
        profile
            .insert(&*self.state.db)
            .await
            .expect("failed to seed user")
    }

    pub async fn seed_product(&self, name: &str, price: Decimal) -> ProductModel {
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(format!("{} description", name)),
            price: Set(price),
            stock: Set(100),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };
        product
            .insert(&*self.state.db)
            .await
            .expect("failed to seed product")
    }
}
