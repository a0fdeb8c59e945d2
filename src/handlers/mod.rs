pub mod carts;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod users;

use crate::events::EventSender;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<crate::services::carts::CartService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub promotions: Arc<crate::services::promotions::PromotionService>,
    pub users: Arc<crate::services::users::UserService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            cart: Arc::new(crate::services::carts::CartService::new(
                db.clone(),
                event_sender.clone(),
            )),
            orders: Arc::new(crate::services::orders::OrderService::new(
                db.clone(),
                event_sender,
            )),
            products: Arc::new(crate::services::products::ProductService::new(db.clone())),
            promotions: Arc::new(crate::services::promotions::PromotionService::new(
                db.clone(),
            )),
            users: Arc::new(crate::services::users::UserService::new(db)),
        }
    }
}
