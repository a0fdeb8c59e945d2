use crate::{
    entities::{
        cart::{self, CartStatus, CartType},
        order, Cart, Order, OrderModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        carts,
        pricing::{self, CartPricing},
        vip::{self, VipChange},
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Order finalization and history.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Finalizes a cart into an order.
    ///
    /// One transaction covers the whole transition: pricing the cart,
    /// inserting the order, flipping the cart to FINALIZED, and running the
    /// VIP status update. A failure at any point leaves the cart ACTIVE with
    /// no order row behind.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        cart_id: Uuid,
        effective_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<OrderReceipt, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = Cart::find_by_id(cart_id)
            .filter(cart::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active or already finalized".to_string(),
            ));
        }

        let items = carts::load_items(&txn, cart_id).await?;
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "Cannot create an order from an empty cart".to_string(),
            ));
        }

        let pricing = pricing::price_cart_on(&txn, &items, cart.cart_type, effective_date).await?;

        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            cart_id: Set(cart_id),
            user_id: Set(user_id),
            total_paid: Set(pricing.total_payable),
            ordered_at: Set(now),
        };
        let order = order.insert(&txn).await?;

        let mut cart: cart::ActiveModel = cart.into();
        cart.status = Set(CartStatus::Finalized);
        cart.updated_at = Set(now);
        let cart = cart.update(&txn).await?;

        // Same unit of work as the order insert: the status update and the
        // order either both commit or neither does.
        let vip_change = vip::apply_vip_transition(&txn, user_id, now).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order_id))
            .await;
        if let Some(change) = vip_change {
            self.event_sender
                .send_or_log(Event::VipStatusChanged {
                    user_id,
                    is_vip: change == VipChange::Granted,
                })
                .await;
        }

        info!(
            "Created order {} from cart {}: total {}",
            order_id, cart_id, order.total_paid
        );

        Ok(OrderReceipt {
            order,
            cart,
            pricing,
        })
    }

    /// Lists orders, newest first, with the original's optional filters:
    /// owner, cart type, and an inclusive `ordered_at` date range.
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderModel>, ServiceError> {
        let mut query = Order::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        if let Some(cart_type) = filter.cart_type {
            query = query
                .join(JoinType::InnerJoin, order::Relation::Cart.def())
                .filter(cart::Column::CartType.eq(cart_type));
        }
        if let Some(start) = filter.start {
            let from = start.and_hms_opt(0, 0, 0).expect("midnight is always valid");
            query = query.filter(order::Column::OrderedAt.gte(from.and_utc()));
        }
        if let Some(end) = filter.end {
            // Inclusive end date: everything strictly before the next day.
            let to = end
                .succ_opt()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc());
            if let Some(to) = to {
                query = query.filter(order::Column::OrderedAt.lt(to));
            }
        }

        query
            .order_by_desc(order::Column::OrderedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        Order::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }
}

/// Optional filters for listing orders
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub cart_type: Option<CartType>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Finalization result: the order, the finalized cart, and the breakdown
/// that produced `total_paid`.
#[derive(Debug, Serialize)]
pub struct OrderReceipt {
    pub order: OrderModel,
    pub cart: crate::entities::CartModel,
    pub pricing: CartPricing,
}
