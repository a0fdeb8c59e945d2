use crate::{
    entities::{
        cart::{self, CartStatus, CartType},
        cart_item, Cart, CartItem, CartItemModel, CartModel, Product, UserProfile,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::pricing::{self, CartPricing},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Shopping cart service: cart lifecycle, line-item mutation, and the priced
/// read model. Every cart is scoped to its owner; lookups that miss or hit a
/// foreign cart both surface as `NotFound`.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a cart of the requested type.
    ///
    /// At most one ACTIVE cart per (user, type) may exist. The pre-check runs
    /// inside the transaction and a partial unique index backs it at the
    /// persistence layer, so a concurrent duplicate fails either way.
    #[instrument(skip(self))]
    pub async fn create_cart(
        &self,
        user_id: Uuid,
        cart_type: CartType,
    ) -> Result<CartModel, ServiceError> {
        let txn = self.db.begin().await?;

        UserProfile::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let existing = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .filter(cart::Column::CartType.eq(cart_type))
            .filter(cart::Column::Status.eq(CartStatus::Active))
            .one(&txn)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "An active cart of this type already exists".to_string(),
            ));
        }

        let cart_id = Uuid::new_v4();
        let cart = cart::ActiveModel {
            id: Set(cart_id),
            user_id: Set(user_id),
            cart_type: Set(cart_type),
            status: Set(CartStatus::Active),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let cart = cart.insert(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartCreated(cart_id))
            .await;

        info!("Created cart: {}", cart_id);
        Ok(cart)
    }

    /// Retrieves a cart with its items and the full pricing breakdown for the
    /// effective date. The breakdown is recomputed from the stored line items
    /// on every call; nothing is cached.
    #[instrument(skip(self))]
    pub async fn get_cart(
        &self,
        user_id: Uuid,
        cart_id: Uuid,
        effective_date: NaiveDate,
    ) -> Result<PricedCart, ServiceError> {
        let cart = self.find_owned_cart(&*self.db, user_id, cart_id).await?;
        let items = load_items(&*self.db, cart_id).await?;
        let pricing =
            pricing::price_cart_on(&*self.db, &items, cart.cart_type, effective_date).await?;

        Ok(PricedCart {
            cart,
            items,
            pricing,
        })
    }

    /// Lists the caller's carts, newest first, without pricing.
    pub async fn list_carts(&self, user_id: Uuid) -> Result<Vec<CartModel>, ServiceError> {
        Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .order_by_desc(cart::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Deletes an ACTIVE cart and all its items. Finalized carts are
    /// immutable and cannot be deleted.
    #[instrument(skip(self))]
    pub async fn delete_cart(&self, user_id: Uuid, cart_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let cart = self.find_owned_cart(&txn, user_id, cart_id).await?;
        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Finalized carts cannot be deleted".to_string(),
            ));
        }

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&txn)
            .await?;
        cart.delete(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartDeleted(cart_id))
            .await;

        info!("Deleted cart: {}", cart_id);
        Ok(())
    }

    /// Adds a product to the cart, snapshotting the catalog price on the new
    /// line. If the product is already in the cart the quantity is merged
    /// with a single SQL increment, so concurrent adds of the same product
    /// cannot lose updates.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        cart_id: Uuid,
        input: AddItemInput,
    ) -> Result<CartItemModel, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let cart = self.find_owned_cart(&txn, user_id, cart_id).await?;
        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active".to_string(),
            ));
        }

        let product = Product::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let existing = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(input.product_id))
            .one(&txn)
            .await?;

        let item = if let Some(existing) = existing {
            CartItem::update_many()
                .col_expr(
                    cart_item::Column::Quantity,
                    Expr::col(cart_item::Column::Quantity).add(input.quantity),
                )
                .col_expr(cart_item::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(cart_item::Column::Id.eq(existing.id))
                .exec(&txn)
                .await?;

            CartItem::find_by_id(existing.id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::InternalError("cart item vanished mid-update".to_string())
                })?
        } else {
            let item = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart_id),
                product_id: Set(input.product_id),
                quantity: Set(input.quantity),
                unit_price: Set(product.price),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            item.insert(&txn).await?
        };

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id,
                product_id: input.product_id,
            })
            .await;

        info!(
            "Added item to cart {}: product {} x{}",
            cart_id, input.product_id, input.quantity
        );
        Ok(item)
    }

    /// Sets a line item's quantity. Zero removes the item; the snapshotted
    /// unit price is never touched.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: Uuid,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemModel>, ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::ValidationError(
                "quantity must not be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let cart = self.find_owned_cart(&txn, user_id, cart_id).await?;
        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active".to_string(),
            ));
        }

        let item = CartItem::find_by_id(item_id)
            .one(&txn)
            .await?
            .filter(|item| item.cart_id == cart_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;

        let result = if quantity == 0 {
            item.delete(&txn).await?;
            None
        } else {
            let mut active: cart_item::ActiveModel = item.into();
            active.quantity = Set(quantity);
            active.updated_at = Set(Utc::now());
            Some(active.update(&txn).await?)
        };

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartUpdated(cart_id))
            .await;

        Ok(result)
    }

    /// Removes a line item from the cart.
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.update_item_quantity(user_id, cart_id, item_id, 0)
            .await?;
        Ok(())
    }

    /// Owner-scoped cart lookup. A cart belonging to another user is
    /// indistinguishable from a missing one.
    async fn find_owned_cart(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
        cart_id: Uuid,
    ) -> Result<CartModel, ServiceError> {
        Cart::find_by_id(cart_id)
            .filter(cart::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))
    }
}

/// Loads a cart's items in storage order. Insertion order is the tie-break
/// for the VIP cheapest-item rule, so the ordering here is load-bearing.
pub async fn load_items(
    conn: &impl ConnectionTrait,
    cart_id: Uuid,
) -> Result<Vec<CartItemModel>, ServiceError> {
    CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::CreatedAt)
        .order_by_asc(cart_item::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Input for adding an item to a cart
#[derive(Debug, Deserialize)]
pub struct AddItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Cart read model: items plus the recomputed pricing breakdown.
#[derive(Debug, Serialize)]
pub struct PricedCart {
    pub cart: CartModel,
    pub items: Vec<CartItemModel>,
    pub pricing: CartPricing,
}
