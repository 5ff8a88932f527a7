use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        cart, cart_item, Cart, CartItem, CartModel, LaundryService, LaundryServiceModel,
        QuantityUnit,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct AddToCartInput {
    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
    pub quantity_unit: QuantityUnit,
}

#[derive(Debug, Clone)]
pub struct RemoveFromCartInput {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
}

/// A cart line joined with its catalog entry, priced at the cart's unit.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub service_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: CartModel,
    pub lines: Vec<CartLine>,
}

/// Cart store. One cart per user; every line belongs to the cart's shop.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Adds a line to the user's cart, creating the cart on first use.
    /// Adding from a different shop clears the existing lines and re-homes
    /// the cart; a cart never mixes shops.
    #[instrument(skip(self), fields(user_id = %input.user_id, service_id = %input.service_id))]
    pub async fn add_item(&self, input: AddToCartInput) -> Result<CartView, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let service = LaundryService::find_by_id(input.service_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))?;
        if service.shop_id != input.shop_id {
            return Err(ServiceError::ValidationError(
                "Service does not belong to this shop".to_string(),
            ));
        }
        if !service.is_active {
            return Err(ServiceError::ValidationError(
                "Service is not available".to_string(),
            ));
        }
        if !service.accepts_unit(input.quantity_unit) {
            return Err(ServiceError::ValidationError(
                "Selected quantity unit is not available for this service".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(input.user_id))
            .one(&txn)
            .await?;

        let cart = match cart {
            Some(existing) => {
                let switching_shops = existing.shop_id != input.shop_id;
                if switching_shops {
                    CartItem::delete_many()
                        .filter(cart_item::Column::CartId.eq(existing.id))
                        .exec(&txn)
                        .await?;
                    info!(cart_id = %existing.id, "Cart re-homed to a new shop, lines cleared");
                }
                let mut active: cart::ActiveModel = existing.into();
                active.shop_id = Set(input.shop_id);
                active.quantity_unit = Set(input.quantity_unit);
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                cart::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(input.user_id),
                    shop_id: Set(input.shop_id),
                    quantity_unit: Set(input.quantity_unit),
                    total_price: Set(Decimal::ZERO),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        let existing_line = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ServiceId.eq(input.service_id))
            .one(&txn)
            .await?;

        match existing_line {
            Some(line) => {
                let quantity = line.quantity + input.quantity;
                let mut active: cart_item::ActiveModel = line.into();
                active.quantity = Set(quantity);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
            None => {
                cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    service_id: Set(input.service_id),
                    quantity: Set(input.quantity),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
            }
        }

        let view = self.recalculate_totals(&txn, cart.id).await?;
        txn.commit().await?;

        Ok(view)
    }

    /// Decrements a line's quantity, removing the line when it reaches zero.
    #[instrument(skip(self), fields(user_id = %input.user_id, service_id = %input.service_id))]
    pub async fn remove_item(&self, input: RemoveFromCartInput) -> Result<CartView, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(input.user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;

        let line = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ServiceId.eq(input.service_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Item not found in cart".to_string()))?;

        let remaining = line.quantity - input.quantity.max(1);
        if remaining > 0 {
            let mut active: cart_item::ActiveModel = line.into();
            active.quantity = Set(remaining);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        } else {
            line.delete(&txn).await?;
        }

        let view = self.recalculate_totals(&txn, cart.id).await?;
        txn.commit().await?;

        Ok(view)
    }

    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;
        self.build_view(&*self.db, cart).await
    }

    /// Drops the user's cart and all of its lines.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;
        let cart_id = cart.id;

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&txn)
            .await?;
        cart.delete(&txn).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::CartCleared(cart_id)).await;
        Ok(())
    }

    async fn recalculate_totals<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        cart_id: Uuid,
    ) -> Result<CartView, ServiceError> {
        let cart = Cart::find_by_id(cart_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;

        let view = self.build_view(conn, cart).await?;
        let total: Decimal = view.lines.iter().map(|l| l.line_total).sum();

        let mut active: cart::ActiveModel = view.cart.clone().into();
        active.total_price = Set(total);
        active.updated_at = Set(Utc::now());
        let cart = active.update(conn).await?;

        Ok(CartView {
            cart,
            lines: view.lines,
        })
    }

    async fn build_view<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        cart: CartModel,
    ) -> Result<CartView, ServiceError> {
        let lines = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(conn)
            .await?;

        let mut views = Vec::with_capacity(lines.len());
        for line in lines {
            let service: LaundryServiceModel = LaundryService::find_by_id(line.service_id)
                .one(conn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound("Service is no longer available".to_string())
                })?;
            let unit_price = service.unit_price(cart.quantity_unit);
            views.push(CartLine {
                service_id: line.service_id,
                name: service.name,
                quantity: line.quantity,
                unit_price,
                line_total: unit_price * Decimal::from(line.quantity),
            });
        }

        Ok(CartView { cart, lines: views })
    }
}
