use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        cart, cart_item, order, Cart, CartItem, DeliveryAgent, LaundryService, Order,
        OrderItemSnapshot, OrderItems, OrderModel, OrderStatus, OrderTimeline, OrderType,
        PriceBreakdown, Shop, ShopModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::wallets::WalletService,
};

/// Which checkpoint an OTP gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpKind {
    Pickup,
    Drop,
}

impl TryFrom<i32> for OtpKind {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OtpKind::Pickup),
            1 => Ok(OtpKind::Drop),
            other => Err(format!("unknown otp kind: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceOrderInput {
    pub user_id: Uuid,
    pub order_type: OrderType,
    pub pickup_address_id: Option<Uuid>,
    pub dropoff_address_id: Option<Uuid>,
    pub pickup_time: Option<String>,
    pub dropoff_time: Option<String>,
    pub self_service: bool,
    pub payment_details: Option<String>,
    pub price_details: PriceBreakdown,
}

#[derive(Debug, Clone, Default)]
pub struct AssignAgentsInput {
    pub pickup_agent_id: Option<Uuid>,
    pub delivery_agent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub user_id: Option<Uuid>,
    pub shop_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Serialize)]
pub struct OrderListPage {
    pub orders: Vec<OrderModel>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Shop fields attached to an order response when the caller asks for an
/// expanded view.
#[derive(Debug, Serialize)]
pub struct ShopSummary {
    pub id: Uuid,
    pub name: String,
    pub partner_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OrderDetails {
    pub order: OrderModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopSummary>,
}

/// Order lifecycle state machine. Every mutation loads the order, applies
/// the transition, and persists the whole document; write-once fields are
/// claimed with conditional updates before that load.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    wallets: WalletService,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        wallets: WalletService,
    ) -> Self {
        Self {
            db,
            event_sender,
            wallets,
        }
    }

    /// Places an order from the user's cart: snapshots the lines and the
    /// confirmed price breakdown, redeems any wallet points the quote
    /// committed to, and drops the cart.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_order(&self, input: PlaceOrderInput) -> Result<OrderModel, ServiceError> {
        // Redeem first so an underfunded wallet rejects the order before
        // anything is written.
        if input.price_details.wallet_points_used > Decimal::ZERO {
            self.wallets
                .redeem(input.user_id, input.price_details.wallet_points_used)
                .await?;
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(input.user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;

        let lines = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(&txn)
            .await?;
        if lines.is_empty() {
            return Err(ServiceError::ValidationError("Cart is empty".to_string()));
        }

        let shop = Shop::find_by_id(cart.shop_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Shop not found".to_string()))?;

        let mut snapshots = Vec::with_capacity(lines.len());
        for line in &lines {
            let service = LaundryService::find_by_id(line.service_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound("Service is no longer available".to_string())
                })?;
            snapshots.push(OrderItemSnapshot {
                service_id: service.id,
                name: service.name.clone(),
                unit_price: service.unit_price(cart.quantity_unit),
                quantity: line.quantity,
            });
        }

        let order_id = Uuid::new_v4();
        let order_number = generate_order_number();
        let mut timeline = OrderTimeline::default();
        timeline.push(OrderStatus::Pending, now);

        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            user_id: Set(input.user_id),
            shop_id: Set(cart.shop_id),
            order_type: Set(input.order_type),
            items: Set(OrderItems(snapshots)),
            pickup_address_id: Set(input.pickup_address_id),
            dropoff_address_id: Set(input.dropoff_address_id),
            pickup_time: Set(input.pickup_time),
            dropoff_time: Set(input.dropoff_time),
            self_service: Set(input.self_service),
            payment_details: Set(input.payment_details),
            status: Set(OrderStatus::Pending),
            timeline: Set(timeline),
            pickup_otp: Set(None),
            drop_otp: Set(None),
            pickup_otp_verified: Set(false),
            delivery_otp_verified: Set(false),
            pickup_agent_id: Set(None),
            delivery_agent_id: Set(None),
            price_details: Set(input.price_details),
            cashback_points: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;
        Cart::delete_by_id(cart.id).exec(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, order_number = %order_number, "Order placed");

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id,
                order_number,
                shop_id: shop.id,
                partner_id: shop.partner_id,
                express: order.order_type == OrderType::Express,
            })
            .await;

        Ok(order)
    }

    /// Generates the pickup or drop OTP. The OTP column is claimed with a
    /// set-if-null update, so once a code exists it can never be replaced.
    #[instrument(skip(self), fields(order_id = %order_id, kind = ?kind))]
    pub async fn generate_otp(
        &self,
        order_id: Uuid,
        kind: OtpKind,
    ) -> Result<OrderModel, ServiceError> {
        let otp: i32 = rand::thread_rng().gen_range(1000..=9999);

        let column = match kind {
            OtpKind::Pickup => order::Column::PickupOtp,
            OtpKind::Drop => order::Column::DropOtp,
        };

        let result = Order::update_many()
            .col_expr(column, Expr::value(otp))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .filter(column.is_null())
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            let exists = Order::find_by_id(order_id).one(&*self.db).await?.is_some();
            return Err(if exists {
                let label = match kind {
                    OtpKind::Pickup => "Pickup Otp Already Generated",
                    OtpKind::Drop => "Drop Otp Already Generated",
                };
                ServiceError::ValidationError(label.to_string())
            } else {
                ServiceError::NotFound("Order not found".to_string())
            });
        }

        info!(order_id = %order_id, "Otp generated");
        self.load(order_id).await
    }

    /// Verifies a checkpoint OTP and advances the order: pickup success
    /// moves to PickedUp, drop success completes the order and credits
    /// cashback. A wrong code never mutates state, and each checkpoint can
    /// verify only once.
    #[instrument(skip(self, supplied_otp), fields(order_id = %order_id, kind = ?kind))]
    pub async fn verify_otp(
        &self,
        order_id: Uuid,
        kind: OtpKind,
        supplied_otp: i32,
    ) -> Result<OrderModel, ServiceError> {
        let order = self.load(order_id).await?;

        if order.status.is_terminal() && order.status != OrderStatus::Completed {
            return Err(ServiceError::BusinessRule(
                "Order is cancelled".to_string(),
            ));
        }

        let (stored, already_verified, missing_label) = match kind {
            OtpKind::Pickup => (
                order.pickup_otp,
                order.pickup_otp_verified,
                "Pickup Otp Not Generated",
            ),
            OtpKind::Drop => (
                order.drop_otp,
                order.delivery_otp_verified,
                "Drop Otp Not Generated",
            ),
        };

        if already_verified {
            return Err(ServiceError::ValidationError(
                "Otp Already Verified".to_string(),
            ));
        }
        let stored =
            stored.ok_or_else(|| ServiceError::ValidationError(missing_label.to_string()))?;
        if stored != supplied_otp {
            return Err(ServiceError::ValidationError("Invalid Otp".to_string()));
        }

        let now = Utc::now();
        let user_id = order.user_id;
        let order_number = order.order_number.clone();
        let mut timeline = order.timeline.clone();
        let total_amount = order.price_details.total_amount_to_pay;

        let updated = match kind {
            OtpKind::Pickup => {
                timeline.push(OrderStatus::PickedUp, now);
                let mut active: order::ActiveModel = order.into();
                active.pickup_otp_verified = Set(true);
                active.status = Set(OrderStatus::PickedUp);
                active.timeline = Set(timeline);
                active.updated_at = Set(now);
                let updated = active.update(&*self.db).await?;

                self.event_sender
                    .send_or_log(Event::OrderPickedUp {
                        order_id,
                        order_number,
                        user_id,
                    })
                    .await;
                updated
            }
            OtpKind::Drop => {
                timeline.push(OrderStatus::Completed, now);
                let cashback_points = self.wallets.cashback_points_for(total_amount).await?;

                let mut active: order::ActiveModel = order.into();
                active.delivery_otp_verified = Set(true);
                active.status = Set(OrderStatus::Completed);
                active.timeline = Set(timeline);
                active.cashback_points = Set(cashback_points);
                active.updated_at = Set(now);
                let updated = active.update(&*self.db).await?;

                if cashback_points > Decimal::ZERO {
                    if let Err(e) = self
                        .wallets
                        .accrue_cashback(user_id, total_amount)
                        .await
                    {
                        // Completion already persisted; a missing wallet is a
                        // provisioning defect, not grounds to undo delivery.
                        warn!(order_id = %order_id, error = %e, "Cashback accrual failed");
                    }
                }

                self.event_sender
                    .send_or_log(Event::OrderCompleted {
                        order_id,
                        order_number,
                        user_id,
                        cashback_points,
                    })
                    .await;
                updated
            }
        };

        info!(order_id = %order_id, status = ?updated.status, "Otp verified, order advanced");
        Ok(updated)
    }

    /// Assigns the pickup and/or delivery agent. Each slot is write-once:
    /// the id is claimed with a set-if-null update and a second assignment
    /// fails without touching the original.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn assign_agents(
        &self,
        order_id: Uuid,
        input: AssignAgentsInput,
    ) -> Result<OrderModel, ServiceError> {
        if input.pickup_agent_id.is_none() && input.delivery_agent_id.is_none() {
            return Err(ServiceError::ValidationError(
                "No agent supplied for assignment".to_string(),
            ));
        }

        if let Some(agent_id) = input.pickup_agent_id {
            self.claim_agent_slot(order_id, agent_id, OtpKind::Pickup)
                .await?;
        }
        if let Some(agent_id) = input.delivery_agent_id {
            self.claim_agent_slot(order_id, agent_id, OtpKind::Drop)
                .await?;
        }

        self.load(order_id).await
    }

    async fn claim_agent_slot(
        &self,
        order_id: Uuid,
        agent_id: Uuid,
        leg: OtpKind,
    ) -> Result<(), ServiceError> {
        let agent = DeliveryAgent::find_by_id(agent_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Delivery agent not found".to_string()))?;

        let (column, status, taken_label) = match leg {
            OtpKind::Pickup => (
                order::Column::PickupAgentId,
                OrderStatus::PickupAgentAssigned,
                "Pickup Agent Already Assigned",
            ),
            OtpKind::Drop => (
                order::Column::DeliveryAgentId,
                OrderStatus::DeliveryAgentAssigned,
                "Delivery Agent Already Assigned",
            ),
        };

        let result = Order::update_many()
            .col_expr(column, Expr::value(agent.id))
            .col_expr(order::Column::Status, Expr::value(status))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .filter(column.is_null())
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            let exists = Order::find_by_id(order_id).one(&*self.db).await?.is_some();
            return Err(if exists {
                ServiceError::ValidationError(taken_label.to_string())
            } else {
                ServiceError::NotFound("Order not found".to_string())
            });
        }

        // Timeline append rides after the claim; the slot itself is already
        // safe against double assignment.
        let order = self.load(order_id).await?;
        let mut timeline = order.timeline.clone();
        let now = Utc::now();
        timeline.push(status, now);
        let order_number = order.order_number.clone();
        let mut active: order::ActiveModel = order.into();
        active.timeline = Set(timeline);
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        let event = match leg {
            OtpKind::Pickup => Event::PickupAgentAssigned {
                order_id,
                order_number,
                agent_id: agent.id,
            },
            OtpKind::Drop => Event::DeliveryAgentAssigned {
                order_id,
                order_number,
                agent_id: agent.id,
            },
        };
        self.event_sender.send_or_log(event).await;

        info!(order_id = %order_id, agent_id = %agent.id, leg = ?leg, "Agent assigned");
        Ok(())
    }

    /// Overwrites the order status, guarded by the transition table. Used
    /// for the Confirmed / InProcess / ReadyForDrop / Cancelled hops that no
    /// OTP or assignment drives.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = ?new_status))]
    pub async fn change_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let order = self.load(order_id).await?;
        let current = order.status;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::BusinessRule(format!(
                "Cannot transition from '{}' to '{}'",
                current.title(),
                new_status.title()
            )));
        }
        if current == new_status {
            return Ok(order);
        }

        let now = Utc::now();
        let user_id = order.user_id;
        let order_number = order.order_number.clone();
        let mut timeline = order.timeline.clone();
        timeline.push(new_status, now);

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.timeline = Set(timeline);
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        info!(order_id = %order_id, from = ?current, to = ?new_status, "Order status changed");

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                order_number,
                user_id,
                status: new_status,
            })
            .await;

        Ok(updated)
    }

    pub async fn get_order(
        &self,
        order_id: Uuid,
        populate: bool,
    ) -> Result<OrderDetails, ServiceError> {
        let order = self.load(order_id).await?;

        let shop = if populate {
            Shop::find_by_id(order.shop_id)
                .one(&*self.db)
                .await?
                .map(|s: ShopModel| ShopSummary {
                    id: s.id,
                    name: s.name,
                    partner_id: s.partner_id,
                })
        } else {
            None
        };

        Ok(OrderDetails { order, shop })
    }

    /// Paginated listing with optional owner, status, and creation-date
    /// filters. An agent filter matches either leg of the order.
    pub async fn list_orders(
        &self,
        filter: OrderListFilter,
    ) -> Result<OrderListPage, ServiceError> {
        let page = filter.page.max(1);
        let page_size = filter.page_size.clamp(1, 100);

        let mut query = Order::find().order_by_desc(order::Column::CreatedAt);

        if let Some(user_id) = filter.user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        if let Some(shop_id) = filter.shop_id {
            query = query.filter(order::Column::ShopId.eq(shop_id));
        }
        if let Some(agent_id) = filter.agent_id {
            query = query.filter(
                Condition::any()
                    .add(order::Column::PickupAgentId.eq(agent_id))
                    .add(order::Column::DeliveryAgentId.eq(agent_id)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(start) = filter.start_date {
            let end = filter.end_date.unwrap_or_else(|| Utc::now().date_naive());
            let from = start.and_hms_opt(0, 0, 0).unwrap().and_utc();
            let to = end.and_hms_opt(23, 59, 59).unwrap().and_utc();
            query = query
                .filter(order::Column::CreatedAt.gte(from))
                .filter(order::Column::CreatedAt.lte(to));
        }

        let paginator = query.paginate(&*self.db, page_size);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;
        let total_pages = if total == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };

        Ok(OrderListPage {
            orders,
            total,
            page,
            page_size,
            total_pages,
        })
    }

    /// Hard delete, admin surface only.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let result = Order::delete_by_id(order_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Order not found".to_string()));
        }
        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    async fn load(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }
}

/// Short human-facing order number.
fn generate_order_number() -> String {
    use rand::distributions::Alphanumeric;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("WL-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_are_short_and_prefixed() {
        let number = generate_order_number();
        assert!(number.starts_with("WL-"));
        assert_eq!(number.len(), 11);
        assert!(number[3..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn otp_kind_parses_only_known_codes() {
        assert_eq!(OtpKind::try_from(0).unwrap(), OtpKind::Pickup);
        assert_eq!(OtpKind::try_from(1).unwrap(), OtpKind::Drop);
        assert!(OtpKind::try_from(2).is_err());
    }
}
