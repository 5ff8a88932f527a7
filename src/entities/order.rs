use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Short human-facing order number, e.g. `WL-4K7QX2MB`.
    #[sea_orm(unique)]
    pub order_number: String,

    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub order_type: OrderType,

    /// Snapshot of the cart lines at placement time.
    #[sea_orm(column_type = "Json")]
    pub items: OrderItems,

    pub pickup_address_id: Option<Uuid>,
    pub dropoff_address_id: Option<Uuid>,
    pub pickup_time: Option<String>,
    pub dropoff_time: Option<String>,
    pub self_service: bool,
    pub payment_details: Option<String>,

    pub status: OrderStatus,

    /// Append-only history of lifecycle transitions.
    #[sea_orm(column_type = "Json")]
    pub timeline: OrderTimeline,

    /// Write-once; set via a conditional update so concurrent generation
    /// cannot overwrite an existing code.
    pub pickup_otp: Option<i32>,
    pub drop_otp: Option<i32>,
    pub pickup_otp_verified: bool,
    pub delivery_otp_verified: bool,

    /// Write-once per slot, same conditional-update discipline as the OTPs.
    pub pickup_agent_id: Option<Uuid>,
    pub delivery_agent_id: Option<Uuid>,

    #[sea_orm(column_type = "Json")]
    pub price_details: PriceBreakdown,

    /// Points credited to the customer's wallet when the order completed.
    pub cashback_points: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum OrderType {
    #[sea_orm(num_value = 0)]
    Regular,
    #[sea_orm(num_value = 1)]
    Express,
}

impl From<OrderType> for i32 {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::Regular => 0,
            OrderType::Express => 1,
        }
    }
}

impl TryFrom<i32> for OrderType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderType::Regular),
            1 => Ok(OrderType::Express),
            other => Err(format!("unknown order type: {other}")),
        }
    }
}

/// Order lifecycle states, persisted as their integer codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum OrderStatus {
    #[sea_orm(num_value = 0)]
    Pending,
    #[sea_orm(num_value = 1)]
    Confirmed,
    #[sea_orm(num_value = 2)]
    PickupAgentAssigned,
    #[sea_orm(num_value = 3)]
    PickedUp,
    #[sea_orm(num_value = 4)]
    InProcess,
    #[sea_orm(num_value = 5)]
    ReadyForDrop,
    #[sea_orm(num_value = 6)]
    DeliveryAgentAssigned,
    #[sea_orm(num_value = 7)]
    Completed,
    #[sea_orm(num_value = 8)]
    Cancelled,
}

impl From<OrderStatus> for i32 {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::PickupAgentAssigned => 2,
            OrderStatus::PickedUp => 3,
            OrderStatus::InProcess => 4,
            OrderStatus::ReadyForDrop => 5,
            OrderStatus::DeliveryAgentAssigned => 6,
            OrderStatus::Completed => 7,
            OrderStatus::Cancelled => 8,
        }
    }
}

impl TryFrom<i32> for OrderStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderStatus::Pending),
            1 => Ok(OrderStatus::Confirmed),
            2 => Ok(OrderStatus::PickupAgentAssigned),
            3 => Ok(OrderStatus::PickedUp),
            4 => Ok(OrderStatus::InProcess),
            5 => Ok(OrderStatus::ReadyForDrop),
            6 => Ok(OrderStatus::DeliveryAgentAssigned),
            7 => Ok(OrderStatus::Completed),
            8 => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl OrderStatus {
    /// Human-readable title used for timeline entries and notifications.
    pub fn title(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order Placed",
            OrderStatus::Confirmed => "Order Confirmed",
            OrderStatus::PickupAgentAssigned => "Pickup Agent Assigned",
            OrderStatus::PickedUp => "Order Picked Up",
            OrderStatus::InProcess => "Order In Process",
            OrderStatus::ReadyForDrop => "Ready For Drop Off",
            OrderStatus::DeliveryAgentAssigned => "Delivery Agent Assigned",
            OrderStatus::Completed => "Order Completed",
            OrderStatus::Cancelled => "Order Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Strict transition table. Same-status writes are accepted as no-ops.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, PickupAgentAssigned)
                | (Confirmed, Cancelled)
                | (PickupAgentAssigned, PickedUp)
                | (PickupAgentAssigned, Cancelled)
                | (PickedUp, InProcess)
                | (InProcess, ReadyForDrop)
                | (ReadyForDrop, DeliveryAgentAssigned)
                | (DeliveryAgentAssigned, Completed)
        )
    }
}

/// One cart line frozen into the order at placement time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderItemSnapshot {
    pub service_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderItems(pub Vec<OrderItemSnapshot>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct TimelineEntry {
    pub title: String,
    pub status: OrderStatus,
    pub at: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderTimeline(pub Vec<TimelineEntry>);

impl OrderTimeline {
    /// Timeline entries are append-only; there is no removal path.
    pub fn push(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        self.0.push(TimelineEntry {
            title: status.title().to_string(),
            status,
            at: at.format("%Y-%m-%d %H:%M:%S").to_string(),
        });
    }
}

/// Priced quote for a cart, embedded verbatim into the order at placement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub delivery_charges: Decimal,
    pub express_delivery_charges: Decimal,
    pub platform_fee: Decimal,
    pub discount: Decimal,
    pub wallet_points_used: Decimal,
    pub promo_code_id: Option<Uuid>,
    /// What the delivery agent earns on this order. Stays at the full
    /// delivery charge under a free-delivery promo even though the customer
    /// pays nothing for delivery.
    pub agent_compensation: Decimal,
    pub total_amount_to_pay: Decimal,
}
