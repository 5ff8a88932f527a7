use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cart per user. All lines belong to `shop_id`; adding a line from a
/// different shop clears the cart and re-homes it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub quantity_unit: QuantityUnit,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// How quantities in this cart are counted and priced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum QuantityUnit {
    #[sea_orm(num_value = 0)]
    PerPiece,
    #[sea_orm(num_value = 1)]
    PerKg,
}

impl From<QuantityUnit> for i32 {
    fn from(value: QuantityUnit) -> Self {
        match value {
            QuantityUnit::PerPiece => 0,
            QuantityUnit::PerKg => 1,
        }
    }
}

impl TryFrom<i32> for QuantityUnit {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QuantityUnit::PerPiece),
            1 => Ok(QuantityUnit::PerKg),
            other => Err(format!("unknown quantity unit: {other}")),
        }
    }
}
