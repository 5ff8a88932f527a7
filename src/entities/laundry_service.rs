use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::QuantityUnit;

/// Catalog entry: one laundry service offered by a shop, priced per piece
/// and/or per kilogram.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "laundry_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub kind: ServiceKind,
    pub description: Option<String>,
    pub per_piece_price: Decimal,
    pub per_kg_price: Decimal,
    pub quantity_accepted_in: QuantityAcceptance,
    pub is_active: bool,
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

impl Model {
    /// Price for one unit under the given quantity unit.
    pub fn unit_price(&self, unit: QuantityUnit) -> Decimal {
        match unit {
            QuantityUnit::PerPiece => self.per_piece_price,
            QuantityUnit::PerKg => self.per_kg_price,
        }
    }

    pub fn accepts_unit(&self, unit: QuantityUnit) -> bool {
        match self.quantity_accepted_in {
            QuantityAcceptance::Either => true,
            QuantityAcceptance::PerPiece => unit == QuantityUnit::PerPiece,
            QuantityAcceptance::PerKg => unit == QuantityUnit::PerKg,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum ServiceKind {
    #[sea_orm(num_value = 0)]
    Press,
    #[sea_orm(num_value = 1)]
    Washing,
    #[sea_orm(num_value = 2)]
    DryCleaning,
}

impl From<ServiceKind> for i32 {
    fn from(value: ServiceKind) -> Self {
        match value {
            ServiceKind::Press => 0,
            ServiceKind::Washing => 1,
            ServiceKind::DryCleaning => 2,
        }
    }
}

impl TryFrom<i32> for ServiceKind {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ServiceKind::Press),
            1 => Ok(ServiceKind::Washing),
            2 => Ok(ServiceKind::DryCleaning),
            other => Err(format!("unknown service kind: {other}")),
        }
    }
}

/// Which quantity units the shop will take this service in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum QuantityAcceptance {
    #[sea_orm(num_value = 0)]
    PerPiece,
    #[sea_orm(num_value = 1)]
    PerKg,
    #[sea_orm(num_value = 2)]
    Either,
}

impl From<QuantityAcceptance> for i32 {
    fn from(value: QuantityAcceptance) -> Self {
        match value {
            QuantityAcceptance::PerPiece => 0,
            QuantityAcceptance::PerKg => 1,
            QuantityAcceptance::Either => 2,
        }
    }
}

impl TryFrom<i32> for QuantityAcceptance {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QuantityAcceptance::PerPiece),
            1 => Ok(QuantityAcceptance::PerKg),
            2 => Ok(QuantityAcceptance::Either),
            other => Err(format!("unknown quantity acceptance: {other}")),
        }
    }
}
