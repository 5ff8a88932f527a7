use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub code_type: PromoCodeType,
    pub discount_amount: Decimal,
    pub min_order_amount: Decimal,
    pub description: Option<String>,
    /// Expiry is a calendar date; a code is usable through its expiry day.
    pub expires_on: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum PromoCodeType {
    #[sea_orm(num_value = 1)]
    FreeDelivery,
    #[sea_orm(num_value = 2)]
    FixedDiscount,
    #[sea_orm(num_value = 3)]
    FirstOrderDiscount,
}

impl From<PromoCodeType> for i32 {
    fn from(value: PromoCodeType) -> Self {
        match value {
            PromoCodeType::FreeDelivery => 1,
            PromoCodeType::FixedDiscount => 2,
            PromoCodeType::FirstOrderDiscount => 3,
        }
    }
}

impl TryFrom<i32> for PromoCodeType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PromoCodeType::FreeDelivery),
            2 => Ok(PromoCodeType::FixedDiscount),
            3 => Ok(PromoCodeType::FirstOrderDiscount),
            other => Err(format!("unknown promo code type: {other}")),
        }
    }
}
