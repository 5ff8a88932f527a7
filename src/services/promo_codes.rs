use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{order, promo_code, Order, PromoCode, PromoCodeModel, PromoCodeType},
    errors::ServiceError,
};

/// Outcome of evaluating a promo code against an order quote.
#[derive(Debug, Clone)]
pub struct EvaluatedPromo {
    pub promo: PromoCodeModel,
    pub discount: Decimal,
}

#[derive(Debug, Clone)]
pub struct CreatePromoCodeInput {
    pub name: String,
    pub code: String,
    pub code_type: PromoCodeType,
    pub discount_amount: Decimal,
    pub min_order_amount: Decimal,
    pub description: Option<String>,
    pub expires_on: NaiveDate,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PromoCodeService {
    db: Arc<DatabaseConnection>,
}

impl PromoCodeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(
        &self,
        input: CreatePromoCodeInput,
    ) -> Result<PromoCodeModel, ServiceError> {
        let duplicate = PromoCode::find()
            .filter(
                promo_code::Column::Code
                    .eq(input.code.clone())
                    .or(promo_code::Column::Name.eq(input.name.clone())),
            )
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::ValidationError(
                "Promo code already exists with this name or code".to_string(),
            ));
        }

        let now = Utc::now();
        let promo = promo_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            code: Set(input.code),
            code_type: Set(input.code_type),
            discount_amount: Set(input.discount_amount),
            min_order_amount: Set(input.min_order_amount),
            description: Set(input.description),
            expires_on: Set(input.expires_on),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(promo_id = %promo.id, "Promo code created");
        Ok(promo)
    }

    pub async fn list(
        &self,
        is_active: Option<bool>,
        code_type: Option<PromoCodeType>,
    ) -> Result<Vec<PromoCodeModel>, ServiceError> {
        let mut query = PromoCode::find().order_by_desc(promo_code::Column::CreatedAt);
        if let Some(active) = is_active {
            query = query.filter(promo_code::Column::IsActive.eq(active));
        }
        if let Some(kind) = code_type {
            query = query.filter(promo_code::Column::CodeType.eq(kind));
        }
        Ok(query.all(&*self.db).await?)
    }

    /// Validates a code and computes the discount it grants on this quote.
    ///
    /// Checks run in a fixed order: existence/active, expiry (calendar date;
    /// a code stays valid through its expiry day), minimum order amount, and
    /// finally the type-specific rule. Pure aside from the first-order
    /// lookup.
    #[instrument(skip(self), fields(code = %code, subtotal = %subtotal))]
    pub async fn evaluate(
        &self,
        code: &str,
        subtotal: Decimal,
        delivery_charges: Decimal,
        user_id: Uuid,
    ) -> Result<EvaluatedPromo, ServiceError> {
        let promo = PromoCode::find()
            .filter(promo_code::Column::Code.eq(code))
            .one(&*self.db)
            .await?;

        let promo = match promo {
            Some(p) if p.is_active => p,
            _ => {
                return Err(ServiceError::BusinessRule("Invalid promo code".to_string()));
            }
        };

        if promo.expires_on < Utc::now().date_naive() {
            return Err(ServiceError::BusinessRule("Promo code expired".to_string()));
        }

        if subtotal < promo.min_order_amount {
            return Err(ServiceError::BusinessRule(
                "Order total needs to be greater than the minimum order amount".to_string(),
            ));
        }

        let discount = match promo.code_type {
            PromoCodeType::FreeDelivery => delivery_charges,
            PromoCodeType::FixedDiscount => promo.discount_amount,
            PromoCodeType::FirstOrderDiscount => {
                let prior_order = Order::find()
                    .filter(order::Column::UserId.eq(user_id))
                    .one(&*self.db)
                    .await?;
                if prior_order.is_some() {
                    return Err(ServiceError::BusinessRule(
                        "This code is only valid on the first order".to_string(),
                    ));
                }
                promo.discount_amount
            }
        };

        Ok(EvaluatedPromo { promo, discount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use crate::entities::{OrderItems, OrderStatus, OrderTimeline, OrderType, PriceBreakdown};
    use assert_matches::assert_matches;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    async fn test_db() -> Arc<DatabaseConnection> {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let db = establish_connection_with_config(&cfg).await.unwrap();
        run_migrations(&db).await.unwrap();
        Arc::new(db)
    }

    fn promo_input(code: &str, code_type: PromoCodeType) -> CreatePromoCodeInput {
        CreatePromoCodeInput {
            name: format!("{code} promo"),
            code: code.to_string(),
            code_type,
            discount_amount: dec!(50),
            min_order_amount: dec!(200),
            description: None,
            expires_on: (Utc::now() + Duration::days(30)).date_naive(),
            is_active: true,
        }
    }

    async fn seed_order_for(db: &DatabaseConnection, user_id: Uuid) {
        use sea_orm::Set;
        order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(format!("WL-{}", &Uuid::new_v4().simple().to_string()[..8])),
            user_id: Set(user_id),
            shop_id: Set(Uuid::new_v4()),
            order_type: Set(OrderType::Regular),
            items: Set(OrderItems::default()),
            pickup_address_id: Set(None),
            dropoff_address_id: Set(None),
            pickup_time: Set(None),
            dropoff_time: Set(None),
            self_service: Set(false),
            payment_details: Set(None),
            status: Set(OrderStatus::Pending),
            timeline: Set(OrderTimeline::default()),
            pickup_otp: Set(None),
            drop_otp: Set(None),
            pickup_otp_verified: Set(false),
            delivery_otp_verified: Set(false),
            pickup_agent_id: Set(None),
            delivery_agent_id: Set(None),
            price_details: Set(PriceBreakdown::default()),
            cashback_points: Set(dec!(0)),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_or_inactive_code_is_invalid() {
        let db = test_db().await;
        let service = PromoCodeService::new(db.clone());

        let err = service
            .evaluate("NOPE", dec!(500), dec!(40), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::BusinessRule(msg) if msg == "Invalid promo code");

        let mut input = promo_input("PAUSED", PromoCodeType::FixedDiscount);
        input.is_active = false;
        service.create(input).await.unwrap();
        let err = service
            .evaluate("PAUSED", dec!(500), dec!(40), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::BusinessRule(msg) if msg == "Invalid promo code");
    }

    #[tokio::test]
    async fn expiry_is_compared_by_calendar_date() {
        let db = test_db().await;
        let service = PromoCodeService::new(db.clone());

        // Expiring today is still usable; yesterday is not.
        let mut today = promo_input("TODAY", PromoCodeType::FixedDiscount);
        today.expires_on = Utc::now().date_naive();
        service.create(today).await.unwrap();
        let result = service
            .evaluate("TODAY", dec!(500), dec!(40), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(result.discount, dec!(50));

        let mut stale = promo_input("STALE", PromoCodeType::FixedDiscount);
        stale.expires_on = (Utc::now() - Duration::days(1)).date_naive();
        service.create(stale).await.unwrap();
        let err = service
            .evaluate("STALE", dec!(500), dec!(40), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::BusinessRule(msg) if msg == "Promo code expired");
    }

    #[tokio::test]
    async fn minimum_order_amount_is_enforced() {
        let db = test_db().await;
        let service = PromoCodeService::new(db.clone());
        service
            .create(promo_input("MIN200", PromoCodeType::FixedDiscount))
            .await
            .unwrap();

        let err = service
            .evaluate("MIN200", dec!(199), dec!(40), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::BusinessRule(_));

        let ok = service
            .evaluate("MIN200", dec!(200), dec!(40), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(ok.discount, dec!(50));
    }

    #[tokio::test]
    async fn free_delivery_discounts_the_delivery_charge() {
        let db = test_db().await;
        let service = PromoCodeService::new(db.clone());
        service
            .create(promo_input("SHIPFREE", PromoCodeType::FreeDelivery))
            .await
            .unwrap();

        let result = service
            .evaluate("SHIPFREE", dec!(500), dec!(40), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(result.discount, dec!(40));
    }

    #[tokio::test]
    async fn first_order_code_rejects_returning_users() {
        let db = test_db().await;
        let service = PromoCodeService::new(db.clone());
        service
            .create(promo_input("WELCOME", PromoCodeType::FirstOrderDiscount))
            .await
            .unwrap();

        let newcomer = Uuid::new_v4();
        let result = service
            .evaluate("WELCOME", dec!(500), dec!(40), newcomer)
            .await
            .unwrap();
        assert_eq!(result.discount, dec!(50));

        let regular = Uuid::new_v4();
        seed_order_for(&db, regular).await;
        let err = service
            .evaluate("WELCOME", dec!(500), dec!(40), regular)
            .await
            .unwrap_err();
        assert_matches!(
            err,
            ServiceError::BusinessRule(msg) if msg == "This code is only valid on the first order"
        );
    }

    #[tokio::test]
    async fn duplicate_name_or_code_is_rejected() {
        let db = test_db().await;
        let service = PromoCodeService::new(db.clone());
        service
            .create(promo_input("ONCE", PromoCodeType::FixedDiscount))
            .await
            .unwrap();

        let err = service
            .create(promo_input("ONCE", PromoCodeType::FixedDiscount))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }
}
