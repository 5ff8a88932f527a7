use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{cashback_tier, wallet, CashbackTier, Wallet},
    errors::ServiceError,
};

/// Per-user point ledger. All mutations go through guarded single-statement
/// updates so the balance can never go negative under concurrent redemption.
#[derive(Clone)]
pub struct WalletService {
    db: Arc<DatabaseConnection>,
}

impl WalletService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Current point balance.
    pub async fn balance(&self, user_id: Uuid) -> Result<Decimal, ServiceError> {
        let wallet = Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Wallet not found".to_string()))?;
        Ok(wallet.points)
    }

    /// Redeems `points` all-or-nothing. The decrement carries its own
    /// balance guard in the WHERE clause, so two concurrent redemptions can
    /// never jointly overdraw.
    #[instrument(skip(self), fields(user_id = %user_id, points = %points))]
    pub async fn redeem(&self, user_id: Uuid, points: Decimal) -> Result<(), ServiceError> {
        if points <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Points to redeem must be positive".to_string(),
            ));
        }

        let result = Wallet::update_many()
            .col_expr(
                wallet::Column::Points,
                Expr::col(wallet::Column::Points).sub(points),
            )
            .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallet::Column::UserId.eq(user_id))
            .filter(wallet::Column::Points.gte(points))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            // Distinguish a missing wallet from an underfunded one.
            let exists = Wallet::find()
                .filter(wallet::Column::UserId.eq(user_id))
                .one(&*self.db)
                .await?
                .is_some();
            return Err(if exists {
                ServiceError::BusinessRule("Insufficient wallet balance".to_string())
            } else {
                ServiceError::NotFound("Wallet not found".to_string())
            });
        }

        info!(user_id = %user_id, points = %points, "Wallet points redeemed");
        Ok(())
    }

    /// Credits cashback for a completed order and returns the points added.
    /// The percentage comes from the active tier whose range contains
    /// `total_amount`; no matching tier means zero points.
    #[instrument(skip(self), fields(user_id = %user_id, total_amount = %total_amount))]
    pub async fn accrue_cashback(
        &self,
        user_id: Uuid,
        total_amount: Decimal,
    ) -> Result<Decimal, ServiceError> {
        let points = self.cashback_points_for(total_amount).await?;

        if points > Decimal::ZERO {
            let result = Wallet::update_many()
                .col_expr(
                    wallet::Column::Points,
                    Expr::col(wallet::Column::Points).add(points),
                )
                .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(wallet::Column::UserId.eq(user_id))
                .exec(&*self.db)
                .await?;

            if result.rows_affected == 0 {
                return Err(ServiceError::NotFound("Wallet not found".to_string()));
            }
            info!(user_id = %user_id, points = %points, "Cashback points credited");
        } else {
            let exists = Wallet::find()
                .filter(wallet::Column::UserId.eq(user_id))
                .one(&*self.db)
                .await?
                .is_some();
            if !exists {
                return Err(ServiceError::NotFound("Wallet not found".to_string()));
            }
        }

        Ok(points)
    }

    /// Resolves the cashback tier for an order total. Points are floored to
    /// whole units; `cashback_percent` is a fractional multiplier.
    pub async fn cashback_points_for(
        &self,
        total_amount: Decimal,
    ) -> Result<Decimal, ServiceError> {
        let tier = CashbackTier::find()
            .filter(cashback_tier::Column::IsActive.eq(true))
            .filter(cashback_tier::Column::OrderAmountFrom.lte(total_amount))
            .filter(cashback_tier::Column::OrderAmountTo.gte(total_amount))
            .one(&*self.db)
            .await?;

        let percent = tier.map(|t| t.cashback_percent).unwrap_or(Decimal::ZERO);
        Ok((total_amount * percent).floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, Set};

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

    async fn seed_wallet(db: &DatabaseConnection, user_id: Uuid, points: Decimal) {
        wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            points: Set(points),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn seed_tier(db: &DatabaseConnection, from: Decimal, to: Decimal, percent: Decimal) {
        cashback_tier::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_amount_from: Set(from),
            order_amount_to: Set(to),
            cashback_percent: Set(percent),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn redeem_decrements_and_rejects_overdraw() {
        let db = test_db().await;
        let service = WalletService::new(db.clone());
        let user_id = Uuid::new_v4();
        seed_wallet(&db, user_id, dec!(100)).await;

        service.redeem(user_id, dec!(60)).await.unwrap();
        assert_eq!(service.balance(user_id).await.unwrap(), dec!(40));

        // Over-redemption is rejected entirely; no partial deduction.
        let err = service.redeem(user_id, dec!(41)).await.unwrap_err();
        assert_matches!(err, ServiceError::BusinessRule(_));
        assert_eq!(service.balance(user_id).await.unwrap(), dec!(40));
    }

    #[tokio::test]
    async fn redeem_without_wallet_is_not_found() {
        let db = test_db().await;
        let service = WalletService::new(db);
        let err = service.redeem(Uuid::new_v4(), dec!(10)).await.unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }

    #[tokio::test]
    async fn cashback_uses_matching_tier_and_floors() {
        let db = test_db().await;
        let service = WalletService::new(db.clone());
        let user_id = Uuid::new_v4();
        seed_wallet(&db, user_id, dec!(0)).await;
        seed_tier(&db, dec!(100), dec!(1000), dec!(0.05)).await;

        // 575 * 0.05 = 28.75, floored to 28.
        let points = service.accrue_cashback(user_id, dec!(575)).await.unwrap();
        assert_eq!(points, dec!(28));
        assert_eq!(service.balance(user_id).await.unwrap(), dec!(28));
    }

    #[tokio::test]
    async fn cashback_without_matching_tier_is_zero() {
        let db = test_db().await;
        let service = WalletService::new(db.clone());
        let user_id = Uuid::new_v4();
        seed_wallet(&db, user_id, dec!(5)).await;
        seed_tier(&db, dec!(1000), dec!(2000), dec!(0.10)).await;

        let points = service.accrue_cashback(user_id, dec!(575)).await.unwrap();
        assert_eq!(points, dec!(0));
        assert_eq!(service.balance(user_id).await.unwrap(), dec!(5));
    }

    #[tokio::test]
    async fn cashback_without_wallet_is_not_found() {
        let db = test_db().await;
        let service = WalletService::new(db.clone());
        seed_tier(&db, dec!(0), dec!(1000), dec!(0.05)).await;

        let err = service
            .accrue_cashback(Uuid::new_v4(), dec!(500))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }
}
