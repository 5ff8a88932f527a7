use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    config::PricingSettings,
    entities::{cart, cart_item, Cart, CartItem, LaundryService, PriceBreakdown, Shop},
    errors::ServiceError,
    services::{promo_codes::PromoCodeService, wallets::WalletService},
};

/// Inputs to a price quote, straight from the client.
#[derive(Debug, Clone)]
pub struct QuoteInput {
    pub user_id: Uuid,
    pub promo_code: Option<String>,
    pub use_wallet_points: bool,
    pub use_express_delivery: bool,
    pub self_service: bool,
}

/// Read-only quote calculator. Persists nothing, so clients can re-quote
/// freely while editing the cart; wallet points are only debited when the
/// order is actually placed.
#[derive(Clone)]
pub struct PricingService {
    db: Arc<DatabaseConnection>,
    promo_codes: PromoCodeService,
    wallets: WalletService,
}

impl PricingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        promo_codes: PromoCodeService,
        wallets: WalletService,
    ) -> Self {
        Self {
            db,
            promo_codes,
            wallets,
        }
    }

    #[instrument(skip(self, settings), fields(user_id = %input.user_id))]
    pub async fn quote(
        &self,
        input: QuoteInput,
        settings: &PricingSettings,
    ) -> Result<PriceBreakdown, ServiceError> {
        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(input.user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;

        let lines = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(&*self.db)
            .await?;
        if lines.is_empty() {
            return Err(ServiceError::ValidationError("Cart is empty".to_string()));
        }

        let mut subtotal = Decimal::ZERO;
        for line in &lines {
            let service = LaundryService::find_by_id(line.service_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound("Service is no longer available".to_string())
                })?;
            subtotal += service.unit_price(cart.quantity_unit) * Decimal::from(line.quantity);
        }

        let gst_amount = subtotal * settings.gst_percentage / Decimal::ONE_HUNDRED;

        let shop = Shop::find_by_id(cart.shop_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Shop not found".to_string()))?;

        let express_delivery_charges = if input.use_express_delivery {
            if !shop.accepts_express_service {
                return Err(ServiceError::BusinessRule(
                    "Express service is not available for this shop".to_string(),
                ));
            }
            if shop.express_service_charges > Decimal::ZERO {
                shop.express_service_charges
            } else {
                settings.express_delivery_charges
            }
        } else {
            Decimal::ZERO
        };

        // Self-service customers handle pickup and drop themselves; express
        // still bills its surcharge because the shop turns the order around
        // faster regardless of who carries it.
        let delivery_charges = if input.self_service {
            Decimal::ZERO
        } else {
            settings.delivery_charges
        };
        let agent_compensation = delivery_charges;

        let gross = subtotal
            + gst_amount
            + delivery_charges
            + express_delivery_charges
            + settings.platform_fee;

        let (discount, promo_code_id) = match input.promo_code.as_deref() {
            Some(code) => {
                let evaluated = self
                    .promo_codes
                    .evaluate(code, subtotal, delivery_charges, input.user_id)
                    .await?;
                (evaluated.discount, Some(evaluated.promo.id))
            }
            None => (Decimal::ZERO, None),
        };

        let wallet_balance = if input.use_wallet_points {
            // A quote for a user without a wallet is still answerable; the
            // redemption itself happens (and is enforced) at placement.
            match self.wallets.balance(input.user_id).await {
                Ok(balance) => Some(balance),
                Err(ServiceError::NotFound(_)) => Some(Decimal::ZERO),
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let (_, wallet_points_used, total_amount_to_pay) =
            settle_total(gross, discount, wallet_balance);

        Ok(PriceBreakdown {
            subtotal,
            gst_amount,
            delivery_charges,
            express_delivery_charges,
            platform_fee: settings.platform_fee,
            discount,
            wallet_points_used,
            promo_code_id,
            agent_compensation,
            total_amount_to_pay,
        })
    }
}

/// Applies discount then wallet redemption to the gross total, flooring at
/// zero after each step. Returns (after-discount total, points used, final
/// total).
fn settle_total(
    gross: Decimal,
    discount: Decimal,
    wallet_balance: Option<Decimal>,
) -> (Decimal, Decimal, Decimal) {
    let discounted = (gross - discount).max(Decimal::ZERO);
    let wallet_points_used = wallet_balance
        .map(|balance| balance.min(discounted).max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO);
    let total = (discounted - wallet_points_used).max(Decimal::ZERO);
    (discounted, wallet_points_used, total)
}
