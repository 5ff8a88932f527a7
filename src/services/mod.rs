pub mod carts;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod promo_codes;
pub mod wallets;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, events::EventSender};

pub use carts::CartService;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use pricing::PricingService;
pub use promo_codes::PromoCodeService;
pub use wallets::WalletService;

/// Aggregate of every service the HTTP handlers reach for.
#[derive(Clone)]
pub struct AppServices {
    pub carts: CartService,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub pricing: PricingService,
    pub promo_codes: PromoCodeService,
    pub wallets: WalletService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, config: &AppConfig) -> Self {
        let wallets = WalletService::new(db.clone());
        let promo_codes = PromoCodeService::new(db.clone());
        let pricing = PricingService::new(db.clone(), promo_codes.clone(), wallets.clone());
        let carts = CartService::new(db.clone(), event_sender.clone());
        let orders = OrderService::new(db.clone(), event_sender, wallets.clone());
        let payments = PaymentService::new(db, config.payment_gateway.clone());

        Self {
            carts,
            orders,
            payments,
            pricing,
            promo_codes,
            wallets,
        }
    }
}
