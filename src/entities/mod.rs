pub mod cart;
pub mod cart_item;
pub mod cashback_tier;
pub mod delivery_agent;
pub mod laundry_service;
pub mod order;
pub mod promo_code;
pub mod shop;
pub mod wallet;

pub use cart::{Entity as Cart, Model as CartModel, QuantityUnit};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use cashback_tier::{Entity as CashbackTier, Model as CashbackTierModel};
pub use delivery_agent::{AgentStatus, Entity as DeliveryAgent, Model as DeliveryAgentModel};
pub use laundry_service::{
    Entity as LaundryService, Model as LaundryServiceModel, QuantityAcceptance, ServiceKind,
};
pub use order::{
    Entity as Order, Model as OrderModel, OrderItemSnapshot, OrderItems, OrderStatus,
    OrderTimeline, OrderType, PriceBreakdown, TimelineEntry,
};
pub use promo_code::{Entity as PromoCode, Model as PromoCodeModel, PromoCodeType};
pub use shop::{Entity as Shop, Model as ShopModel};
pub use wallet::{Entity as Wallet, Model as WalletModel};
