use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Washline API",
        description = "Backend for an on-demand laundry marketplace: carts, price quotes \
with GST/delivery/express/promo/wallet arithmetic, and an OTP-gated order lifecycle with \
delivery-agent assignment."
    ),
    paths(
        handlers::orders::calculate_amount_to_pay,
        handlers::orders::place_order,
        handlers::orders::initiate_payment,
        handlers::orders::generate_otp,
        handlers::orders::verify_otp,
        handlers::orders::update_order_status,
        handlers::orders::assign_delivery_agent,
        handlers::orders::get_order,
        handlers::orders::list_orders_by_user,
        handlers::orders::list_orders_by_shop,
        handlers::orders::list_orders_by_agent,
        handlers::orders::delete_order,
        handlers::carts::add_to_cart,
        handlers::carts::remove_from_cart,
        handlers::carts::get_cart,
        handlers::carts::clear_cart,
        handlers::promo_codes::create_promo_code,
        handlers::promo_codes::list_promo_codes,
        handlers::promo_codes::apply_promo_code,
        handlers::wallets::get_wallet_balance,
    ),
    tags(
        (name = "orders", description = "Order lifecycle and pricing"),
        (name = "carts", description = "Cart management"),
        (name = "promo-codes", description = "Promotional codes"),
        (name = "wallets", description = "Cashback wallet")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
