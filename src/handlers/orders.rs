use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{OrderStatus, OrderType, PriceBreakdown},
    errors::ServiceError,
    handlers::common::{created_response, success_response, validate_input},
    services::orders::{AssignAgentsInput, OrderListFilter, OtpKind, PlaceOrderInput},
    services::pricing::QuoteInput,
    AppState,
};

pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate/amount-to-pay", post(calculate_amount_to_pay))
        .route("/place", post(place_order))
        .route("/initiate/payment", post(initiate_payment))
        .route("/generate/otp", post(generate_otp))
        .route("/verify/otp/update-order", post(verify_otp))
        .route("/update/order-status", put(update_order_status))
        .route("/assign/delivery-agent", put(assign_delivery_agent))
        .route("/get/:order_id", get(get_order))
        .route("/get-by/user/:user_id", get(list_orders_by_user))
        .route("/get-by/shop/:shop_id", get(list_orders_by_shop))
        .route("/get-by/agent/:agent_id", get(list_orders_by_agent))
        .route("/delete/:order_id", delete(delete_order))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct QuoteRequest {
    pub user_id: Uuid,
    pub code: Option<String>,
    #[serde(default)]
    pub use_wallet_points: bool,
    #[serde(default)]
    pub use_express_delivery: bool,
    #[serde(default)]
    pub self_service: bool,
}

/// Price a cart without persisting anything.
#[utoipa::path(
    post,
    path = "/api/v1/orders/calculate/amount-to-pay",
    request_body = QuoteRequest,
    responses((status = 200, description = "Priced breakdown for the current cart"))
)]
pub async fn calculate_amount_to_pay(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let breakdown = state
        .services
        .pricing
        .quote(
            QuoteInput {
                user_id: payload.user_id,
                promo_code: payload.code,
                use_wallet_points: payload.use_wallet_points,
                use_express_delivery: payload.use_express_delivery,
                self_service: payload.self_service,
            },
            &state.config.pricing,
        )
        .await?;
    Ok(success_response(breakdown, "Amount calculated successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub order_type: i32,
    pub pickup_address_id: Option<Uuid>,
    pub dropoff_address_id: Option<Uuid>,
    pub pickup_time: Option<String>,
    pub dropoff_time: Option<String>,
    #[serde(default)]
    pub self_service: bool,
    pub payment_details: Option<String>,
    #[schema(value_type = Object)]
    pub price_details: PriceBreakdown,
}

/// Create an order from the caller's priced cart.
#[utoipa::path(
    post,
    path = "/api/v1/orders/place",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order created"),
        (status = 404, description = "Cart not found")
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let order_type = OrderType::try_from(payload.order_type)
        .map_err(ServiceError::ValidationError)?;
    if payload.price_details.total_amount_to_pay < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Total amount to pay cannot be negative".to_string(),
        ));
    }

    let order = state
        .services
        .orders
        .create_order(PlaceOrderInput {
            user_id: payload.user_id,
            order_type,
            pickup_address_id: payload.pickup_address_id,
            dropoff_address_id: payload.dropoff_address_id,
            pickup_time: payload.pickup_time,
            dropoff_time: payload.dropoff_time,
            self_service: payload.self_service,
            payment_details: payload.payment_details,
            price_details: payload.price_details,
        })
        .await?;
    Ok(created_response(order, "Order created successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct InitiatePaymentRequest {
    pub order_id: Uuid,
}

/// Open a charge with the external payment gateway.
#[utoipa::path(
    post,
    path = "/api/v1/orders/initiate/payment",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Payment initiated"),
        (status = 502, description = "Gateway unavailable or unconfigured")
    )
)]
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(payload): Json<InitiatePaymentRequest>,
) -> Result<Response, ServiceError> {
    let initiation = state.services.payments.initiate(payload.order_id).await?;
    Ok(success_response(initiation, "Payment initiated successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct GenerateOtpRequest {
    pub order_id: Uuid,
    /// 0 = pickup, 1 = drop.
    pub otp_type: i32,
}

/// Generate the pickup or drop OTP for an order. Each OTP can be generated
/// exactly once.
#[utoipa::path(
    post,
    path = "/api/v1/orders/generate/otp",
    request_body = GenerateOtpRequest,
    responses(
        (status = 200, description = "Otp generated"),
        (status = 400, description = "Otp already generated")
    )
)]
pub async fn generate_otp(
    State(state): State<AppState>,
    Json(payload): Json<GenerateOtpRequest>,
) -> Result<Response, ServiceError> {
    let kind = OtpKind::try_from(payload.otp_type).map_err(ServiceError::ValidationError)?;
    let order = state.services.orders.generate_otp(payload.order_id, kind).await?;
    Ok(success_response(order, "Otp generated successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpRequest {
    pub order_id: Uuid,
    /// 0 = pickup, 1 = drop.
    pub otp_type: i32,
    pub otp: i32,
}

/// Verify a checkpoint OTP and advance the order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/verify/otp/update-order",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Order advanced"),
        (status = 400, description = "Invalid or already verified otp")
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Response, ServiceError> {
    let kind = OtpKind::try_from(payload.otp_type).map_err(ServiceError::ValidationError)?;
    let order = state
        .services
        .orders
        .verify_otp(payload.order_id, kind, payload.otp)
        .await?;
    Ok(success_response(order, "Otp verified successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub order_id: Uuid,
    /// Target status code (see the order status table).
    pub status: i32,
}

/// Move an order to a new status, subject to the transition table.
#[utoipa::path(
    put,
    path = "/api/v1/orders/update/order-status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Illegal transition")
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Response, ServiceError> {
    let status = OrderStatus::try_from(payload.status).map_err(ServiceError::ValidationError)?;
    let order = state
        .services
        .orders
        .change_status(payload.order_id, status)
        .await?;
    Ok(success_response(order, "Order status updated successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AssignAgentRequest {
    pub order_id: Uuid,
    pub pickup_agent_id: Option<Uuid>,
    pub delivery_agent_id: Option<Uuid>,
}

/// Assign the pickup and/or delivery agent. Each slot is write-once.
#[utoipa::path(
    put,
    path = "/api/v1/orders/assign/delivery-agent",
    request_body = AssignAgentRequest,
    responses(
        (status = 200, description = "Agent assigned"),
        (status = 400, description = "Slot already assigned")
    )
)]
pub async fn assign_delivery_agent(
    State(state): State<AppState>,
    Json(payload): Json<AssignAgentRequest>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .orders
        .assign_agents(
            payload.order_id,
            AssignAgentsInput {
                pickup_agent_id: payload.pickup_agent_id,
                delivery_agent_id: payload.delivery_agent_id,
            },
        )
        .await?;
    Ok(success_response(order, "Agent assigned successfully"))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetOrderQuery {
    #[serde(default)]
    pub populate: bool,
}

/// Fetch one order; `populate=true` expands the shop reference.
#[utoipa::path(
    get,
    path = "/api/v1/orders/get/{order_id}",
    params(("order_id" = Uuid, Path), GetOrderQuery),
    responses((status = 200, description = "Order"), (status = 404, description = "Not found"))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Query(query): Query<GetOrderQuery>,
) -> Result<Response, ServiceError> {
    let details = state
        .services
        .orders
        .get_order(order_id, query.populate)
        .await?;
    Ok(success_response(details, "Order fetched successfully"))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListQuery {
    pub status: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}
fn default_page_size() -> u64 {
    10
}

impl OrderListQuery {
    fn into_filter(self) -> Result<OrderListFilter, ServiceError> {
        let status = self
            .status
            .map(OrderStatus::try_from)
            .transpose()
            .map_err(ServiceError::ValidationError)?;
        Ok(OrderListFilter {
            status,
            start_date: self.start_date,
            end_date: self.end_date,
            page: self.page,
            page_size: self.page_size,
            ..Default::default()
        })
    }
}

/// Orders for one customer, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/get-by/user/{user_id}",
    params(("user_id" = Uuid, Path), OrderListQuery),
    responses((status = 200, description = "Page of orders"))
)]
pub async fn list_orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, ServiceError> {
    let mut filter = query.into_filter()?;
    filter.user_id = Some(user_id);
    let page = state.services.orders.list_orders(filter).await?;
    Ok(success_response(page, "Orders fetched successfully"))
}

/// Orders for one shop, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/get-by/shop/{shop_id}",
    params(("shop_id" = Uuid, Path), OrderListQuery),
    responses((status = 200, description = "Page of orders"))
)]
pub async fn list_orders_by_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, ServiceError> {
    let mut filter = query.into_filter()?;
    filter.shop_id = Some(shop_id);
    let page = state.services.orders.list_orders(filter).await?;
    Ok(success_response(page, "Orders fetched successfully"))
}

/// Orders where the agent holds either the pickup or the delivery leg.
#[utoipa::path(
    get,
    path = "/api/v1/orders/get-by/agent/{agent_id}",
    params(("agent_id" = Uuid, Path), OrderListQuery),
    responses((status = 200, description = "Page of orders"))
)]
pub async fn list_orders_by_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, ServiceError> {
    let mut filter = query.into_filter()?;
    filter.agent_id = Some(agent_id);
    let page = state.services.orders.list_orders(filter).await?;
    Ok(success_response(page, "Orders fetched successfully"))
}

/// Admin hard delete.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/delete/{order_id}",
    params(("order_id" = Uuid, Path)),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.orders.delete_order(order_id).await?;
    Ok(success_response((), "Order deleted successfully"))
}
