use axum::{
    extract::{Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::PromoCodeType,
    errors::ServiceError,
    events::{Event, EventSender},
    handlers::common::{created_response, success_response, validate_input},
    services::promo_codes::CreatePromoCodeInput,
    AppState,
};

pub fn promo_codes_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_promo_code).get(list_promo_codes))
        .route("/apply", post(apply_promo_code))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePromoCodeRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    /// 1 = free delivery, 2 = fixed discount, 3 = first-order discount.
    pub code_type: i32,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub min_order_amount: Decimal,
    pub description: Option<String>,
    pub expires_on: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[utoipa::path(
    post,
    path = "/api/v1/promo-codes",
    request_body = CreatePromoCodeRequest,
    responses((status = 201, description = "Promo code created"))
)]
pub async fn create_promo_code(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromoCodeRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let code_type = PromoCodeType::try_from(payload.code_type)
        .map_err(|_| ServiceError::ValidationError("Invalid promo code type".to_string()))?;

    let promo = state
        .services
        .promo_codes
        .create(CreatePromoCodeInput {
            name: payload.name,
            code: payload.code,
            code_type,
            discount_amount: payload.discount_amount,
            min_order_amount: payload.min_order_amount,
            description: payload.description,
            expires_on: payload.expires_on,
            is_active: payload.is_active,
        })
        .await?;

    notify_created(&state.event_sender, promo.id).await;
    Ok(created_response(promo, "Promo code added successfully"))
}

async fn notify_created(sender: &EventSender, promo_id: Uuid) {
    sender.send_or_log(Event::PromoCodeCreated(promo_id)).await;
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPromoCodesQuery {
    pub is_active: Option<bool>,
    pub code_type: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/promo-codes",
    params(ListPromoCodesQuery),
    responses((status = 200, description = "All promo codes"))
)]
pub async fn list_promo_codes(
    State(state): State<AppState>,
    Query(query): Query<ListPromoCodesQuery>,
) -> Result<Response, ServiceError> {
    let code_type = query
        .code_type
        .map(PromoCodeType::try_from)
        .transpose()
        .map_err(|_| ServiceError::ValidationError("Invalid promo code type".to_string()))?;
    let promos = state
        .services
        .promo_codes
        .list(query.is_active, code_type)
        .await?;
    Ok(success_response(promos, "All promo codes fetched successfully"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplyPromoCodeRequest {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub order_amount: Decimal,
    #[serde(default)]
    pub delivery_charges: Option<Decimal>,
    pub user_id: Uuid,
}

/// Standalone evaluator: what would this code be worth on this order?
#[utoipa::path(
    post,
    path = "/api/v1/promo-codes/apply",
    request_body = ApplyPromoCodeRequest,
    responses(
        (status = 200, description = "Discount granted"),
        (status = 400, description = "Code invalid, expired, or not applicable")
    )
)]
pub async fn apply_promo_code(
    State(state): State<AppState>,
    Json(payload): Json<ApplyPromoCodeRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let delivery_charges = payload
        .delivery_charges
        .unwrap_or(state.config.pricing.delivery_charges);
    let evaluated = state
        .services
        .promo_codes
        .evaluate(
            &payload.code,
            payload.order_amount,
            delivery_charges,
            payload.user_id,
        )
        .await?;
    Ok(success_response(
        serde_json::json!({
            "promo_code": evaluated.promo,
            "discount": evaluated.discount,
        }),
        "Promo code applied successfully",
    ))
}
