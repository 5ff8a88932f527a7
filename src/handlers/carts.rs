use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::QuantityUnit,
    errors::ServiceError,
    handlers::common::{success_response, validate_input},
    services::carts::{AddToCartInput, RemoveFromCartInput},
    AppState,
};

pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_to_cart))
        .route("/remove", post(remove_from_cart))
        .route("/get/:user_id", get(get_cart))
        .route("/clear/:user_id", delete(clear_cart))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddToCartRequest {
    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub service_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// 0 = per piece, 1 = per kg.
    #[serde(default)]
    pub quantity_unit: i32,
}

/// Add a service line to the caller's cart. Lines from a different shop
/// replace the cart's contents.
#[utoipa::path(
    post,
    path = "/api/v1/carts/add",
    request_body = AddToCartRequest,
    responses((status = 200, description = "Updated cart"))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let unit = QuantityUnit::try_from(payload.quantity_unit)
        .map_err(ServiceError::ValidationError)?;
    let view = state
        .services
        .carts
        .add_item(AddToCartInput {
            user_id: payload.user_id,
            shop_id: payload.shop_id,
            service_id: payload.service_id,
            quantity: payload.quantity,
            quantity_unit: unit,
        })
        .await?;
    Ok(success_response(view, "Item added to cart"))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RemoveFromCartRequest {
    pub user_id: Uuid,
    pub service_id: Uuid,
    #[serde(default = "default_remove_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

fn default_remove_quantity() -> i32 {
    1
}

/// Decrement a line, removing it once the quantity reaches zero.
#[utoipa::path(
    post,
    path = "/api/v1/carts/remove",
    request_body = RemoveFromCartRequest,
    responses((status = 200, description = "Updated cart"))
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Json(payload): Json<RemoveFromCartRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let view = state
        .services
        .carts
        .remove_item(RemoveFromCartInput {
            user_id: payload.user_id,
            service_id: payload.service_id,
            quantity: payload.quantity,
        })
        .await?;
    Ok(success_response(view, "Item removed from cart"))
}

/// Fetch the caller's cart with priced lines.
#[utoipa::path(
    get,
    path = "/api/v1/carts/get/{user_id}",
    params(("user_id" = Uuid, Path)),
    responses((status = 200, description = "Cart"), (status = 404, description = "No cart"))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let view = state.services.carts.get_cart(user_id).await?;
    Ok(success_response(view, "Cart fetched successfully"))
}

/// Drop the caller's cart.
#[utoipa::path(
    delete,
    path = "/api/v1/carts/clear/{user_id}",
    params(("user_id" = Uuid, Path)),
    responses((status = 200, description = "Cart cleared"))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.carts.clear(user_id).await?;
    Ok(success_response((), "Cart cleared successfully"))
}
