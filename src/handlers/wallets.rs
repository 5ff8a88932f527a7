use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::{errors::ServiceError, handlers::common::success_response, AppState};

pub fn wallets_routes() -> Router<AppState> {
    Router::new().route("/:user_id", get(get_wallet_balance))
}

/// Current point balance for a user's wallet.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{user_id}",
    params(("user_id" = Uuid, Path)),
    responses((status = 200, description = "Balance"), (status = 404, description = "No wallet"))
)]
pub async fn get_wallet_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let points = state.services.wallets.balance(user_id).await?;
    Ok(success_response(
        serde_json::json!({ "user_id": user_id, "points": points }),
        "Wallet fetched successfully",
    ))
}
