//! Quote endpoint behavior: arithmetic, promo interaction, wallet capping,
//! and re-quote stability.

mod common;

use axum::http::{Method, StatusCode};
use common::{as_decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

fn quote_body(user_id: Uuid) -> serde_json::Value {
    json!({
        "user_id": user_id,
        "use_wallet_points": false,
        "use_express_delivery": false,
        "self_service": false,
    })
}

#[tokio::test]
async fn quote_breaks_down_the_standard_cart() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(quote_body(user_id)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(as_decimal(&data["subtotal"]), dec!(500));
    assert_eq!(as_decimal(&data["gst_amount"]), dec!(25));
    assert_eq!(as_decimal(&data["delivery_charges"]), dec!(40));
    assert_eq!(as_decimal(&data["platform_fee"]), dec!(10));
    assert_eq!(as_decimal(&data["discount"]), dec!(0));
    assert_eq!(as_decimal(&data["total_amount_to_pay"]), dec!(575));
}

#[tokio::test]
async fn quote_is_idempotent_for_unchanged_inputs() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;

    let first = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(quote_body(user_id)),
        )
        .await,
    )
    .await;
    let second = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(quote_body(user_id)),
        )
        .await,
    )
    .await;
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn free_delivery_promo_discounts_but_still_pays_the_agent() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;

    let created = app
        .request(
            Method::POST,
            "/api/v1/promo-codes",
            Some(json!({
                "name": "Free delivery week",
                "code": "FREEDEL",
                "code_type": 1,
                "min_order_amount": 100,
                "expires_on": "2099-12-31",
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let mut body = quote_body(user_id);
    body["code"] = json!("FREEDEL");
    let data = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(body),
        )
        .await,
    )
    .await["data"]
        .clone();

    assert_eq!(as_decimal(&data["discount"]), dec!(40));
    assert_eq!(as_decimal(&data["agent_compensation"]), dec!(40));
    assert_eq!(as_decimal(&data["total_amount_to_pay"]), dec!(535));
}

#[tokio::test]
async fn wallet_redemption_is_capped_by_balance() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;
    app.seed_wallet(user_id, dec!(100)).await;

    let mut body = quote_body(user_id);
    body["use_wallet_points"] = json!(true);
    let data = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(body),
        )
        .await,
    )
    .await["data"]
        .clone();

    assert_eq!(as_decimal(&data["wallet_points_used"]), dec!(100));
    assert_eq!(as_decimal(&data["total_amount_to_pay"]), dec!(475));
}

#[tokio::test]
async fn quote_without_a_cart_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(quote_body(Uuid::new_v4())),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Cart not found");
}

#[tokio::test]
async fn expired_promo_is_rejected_with_a_clear_message() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;

    app.request(
        Method::POST,
        "/api/v1/promo-codes",
        Some(json!({
            "name": "Bygone deal",
            "code": "BYGONE",
            "code_type": 2,
            "discount_amount": 50,
            "expires_on": "2020-01-01",
        })),
    )
    .await;

    let mut body = quote_body(user_id);
    body["code"] = json!("BYGONE");
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(body),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Promo code expired");
}
