//! End-to-end coverage of the order lifecycle over the HTTP surface:
//! placement from a priced cart, OTP-gated pickup and delivery, write-once
//! agent assignment, the status transition table, and completion cashback.

mod common;

use axum::http::{Method, StatusCode};
use common::{as_decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

async fn quote_and_place(app: &TestApp, user_id: Uuid, use_wallet: bool) -> Value {
    let quote = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/calculate/amount-to-pay",
            Some(json!({
                "user_id": user_id,
                "use_wallet_points": use_wallet,
                "use_express_delivery": false,
                "self_service": false,
            })),
        )
        .await,
    )
    .await["data"]
        .clone();

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/place",
            Some(json!({
                "user_id": user_id,
                "order_type": 0,
                "self_service": false,
                "price_details": quote,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["data"].clone()
}

#[tokio::test]
async fn placing_an_order_snapshots_the_cart_and_deletes_it() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;

    let order = quote_and_place(&app, user_id, false).await;

    assert_eq!(order["status"], 0);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["quantity"], 10);
    assert_eq!(as_decimal(&order["items"][0]["unit_price"]), dec!(50));
    assert_eq!(
        as_decimal(&order["price_details"]["total_amount_to_pay"]),
        dec!(575)
    );
    let timeline = order["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0]["title"], "Order Placed");
    assert!(order["order_number"].as_str().unwrap().starts_with("WL-"));

    // The cart is consumed by placement.
    let cart = app
        .request(Method::GET, &format!("/api/v1/carts/get/{user_id}"), None)
        .await;
    assert_eq!(cart.status(), StatusCode::NOT_FOUND);

    // populate expands the shop reference.
    let order_id = order["id"].as_str().unwrap();
    let expanded = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get/{order_id}?populate=true"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(expanded["data"]["shop"]["name"], "Fold & Go");
}

#[tokio::test]
async fn placement_redeems_committed_wallet_points() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;
    app.seed_wallet(user_id, dec!(100)).await;

    let order = quote_and_place(&app, user_id, true).await;
    assert_eq!(
        as_decimal(&order["price_details"]["wallet_points_used"]),
        dec!(100)
    );

    let wallet = response_json(
        app.request(Method::GET, &format!("/api/v1/wallets/{user_id}"), None)
            .await,
    )
    .await;
    assert_eq!(as_decimal(&wallet["data"]["points"]), dec!(0));
}

#[tokio::test]
async fn pickup_otp_is_write_once_and_gates_the_pickup() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;
    let order = quote_and_place(&app, user_id, false).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let generated = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/generate/otp",
            Some(json!({ "order_id": order_id, "otp_type": 0 })),
        )
        .await,
    )
    .await;
    let otp = generated["data"]["pickup_otp"].as_i64().unwrap();
    assert!((1000..=9999).contains(&otp));

    // Second generation fails and the stored code is unchanged.
    let second = app
        .request(
            Method::POST,
            "/api/v1/orders/generate/otp",
            Some(json!({ "order_id": order_id, "otp_type": 0 })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let second = response_json(second).await;
    assert_eq!(second["message"], "Pickup Otp Already Generated");

    let fetched = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get/{order_id}"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(fetched["data"]["order"]["pickup_otp"].as_i64().unwrap(), otp);

    // A wrong code never mutates state.
    let wrong = if otp == 9999 { 1000 } else { otp + 1 };
    let rejected = app
        .request(
            Method::POST,
            "/api/v1/orders/verify/otp/update-order",
            Some(json!({ "order_id": order_id, "otp_type": 0, "otp": wrong })),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let still = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get/{order_id}"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(still["data"]["order"]["status"], 0);
    assert_eq!(still["data"]["order"]["pickup_otp_verified"], false);

    // The right code advances to PickedUp exactly once.
    let verified = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/verify/otp/update-order",
            Some(json!({ "order_id": order_id, "otp_type": 0, "otp": otp })),
        )
        .await,
    )
    .await;
    assert_eq!(verified["data"]["status"], 3);
    assert_eq!(verified["data"]["pickup_otp_verified"], true);

    let replay = app
        .request(
            Method::POST,
            "/api/v1/orders/verify/otp/update-order",
            Some(json!({ "order_id": order_id, "otp_type": 0, "otp": otp })),
        )
        .await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agent_slots_are_write_once() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;
    let order = quote_and_place(&app, user_id, false).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let first_agent = app.seed_agent().await;
    let second_agent = app.seed_agent().await;

    let assigned = response_json(
        app.request(
            Method::PUT,
            "/api/v1/orders/assign/delivery-agent",
            Some(json!({ "order_id": order_id, "pickup_agent_id": first_agent })),
        )
        .await,
    )
    .await;
    assert_eq!(assigned["data"]["status"], 2);
    assert_eq!(
        assigned["data"]["pickup_agent_id"].as_str().unwrap(),
        first_agent.to_string()
    );

    let retaken = app
        .request(
            Method::PUT,
            "/api/v1/orders/assign/delivery-agent",
            Some(json!({ "order_id": order_id, "pickup_agent_id": second_agent })),
        )
        .await;
    assert_eq!(retaken.status(), StatusCode::BAD_REQUEST);
    let retaken = response_json(retaken).await;
    assert_eq!(retaken["message"], "Pickup Agent Already Assigned");

    // The original assignment survives.
    let fetched = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get/{order_id}"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(
        fetched["data"]["order"]["pickup_agent_id"].as_str().unwrap(),
        first_agent.to_string()
    );

    let ghost = app
        .request(
            Method::PUT,
            "/api/v1/orders/assign/delivery-agent",
            Some(json!({ "order_id": order_id, "delivery_agent_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(ghost.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_transitions_follow_the_table() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;
    let order = quote_and_place(&app, user_id, false).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Pending cannot jump straight to Completed.
    let jump = app
        .request(
            Method::PUT,
            "/api/v1/orders/update/order-status",
            Some(json!({ "order_id": order_id, "status": 7 })),
        )
        .await;
    assert_eq!(jump.status(), StatusCode::BAD_REQUEST);

    // Pending -> Confirmed is fine and appends to the timeline.
    let confirmed = response_json(
        app.request(
            Method::PUT,
            "/api/v1/orders/update/order-status",
            Some(json!({ "order_id": order_id, "status": 1 })),
        )
        .await,
    )
    .await;
    assert_eq!(confirmed["data"]["status"], 1);
    let timeline = confirmed["data"]["timeline"].as_array().unwrap();
    assert_eq!(timeline.last().unwrap()["title"], "Order Confirmed");

    // Unknown integers are rejected outright.
    let unknown = app
        .request(
            Method::PUT,
            "/api/v1/orders/update/order-status",
            Some(json!({ "order_id": order_id, "status": 42 })),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completing_the_order_credits_cashback() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 10).await;
    app.seed_wallet(user_id, dec!(0)).await;
    app.seed_cashback_tier(dec!(100), dec!(1000), dec!(0.05)).await;

    let order = quote_and_place(&app, user_id, false).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Walk the order to the drop checkpoint.
    let pickup_agent = app.seed_agent().await;
    let delivery_agent = app.seed_agent().await;
    app.request(
        Method::PUT,
        "/api/v1/orders/update/order-status",
        Some(json!({ "order_id": order_id, "status": 1 })),
    )
    .await;
    app.request(
        Method::PUT,
        "/api/v1/orders/assign/delivery-agent",
        Some(json!({ "order_id": order_id, "pickup_agent_id": pickup_agent })),
    )
    .await;
    let generated = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/generate/otp",
            Some(json!({ "order_id": order_id, "otp_type": 0 })),
        )
        .await,
    )
    .await;
    let pickup_otp = generated["data"]["pickup_otp"].as_i64().unwrap();
    app.request(
        Method::POST,
        "/api/v1/orders/verify/otp/update-order",
        Some(json!({ "order_id": order_id, "otp_type": 0, "otp": pickup_otp })),
    )
    .await;
    for status in [4, 5] {
        app.request(
            Method::PUT,
            "/api/v1/orders/update/order-status",
            Some(json!({ "order_id": order_id, "status": status })),
        )
        .await;
    }
    app.request(
        Method::PUT,
        "/api/v1/orders/assign/delivery-agent",
        Some(json!({ "order_id": order_id, "delivery_agent_id": delivery_agent })),
    )
    .await;
    let generated = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/generate/otp",
            Some(json!({ "order_id": order_id, "otp_type": 1 })),
        )
        .await,
    )
    .await;
    let drop_otp = generated["data"]["drop_otp"].as_i64().unwrap();

    let completed = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders/verify/otp/update-order",
            Some(json!({ "order_id": order_id, "otp_type": 1, "otp": drop_otp })),
        )
        .await,
    )
    .await;
    assert_eq!(completed["data"]["status"], 7);
    assert_eq!(completed["data"]["delivery_otp_verified"], true);
    // 575 * 0.05 floored.
    assert_eq!(as_decimal(&completed["data"]["cashback_points"]), dec!(28));

    let wallet = response_json(
        app.request(Method::GET, &format!("/api/v1/wallets/{user_id}"), None)
            .await,
    )
    .await;
    assert_eq!(as_decimal(&wallet["data"]["points"]), dec!(28));
}

#[tokio::test]
async fn listing_filters_by_user_and_status() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();
    app.seed_cart(user_id, dec!(50), 2).await;
    let order = quote_and_place(&app, user_id, false).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let listed = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get-by/user/{user_id}"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["orders"][0]["id"].as_str().unwrap(), order_id);

    // Status filter excludes the pending order.
    let filtered = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get-by/user/{user_id}?status=7"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(filtered["data"]["total"], 0);

    // A stranger has no orders.
    let stranger = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/get-by/user/{}", Uuid::new_v4()),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(stranger["data"]["total"], 0);
}
