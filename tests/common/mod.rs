use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use washline_api::{
    api_v1_routes,
    config::AppConfig,
    db::{establish_connection_with_config, run_migrations, DbConfig},
    entities::{
        cashback_tier, delivery_agent, laundry_service, shop, wallet, AgentStatus,
        QuantityAcceptance, ServiceKind,
    },
    events::EventSender,
    services::AppServices,
    AppState,
};

/// Test harness backed by an in-memory SQLite database. Events flow into a
/// buffered channel that nothing drains; notification dispatch is exercised
/// by unit tests against the gateway trait instead.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_rx: mpsc::Receiver<washline_api::events::Event>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");
        run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db = Arc::new(pool);

        let cfg = AppConfig::new(
            db_cfg.url.clone(),
            "redis://127.0.0.1:6379".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let services = AppServices::new(db.clone(), event_sender.clone(), &cfg);

        let state = AppState {
            db,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_rx: event_rx,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn seed_shop(&self, accepts_express: bool) -> (Uuid, Uuid) {
        let shop_id = Uuid::new_v4();
        let partner_id = Uuid::new_v4();
        shop::ActiveModel {
            id: Set(shop_id),
            name: Set("Fold & Go".to_string()),
            partner_id: Set(partner_id),
            is_open: Set(true),
            accepts_express_service: Set(accepts_express),
            express_service_charges: Set(Decimal::from(25)),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .unwrap();
        (shop_id, partner_id)
    }

    pub async fn seed_service(&self, shop_id: Uuid, per_piece: Decimal) -> Uuid {
        let service_id = Uuid::new_v4();
        laundry_service::ActiveModel {
            id: Set(service_id),
            shop_id: Set(shop_id),
            name: Set("Wash & Iron".to_string()),
            kind: Set(ServiceKind::Washing),
            description: Set(None),
            per_piece_price: Set(per_piece),
            per_kg_price: Set(per_piece * Decimal::from(4)),
            quantity_accepted_in: Set(QuantityAcceptance::Either),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .unwrap();
        service_id
    }

    #[allow(dead_code)]
    pub async fn seed_agent(&self) -> Uuid {
        let agent_id = Uuid::new_v4();
        delivery_agent::ActiveModel {
            id: Set(agent_id),
            name: Set("Ravi".to_string()),
            phone_number: Set(format!("+91{}", &agent_id.simple().to_string()[..10])),
            is_online: Set(true),
            status: Set(AgentStatus::Approved),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .unwrap();
        agent_id
    }

    pub async fn seed_wallet(&self, user_id: Uuid, points: Decimal) {
        wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            points: Set(points),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .unwrap();
    }

    #[allow(dead_code)]
    pub async fn seed_cashback_tier(&self, from: Decimal, to: Decimal, percent: Decimal) {
        cashback_tier::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_amount_from: Set(from),
            order_amount_to: Set(to),
            cashback_percent: Set(percent),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .unwrap();
    }

    /// Puts `quantity` pieces of a fresh service into the user's cart and
    /// returns (shop_id, service_id).
    pub async fn seed_cart(&self, user_id: Uuid, per_piece: Decimal, quantity: i32) -> (Uuid, Uuid) {
        let (shop_id, _) = self.seed_shop(false).await;
        let service_id = self.seed_service(shop_id, per_piece).await;
        self.add_to_cart(user_id, shop_id, service_id, quantity).await;
        (shop_id, service_id)
    }

    pub async fn add_to_cart(&self, user_id: Uuid, shop_id: Uuid, service_id: Uuid, quantity: i32) {
        let response = self
            .request(
                Method::POST,
                "/api/v1/carts/add",
                Some(serde_json::json!({
                    "user_id": user_id,
                    "shop_id": shop_id,
                    "service_id": service_id,
                    "quantity": quantity,
                    "quantity_unit": 0,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn as_decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).expect("decimal value")
}
