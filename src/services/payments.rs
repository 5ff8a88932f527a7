use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    config::PaymentGatewaySettings,
    entities::{Order, OrderModel},
    errors::ServiceError,
};
use sea_orm::{DatabaseConnection, EntityTrait};

#[derive(Debug, Serialize)]
struct GatewayChargeRequest<'a> {
    reference: &'a str,
    amount: Decimal,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayChargeResponse {
    id: String,
}

/// Result of asking the gateway to open a payment for an order.
#[derive(Debug, Serialize)]
pub struct PaymentInitiation {
    pub order_id: Uuid,
    pub amount: Decimal,
    pub gateway_ref: String,
}

/// Thin client for the external payment gateway. The gateway is an opaque
/// collaborator: this service forwards the order total and reports the
/// gateway's reference, nothing more.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    client: Client,
    settings: Option<PaymentGatewaySettings>,
}

impl PaymentService {
    pub fn new(db: Arc<DatabaseConnection>, settings: Option<PaymentGatewaySettings>) -> Self {
        Self {
            db,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            settings,
        }
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn initiate(&self, order_id: Uuid) -> Result<PaymentInitiation, ServiceError> {
        let order: OrderModel = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let settings = self.settings.as_ref().ok_or_else(|| {
            ServiceError::ExternalServiceError("Payment gateway not configured".to_string())
        })?;

        let amount = order.price_details.total_amount_to_pay;
        let request = GatewayChargeRequest {
            reference: &order.order_number,
            amount,
            currency: "INR",
        };

        let response = self
            .client
            .post(format!("{}/charges", settings.base_url.trim_end_matches('/')))
            .bearer_auth(&settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("Payment gateway unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "Payment gateway rejected the charge ({})",
                response.status()
            )));
        }

        let charge: GatewayChargeResponse = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("Payment gateway response invalid: {e}"))
        })?;

        info!(order_id = %order_id, gateway_ref = %charge.id, "Payment initiated");

        Ok(PaymentInitiation {
            order_id,
            amount,
            gateway_ref: charge.id,
        })
    }
}
