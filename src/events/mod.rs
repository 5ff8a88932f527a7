use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::OrderStatus;
use crate::notifications::{NotificationBuilder, NotificationService};

/// Lifecycle events emitted by the order state machine and cart store.
/// Consumers must never influence whether the emitting transition commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderPlaced {
        order_id: Uuid,
        order_number: String,
        shop_id: Uuid,
        partner_id: Uuid,
        express: bool,
    },
    OrderStatusChanged {
        order_id: Uuid,
        order_number: String,
        user_id: Uuid,
        status: OrderStatus,
    },
    OrderPickedUp {
        order_id: Uuid,
        order_number: String,
        user_id: Uuid,
    },
    OrderCompleted {
        order_id: Uuid,
        order_number: String,
        user_id: Uuid,
        cashback_points: Decimal,
    },
    PickupAgentAssigned {
        order_id: Uuid,
        order_number: String,
        agent_id: Uuid,
    },
    DeliveryAgentAssigned {
        order_id: Uuid,
        order_number: String,
        agent_id: Uuid,
    },
    CartCleared(Uuid),
    PromoCodeCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging (not propagating) a full-channel failure.
    /// Transitions never fail because the event pipe is down.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!(error = %e, ?event, "Failed to send event");
        }
    }
}

/// Drains the event channel and fans each event out to the notification
/// gateway. Dispatch failures are logged and dropped.
pub async fn process_events(
    mut rx: mpsc::Receiver<Event>,
    notifier: Arc<dyn NotificationService>,
) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let notification = match &event {
            Event::OrderPlaced {
                order_id,
                order_number,
                partner_id,
                express,
                ..
            } => Some(NotificationBuilder::order_placed(
                *partner_id,
                *order_id,
                order_number,
                *express,
            )),
            Event::OrderStatusChanged {
                order_id,
                order_number,
                user_id,
                status,
            } => Some(NotificationBuilder::status_update(
                *user_id,
                *order_id,
                order_number,
                *status,
            )),
            Event::OrderPickedUp {
                order_id,
                order_number,
                user_id,
            } => Some(NotificationBuilder::status_update(
                *user_id,
                *order_id,
                order_number,
                OrderStatus::PickedUp,
            )),
            Event::OrderCompleted {
                order_id,
                order_number,
                user_id,
                cashback_points,
            } => Some(NotificationBuilder::order_completed(
                *user_id,
                *order_id,
                order_number,
                *cashback_points,
            )),
            Event::PickupAgentAssigned {
                order_id,
                order_number,
                agent_id,
            } => Some(NotificationBuilder::agent_assignment(
                *agent_id,
                *order_id,
                order_number,
                "pickup",
            )),
            Event::DeliveryAgentAssigned {
                order_id,
                order_number,
                agent_id,
            } => Some(NotificationBuilder::agent_assignment(
                *agent_id,
                *order_id,
                order_number,
                "delivery",
            )),
            Event::CartCleared(_) | Event::PromoCodeCreated(_) => None,
        };

        if let Some(notification) = notification {
            if let Err(e) = notifier.send(notification).await {
                warn!(error = %e, ?event, "Notification dispatch failed");
            }
        }
    }

    info!("Event processing loop stopped");
}
