use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use slog::{info, Logger};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::OrderStatus;

/// A notification destined for one recipient's inbox.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub recipient_role: RecipientRole,
    /// Express orders land in a separate partner channel so shops can triage
    /// them ahead of regular work.
    pub channel: Channel,
    pub title: String,
    pub body: String,
    pub order_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    Customer,
    Partner,
    DeliveryAgent,
}

impl RecipientRole {
    fn key_segment(self) -> &'static str {
        match self {
            RecipientRole::Customer => "customer",
            RecipientRole::Partner => "partner",
            RecipientRole::DeliveryAgent => "agent",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Regular,
    Express,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Fire-and-forget dispatch gateway. The event loop is the only caller;
/// errors surface there as log lines and nowhere else.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
    async fn recent_for_recipient(
        &self,
        recipient_id: Uuid,
        role: RecipientRole,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationError>;
}

/// Redis-backed inbox: one sorted set per recipient, scored by creation
/// time, trimmed to the most recent thousand entries.
#[derive(Clone)]
pub struct RedisNotificationService {
    redis: Arc<Client>,
    logger: Logger,
}

impl RedisNotificationService {
    pub fn new(redis: Arc<Client>, logger: Logger) -> Self {
        Self { redis, logger }
    }

    fn inbox_key(recipient_id: Uuid, role: RecipientRole, channel: Channel) -> String {
        match channel {
            Channel::Regular => {
                format!("notifications:{}:{}", role.key_segment(), recipient_id)
            }
            Channel::Express => {
                format!(
                    "notifications:{}:{}:express",
                    role.key_segment(),
                    recipient_id
                )
            }
        }
    }
}

#[async_trait]
impl NotificationService for RedisNotificationService {
    #[instrument(skip(self, notification), fields(id = %notification.id, recipient = %notification.recipient_id))]
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut conn = self.redis.get_async_connection().await?;
        let json = serde_json::to_string(&notification)?;
        let key = Self::inbox_key(
            notification.recipient_id,
            notification.recipient_role,
            notification.channel,
        );

        let _: () = redis::pipe()
            .atomic()
            .zadd(&key, &json, notification.created_at.timestamp())
            .zremrangebyrank(&key, 0, -1001)
            .query_async(&mut conn)
            .await?;

        info!(self.logger, "Notification dispatched";
            "recipient" => notification.recipient_id.to_string(),
            "title" => notification.title,
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_for_recipient(
        &self,
        recipient_id: Uuid,
        role: RecipientRole,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationError> {
        let mut conn = self.redis.get_async_connection().await?;
        let key = Self::inbox_key(recipient_id, role, Channel::Regular);

        let raw: Vec<String> = conn.zrevrange(key, 0, limit as isize - 1).await?;
        let notifications = raw
            .into_iter()
            .map(|json| serde_json::from_str(&json))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notifications)
    }
}

/// Notification construction helpers, one per lifecycle trigger.
pub struct NotificationBuilder;

impl NotificationBuilder {
    pub fn order_placed(
        partner_id: Uuid,
        order_id: Uuid,
        order_number: &str,
        express: bool,
    ) -> Notification {
        let (title, channel) = if express {
            ("New Express Order", Channel::Express)
        } else {
            ("New Order", Channel::Regular)
        };
        Notification {
            id: Uuid::new_v4(),
            recipient_id: partner_id,
            recipient_role: RecipientRole::Partner,
            channel,
            title: title.to_string(),
            body: format!("Order {} has been placed at your shop", order_number),
            order_id: Some(order_id),
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn status_update(
        user_id: Uuid,
        order_id: Uuid,
        order_number: &str,
        status: OrderStatus,
    ) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id: user_id,
            recipient_role: RecipientRole::Customer,
            channel: Channel::Regular,
            title: status.title().to_string(),
            body: format!("Order {}: {}", order_number, status.title()),
            order_id: Some(order_id),
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn order_completed(
        user_id: Uuid,
        order_id: Uuid,
        order_number: &str,
        cashback_points: Decimal,
    ) -> Notification {
        let body = if cashback_points > Decimal::ZERO {
            format!(
                "Order {} is complete. {} cashback points were added to your wallet",
                order_number, cashback_points
            )
        } else {
            format!("Order {} is complete", order_number)
        };
        Notification {
            id: Uuid::new_v4(),
            recipient_id: user_id,
            recipient_role: RecipientRole::Customer,
            channel: Channel::Regular,
            title: OrderStatus::Completed.title().to_string(),
            body,
            order_id: Some(order_id),
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn agent_assignment(
        agent_id: Uuid,
        order_id: Uuid,
        order_number: &str,
        leg: &str,
    ) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id: agent_id,
            recipient_role: RecipientRole::DeliveryAgent,
            channel: Channel::Regular,
            title: "New Assignment".to_string(),
            body: format!("You have been assigned the {} for order {}", leg, order_number),
            order_id: Some(order_id),
            read: false,
            created_at: Utc::now(),
        }
    }
}
