use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::notification::Notification;

// Response de notificación para la API
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}
