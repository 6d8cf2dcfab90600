//! Modelo de Notification
//!
//! Mensajes unidireccionales hacia un usuario o hacia el panel de
//! administración. Se escriben una sola vez; únicamente se muta el flag read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Destinatario centinela para el panel de administración
pub const ADMIN_RECIPIENT: &str = "admin";

/// Notification principal - mapea exactamente a la tabla notifications
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    /// UUID del usuario en texto, o el centinela "admin"
    pub recipient: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
