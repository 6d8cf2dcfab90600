//! Modelos de verificación
//!
//! Registros de auditoría para comprobantes de pago y reportes de estado
//! del vehículo previos a la entrega.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::order::ReviewStatus;

/// Tipo de comprobante de pago - mapea al ENUM proof_kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "proof_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    DownPayment,
    Balance,
}

/// Registro de auditoría por cada comprobante enviado
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentVerification {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub kind: ProofKind,
    pub amount: i64,
    pub proof_url: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Reporte de condición del vehículo hecho por el conductor antes de la entrega
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleVerification {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub condition_ok: bool,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
