//! Modelo de Order
//!
//! Este módulo contiene el struct Order, el entity central del pipeline de
//! alquiler, junto con sus enums de estado y las solicitudes anidadas
//! (cambio de fechas y pago del saldo) almacenadas como JSONB.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del pedido - mapea al ENUM order_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Requested,
    Approved,
    AwaitingPayment,
    PaymentSubmitted,
    CashPendingApproval,
    CashApproved,
    PaymentConfirmed,
    Completed,
    FullyPaid,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    /// Estados desde los que ya no se permite ninguna transición de pipeline.
    /// `completed` solo admite las acciones de liquidación del saldo.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Cancelled | OrderStatus::FullyPaid
        )
    }

    /// Estados en los que el pedido sigue activo y puede cancelarse
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Requested
                | OrderStatus::Approved
                | OrderStatus::AwaitingPayment
                | OrderStatus::PaymentSubmitted
                | OrderStatus::CashPendingApproval
                | OrderStatus::CashApproved
                | OrderStatus::PaymentConfirmed
        )
    }
}

/// Método de pago - mapea al ENUM payment_method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    EWallet,
    Cash,
}

/// Estado del pago - mapea al ENUM payment_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Submitted,
    PendingApproval,
    Completed,
    FullyPaid,
}

/// Estado de una solicitud de cambio de fechas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditRequestStatus {
    Pending,
    Approved,
    Rejected,
    Applied,
}

/// Solicitud de cambio de fechas/precio propuesta por el cliente.
/// Las fechas solo se aplican al pedido cuando el cliente ejecuta "apply"
/// sobre una solicitud ya aprobada (commit en dos pasos).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    pub total_amount: i64,
    pub dp_amount: i64,
    pub status: EditRequestStatus,
    pub requested_at: DateTime<Utc>,
}

/// Estado de revisión de un comprobante
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "review_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// Comprobante del pago del saldo restante, pendiente de aprobación del admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub amount: i64,
    pub proof_url: String,
    pub status: ReviewStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Order principal - mapea exactamente a la tabla orders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    pub daily_rate: i64,
    pub with_driver: bool,
    pub total_amount: i64,
    pub dp_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_proof_url: Option<String>,
    pub status: OrderStatus,
    pub edit_request: Option<Json<EditRequest>>,
    pub balance_request: Option<Json<BalanceRequest>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Saldo restante tras el anticipo, nunca negativo
    pub fn remaining_amount(&self) -> i64 {
        self.total_amount - self.dp_amount
    }
}
