use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::order::{
    BalanceRequest, EditRequest, Order, OrderStatus, PaymentMethod, PaymentStatus,
};

// Request para crear un pedido de alquiler
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub with_driver: bool,
    pub payment_method: PaymentMethod,
}

// Request para enviar un comprobante de pago (anticipo o saldo)
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitProofRequest {
    #[validate(url)]
    pub proof_url: String,

    #[validate(range(min = 1))]
    pub amount: i64,
}

// Request del cliente para proponer un cambio de fechas
#[derive(Debug, Deserialize)]
pub struct EditDatesRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// Request del admin para asignar un conductor
#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

// Filtros para el listado de pedidos
#[derive(Debug, Deserialize)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Response de pedido para la API
#[derive(Debug, Serialize)]
pub struct OrderResponse {
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
    pub remaining_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_proof_url: Option<String>,
    pub status: OrderStatus,
    pub edit_request: Option<EditRequest>,
    pub balance_request: Option<BalanceRequest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            vehicle_id: order.vehicle_id,
            user_id: order.user_id,
            driver_id: order.driver_id,
            start_date: order.start_date,
            end_date: order.end_date,
            duration_days: order.duration_days,
            daily_rate: order.daily_rate,
            with_driver: order.with_driver,
            total_amount: order.total_amount,
            dp_amount: order.dp_amount,
            remaining_amount: order.remaining_amount(),
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            payment_proof_url: order.payment_proof_url,
            status: order.status,
            edit_request: order.edit_request.map(|j| j.0),
            balance_request: order.balance_request.map(|j| j.0),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
