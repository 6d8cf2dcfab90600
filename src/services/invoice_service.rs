//! Render de facturas
//!
//! Construcción pura del documento de factura a partir del pedido, el
//! cliente y el vehículo. No tiene efectos sobre el pedido: se invoca tras
//! la confirmación del pago y al liquidar, solo para dejar registro.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::order::Order;
use crate::models::user::User;
use crate::models::vehicle::Vehicle;
use crate::workflow::pricing;
use crate::workflow::{order_ref, InvoiceKind};

const COMPANY_NAME: &str = "Rental Nusantara";
const COMPANY_ADDRESS: &str = "Jl. Raya Kuta No. 88, Badung, Bali";
const COMPANY_PHONE: &str = "+62 361 751 000";
const FOOTER_NOTE: &str = "Gracias por alquilar con nosotros. Este documento es su comprobante de pago.";

/// Bloque de cabecera con los datos de la empresa
#[derive(Debug, Clone, Serialize)]
pub struct CompanyBlock {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Bloque con los datos del cliente
#[derive(Debug, Clone, Serialize)]
pub struct ClientBlock {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Línea de detalle del alquiler
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub vehicle_name: String,
    pub license_plate: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    pub daily_rate: i64,
    pub with_driver: bool,
}

/// Bloque de importes
#[derive(Debug, Clone, Serialize)]
pub struct PaymentBlock {
    pub total_amount: i64,
    pub dp_amount: i64,
    pub remaining_amount: i64,
}

/// Documento de factura renderizado
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub issued_at: DateTime<Utc>,
    pub company: CompanyBlock,
    pub client: ClientBlock,
    pub line_item: LineItem,
    pub payment: PaymentBlock,
    pub footer: String,
}

/// Número de factura determinístico: prefijo por tipo + sufijo del id del pedido
pub fn invoice_number(order: &Order, kind: InvoiceKind) -> String {
    format!("{}-{}", kind.prefix(), order_ref(&order.id))
}

/// Construir el documento de factura. Función pura de lectura + render.
pub fn build_invoice(
    order: &Order,
    customer: &User,
    vehicle: &Vehicle,
    kind: InvoiceKind,
    issued_at: DateTime<Utc>,
) -> InvoiceDocument {
    let dp = pricing::down_payment(order.total_amount);

    InvoiceDocument {
        invoice_number: invoice_number(order, kind),
        issued_at,
        company: CompanyBlock {
            name: COMPANY_NAME.to_string(),
            address: COMPANY_ADDRESS.to_string(),
            phone: COMPANY_PHONE.to_string(),
        },
        client: ClientBlock {
            full_name: customer.full_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        },
        line_item: LineItem {
            vehicle_name: vehicle.name.clone(),
            license_plate: vehicle.license_plate.clone(),
            start_date: order.start_date,
            end_date: order.end_date,
            duration_days: order.duration_days,
            daily_rate: order.daily_rate,
            with_driver: order.with_driver,
        },
        payment: PaymentBlock {
            total_amount: order.total_amount,
            dp_amount: dp,
            remaining_amount: order.total_amount - dp,
        },
        footer: FOOTER_NOTE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderStatus, PaymentMethod, PaymentStatus};
    use crate::models::user::{UserRole, VerificationStatus};
    use crate::models::vehicle::VehicleCondition;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn fixtures() -> (Order, User, Vehicle) {
        let user_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let order = Order {
            id: Uuid::parse_str("c56a4180-65aa-42ec-a945-5fd21dec0538").unwrap(),
            vehicle_id,
            user_id,
            driver_id: None,
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 13).unwrap(),
            duration_days: 3,
            daily_rate: 250_000,
            with_driver: false,
            total_amount: 750_001,
            dp_amount: 375_001,
            payment_method: PaymentMethod::BankTransfer,
            payment_status: PaymentStatus::Completed,
            payment_proof_url: None,
            status: OrderStatus::PaymentConfirmed,
            edit_request: None,
            balance_request: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let user = User {
            id: user_id,
            full_name: "Putu Wijaya".to_string(),
            email: "putu@example.com".to_string(),
            phone: "+6281234567890".to_string(),
            password_hash: "x".to_string(),
            role: UserRole::Client,
            verification_status: VerificationStatus::Verified,
            id_card_url: None,
            trip_count: 0,
            rating: 0.0,
            total_earnings: 0,
            created_at: Utc::now(),
        };
        let vehicle = Vehicle {
            id: vehicle_id,
            name: "Toyota Avanza".to_string(),
            license_plate: "DK 1234 AB".to_string(),
            daily_rate: 250_000,
            image_url: None,
            available: false,
            condition: VehicleCondition::Rented,
            created_at: Utc::now(),
        };
        (order, user, vehicle)
    }

    #[test]
    fn test_invoice_number_is_deterministic_per_kind() {
        let (order, _, _) = fixtures();
        assert_eq!(invoice_number(&order, InvoiceKind::DownPayment), "INV-DP-1DEC0538");
        assert_eq!(invoice_number(&order, InvoiceKind::FullPayment), "INV-FP-1DEC0538");
        assert_eq!(invoice_number(&order, InvoiceKind::DriverCopy), "INV-DRV-1DEC0538");
    }

    #[test]
    fn test_payment_block_arithmetic() {
        let (order, user, vehicle) = fixtures();
        let doc = build_invoice(&order, &user, &vehicle, InvoiceKind::FullPayment, Utc::now());

        assert_eq!(doc.payment.total_amount, 750_001);
        assert_eq!(doc.payment.dp_amount, 375_001);
        assert_eq!(doc.payment.remaining_amount, 375_000);
        assert!(doc.payment.remaining_amount >= 0);
    }

    #[test]
    fn test_line_item_reflects_order_and_vehicle() {
        let (order, user, vehicle) = fixtures();
        let doc = build_invoice(&order, &user, &vehicle, InvoiceKind::DownPayment, Utc::now());

        assert_eq!(doc.line_item.vehicle_name, "Toyota Avanza");
        assert_eq!(doc.line_item.license_plate, "DK 1234 AB");
        assert_eq!(doc.line_item.duration_days, 3);
        assert_eq!(doc.client.full_name, "Putu Wijaya");
    }
}
