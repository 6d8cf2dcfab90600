//! Recorridos completos del pipeline de pedidos, de la solicitud a la
//! liquidación, usando solo la máquina de estados y el render de facturas.

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use rental_management::models::order::{
    Order, OrderStatus, PaymentMethod, PaymentStatus,
};
use rental_management::models::user::{User, UserRole, VerificationStatus};
use rental_management::models::vehicle::{Vehicle, VehicleCondition};
use rental_management::services::invoice_service;
use rental_management::workflow::pricing;
use rental_management::workflow::{
    apply_transition, Actor, InvoiceKind, OrderAction, VehiclePatch,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_order(daily_rate: i64, days: i32, with_driver: bool) -> Order {
    let start = date(2026, 9, 10);
    let end = start + chrono::Duration::days(days as i64);
    let duration = pricing::duration_days(start, end).unwrap();
    let total = pricing::rental_total(duration, daily_rate, with_driver);
    let now = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();

    Order {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        driver_id: None,
        start_date: start,
        end_date: end,
        duration_days: duration,
        daily_rate,
        with_driver,
        total_amount: total,
        dp_amount: pricing::down_payment(total),
        payment_method: PaymentMethod::BankTransfer,
        payment_status: PaymentStatus::Pending,
        payment_proof_url: None,
        status: OrderStatus::Requested,
        edit_request: None,
        balance_request: None,
        created_at: now,
        updated_at: now,
    }
}

fn customer_for(order: &Order) -> User {
    User {
        id: order.user_id,
        full_name: "Made Santika".to_string(),
        email: "made@example.com".to_string(),
        phone: "+6281122334455".to_string(),
        password_hash: "x".to_string(),
        role: UserRole::Client,
        verification_status: VerificationStatus::Verified,
        id_card_url: None,
        trip_count: 0,
        rating: 0.0,
        total_earnings: 0,
        created_at: Utc::now(),
    }
}

fn vehicle_for(order: &Order) -> Vehicle {
    Vehicle {
        id: order.vehicle_id,
        name: "Honda Brio".to_string(),
        license_plate: "DK 4321 XY".to_string(),
        daily_rate: order.daily_rate,
        image_url: None,
        available: false,
        condition: VehicleCondition::Rented,
        created_at: Utc::now(),
    }
}

#[test]
fn full_bank_transfer_lifecycle_ends_fully_paid_with_vehicle_released() {
    let now = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
    let order = new_order(250_000, 4, false);
    let admin = Actor::admin(Uuid::new_v4());
    let client = Actor::client(order.user_id);

    let approved = apply_transition(&order, OrderAction::Approve, &admin, now).unwrap();
    let proof = OrderAction::SubmitPaymentProof {
        proof_url: "https://blob.example/dp.jpg".to_string(),
        amount: approved.order.dp_amount,
    };
    let submitted = apply_transition(&approved.order, proof, &client, now).unwrap();
    let confirmed =
        apply_transition(&submitted.order, OrderAction::ConfirmPayment, &admin, now).unwrap();
    let completed =
        apply_transition(&confirmed.order, OrderAction::MarkCompleted, &admin, now).unwrap();

    let balance = OrderAction::SubmitBalanceProof {
        proof_url: "https://blob.example/balance.jpg".to_string(),
        amount: completed.order.remaining_amount(),
    };
    let balance_submitted = apply_transition(&completed.order, balance, &client, now).unwrap();
    let settled = apply_transition(
        &balance_submitted.order,
        OrderAction::ApproveBalancePayment,
        &admin,
        now,
    )
    .unwrap();

    assert_eq!(settled.order.status, OrderStatus::FullyPaid);
    assert_eq!(settled.order.payment_status, PaymentStatus::FullyPaid);
    assert_eq!(settled.vehicle_patch, Some(VehiclePatch::released()));

    // La suma anticipo + saldo cubre exactamente el total
    assert_eq!(
        settled.order.dp_amount + settled.order.remaining_amount(),
        settled.order.total_amount
    );
}

#[test]
fn full_cash_lifecycle_reserves_then_releases_vehicle() {
    let now = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
    let mut order = new_order(300_000, 2, true);
    order.payment_method = PaymentMethod::Cash;
    let admin = Actor::admin(Uuid::new_v4());
    let client = Actor::client(order.user_id);

    let approved = apply_transition(&order, OrderAction::Approve, &admin, now).unwrap();
    let requested =
        apply_transition(&approved.order, OrderAction::RequestCashPayment, &client, now).unwrap();
    let cash_ok =
        apply_transition(&requested.order, OrderAction::ApproveCashPayment, &admin, now).unwrap();
    assert_eq!(cash_ok.vehicle_patch, Some(VehiclePatch::rented()));

    let confirmed =
        apply_transition(&cash_ok.order, OrderAction::ConfirmPayment, &admin, now).unwrap();
    let completed =
        apply_transition(&confirmed.order, OrderAction::MarkCompleted, &admin, now).unwrap();
    let paid =
        apply_transition(&completed.order, OrderAction::MarkFullyPaid, &admin, now).unwrap();

    assert_eq!(paid.order.status, OrderStatus::FullyPaid);
    assert_eq!(paid.vehicle_patch, Some(VehiclePatch::released()));
}

#[test]
fn edit_request_lifecycle_applies_dates_through_two_step_commit() {
    let now = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
    let order = new_order(200_000, 3, false);
    let admin = Actor::admin(Uuid::new_v4());
    let client = Actor::client(order.user_id);
    let original_total = order.total_amount;

    let submit = OrderAction::SubmitEditRequest {
        start_date: date(2026, 9, 12),
        end_date: date(2026, 9, 17),
    };
    let submitted = apply_transition(&order, submit, &client, now).unwrap();

    // La aprobación del admin no toca las fechas del pedido
    let approved =
        apply_transition(&submitted.order, OrderAction::ApproveEditRequest, &admin, now).unwrap();
    assert_eq!(approved.order.start_date, date(2026, 9, 10));
    assert_eq!(approved.order.total_amount, original_total);

    // El apply del cliente las hace efectivas
    let applied =
        apply_transition(&approved.order, OrderAction::ApplyEditRequest, &client, now).unwrap();
    assert_eq!(applied.order.start_date, date(2026, 9, 12));
    assert_eq!(applied.order.end_date, date(2026, 9, 17));
    assert_eq!(applied.order.duration_days, 5);
    assert_eq!(applied.order.total_amount, 1_000_000);
    assert_eq!(applied.order.dp_amount, 500_000);
}

#[test]
fn invoice_render_matches_settled_order() {
    let now = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
    let order = new_order(250_001, 3, false);
    let customer = customer_for(&order);
    let vehicle = vehicle_for(&order);

    let doc = invoice_service::build_invoice(&order, &customer, &vehicle, InvoiceKind::FullPayment, now);

    assert!(doc.invoice_number.starts_with("INV-FP-"));
    assert_eq!(doc.payment.total_amount, 750_003);
    assert_eq!(doc.payment.dp_amount, 375_002);
    assert_eq!(doc.payment.remaining_amount, 375_001);
    assert_eq!(doc.line_item.duration_days, 3);
    assert_eq!(doc.client.email, "made@example.com");
}
