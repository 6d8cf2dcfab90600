//! Transiciones del pedido
//!
//! Una única función pura `apply_transition` decide todas las transiciones
//! del pipeline, tabla en mano: por cada acción existe una regla declarativa
//! con el rol requerido y los estados de origen permitidos. El dispatcher
//! valida rol, propiedad y estado antes de producir efecto alguno; una acción
//! inválida devuelve error sin mutar nada.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::notification::ADMIN_RECIPIENT;
use crate::models::order::{
    BalanceRequest, EditRequest, EditRequestStatus, Order, OrderStatus, PaymentMethod,
    PaymentStatus, ReviewStatus,
};
use crate::models::user::UserRole;
use crate::models::vehicle::VehicleCondition;
use crate::models::verification::ProofKind;
use crate::utils::errors::AppError;

use super::pricing;

/// Acción solicitada sobre un pedido, con su payload
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    Approve,
    Reject,
    SubmitPaymentProof { proof_url: String, amount: i64 },
    RequestCashPayment,
    ApproveCashPayment,
    RejectCashPayment,
    ConfirmPayment,
    MarkCompleted,
    MarkFullyPaid,
    SubmitBalanceProof { proof_url: String, amount: i64 },
    ApproveBalancePayment,
    RejectBalancePayment,
    SubmitEditRequest { start_date: chrono::NaiveDate, end_date: chrono::NaiveDate },
    ApproveEditRequest,
    RejectEditRequest,
    ApplyEditRequest,
    Cancel,
}

/// Discriminante de la acción, usado por la tabla de reglas y los errores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Approve,
    Reject,
    SubmitPaymentProof,
    RequestCashPayment,
    ApproveCashPayment,
    RejectCashPayment,
    ConfirmPayment,
    MarkCompleted,
    MarkFullyPaid,
    SubmitBalanceProof,
    ApproveBalancePayment,
    RejectBalancePayment,
    SubmitEditRequest,
    ApproveEditRequest,
    RejectEditRequest,
    ApplyEditRequest,
    Cancel,
}

impl OrderAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            OrderAction::Approve => ActionKind::Approve,
            OrderAction::Reject => ActionKind::Reject,
            OrderAction::SubmitPaymentProof { .. } => ActionKind::SubmitPaymentProof,
            OrderAction::RequestCashPayment => ActionKind::RequestCashPayment,
            OrderAction::ApproveCashPayment => ActionKind::ApproveCashPayment,
            OrderAction::RejectCashPayment => ActionKind::RejectCashPayment,
            OrderAction::ConfirmPayment => ActionKind::ConfirmPayment,
            OrderAction::MarkCompleted => ActionKind::MarkCompleted,
            OrderAction::MarkFullyPaid => ActionKind::MarkFullyPaid,
            OrderAction::SubmitBalanceProof { .. } => ActionKind::SubmitBalanceProof,
            OrderAction::ApproveBalancePayment => ActionKind::ApproveBalancePayment,
            OrderAction::RejectBalancePayment => ActionKind::RejectBalancePayment,
            OrderAction::SubmitEditRequest { .. } => ActionKind::SubmitEditRequest,
            OrderAction::ApproveEditRequest => ActionKind::ApproveEditRequest,
            OrderAction::RejectEditRequest => ActionKind::RejectEditRequest,
            OrderAction::ApplyEditRequest => ActionKind::ApplyEditRequest,
            OrderAction::Cancel => ActionKind::Cancel,
        }
    }
}

/// Actor que ejecuta la transición; el rol viene del gate de identidad
/// y se trata como autoritativo
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn admin(user_id: Uuid) -> Self {
        Self { user_id, role: UserRole::Admin }
    }

    pub fn client(user_id: Uuid) -> Self {
        Self { user_id, role: UserRole::Client }
    }
}

/// Errores de la máquina de estados. Siempre síncronos y previos a
/// cualquier escritura.
#[derive(Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("role '{role}' cannot perform action {action:?}")]
    NotAllowed { role: &'static str, action: ActionKind },

    #[error("only the order owner can perform action {action:?}")]
    NotOwner { action: ActionKind },

    #[error("action {action:?} is not valid while the order is in status {status:?}")]
    InvalidState { status: OrderStatus, action: ActionKind },

    #[error("{0}")]
    Validation(String),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::NotAllowed { .. } | WorkflowError::NotOwner { .. } => {
                AppError::Forbidden(err.to_string())
            }
            WorkflowError::InvalidState { .. } => AppError::Conflict(err.to_string()),
            WorkflowError::Validation(msg) => AppError::BadRequest(msg.clone()),
        }
    }
}

/// Parche de disponibilidad que el controller aplica al vehículo dentro de
/// la misma transacción que el pedido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehiclePatch {
    pub available: bool,
    pub condition: VehicleCondition,
}

impl VehiclePatch {
    pub fn released() -> Self {
        Self { available: true, condition: VehicleCondition::Normal }
    }

    pub fn rented() -> Self {
        Self { available: false, condition: VehicleCondition::Rented }
    }

    /// Invariante de disponibilidad: available=false ⟺ rented/under_service
    pub fn is_consistent(&self) -> bool {
        match self.condition {
            VehicleCondition::Normal => self.available,
            VehicleCondition::Rented | VehicleCondition::UnderService => !self.available,
        }
    }
}

/// Destinatario de una notificación
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    User(Uuid),
    Admin,
}

impl Recipient {
    /// Representación en texto tal como se persiste en la colección
    pub fn as_recipient_field(&self) -> String {
        match self {
            Recipient::User(id) => id.to_string(),
            Recipient::Admin => ADMIN_RECIPIENT.to_string(),
        }
    }
}

/// Borrador de notificación; la escritura es best-effort y nunca bloquea
/// la transición principal
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub recipient: Recipient,
    pub message: String,
}

/// Evento saliente hacia el webhook configurado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    PaymentSuccess,
}

/// Tipo de factura a renderizar tras la transición
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceKind {
    DownPayment,
    FullPayment,
    DriverCopy,
}

impl InvoiceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "down_payment" => Some(InvoiceKind::DownPayment),
            "full_payment" => Some(InvoiceKind::FullPayment),
            "driver_copy" => Some(InvoiceKind::DriverCopy),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            InvoiceKind::DownPayment => "INV-DP",
            InvoiceKind::FullPayment => "INV-FP",
            InvoiceKind::DriverCopy => "INV-DRV",
        }
    }
}

/// Registro de auditoría de comprobante que el controller inserta en
/// payment_verifications
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAudit {
    pub kind: ProofKind,
    pub amount: i64,
    pub proof_url: String,
}

/// Resultado de una transición válida
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Pedido con el nuevo estado ya aplicado
    pub order: Order,
    /// Estado desde el que partió la transición; el UPDATE lo usa como
    /// guard optimista
    pub previous_status: OrderStatus,
    pub vehicle_patch: Option<VehiclePatch>,
    pub notifications: Vec<NotificationDraft>,
    pub webhook: Option<WebhookEvent>,
    pub invoice: Option<InvoiceKind>,
    pub payment_audit: Option<PaymentAudit>,
}

impl TransitionOutcome {
    fn new(order: Order, previous_status: OrderStatus) -> Self {
        Self {
            order,
            previous_status,
            vehicle_patch: None,
            notifications: Vec::new(),
            webhook: None,
            invoice: None,
            payment_audit: None,
        }
    }
}

/// Regla declarativa por acción: rol mínimo + estados de origen permitidos
struct TransitionRule {
    action: ActionKind,
    role: UserRole,
    from: &'static [OrderStatus],
}

use OrderStatus::*;

/// Estados desde los que el cliente todavía puede cancelar
const ACTIVE_STATES: &[OrderStatus] = &[
    Requested,
    Approved,
    AwaitingPayment,
    PaymentSubmitted,
    CashPendingApproval,
    CashApproved,
    PaymentConfirmed,
];

/// Tabla canónica de transiciones
const RULES: &[TransitionRule] = &[
    TransitionRule { action: ActionKind::Approve, role: UserRole::Admin, from: &[Requested] },
    TransitionRule { action: ActionKind::Reject, role: UserRole::Admin, from: &[Requested] },
    TransitionRule {
        action: ActionKind::SubmitPaymentProof,
        role: UserRole::Client,
        from: &[AwaitingPayment],
    },
    TransitionRule {
        action: ActionKind::RequestCashPayment,
        role: UserRole::Client,
        from: &[AwaitingPayment],
    },
    TransitionRule {
        action: ActionKind::ApproveCashPayment,
        role: UserRole::Admin,
        from: &[CashPendingApproval],
    },
    TransitionRule {
        action: ActionKind::RejectCashPayment,
        role: UserRole::Admin,
        from: &[CashPendingApproval],
    },
    TransitionRule {
        action: ActionKind::ConfirmPayment,
        role: UserRole::Admin,
        from: &[PaymentSubmitted, CashApproved],
    },
    TransitionRule {
        action: ActionKind::MarkCompleted,
        role: UserRole::Admin,
        from: &[PaymentConfirmed],
    },
    TransitionRule { action: ActionKind::MarkFullyPaid, role: UserRole::Admin, from: &[Completed] },
    TransitionRule {
        action: ActionKind::SubmitBalanceProof,
        role: UserRole::Client,
        from: &[Completed],
    },
    TransitionRule {
        action: ActionKind::ApproveBalancePayment,
        role: UserRole::Admin,
        from: &[Completed],
    },
    TransitionRule {
        action: ActionKind::RejectBalancePayment,
        role: UserRole::Admin,
        from: &[Completed],
    },
    TransitionRule {
        action: ActionKind::SubmitEditRequest,
        role: UserRole::Client,
        from: &[Requested, Approved],
    },
    TransitionRule {
        action: ActionKind::ApproveEditRequest,
        role: UserRole::Admin,
        from: &[Requested, Approved],
    },
    TransitionRule {
        action: ActionKind::RejectEditRequest,
        role: UserRole::Admin,
        from: &[Requested, Approved],
    },
    TransitionRule {
        action: ActionKind::ApplyEditRequest,
        role: UserRole::Client,
        from: &[Requested, Approved],
    },
    TransitionRule { action: ActionKind::Cancel, role: UserRole::Client, from: ACTIVE_STATES },
];

fn rule_for(kind: ActionKind) -> &'static TransitionRule {
    RULES
        .iter()
        .find(|r| r.action == kind)
        .expect("every ActionKind has a transition rule")
}

/// Referencia corta del pedido usada en notificaciones y facturas
pub fn order_ref(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    simple[simple.len() - 8..].to_uppercase()
}

fn notify_user(order: &Order, message: impl Into<String>) -> NotificationDraft {
    NotificationDraft { recipient: Recipient::User(order.user_id), message: message.into() }
}

fn notify_admin(message: impl Into<String>) -> NotificationDraft {
    NotificationDraft { recipient: Recipient::Admin, message: message.into() }
}

/// Aplicar una acción sobre un pedido.
///
/// Función pura: recibe el pedido leído de la base, la acción, el actor y el
/// instante actual; devuelve el pedido mutado junto con los efectos a
/// persistir, o un error sin haber tocado nada.
pub fn apply_transition(
    order: &Order,
    action: OrderAction,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, WorkflowError> {
    let kind = action.kind();
    let rule = rule_for(kind);

    // Gate de rol: la tabla declara el rol requerido y el dispatcher lo
    // comprueba una única vez
    match rule.role {
        UserRole::Admin => {
            if actor.role != UserRole::Admin {
                return Err(WorkflowError::NotAllowed {
                    role: actor.role.as_str(),
                    action: kind,
                });
            }
        }
        UserRole::Client => {
            if actor.role != UserRole::Client {
                return Err(WorkflowError::NotAllowed {
                    role: actor.role.as_str(),
                    action: kind,
                });
            }
            if actor.user_id != order.user_id {
                return Err(WorkflowError::NotOwner { action: kind });
            }
        }
        UserRole::Driver => {
            // Ninguna transición de la tabla pertenece a conductores
            return Err(WorkflowError::NotAllowed { role: actor.role.as_str(), action: kind });
        }
    }

    // Guard de estado: desde un estado no contemplado la acción es un error,
    // nunca una mutación silenciosa
    if !rule.from.contains(&order.status) {
        return Err(WorkflowError::InvalidState { status: order.status, action: kind });
    }

    let previous_status = order.status;
    let mut next = order.clone();
    let mut outcome;

    match action {
        OrderAction::Approve => {
            next.status = AwaitingPayment;
            next.dp_amount = pricing::down_payment(next.total_amount);
            let dp = next.dp_amount;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_user(
                order,
                format!("Tu pedido fue aprobado. Paga el anticipo de Rp {} para continuar.", dp),
            ));
        }

        OrderAction::Reject => {
            next.status = Rejected;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.vehicle_patch = Some(VehiclePatch::released());
            outcome
                .notifications
                .push(notify_user(order, "Tu pedido fue rechazado por el administrador."));
        }

        OrderAction::SubmitPaymentProof { proof_url, amount } => {
            if proof_url.trim().is_empty() {
                return Err(WorkflowError::Validation(
                    "payment proof upload is required".to_string(),
                ));
            }
            if amount != order.dp_amount {
                return Err(WorkflowError::Validation(format!(
                    "payment amount {} does not match the down payment of {}",
                    amount, order.dp_amount
                )));
            }
            next.status = PaymentSubmitted;
            next.payment_status = PaymentStatus::Submitted;
            next.payment_proof_url = Some(proof_url.clone());
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_admin(format!(
                "El cliente envió el comprobante del anticipo del pedido {}.",
                order_ref(&order.id)
            )));
            outcome.payment_audit =
                Some(PaymentAudit { kind: ProofKind::DownPayment, amount, proof_url });
        }

        OrderAction::RequestCashPayment => {
            next.status = CashPendingApproval;
            next.payment_method = PaymentMethod::Cash;
            next.payment_status = PaymentStatus::PendingApproval;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_admin(format!(
                "El cliente solicitó pago en efectivo para el pedido {}.",
                order_ref(&order.id)
            )));
        }

        OrderAction::ApproveCashPayment => {
            next.status = CashApproved;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.vehicle_patch = Some(VehiclePatch::rented());
            outcome.notifications.push(notify_user(
                order,
                "Pago en efectivo aprobado. El vehículo quedó reservado para ti.",
            ));
            outcome.notifications.push(notify_admin(format!(
                "Pedido {} aprobado para pago en efectivo. Asigna un conductor para la entrega.",
                order_ref(&order.id)
            )));
        }

        OrderAction::RejectCashPayment => {
            next.status = Rejected;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.vehicle_patch = Some(VehiclePatch::released());
            outcome.notifications.push(notify_user(
                order,
                "La solicitud de pago en efectivo fue rechazada.",
            ));
        }

        OrderAction::ConfirmPayment => {
            next.status = PaymentConfirmed;
            next.payment_status = PaymentStatus::Completed;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_user(
                order,
                "Tu pago fue confirmado. ¡Disfruta tu alquiler!",
            ));
            outcome.webhook = Some(WebhookEvent::PaymentSuccess);
            outcome.invoice = Some(InvoiceKind::DownPayment);
        }

        OrderAction::MarkCompleted => {
            next.status = Completed;
            outcome = TransitionOutcome::new(next, previous_status);
        }

        OrderAction::MarkFullyPaid => {
            next.status = FullyPaid;
            next.payment_status = PaymentStatus::FullyPaid;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.vehicle_patch = Some(VehiclePatch::released());
            outcome.notifications.push(notify_user(
                order,
                "Pago completado. Gracias por alquilar con nosotros.",
            ));
            outcome.notifications.push(notify_admin(format!(
                "Pedido {} liquidado. El vehículo vuelve a estar disponible.",
                order_ref(&order.id)
            )));
            outcome.invoice = Some(InvoiceKind::FullPayment);
        }

        OrderAction::SubmitBalanceProof { proof_url, amount } => {
            if proof_url.trim().is_empty() {
                return Err(WorkflowError::Validation(
                    "balance payment proof upload is required".to_string(),
                ));
            }
            if let Some(req) = &order.balance_request {
                if req.0.status == ReviewStatus::Pending {
                    return Err(WorkflowError::Validation(
                        "a balance payment is already awaiting approval".to_string(),
                    ));
                }
            }
            let remaining = order.remaining_amount();
            if amount != remaining {
                return Err(WorkflowError::Validation(format!(
                    "payment amount {} does not match the remaining balance of {}",
                    amount, remaining
                )));
            }
            next.balance_request = Some(Json(BalanceRequest {
                amount,
                proof_url: proof_url.clone(),
                status: ReviewStatus::Pending,
                submitted_at: now,
            }));
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_admin(format!(
                "El cliente envió el comprobante del saldo restante del pedido {}.",
                order_ref(&order.id)
            )));
            outcome.payment_audit =
                Some(PaymentAudit { kind: ProofKind::Balance, amount, proof_url });
        }

        OrderAction::ApproveBalancePayment => {
            let mut req = match &order.balance_request {
                Some(req) if req.0.status == ReviewStatus::Pending => req.0.clone(),
                _ => {
                    return Err(WorkflowError::Validation(
                        "there is no balance payment awaiting approval".to_string(),
                    ))
                }
            };
            req.status = ReviewStatus::Approved;
            next.balance_request = Some(Json(req));
            next.status = FullyPaid;
            next.payment_status = PaymentStatus::FullyPaid;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.vehicle_patch = Some(VehiclePatch::released());
            outcome.notifications.push(notify_user(
                order,
                "Pago del saldo confirmado. El pedido quedó liquidado.",
            ));
            outcome.invoice = Some(InvoiceKind::FullPayment);
        }

        OrderAction::RejectBalancePayment => {
            let mut req = match &order.balance_request {
                Some(req) if req.0.status == ReviewStatus::Pending => req.0.clone(),
                _ => {
                    return Err(WorkflowError::Validation(
                        "there is no balance payment awaiting approval".to_string(),
                    ))
                }
            };
            req.status = ReviewStatus::Rejected;
            next.balance_request = Some(Json(req));
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_user(
                order,
                "El comprobante del saldo fue rechazado. Envíalo nuevamente.",
            ));
        }

        OrderAction::SubmitEditRequest { start_date, end_date } => {
            // Ventana H-1: solo estrictamente antes del día previo al inicio
            let days_until_start = (order.start_date - now.date_naive()).num_days();
            if days_until_start <= 1 {
                return Err(WorkflowError::Validation(
                    "date changes are closed from one day before the rental starts".to_string(),
                ));
            }
            if let Some(req) = &order.edit_request {
                match req.0.status {
                    EditRequestStatus::Pending | EditRequestStatus::Approved => {
                        return Err(WorkflowError::Validation(
                            "an edit request is already in progress".to_string(),
                        ));
                    }
                    EditRequestStatus::Rejected | EditRequestStatus::Applied => {}
                }
            }
            let duration = pricing::duration_days(start_date, end_date)?;
            let total = pricing::rental_total(duration, order.daily_rate, order.with_driver);
            next.edit_request = Some(Json(EditRequest {
                start_date,
                end_date,
                duration_days: duration,
                total_amount: total,
                dp_amount: pricing::down_payment(total),
                status: EditRequestStatus::Pending,
                requested_at: now,
            }));
            outcome = TransitionOutcome::new(next, previous_status);
            // Sin notificaciones hasta que el admin actúe
        }

        OrderAction::ApproveEditRequest => {
            let mut req = match &order.edit_request {
                Some(req) if req.0.status == EditRequestStatus::Pending => req.0.clone(),
                _ => {
                    return Err(WorkflowError::Validation(
                        "there is no pending edit request".to_string(),
                    ))
                }
            };
            req.status = EditRequestStatus::Approved;
            next.edit_request = Some(Json(req));
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.notifications.push(notify_user(
                order,
                "Tu cambio de fechas fue aprobado. Aplícalo para actualizar el pedido.",
            ));
        }

        OrderAction::RejectEditRequest => {
            let mut req = match &order.edit_request {
                Some(req) if req.0.status == EditRequestStatus::Pending => req.0.clone(),
                _ => {
                    return Err(WorkflowError::Validation(
                        "there is no pending edit request".to_string(),
                    ))
                }
            };
            req.status = EditRequestStatus::Rejected;
            next.edit_request = Some(Json(req));
            outcome = TransitionOutcome::new(next, previous_status);
            outcome
                .notifications
                .push(notify_user(order, "Tu cambio de fechas fue rechazado."));
        }

        OrderAction::ApplyEditRequest => {
            let mut req = match &order.edit_request {
                Some(req) if req.0.status == EditRequestStatus::Approved => req.0.clone(),
                Some(req) if req.0.status == EditRequestStatus::Applied => {
                    return Err(WorkflowError::Validation(
                        "the edit request was already applied".to_string(),
                    ))
                }
                _ => {
                    return Err(WorkflowError::Validation(
                        "there is no approved edit request to apply".to_string(),
                    ))
                }
            };
            next.start_date = req.start_date;
            next.end_date = req.end_date;
            next.duration_days = req.duration_days;
            next.total_amount = req.total_amount;
            next.dp_amount = req.dp_amount;
            req.status = EditRequestStatus::Applied;
            next.edit_request = Some(Json(req));
            outcome = TransitionOutcome::new(next, previous_status);
        }

        OrderAction::Cancel => {
            next.status = Cancelled;
            outcome = TransitionOutcome::new(next, previous_status);
            outcome.vehicle_patch = Some(VehiclePatch::released());
        }
    }

    if let Some(patch) = &outcome.vehicle_patch {
        debug_assert!(patch.is_consistent());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap()
    }

    fn base_order(status: OrderStatus) -> Order {
        let total = 1_000_000;
        Order {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            driver_id: None,
            start_date: date(2026, 8, 10),
            end_date: date(2026, 8, 14),
            duration_days: 4,
            daily_rate: 250_000,
            with_driver: false,
            total_amount: total,
            dp_amount: pricing::down_payment(total),
            payment_method: PaymentMethod::BankTransfer,
            payment_status: PaymentStatus::Pending,
            payment_proof_url: None,
            status,
            edit_request: None,
            balance_request: None,
            created_at: clock(),
            updated_at: clock(),
        }
    }

    fn admin() -> Actor {
        Actor::admin(Uuid::new_v4())
    }

    fn owner(order: &Order) -> Actor {
        Actor::client(order.user_id)
    }

    #[test]
    fn scenario_a_approve_computes_down_payment() {
        let order = base_order(Requested);
        let outcome = apply_transition(&order, OrderAction::Approve, &admin(), clock()).unwrap();

        assert_eq!(outcome.order.status, AwaitingPayment);
        assert_eq!(outcome.order.dp_amount, 500_000);
        assert_eq!(outcome.previous_status, Requested);
        // El vehículo sigue reservado: sin parche
        assert!(outcome.vehicle_patch.is_none());
        assert_eq!(outcome.notifications.len(), 1);
        assert_eq!(outcome.notifications[0].recipient, Recipient::User(order.user_id));
    }

    #[test]
    fn scenario_b_bank_transfer_happy_path() {
        let order = base_order(AwaitingPayment);

        let action = OrderAction::SubmitPaymentProof {
            proof_url: "https://blob.example/proof.jpg".to_string(),
            amount: order.dp_amount,
        };
        let submitted = apply_transition(&order, action, &owner(&order), clock()).unwrap();
        assert_eq!(submitted.order.status, PaymentSubmitted);
        assert_eq!(submitted.order.payment_status, PaymentStatus::Submitted);
        assert_eq!(submitted.notifications[0].recipient, Recipient::Admin);
        let audit = submitted.payment_audit.as_ref().unwrap();
        assert_eq!(audit.kind, ProofKind::DownPayment);
        assert_eq!(audit.amount, 500_000);

        let confirmed =
            apply_transition(&submitted.order, OrderAction::ConfirmPayment, &admin(), clock())
                .unwrap();
        assert_eq!(confirmed.order.status, PaymentConfirmed);
        assert_eq!(confirmed.order.payment_status, PaymentStatus::Completed);
        assert_eq!(confirmed.webhook, Some(WebhookEvent::PaymentSuccess));
        assert_eq!(confirmed.invoice, Some(InvoiceKind::DownPayment));

        let completed =
            apply_transition(&confirmed.order, OrderAction::MarkCompleted, &admin(), clock())
                .unwrap();
        assert_eq!(completed.order.status, Completed);
        assert!(completed.vehicle_patch.is_none());
        assert!(completed.notifications.is_empty());

        let paid =
            apply_transition(&completed.order, OrderAction::MarkFullyPaid, &admin(), clock())
                .unwrap();
        assert_eq!(paid.order.status, FullyPaid);
        assert_eq!(paid.order.payment_status, PaymentStatus::FullyPaid);
        assert_eq!(paid.vehicle_patch, Some(VehiclePatch::released()));
        assert_eq!(paid.notifications.len(), 2);
    }

    #[test]
    fn scenario_c_cash_request_then_reject() {
        let order = base_order(AwaitingPayment);

        let pending =
            apply_transition(&order, OrderAction::RequestCashPayment, &owner(&order), clock())
                .unwrap();
        assert_eq!(pending.order.status, CashPendingApproval);
        assert_eq!(pending.order.payment_method, PaymentMethod::Cash);
        assert_eq!(pending.notifications[0].recipient, Recipient::Admin);

        let rejected =
            apply_transition(&pending.order, OrderAction::RejectCashPayment, &admin(), clock())
                .unwrap();
        assert_eq!(rejected.order.status, Rejected);
        assert_eq!(rejected.vehicle_patch, Some(VehiclePatch::released()));
    }

    #[test]
    fn cash_approval_reserves_vehicle_and_hints_driver_assignment() {
        let order = base_order(CashPendingApproval);
        let outcome =
            apply_transition(&order, OrderAction::ApproveCashPayment, &admin(), clock()).unwrap();

        assert_eq!(outcome.order.status, CashApproved);
        assert_eq!(outcome.vehicle_patch, Some(VehiclePatch::rented()));
        let recipients: Vec<_> =
            outcome.notifications.iter().map(|n| n.recipient.clone()).collect();
        assert!(recipients.contains(&Recipient::User(order.user_id)));
        assert!(recipients.contains(&Recipient::Admin));
    }

    #[test]
    fn scenario_d_edit_window_h1_cutoff() {
        // Inicio el 10; hoy es 7: faltan 3 días, permitido
        let order = base_order(Requested);
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();
        let action = OrderAction::SubmitEditRequest {
            start_date: date(2026, 8, 12),
            end_date: date(2026, 8, 15),
        };
        let outcome = apply_transition(&order, action.clone(), &owner(&order), now).unwrap();
        let req = outcome.order.edit_request.as_ref().unwrap();
        assert_eq!(req.0.status, EditRequestStatus::Pending);
        assert_eq!(req.0.duration_days, 3);
        assert_eq!(req.0.total_amount, 750_000);
        assert_eq!(req.0.dp_amount, 375_000);
        // Sin notificaciones hasta que el admin actúe
        assert!(outcome.notifications.is_empty());

        // El mismo día del inicio: rechazado
        let same_day = Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap();
        assert!(matches!(
            apply_transition(&order, action.clone(), &owner(&order), same_day),
            Err(WorkflowError::Validation(_))
        ));

        // H-1 exacto (un día antes): también rechazado
        let h1 = Utc.with_ymd_and_hms(2026, 8, 9, 23, 0, 0).unwrap();
        assert!(matches!(
            apply_transition(&order, action, &owner(&order), h1),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn edit_request_refused_while_another_is_in_progress() {
        let mut order = base_order(Requested);
        order.edit_request = Some(Json(EditRequest {
            start_date: date(2026, 8, 11),
            end_date: date(2026, 8, 13),
            duration_days: 2,
            total_amount: 500_000,
            dp_amount: 250_000,
            status: EditRequestStatus::Pending,
            requested_at: clock(),
        }));
        let action = OrderAction::SubmitEditRequest {
            start_date: date(2026, 8, 12),
            end_date: date(2026, 8, 14),
        };
        assert!(matches!(
            apply_transition(&order, action, &owner(&order), clock()),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn edit_request_with_non_positive_duration_is_refused() {
        let order = base_order(Requested);
        let action = OrderAction::SubmitEditRequest {
            start_date: date(2026, 8, 12),
            end_date: date(2026, 8, 12),
        };
        assert!(matches!(
            apply_transition(&order, action, &owner(&order), clock()),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn approved_edit_is_applied_once_and_only_once() {
        let mut order = base_order(Requested);
        order.edit_request = Some(Json(EditRequest {
            start_date: date(2026, 8, 12),
            end_date: date(2026, 8, 18),
            duration_days: 6,
            total_amount: 1_500_000,
            dp_amount: 750_000,
            status: EditRequestStatus::Approved,
            requested_at: clock(),
        }));

        // Aprobar no aplica las fechas todavía
        assert_eq!(order.start_date, date(2026, 8, 10));

        let applied =
            apply_transition(&order, OrderAction::ApplyEditRequest, &owner(&order), clock())
                .unwrap();
        assert_eq!(applied.order.start_date, date(2026, 8, 12));
        assert_eq!(applied.order.end_date, date(2026, 8, 18));
        assert_eq!(applied.order.duration_days, 6);
        assert_eq!(applied.order.total_amount, 1_500_000);
        assert_eq!(applied.order.dp_amount, 750_000);
        assert_eq!(
            applied.order.edit_request.as_ref().unwrap().0.status,
            EditRequestStatus::Applied
        );

        // Segunda aplicación: error, el pedido no vuelve a mutar
        assert!(matches!(
            apply_transition(&applied.order, OrderAction::ApplyEditRequest, &owner(&order), clock()),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn balance_settlement_flow() {
        let mut order = base_order(Completed);
        order.payment_status = PaymentStatus::Completed;

        let wrong = OrderAction::SubmitBalanceProof {
            proof_url: "https://blob.example/rest.jpg".to_string(),
            amount: 123,
        };
        assert!(matches!(
            apply_transition(&order, wrong, &owner(&order), clock()),
            Err(WorkflowError::Validation(_))
        ));

        let submit = OrderAction::SubmitBalanceProof {
            proof_url: "https://blob.example/rest.jpg".to_string(),
            amount: order.remaining_amount(),
        };
        let submitted = apply_transition(&order, submit, &owner(&order), clock()).unwrap();
        assert_eq!(submitted.order.status, Completed);
        let audit = submitted.payment_audit.as_ref().unwrap();
        assert_eq!(audit.kind, ProofKind::Balance);

        // Rechazo: el pedido queda como estaba, el cliente es notificado
        let rejected = apply_transition(
            &submitted.order,
            OrderAction::RejectBalancePayment,
            &admin(),
            clock(),
        )
        .unwrap();
        assert_eq!(rejected.order.status, Completed);
        assert!(rejected.vehicle_patch.is_none());
        assert_eq!(
            rejected.order.balance_request.as_ref().unwrap().0.status,
            ReviewStatus::Rejected
        );

        // Aprobación: liquidado y vehículo liberado
        let approved = apply_transition(
            &submitted.order,
            OrderAction::ApproveBalancePayment,
            &admin(),
            clock(),
        )
        .unwrap();
        assert_eq!(approved.order.status, FullyPaid);
        assert_eq!(approved.vehicle_patch, Some(VehiclePatch::released()));
        assert_eq!(approved.invoice, Some(InvoiceKind::FullPayment));
    }

    #[test]
    fn payment_proof_amount_must_match_down_payment() {
        let order = base_order(AwaitingPayment);
        let action = OrderAction::SubmitPaymentProof {
            proof_url: "https://blob.example/proof.jpg".to_string(),
            amount: order.dp_amount - 1,
        };
        assert!(matches!(
            apply_transition(&order, action, &owner(&order), clock()),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn payment_proof_requires_upload() {
        let order = base_order(AwaitingPayment);
        let action = OrderAction::SubmitPaymentProof {
            proof_url: "  ".to_string(),
            amount: order.dp_amount,
        };
        assert!(matches!(
            apply_transition(&order, action, &owner(&order), clock()),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn invalid_state_is_an_error_not_a_mutation() {
        let order = base_order(AwaitingPayment);
        let result = apply_transition(&order, OrderAction::Approve, &admin(), clock());
        assert_eq!(
            result.unwrap_err(),
            WorkflowError::InvalidState { status: AwaitingPayment, action: ActionKind::Approve }
        );
    }

    #[test]
    fn rejection_is_only_reachable_from_requested_or_cash_pending() {
        for status in [AwaitingPayment, PaymentSubmitted, CashApproved, PaymentConfirmed, Completed]
        {
            let order = base_order(status);
            assert!(
                apply_transition(&order, OrderAction::Reject, &admin(), clock()).is_err(),
                "reject must not be allowed from {:?}",
                status
            );
            assert!(
                apply_transition(&order, OrderAction::RejectCashPayment, &admin(), clock())
                    .is_err(),
                "cash reject must not be allowed from {:?}",
                status
            );
        }
    }

    #[test]
    fn terminal_states_permit_no_further_transitions() {
        let all_actions = |order: &Order| {
            vec![
                OrderAction::Approve,
                OrderAction::Reject,
                OrderAction::SubmitPaymentProof {
                    proof_url: "x".to_string(),
                    amount: order.dp_amount,
                },
                OrderAction::RequestCashPayment,
                OrderAction::ApproveCashPayment,
                OrderAction::RejectCashPayment,
                OrderAction::ConfirmPayment,
                OrderAction::MarkCompleted,
                OrderAction::MarkFullyPaid,
                OrderAction::SubmitBalanceProof {
                    proof_url: "x".to_string(),
                    amount: order.remaining_amount(),
                },
                OrderAction::ApproveBalancePayment,
                OrderAction::RejectBalancePayment,
                OrderAction::SubmitEditRequest {
                    start_date: date(2026, 9, 1),
                    end_date: date(2026, 9, 3),
                },
                OrderAction::ApproveEditRequest,
                OrderAction::RejectEditRequest,
                OrderAction::ApplyEditRequest,
                OrderAction::Cancel,
            ]
        };

        for status in [Rejected, Cancelled, FullyPaid] {
            let order = base_order(status);
            for action in all_actions(&order) {
                let actor = match action.kind() {
                    ActionKind::Approve
                    | ActionKind::Reject
                    | ActionKind::ApproveCashPayment
                    | ActionKind::RejectCashPayment
                    | ActionKind::ConfirmPayment
                    | ActionKind::MarkCompleted
                    | ActionKind::MarkFullyPaid
                    | ActionKind::ApproveBalancePayment
                    | ActionKind::RejectBalancePayment
                    | ActionKind::ApproveEditRequest
                    | ActionKind::RejectEditRequest => admin(),
                    _ => owner(&order),
                };
                assert!(
                    apply_transition(&order, action.clone(), &actor, clock()).is_err(),
                    "action {:?} must be refused from terminal status {:?}",
                    action.kind(),
                    status
                );
            }
        }
    }

    #[test]
    fn wrong_role_is_refused_without_mutation() {
        let order = base_order(Requested);

        // Un cliente no puede aprobar
        let result = apply_transition(&order, OrderAction::Approve, &owner(&order), clock());
        assert!(matches!(result, Err(WorkflowError::NotAllowed { .. })));

        // Un admin no envía comprobantes de cliente
        let order = base_order(AwaitingPayment);
        let action = OrderAction::SubmitPaymentProof {
            proof_url: "https://blob.example/proof.jpg".to_string(),
            amount: order.dp_amount,
        };
        let result = apply_transition(&order, action, &admin(), clock());
        assert!(matches!(result, Err(WorkflowError::NotAllowed { .. })));

        // Un cliente distinto del dueño no puede cancelar
        let stranger = Actor::client(Uuid::new_v4());
        let result = apply_transition(&order, OrderAction::Cancel, &stranger, clock());
        assert!(matches!(result, Err(WorkflowError::NotOwner { .. })));
    }

    #[test]
    fn cancel_releases_vehicle_from_any_active_state() {
        for status in [
            Requested,
            Approved,
            AwaitingPayment,
            PaymentSubmitted,
            CashPendingApproval,
            CashApproved,
            PaymentConfirmed,
        ] {
            let order = base_order(status);
            let outcome =
                apply_transition(&order, OrderAction::Cancel, &owner(&order), clock()).unwrap();
            assert_eq!(outcome.order.status, Cancelled);
            assert_eq!(outcome.vehicle_patch, Some(VehiclePatch::released()));
        }

        // Un pedido completado ya no se cancela
        let order = base_order(Completed);
        assert!(apply_transition(&order, OrderAction::Cancel, &owner(&order), clock()).is_err());
    }

    #[test]
    fn every_vehicle_patch_keeps_the_availability_invariant() {
        let cases: Vec<(Order, OrderAction, Actor)> = vec![
            (base_order(Requested), OrderAction::Reject, admin()),
            (base_order(CashPendingApproval), OrderAction::ApproveCashPayment, admin()),
            (base_order(CashPendingApproval), OrderAction::RejectCashPayment, admin()),
            (base_order(Completed), OrderAction::MarkFullyPaid, admin()),
            {
                let order = base_order(AwaitingPayment);
                let actor = owner(&order);
                (order, OrderAction::Cancel, actor)
            },
        ];
        for (order, action, actor) in cases {
            let outcome = apply_transition(&order, action, &actor, clock()).unwrap();
            if let Some(patch) = outcome.vehicle_patch {
                assert!(patch.is_consistent());
            }
        }
    }

    #[test]
    fn order_ref_is_deterministic_suffix() {
        let id = Uuid::parse_str("c56a4180-65aa-42ec-a945-5fd21dec0538").unwrap();
        assert_eq!(order_ref(&id), "1DEC0538");
    }
}
