//! Máquina de estados del pedido
//!
//! Este módulo contiene la lógica de decisión pura del pipeline de alquiler:
//! dada la acción de un actor sobre un pedido, produce el nuevo pedido, el
//! parche de disponibilidad del vehículo y las notificaciones a emitir.
//! Ninguna función de este módulo toca la base de datos; los controllers son
//! los responsables de persistir el resultado.

pub mod pricing;
pub mod transition;

pub use transition::{
    apply_transition, order_ref, ActionKind, Actor, InvoiceKind, NotificationDraft, OrderAction,
    PaymentAudit, Recipient, TransitionOutcome, VehiclePatch, WebhookEvent, WorkflowError,
};
