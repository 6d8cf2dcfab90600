//! Controller de pedidos
//!
//! Ejecuta el ciclo leer → decidir → persistir de cada transición. La
//! decisión es de la máquina de estados; aquí solo se valida la entrada,
//! se escribe el resultado (pedido + vehículo en una transacción) y se
//! despachan los efectos best-effort.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::auth_dto::ApiResponse;
use crate::dto::order_dto::{CreateOrderRequest, OrderFilters, OrderResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::order::{Order, OrderStatus, PaymentStatus, ReviewStatus};
use crate::models::user::UserRole;
use crate::models::vehicle::VehicleCondition;
use crate::models::verification::ProofKind;
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::order_repository::OrderRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::verification_repository::VerificationRepository;
use crate::services::invoice_service::{self, InvoiceDocument};
use crate::services::webhook_service::WebhookService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};
use crate::workflow::pricing;
use crate::workflow::{
    apply_transition, ActionKind, InvoiceKind, OrderAction, TransitionOutcome, VehiclePatch,
    WebhookEvent,
};

pub struct OrderController {
    pool: sqlx::PgPool,
    orders: OrderRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    verifications: VerificationRepository,
    webhook: WebhookService,
}

impl OrderController {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            orders: OrderRepository::new(state.pool.clone()),
            vehicles: VehicleRepository::new(state.pool.clone()),
            users: UserRepository::new(state.pool.clone()),
            notifications: NotificationRepository::new(state.pool.clone()),
            verifications: VerificationRepository::new(state.pool.clone()),
            webhook: state.webhook(),
        }
    }

    /// Crear un pedido: valida fechas y disponibilidad, calcula importes y
    /// reserva el vehículo en la misma transacción que el INSERT.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, AppError> {
        if user.role != UserRole::Client {
            return Err(AppError::Forbidden("Only clients can place orders".to_string()));
        }
        if user.verification_status != crate::models::user::VerificationStatus::Verified {
            return Err(AppError::Forbidden(
                "Account must be verified before placing orders".to_string(),
            ));
        }

        let vehicle = self
            .vehicles
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &request.vehicle_id.to_string()))?;

        if !vehicle.available || vehicle.condition != VehicleCondition::Normal {
            return Err(AppError::Conflict(
                "The vehicle is not available for the requested dates".to_string(),
            ));
        }

        let duration = pricing::duration_days(request.start_date, request.end_date)?;
        let total = pricing::rental_total(duration, vehicle.daily_rate, request.with_driver);
        let now = Utc::now();

        let order = Order {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            user_id: user.user_id,
            driver_id: None,
            start_date: request.start_date,
            end_date: request.end_date,
            duration_days: duration,
            daily_rate: vehicle.daily_rate,
            with_driver: request.with_driver,
            total_amount: total,
            dp_amount: pricing::down_payment(total),
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            payment_proof_url: None,
            status: OrderStatus::Requested,
            edit_request: None,
            balance_request: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;
        let order = OrderRepository::insert(&mut *tx, &order).await?;
        VehicleRepository::apply_patch(&mut *tx, vehicle.id, &VehiclePatch::rented()).await?;
        tx.commit().await?;

        // Aviso al panel, best-effort
        if let Err(e) = self
            .notifications
            .insert(
                crate::models::notification::ADMIN_RECIPIENT,
                &format!(
                    "Nuevo pedido {} recibido para el vehículo {}.",
                    crate::workflow::order_ref(&order.id),
                    vehicle.name
                ),
            )
            .await
        {
            warn!("No se pudo escribir la notificación de nuevo pedido: {}", e);
        }

        Ok(ApiResponse::success_with_message(
            order.into(),
            "Pedido creado exitosamente".to_string(),
        ))
    }

    /// Ejecutar una transición de la tabla canónica sobre un pedido
    pub async fn execute_transition(
        &self,
        order_id: Uuid,
        action: OrderAction,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<OrderResponse>, AppError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", &order_id.to_string()))?;

        let kind = action.kind();
        let outcome = apply_transition(&order, action, &user.actor(), Utc::now())?;

        // Pedido y vehículo se escriben en una única transacción; el guard
        // optimista sobre el estado previo resuelve carreras entre admins
        let mut tx = self.pool.begin().await?;
        let rows =
            OrderRepository::update_from_transition(&mut *tx, &outcome.order, outcome.previous_status)
                .await?;
        if rows == 0 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "The order was modified by a concurrent operation, please retry".to_string(),
            ));
        }
        if let Some(patch) = &outcome.vehicle_patch {
            VehicleRepository::apply_patch(&mut *tx, outcome.order.vehicle_id, patch).await?;
        }
        tx.commit().await?;

        self.dispatch_side_effects(kind, &outcome).await;

        Ok(ApiResponse::success(outcome.order.into()))
    }

    /// Efectos best-effort tras una transición persistida: notificaciones,
    /// auditoría de comprobantes, webhook y estadísticas del conductor.
    /// Ningún fallo aquí revierte la transición.
    async fn dispatch_side_effects(&self, kind: ActionKind, outcome: &TransitionOutcome) {
        let order = &outcome.order;

        for draft in &outcome.notifications {
            if let Err(e) = self
                .notifications
                .insert(&draft.recipient.as_recipient_field(), &draft.message)
                .await
            {
                warn!("No se pudo escribir una notificación del pedido {}: {}", order.id, e);
            }
        }

        if let Some(audit) = &outcome.payment_audit {
            if let Err(e) = self
                .verifications
                .insert_payment_proof(order.id, order.user_id, audit.kind, audit.amount, &audit.proof_url)
                .await
            {
                warn!("No se pudo registrar el comprobante del pedido {}: {}", order.id, e);
            }
        }

        // Resolver el registro de auditoría cuando el admin revisa un comprobante
        let review = match kind {
            ActionKind::ConfirmPayment => Some((ProofKind::DownPayment, ReviewStatus::Approved)),
            ActionKind::ApproveBalancePayment => Some((ProofKind::Balance, ReviewStatus::Approved)),
            ActionKind::RejectBalancePayment => Some((ProofKind::Balance, ReviewStatus::Rejected)),
            _ => None,
        };
        if let Some((proof_kind, status)) = review {
            if let Err(e) = self
                .verifications
                .review_latest_pending(order.id, proof_kind, status)
                .await
            {
                warn!("No se pudo resolver la auditoría del pedido {}: {}", order.id, e);
            }
        }

        if outcome.webhook == Some(WebhookEvent::PaymentSuccess) {
            match self.users.find_by_id(order.user_id).await {
                Ok(Some(customer)) => self.webhook.notify_payment_success(order, &customer).await,
                Ok(None) => warn!("Cliente del pedido {} no encontrado para el webhook", order.id),
                Err(e) => warn!("Error cargando el cliente del pedido {}: {}", order.id, e),
            }
        }

        if let Some(invoice_kind) = outcome.invoice {
            info!(
                "Factura {} disponible para el pedido {}",
                invoice_service::invoice_number(order, invoice_kind),
                order.id
            );
        }

        // Liquidación con chófer: acumular el viaje y el recargo al conductor
        if kind == ActionKind::MarkFullyPaid || kind == ActionKind::ApproveBalancePayment {
            if order.with_driver {
                if let Some(driver_id) = order.driver_id {
                    if let Err(e) = self
                        .users
                        .add_driver_earnings(driver_id, pricing::CHAUFFEUR_SURCHARGE)
                        .await
                    {
                        warn!("No se pudieron acumular las ganancias del conductor: {}", e);
                    }
                }
            }
        }
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<OrderResponse, AppError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Order", &id.to_string()))?;

        self.authorize_read(&order, user)?;

        Ok(order.into())
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        filters: OrderFilters,
    ) -> Result<Vec<OrderResponse>, AppError> {
        let limit = filters.limit.unwrap_or(50).clamp(1, 200);
        let offset = filters.offset.unwrap_or(0).max(0);

        let orders = match user.role {
            UserRole::Admin => self.orders.list_all(filters.status, limit, offset).await?,
            UserRole::Client => self.orders.list_by_user(user.user_id).await?,
            UserRole::Driver => self.orders.list_by_driver(user.user_id).await?,
        };

        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    /// Asignar un conductor a un pedido con chófer ya aprobado para entrega
    pub async fn assign_driver(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<OrderResponse>, AppError> {
        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("Administrator role required".to_string()));
        }

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", &order_id.to_string()))?;

        if !matches!(order.status, OrderStatus::CashApproved | OrderStatus::PaymentConfirmed) {
            return Err(AppError::Conflict(
                "A driver can only be assigned after the payment is approved".to_string(),
            ));
        }

        let driver = self
            .users
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))?;
        if driver.role != UserRole::Driver {
            return Err(AppError::BadRequest("The selected user is not a driver".to_string()));
        }

        let order = self.orders.assign_driver(order_id, driver_id).await?;

        if let Err(e) = self
            .notifications
            .insert(
                &driver_id.to_string(),
                &format!("Se te asignó el pedido {}.", crate::workflow::order_ref(&order.id)),
            )
            .await
        {
            warn!("No se pudo notificar al conductor asignado: {}", e);
        }

        Ok(ApiResponse::success_with_message(
            order.into(),
            "Conductor asignado exitosamente".to_string(),
        ))
    }

    /// Renderizar la factura del pedido. Lectura pura, sin efectos.
    pub async fn invoice(
        &self,
        order_id: Uuid,
        kind: InvoiceKind,
        user: &AuthenticatedUser,
    ) -> Result<InvoiceDocument, AppError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", &order_id.to_string()))?;

        self.authorize_read(&order, user)?;

        let customer = self
            .users
            .find_by_id(order.user_id)
            .await?
            .ok_or_else(|| not_found_error("User", &order.user_id.to_string()))?;
        let vehicle = self
            .vehicles
            .find_by_id(order.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &order.vehicle_id.to_string()))?;

        Ok(invoice_service::build_invoice(&order, &customer, &vehicle, kind, Utc::now()))
    }

    /// Historial de comprobantes del pedido (auditoría, solo admin)
    pub async fn payment_verifications(
        &self,
        order_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<crate::models::verification::PaymentVerification>, AppError> {
        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("Administrator role required".to_string()));
        }

        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", &order_id.to_string()))?;

        self.verifications.list_for_order(order_id).await
    }

    /// Un pedido lo ven el admin, su dueño y el conductor asignado
    fn authorize_read(&self, order: &Order, user: &AuthenticatedUser) -> Result<(), AppError> {
        let allowed = match user.role {
            UserRole::Admin => true,
            UserRole::Client => order.user_id == user.user_id,
            UserRole::Driver => order.driver_id == Some(user.user_id),
        };
        if !allowed {
            return Err(AppError::Forbidden(
                "You do not have access to this order".to_string(),
            ));
        }
        Ok(())
    }
}
