use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::order_controller::OrderController;
use crate::dto::auth_dto::ApiResponse;
use crate::dto::order_dto::{
    AssignDriverRequest, CreateOrderRequest, EditDatesRequest, OrderFilters, OrderResponse,
    SubmitProofRequest,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::models::verification::PaymentVerification;
use crate::services::invoice_service::InvoiceDocument;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::workflow::{InvoiceKind, OrderAction};

pub fn create_order_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        // Transiciones del pipeline
        .route("/:id/approve", post(approve_order))
        .route("/:id/reject", post(reject_order))
        .route("/:id/payment-proof", post(submit_payment_proof))
        .route("/:id/cash-request", post(request_cash_payment))
        .route("/:id/cash-approve", post(approve_cash_payment))
        .route("/:id/cash-reject", post(reject_cash_payment))
        .route("/:id/confirm-payment", post(confirm_payment))
        .route("/:id/complete", post(mark_completed))
        .route("/:id/fully-paid", post(mark_fully_paid))
        .route("/:id/balance-proof", post(submit_balance_proof))
        .route("/:id/balance-approve", post(approve_balance_payment))
        .route("/:id/balance-reject", post(reject_balance_payment))
        .route("/:id/edit-request", post(submit_edit_request))
        .route("/:id/edit-approve", post(approve_edit_request))
        .route("/:id/edit-reject", post(reject_edit_request))
        .route("/:id/edit-apply", post(apply_edit_request))
        .route("/:id/cancel", post(cancel_order))
        // Operaciones auxiliares
        .route("/:id/assign-driver", post(assign_driver))
        .route("/:id/invoice/:kind", get(get_invoice))
        .route("/:id/verifications", get(list_payment_verifications))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    request.validate()?;
    let controller = OrderController::new(&state);
    let response = controller.create(&user, request).await?;
    Ok(Json(response))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<OrderFilters>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let controller = OrderController::new(&state);
    let response = controller.list(&user, filters).await?;
    Ok(Json(response))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let controller = OrderController::new(&state);
    let response = controller.get_by_id(id, &user).await?;
    Ok(Json(response))
}

/// Helper para las transiciones sin payload
async fn run_transition(
    state: AppState,
    user: AuthenticatedUser,
    id: Uuid,
    action: OrderAction,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    let controller = OrderController::new(&state);
    let response = controller.execute_transition(id, action, &user).await?;
    Ok(Json(response))
}

async fn approve_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::Approve).await
}

async fn reject_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::Reject).await
}

async fn submit_payment_proof(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitProofRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    request.validate()?;
    let action = OrderAction::SubmitPaymentProof {
        proof_url: request.proof_url,
        amount: request.amount,
    };
    run_transition(state, user, id, action).await
}

async fn request_cash_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::RequestCashPayment).await
}

async fn approve_cash_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::ApproveCashPayment).await
}

async fn reject_cash_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::RejectCashPayment).await
}

async fn confirm_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::ConfirmPayment).await
}

async fn mark_completed(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::MarkCompleted).await
}

async fn mark_fully_paid(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::MarkFullyPaid).await
}

async fn submit_balance_proof(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitProofRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    request.validate()?;
    let action = OrderAction::SubmitBalanceProof {
        proof_url: request.proof_url,
        amount: request.amount,
    };
    run_transition(state, user, id, action).await
}

async fn approve_balance_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::ApproveBalancePayment).await
}

async fn reject_balance_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::RejectBalancePayment).await
}

async fn submit_edit_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditDatesRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    let action = OrderAction::SubmitEditRequest {
        start_date: request.start_date,
        end_date: request.end_date,
    };
    run_transition(state, user, id, action).await
}

async fn approve_edit_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::ApproveEditRequest).await
}

async fn reject_edit_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::RejectEditRequest).await
}

async fn apply_edit_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::ApplyEditRequest).await
}

async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    run_transition(state, user, id, OrderAction::Cancel).await
}

async fn assign_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    let controller = OrderController::new(&state);
    let response = controller.assign_driver(id, request.driver_id, &user).await?;
    Ok(Json(response))
}

async fn list_payment_verifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaymentVerification>>, AppError> {
    let controller = OrderController::new(&state);
    let response = controller.payment_verifications(id, &user).await?;
    Ok(Json(response))
}

async fn get_invoice(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, kind)): Path<(Uuid, String)>,
) -> Result<Json<InvoiceDocument>, AppError> {
    let kind = InvoiceKind::parse(&kind).ok_or_else(|| {
        AppError::BadRequest(
            "Invoice kind must be one of: down_payment, full_payment, driver_copy".to_string(),
        )
    })?;
    let controller = OrderController::new(&state);
    let response = controller.invoice(id, kind, &user).await?;
    Ok(Json(response))
}
