use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{
    ApiResponse, LoginRequest, LoginResponse, RegisterRequest, ReviewVerificationRequest,
    SubmitVerificationRequest, UserResponse,
};
use crate::middleware::auth::{admin_only_middleware, auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/verification", post(submit_verification))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin = Router::new()
        .route("/verification/pending", get(list_pending_verifications))
        .route("/verification/:user_id/review", post(review_verification))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
        .merge(admin)
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    request.validate()?;
    let controller = AuthController::new(&state);
    let response = controller.register(request).await?;
    Ok(Json(response))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    request.validate()?;
    let controller = AuthController::new(&state);
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.me(&user).await?;
    Ok(Json(response))
}

async fn submit_verification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<SubmitVerificationRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    request.validate()?;
    let controller = AuthController::new(&state);
    let response = controller.submit_verification(&user, request).await?;
    Ok(Json(response))
}

async fn review_verification(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<ReviewVerificationRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.review_verification(user_id, request).await?;
    Ok(Json(response))
}

async fn list_pending_verifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.list_pending_verifications().await?;
    Ok(Json(response))
}
