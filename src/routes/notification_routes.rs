use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::notification_controller::NotificationController;
use crate::dto::notification_dto::NotificationResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", post(mark_read))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.list(&user).await?;
    Ok(Json(response))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    controller.mark_read(id, &user).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Notificación marcada como leída"
    })))
}
