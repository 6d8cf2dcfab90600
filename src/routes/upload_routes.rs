use axum::{extract::State, middleware, routing::post, Json, Router};
use validator::Validate;

use crate::dto::upload_dto::{UploadRequest, UploadResponse};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_upload_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_file))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Proxy hacia el blob store: recibe el archivo en base64 y devuelve la
/// URL pública con la que se referencia desde pedidos y perfiles
async fn upload_file(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    request.validate()?;

    let storage = state.storage().ok_or_else(|| {
        AppError::ExternalApi("Blob store is not configured".to_string())
    })?;

    let url = storage
        .upload_base64(&request.file_name, &request.content_base64)
        .await?;

    Ok(Json(UploadResponse { url }))
}
