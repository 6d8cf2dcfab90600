use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::driver_controller::DriverController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::auth_dto::ApiResponse;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, UpdateVehicleRequest, VehicleCheckRequest, VehicleFilters,
    VehicleResponse,
};
use crate::middleware::auth::{
    admin_only_middleware, auth_middleware, driver_only_middleware, AuthenticatedUser,
};
use crate::models::verification::VehicleVerification;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id", delete(delete_vehicle))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let driver = Router::new()
        .route("/:id/check", post(submit_vehicle_check))
        .route_layer(middleware::from_fn(driver_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    // El catálogo es público: los clientes navegan sin autenticarse
    Router::new()
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .merge(admin)
        .merge(driver)
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehículo eliminado exitosamente"
    })))
}

async fn submit_vehicle_check(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<VehicleCheckRequest>,
) -> Result<Json<ApiResponse<VehicleVerification>>, AppError> {
    request.validate()?;
    let controller = DriverController::new(state.pool.clone());
    let response = controller.submit_vehicle_check(id, &user, request).await?;
    Ok(Json(response))
}
