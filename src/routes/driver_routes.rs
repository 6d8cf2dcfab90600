use axum::{
    extract::State,
    middleware,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::driver_controller::DriverController;
use crate::dto::auth_dto::DriverStatsResponse;
use crate::dto::order_dto::OrderResponse;
use crate::middleware::auth::{auth_middleware, driver_only_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(my_orders))
        .route("/stats", get(stats))
        .route_layer(middleware::from_fn(driver_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.my_orders(&user).await?;
    Ok(Json(response))
}

async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<DriverStatsResponse>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.stats(&user).await?;
    Ok(Json(response))
}
