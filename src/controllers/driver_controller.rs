use sqlx::PgPool;

use crate::dto::auth_dto::{ApiResponse, DriverStatsResponse};
use crate::dto::order_dto::OrderResponse;
use crate::dto::vehicle_dto::VehicleCheckRequest;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::verification::VehicleVerification;
use crate::repositories::order_repository::OrderRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::verification_repository::VerificationRepository;
use crate::utils::errors::{not_found_error, AppError};
use uuid::Uuid;

pub struct DriverController {
    orders: OrderRepository,
    users: UserRepository,
    vehicles: VehicleRepository,
    verifications: VerificationRepository,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            verifications: VerificationRepository::new(pool),
        }
    }

    /// Pedidos asignados al conductor autenticado
    pub async fn my_orders(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<OrderResponse>, AppError> {
        let orders = self.orders.list_by_driver(user.user_id).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    pub async fn stats(&self, user: &AuthenticatedUser) -> Result<DriverStatsResponse, AppError> {
        let driver = self
            .users
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

        Ok(DriverStatsResponse {
            trip_count: driver.trip_count,
            rating: driver.rating,
            total_earnings: driver.total_earnings,
        })
    }

    /// Reporte de estado del vehículo antes de la entrega
    pub async fn submit_vehicle_check(
        &self,
        vehicle_id: Uuid,
        user: &AuthenticatedUser,
        request: VehicleCheckRequest,
    ) -> Result<ApiResponse<VehicleVerification>, AppError> {
        self.vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))?;

        if let Some(order_id) = request.order_id {
            let order = self
                .orders
                .find_by_id(order_id)
                .await?
                .ok_or_else(|| not_found_error("Order", &order_id.to_string()))?;
            if order.driver_id != Some(user.user_id) {
                return Err(AppError::Forbidden(
                    "The order is not assigned to this driver".to_string(),
                ));
            }
        }

        let verification = self
            .verifications
            .insert_vehicle_check(
                vehicle_id,
                user.user_id,
                request.order_id,
                request.condition_ok,
                request.notes,
                request.photo_url,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            verification,
            "Reporte de vehículo registrado".to_string(),
        ))
    }
}
