use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters, VehicleResponse};
use crate::models::vehicle::VehicleCondition;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{conflict_error, not_found_error, AppError};
use crate::utils::validation::validate_license_plate;

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let plate = request.license_plate.trim().to_uppercase();
        validate_license_plate(&plate)
            .map_err(|_| AppError::BadRequest("Invalid license plate format".to_string()))?;

        if self.repository.license_plate_exists(&plate).await? {
            return Err(conflict_error("Vehicle", "license_plate", &plate));
        }

        let vehicle = self
            .repository
            .create(request.name, plate, request.daily_rate, request.image_url)
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehículo creado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleResponse, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(vehicle.into())
    }

    pub async fn list(&self, filters: VehicleFilters) -> Result<Vec<VehicleResponse>, AppError> {
        let limit = filters.limit.unwrap_or(50).clamp(1, 200);
        let offset = filters.offset.unwrap_or(0).max(0);

        let vehicles = self.repository.list(filters.available, limit, offset).await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        // La condición 'rented' es exclusiva del pipeline de pedidos
        if request.condition == Some(VehicleCondition::Rented) {
            return Err(AppError::BadRequest(
                "The rented condition is managed by the order pipeline".to_string(),
            ));
        }

        let plate = match request.license_plate {
            Some(p) => {
                let plate = p.trim().to_uppercase();
                validate_license_plate(&plate)
                    .map_err(|_| AppError::BadRequest("Invalid license plate format".to_string()))?;
                Some(plate)
            }
            None => None,
        };

        // Mantener el invariante disponibilidad ⟺ condición al editar
        let available = request
            .condition
            .map(|condition| condition == VehicleCondition::Normal);

        let vehicle = self
            .repository
            .update(
                id,
                request.name,
                plate,
                request.daily_rate,
                request.image_url,
                available,
                request.condition,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehículo actualizado exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        if vehicle.condition == VehicleCondition::Rented {
            return Err(AppError::Conflict(
                "A rented vehicle cannot be deleted".to_string(),
            ));
        }

        self.repository.delete(id).await
    }
}
