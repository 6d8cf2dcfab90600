use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{Vehicle, VehicleCondition};

// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 4, max = 20))]
    pub license_plate: String,

    #[validate(range(min = 1))]
    pub daily_rate: i64,

    #[validate(url)]
    pub image_url: Option<String>,
}

// Request para actualizar un vehículo existente.
// La condición 'rented' solo la asigna el pipeline de pedidos, nunca este endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 4, max = 20))]
    pub license_plate: Option<String>,

    #[validate(range(min = 1))]
    pub daily_rate: Option<i64>,

    #[validate(url)]
    pub image_url: Option<String>,

    pub condition: Option<VehicleCondition>,
}

// Filtros para el listado de vehículos
#[derive(Debug, Deserialize)]
pub struct VehicleFilters {
    pub available: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Reporte del conductor sobre el estado del vehículo antes de la entrega
#[derive(Debug, Deserialize, Validate)]
pub struct VehicleCheckRequest {
    pub order_id: Option<Uuid>,
    pub condition_ok: bool,

    #[validate(length(max = 500))]
    pub notes: Option<String>,

    #[validate(url)]
    pub photo_url: Option<String>,
}

// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    pub daily_rate: i64,
    pub image_url: Option<String>,
    pub available: bool,
    pub condition: VehicleCondition,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            name: vehicle.name,
            license_plate: vehicle.license_plate,
            daily_rate: vehicle.daily_rate,
            image_url: vehicle.image_url,
            available: vehicle.available,
            condition: vehicle.condition,
            created_at: vehicle.created_at,
        }
    }
}
