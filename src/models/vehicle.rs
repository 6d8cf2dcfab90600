//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado físico del vehículo - mapea al ENUM vehicle_condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleCondition {
    Normal,
    UnderService,
    Rented,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    pub daily_rate: i64,
    pub image_url: Option<String>,
    pub available: bool,
    pub condition: VehicleCondition,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Invariante: available=false ⟺ condition ∈ {rented, under_service}
    pub fn availability_consistent(&self) -> bool {
        match self.condition {
            VehicleCondition::Normal => self.available,
            VehicleCondition::UnderService | VehicleCondition::Rented => !self.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(available: bool, condition: VehicleCondition) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: "Toyota Avanza".to_string(),
            license_plate: "B 1234 ABC".to_string(),
            daily_rate: 350_000,
            image_url: None,
            available,
            condition,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_availability_consistency() {
        assert!(vehicle(true, VehicleCondition::Normal).availability_consistent());
        assert!(vehicle(false, VehicleCondition::Rented).availability_consistent());
        assert!(vehicle(false, VehicleCondition::UnderService).availability_consistent());
        assert!(!vehicle(false, VehicleCondition::Normal).availability_consistent());
        assert!(!vehicle(true, VehicleCondition::Rented).availability_consistent());
    }
}
