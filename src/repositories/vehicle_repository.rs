use chrono::Utc;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleCondition};
use crate::utils::errors::AppError;
use crate::workflow::VehiclePatch;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: String,
        license_plate: String,
        daily_rate: i64,
        image_url: Option<String>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, name, license_plate, daily_rate, image_url, available, condition, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, 'normal', $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(license_plate)
        .bind(daily_rate)
        .bind(image_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn list(
        &self,
        available: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($1::BOOLEAN IS NULL OR available = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(available)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        license_plate: Option<String>,
        daily_rate: Option<i64>,
        image_url: Option<String>,
        available: Option<bool>,
        condition: Option<VehicleCondition>,
    ) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET name = $2, license_plate = $3, daily_rate = $4, image_url = $5, available = $6, condition = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name.unwrap_or(current.name))
        .bind(license_plate.unwrap_or(current.license_plate))
        .bind(daily_rate.unwrap_or(current.daily_rate))
        .bind(image_url.or(current.image_url))
        .bind(available.unwrap_or(current.available))
        .bind(condition.unwrap_or(current.condition))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        Ok(())
    }

    /// Aplicar el parche de disponibilidad producido por una transición.
    /// Recibe el executor para poder ejecutarse dentro de la misma
    /// transacción que el UPDATE del pedido.
    pub async fn apply_patch<'e, E: PgExecutor<'e>>(
        executor: E,
        vehicle_id: Uuid,
        patch: &VehiclePatch,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE vehicles SET available = $2, condition = $3 WHERE id = $1")
            .bind(vehicle_id)
            .bind(patch.available)
            .bind(patch.condition)
            .execute(executor)
            .await?;

        Ok(())
    }
}
