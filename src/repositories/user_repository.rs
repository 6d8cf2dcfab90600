use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{User, UserRole, VerificationStatus};
use crate::utils::errors::AppError;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        full_name: String,
        email: String,
        phone: String,
        password_hash: String,
        role: UserRole,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, full_name, email, phone, password_hash, role,
                verification_status, id_card_url, trip_count, rating, total_earnings, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'unverified', NULL, 0, 0, 0, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    /// El cliente envía su documento: queda pendiente de revisión
    pub async fn submit_verification(
        &self,
        id: Uuid,
        id_card_url: String,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET verification_status = 'pending', id_card_url = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(id_card_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// El admin resuelve la verificación pendiente
    pub async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET verification_status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn list_pending_verifications(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE verification_status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Acumular estadísticas del conductor al liquidar un pedido con chófer
    pub async fn add_driver_earnings(
        &self,
        driver_id: Uuid,
        earnings: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET trip_count = trip_count + 1, total_earnings = total_earnings + $2
            WHERE id = $1 AND role = 'driver'
            "#,
        )
        .bind(driver_id)
        .bind(earnings)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
