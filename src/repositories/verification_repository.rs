use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::order::ReviewStatus;
use crate::models::verification::{PaymentVerification, ProofKind, VehicleVerification};
use crate::utils::errors::AppError;

pub struct VerificationRepository {
    pool: PgPool,
}

impl VerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_payment_proof(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        kind: ProofKind,
        amount: i64,
        proof_url: &str,
    ) -> Result<PaymentVerification, AppError> {
        let verification = sqlx::query_as::<_, PaymentVerification>(
            r#"
            INSERT INTO payment_verifications (id, order_id, user_id, kind, amount, proof_url, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(user_id)
        .bind(kind)
        .bind(amount)
        .bind(proof_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(verification)
    }

    /// Resolver el comprobante pendiente más reciente del pedido
    pub async fn review_latest_pending(
        &self,
        order_id: Uuid,
        kind: ProofKind,
        status: ReviewStatus,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE payment_verifications SET status = $3, reviewed_at = now()
            WHERE id = (
                SELECT id FROM payment_verifications
                WHERE order_id = $1 AND kind = $2 AND status = 'pending'
                ORDER BY created_at DESC
                LIMIT 1
            )
            "#,
        )
        .bind(order_id)
        .bind(kind)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<PaymentVerification>, AppError> {
        let verifications = sqlx::query_as::<_, PaymentVerification>(
            "SELECT * FROM payment_verifications WHERE order_id = $1 ORDER BY created_at DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(verifications)
    }

    pub async fn insert_vehicle_check(
        &self,
        vehicle_id: Uuid,
        driver_id: Uuid,
        order_id: Option<Uuid>,
        condition_ok: bool,
        notes: Option<String>,
        photo_url: Option<String>,
    ) -> Result<VehicleVerification, AppError> {
        let verification = sqlx::query_as::<_, VehicleVerification>(
            r#"
            INSERT INTO vehicle_verifications (id, vehicle_id, driver_id, order_id, condition_ok, notes, photo_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(driver_id)
        .bind(order_id)
        .bind(condition_ok)
        .bind(notes)
        .bind(photo_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(verification)
    }
}
