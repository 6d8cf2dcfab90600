use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::utils::errors::AppError;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, recipient: &str, message: &str) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient, message, read, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipient)
        .bind(message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_for_recipient(
        &self,
        recipient: &str,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient = $1 ORDER BY created_at DESC",
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Marcar como leída; el filtro por destinatario impide marcar
    /// notificaciones ajenas
    pub async fn mark_read(&self, id: Uuid, recipient: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient = $2")
                .bind(id)
                .bind(recipient)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}
