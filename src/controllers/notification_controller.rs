use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::notification_dto::NotificationResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::notification::ADMIN_RECIPIENT;
use crate::models::user::UserRole;
use crate::repositories::notification_repository::NotificationRepository;
use crate::utils::errors::AppError;

pub struct NotificationController {
    repository: NotificationRepository,
}

impl NotificationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool),
        }
    }

    /// El admin lee el buzón del panel; el resto, el suyo propio
    fn recipient_for(user: &AuthenticatedUser) -> String {
        if user.role == UserRole::Admin {
            ADMIN_RECIPIENT.to_string()
        } else {
            user.user_id.to_string()
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<NotificationResponse>, AppError> {
        let notifications = self
            .repository
            .list_for_recipient(&Self::recipient_for(user))
            .await?;

        Ok(notifications.into_iter().map(NotificationResponse::from).collect())
    }

    pub async fn mark_read(&self, id: Uuid, user: &AuthenticatedUser) -> Result<(), AppError> {
        self.repository.mark_read(id, &Self::recipient_for(user)).await
    }
}
