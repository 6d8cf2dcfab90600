use tracing::warn;
use uuid::Uuid;

use crate::dto::auth_dto::{
    ApiResponse, LoginRequest, LoginResponse, RegisterRequest, ReviewVerificationRequest,
    SubmitVerificationRequest, UserResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::VerificationStatus;
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AuthController {
    service: AuthService,
    users: UserRepository,
    notifications: NotificationRepository,
    state: AppState,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: AuthService::new(state.pool.clone()),
            users: UserRepository::new(state.pool.clone()),
            notifications: NotificationRepository::new(state.pool.clone()),
            state: state.clone(),
        }
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        let user = self.service.register(request).await?;

        Ok(ApiResponse::success_with_message(
            user,
            "Usuario registrado exitosamente".to_string(),
        ))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        self.service.login(request, &self.state.jwt()).await
    }

    pub async fn me(&self, user: &AuthenticatedUser) -> Result<UserResponse, AppError> {
        let user = self.service.find_user(user.user_id).await?;
        Ok(user.into())
    }

    /// El cliente envía su documento de identidad para poder alquilar
    pub async fn submit_verification(
        &self,
        user: &AuthenticatedUser,
        request: SubmitVerificationRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        if user.verification_status == VerificationStatus::Verified {
            return Err(AppError::Conflict("Account is already verified".to_string()));
        }

        let updated = self
            .users
            .submit_verification(user.user_id, request.id_card_url)
            .await?;

        Ok(ApiResponse::success_with_message(
            updated.into(),
            "Documento enviado para verificación".to_string(),
        ))
    }

    /// El admin resuelve una verificación pendiente
    pub async fn review_verification(
        &self,
        user_id: Uuid,
        request: ReviewVerificationRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.verification_status != VerificationStatus::Pending {
            return Err(AppError::Conflict(
                "The user has no pending verification".to_string(),
            ));
        }

        let status = if request.approve {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Unverified
        };
        let updated = self.users.set_verification_status(user_id, status).await?;

        let message = if request.approve {
            "Tu cuenta fue verificada. Ya puedes alquilar vehículos."
        } else {
            "Tu documento fue rechazado. Envía una imagen legible de tu identificación."
        };
        if let Err(e) = self.notifications.insert(&user_id.to_string(), message).await {
            warn!("No se pudo notificar el resultado de la verificación: {}", e);
        }

        Ok(ApiResponse::success_with_message(
            updated.into(),
            "Verificación resuelta".to_string(),
        ))
    }

    pub async fn list_pending_verifications(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.users.list_pending_verifications().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}
