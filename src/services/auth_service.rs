//! Servicio de autenticación
//!
//! Registro y login contra la tabla users; bcrypt para las contraseñas.

use sqlx::PgPool;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::models::user::{User, UserRole};
use crate::repositories::user_repository::UserRepository;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{conflict_error, AppError};

pub struct AuthService {
    repository: UserRepository,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        if self.repository.email_exists(&request.email).await? {
            return Err(conflict_error("User", "email", &request.email));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .repository
            .create(
                request.full_name,
                request.email,
                request.phone,
                password_hash,
                UserRole::Client,
            )
            .await?;

        Ok(user.into())
    }

    pub async fn login(
        &self,
        request: LoginRequest,
        jwt: &JwtService,
    ) -> Result<LoginResponse, AppError> {
        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !valid {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let (token, expires_at) = jwt.generate_token(user.id, user.role)?;

        Ok(LoginResponse {
            token,
            expires_at,
            user: user.into(),
        })
    }

    pub async fn find_user(&self, id: uuid::Uuid) -> Result<User, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
