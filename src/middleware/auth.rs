//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de usuarios autenticados. El rol resuelto aquí es el
//! que la máquina de estados trata como autoritativo.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use uuid::Uuid;

use crate::{
    models::user::{UserRole, VerificationStatus},
    repositories::user_repository::UserRepository,
    state::AppState,
    utils::errors::AppError,
    workflow::Actor,
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub verification_status: VerificationStatus,
}

impl AuthenticatedUser {
    /// Actor para la máquina de estados
    pub fn actor(&self) -> Actor {
        Actor { user_id: self.user_id, role: self.role }
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    // Decodificar y validar JWT
    let claims = state.jwt().decode_token(auth_header)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;

    // Verificar que el usuario existe; el perfil persistido manda sobre el claim
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let authenticated_user = AuthenticatedUser {
        user_id: user.id,
        role: user.role,
        verification_status: user.verification_status,
    };

    // Inyectar usuario autenticado en las extensions
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Middleware para verificar permisos de admin
pub async fn admin_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden("Administrator role required".to_string()));
    }

    Ok(next.run(request).await)
}

/// Middleware para verificar permisos de conductor
pub async fn driver_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role != UserRole::Driver {
        return Err(AppError::Forbidden("Driver role required".to_string()));
    }

    Ok(next.run(request).await)
}
