use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{User, UserRole, VerificationStatus};

// Request para registrar un usuario
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 20))]
    pub phone: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

// Request de login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

// Response de login con el token emitido
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

// Response de usuario (sin password)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub verification_status: VerificationStatus,
    pub id_card_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            verification_status: user.verification_status,
            id_card_url: user.id_card_url,
            created_at: user.created_at,
        }
    }
}

// Request para enviar el documento de identidad a verificación
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitVerificationRequest {
    #[validate(url)]
    pub id_card_url: String,
}

// Request del admin para resolver una verificación pendiente
#[derive(Debug, Deserialize)]
pub struct ReviewVerificationRequest {
    pub approve: bool,
}

// Estadísticas del conductor autenticado
#[derive(Debug, Serialize)]
pub struct DriverStatsResponse {
    pub trip_count: i32,
    pub rating: f64,
    pub total_earnings: i64,
}

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
            data: None,
        }
    }
}
