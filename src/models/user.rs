//! Modelo de User
//!
//! Este módulo contiene el struct User y sus enums asociados.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Driver,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Driver => "driver",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(UserRole::Client),
            "driver" => Some(UserRole::Driver),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Estado de verificación de identidad - mapea al ENUM verification_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub verification_status: VerificationStatus,
    pub id_card_url: Option<String>,
    // Estadísticas de conductor (cero para clientes y administradores)
    pub trip_count: i32,
    pub rating: f64,
    pub total_earnings: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Solo los clientes verificados pueden crear pedidos
    pub fn can_place_orders(&self) -> bool {
        self.role == UserRole::Client && self.verification_status == VerificationStatus::Verified
    }
}
