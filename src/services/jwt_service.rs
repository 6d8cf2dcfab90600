//! Servicio JWT
//!
//! Emisión y validación de tokens de acceso. El claim de rol viaja en el
//! token y el perfil persistido lo confirma en el middleware.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::utils::errors::AppError;

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiration_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            expiration: Duration::seconds(expiration_seconds as i64),
        }
    }

    /// Genera un token de acceso para el usuario
    pub fn generate_token(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Jwt(format!("Error generating token: {}", e)))?;

        Ok((token, expires_at))
    }

    /// Decodifica y valida un token
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_decode_roundtrip() {
        let service = JwtService::new("test-secret", 3600);
        let user_id = Uuid::new_v4();

        let (token, _expires_at) = service.generate_token(user_id, UserRole::Admin).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let service = JwtService::new("test-secret", 3600);
        assert!(service.decode_token("not-a-token").is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let issuer = JwtService::new("secret-a", 3600);
        let verifier = JwtService::new("secret-b", 3600);

        let (token, _) = issuer.generate_token(Uuid::new_v4(), UserRole::Client).unwrap();
        assert!(verifier.decode_token(&token).is_err());
    }
}
