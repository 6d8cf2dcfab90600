//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use reqwest::Client;
use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::services::jwt_service::JwtService;
use crate::services::storage_service::StorageService;
use crate::services::webhook_service::WebhookService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub http_client: Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            pool,
            config,
            http_client: Client::new(),
        }
    }

    /// Servicio JWT configurado con el secreto del entorno
    pub fn jwt(&self) -> JwtService {
        JwtService::new(&self.config.jwt_secret, self.config.jwt_expiration)
    }

    /// Webhook de facturación (best-effort)
    pub fn webhook(&self) -> WebhookService {
        WebhookService::new(
            self.http_client.clone(),
            self.config.invoice_webhook_url.clone(),
        )
    }

    /// Blob store externo, si está configurado
    pub fn storage(&self) -> Option<StorageService> {
        StorageService::from_config(
            self.http_client.clone(),
            self.config.blob_store_url.clone(),
            self.config.blob_public_base_url.clone(),
        )
    }
}
