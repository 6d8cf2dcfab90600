//! Blob store
//!
//! Subida de archivos (comprobantes de pago, documentos, fotos) a un
//! almacenamiento externo que devuelve una URL pública. El resto del
//! sistema solo persiste la URL.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use uuid::Uuid;

use crate::utils::errors::AppError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Subir bytes y obtener la URL pública del archivo
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError>;
}

/// Blob store HTTP: sube por PUT a `{store_url}/{key}` y expone el archivo
/// en `{public_base_url}/{key}`
pub struct HttpBlobStore {
    client: Client,
    store_url: String,
    public_base_url: String,
}

impl HttpBlobStore {
    pub fn new(client: Client, store_url: String, public_base_url: Option<String>) -> Self {
        let public_base_url = public_base_url.unwrap_or_else(|| store_url.clone());
        Self { client, store_url, public_base_url }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let key = object_key(file_name);
        let upload_url = format!("{}/{}", self.store_url.trim_end_matches('/'), key);

        let response = self
            .client
            .put(&upload_url)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Blob store upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Blob store responded with status {}",
                response.status()
            )));
        }

        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), key))
    }
}

pub struct StorageService {
    store: Box<dyn BlobStore>,
}

impl StorageService {
    pub fn new(store: Box<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn from_config(
        client: Client,
        store_url: Option<String>,
        public_base_url: Option<String>,
    ) -> Option<Self> {
        store_url.map(|url| Self::new(Box::new(HttpBlobStore::new(client, url, public_base_url))))
    }

    /// Decodificar el payload base64 y subirlo al blob store
    pub async fn upload_base64(
        &self,
        file_name: &str,
        content_base64: &str,
    ) -> Result<String, AppError> {
        let bytes = BASE64
            .decode(content_base64)
            .map_err(|_| AppError::BadRequest("Invalid base64 payload".to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Empty file upload".to_string()));
        }

        self.store.upload(file_name, bytes).await
    }
}

/// Clave única del objeto: uuid + nombre saneado
fn object_key(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-{}", Uuid::new_v4().simple(), safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_sanitizes_name() {
        let key = object_key("mi comprobante (1).jpg");
        assert!(key.ends_with("mi_comprobante__1_.jpg"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_object_keys_are_unique() {
        assert_ne!(object_key("a.jpg"), object_key("a.jpg"));
    }
}
