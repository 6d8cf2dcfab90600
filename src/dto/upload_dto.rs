use serde::{Deserialize, Serialize};
use validator::Validate;

// Request de subida al blob store: el archivo viaja como base64
#[derive(Debug, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 200))]
    pub file_name: String,

    #[validate(length(min = 1))]
    pub content_base64: String,
}

// Response con la URL pública del archivo subido
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}
