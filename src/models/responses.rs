use serde::{Deserialize, Serialize};
use crate::models::domain::{ItemView, RiderProfile};

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub items: Vec<ItemView>,
    pub count: usize,
    pub profile: RiderProfile,
}

/// Response for the chat endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub topic: String,
    pub message: String,
    pub profile: RiderProfile,
    pub recommended: bool,
    pub items: Vec<ItemView>,
    pub count: usize,
}

/// A displayable picture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Local,
    Search,
    Fallback,
}

/// Response for the images endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub source: ImageSource,
    pub images: Vec<ImageResult>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub offline_mode: bool,
    pub keys_present: KeysPresent,
    pub catalog: CatalogHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysPresent {
    pub google_cse_key: bool,
    pub google_cse_cx: bool,
    pub openai: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogHealth {
    pub bikes: usize,
    pub warnings: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
