use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::domain::ExternalCandidate;

/// Request to build a shortlist
///
/// The body is untrusted: the profile part is kept raw and normalized by
/// the core, pins and external items are decoded leniently.
#[derive(Debug, Clone)]
pub struct RecommendRequest {
    pub profile: Value,
    pub pin_ids: Vec<String>,
    pub external_items: Vec<ExternalCandidate>,
}

impl RecommendRequest {
    pub fn from_value(body: Value) -> Self {
        let pin_ids = body.get("pin_ids").map(string_list).unwrap_or_default();
        let external_items = body
            .get("external_items")
            .map(ExternalCandidate::list_from_value)
            .unwrap_or_default();

        Self {
            profile: body,
            pin_ids,
            external_items,
        }
    }
}

/// Collect the non-empty strings of a JSON array
///
/// Anything that is not an array counts as an empty list.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Chat message together with the client's current profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 500))]
    pub message: String,
    #[serde(default)]
    pub profile: Value,
}

/// Image lookup for one shortlist item
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ImageRequest {
    #[serde(default)]
    #[validate(length(max = 128))]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub query: Option<String>,
    #[serde(default, alias = "brand")]
    #[validate(length(max = 128))]
    pub manufacturer: Option<String>,
    #[serde(default, alias = "name")]
    #[validate(length(max = 128))]
    pub model: Option<String>,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub local_image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub mfr_domain: Option<String>,
    #[serde(default = "default_image_limit")]
    #[validate(range(min = 1, max = 5))]
    pub limit: u8,
}

fn default_image_limit() -> u8 {
    1
}
