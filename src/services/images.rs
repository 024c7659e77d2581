use crate::models::{ImageRequest, ImageResponse, ImageResult, ImageSource};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_WIDTH: u32 = 1200;
const DEFAULT_HEIGHT: u32 = 800;

/// Errors that can occur when searching for images online
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Canonical manifest key for a manufacturer/model pair
///
/// Lowercases and strips every non-alphanumeric character; a model that
/// already starts with the manufacturer does not repeat it.
/// `("Yamaha", "YZF-R3")` and `("Yamaha", "Yamaha YZF R3")` both give `yamaha_yzfr3`.
pub fn canonical_key(manufacturer: &str, model: &str) -> String {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    };

    let manufacturer = squash(manufacturer);
    let model = squash(model);
    let model = model.strip_prefix(manufacturer.as_str()).unwrap_or(&model);

    match (manufacturer.is_empty(), model.is_empty()) {
        (true, _) => model.to_string(),
        (false, true) => manufacturer,
        (false, false) => format!("{}_{}", manufacturer, model),
    }
}

/// Google Custom Search client restricted to image results
pub struct ImageSearchClient {
    endpoint: String,
    api_key: String,
    cx: String,
    client: Client,
}

impl ImageSearchClient {
    pub fn new(endpoint: String, api_key: String, cx: String, timeout: Duration) -> Result<Self, ImageError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            cx,
            client,
        })
    }

    /// Search images for a query, optionally restricted to a manufacturer site
    pub async fn search(
        &self,
        query: &str,
        mfr_domain: Option<&str>,
        limit: u8,
    ) -> Result<Vec<ImageResult>, ImageError> {
        let mut url = format!(
            "{}?key={}&cx={}&q={}&searchType=image&num={}&safe=active",
            self.endpoint,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.cx),
            urlencoding::encode(query),
            limit.clamp(1, 10)
        );
        if let Some(domain) = mfr_domain.filter(|d| !d.is_empty()) {
            url.push_str(&format!("&siteSearch={}", urlencoding::encode(domain)));
        }

        tracing::debug!("Searching images for: {}", query);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ImageError::ApiError(format!(
                "Image search failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        // No "items" key means no hits, not a malformed response
        let Some(items) = json.get("items") else {
            return Ok(Vec::new());
        };
        let items = items
            .as_array()
            .ok_or_else(|| ImageError::InvalidResponse("items is not an array".into()))?;

        let images = items
            .iter()
            .filter_map(|item| {
                let url = item.get("link")?.as_str()?.to_string();
                let dimension = |key: &str, default: u32| {
                    item.get("image")
                        .and_then(|i| i.get(key))
                        .and_then(Value::as_u64)
                        .and_then(|v| u32::try_from(v).ok())
                        .unwrap_or(default)
                };
                Some(ImageResult {
                    url,
                    width: dimension("width", DEFAULT_WIDTH),
                    height: dimension("height", DEFAULT_HEIGHT),
                })
            })
            .take(usize::from(limit))
            .collect();

        Ok(images)
    }
}

/// Local-first image lookup for shortlist items
///
/// Order: explicit local hint, manifest by id, manifest by canonical key,
/// online search (cached), stock fallback. Never fails.
pub struct ImageResolver {
    manifest: HashMap<String, String>,
    static_prefix: String,
    fallback_image: String,
    search: Option<ImageSearchClient>,
    cache: moka::future::Cache<String, Vec<ImageResult>>,
}

impl ImageResolver {
    pub fn new(
        manifest: HashMap<String, String>,
        static_prefix: String,
        fallback_image: String,
        search: Option<ImageSearchClient>,
        cache_size: u64,
        cache_ttl_secs: u64,
    ) -> Self {
        let cache = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(Duration::from_secs(cache_ttl_secs))
            .build();

        Self {
            manifest,
            static_prefix,
            fallback_image,
            search,
            cache,
        }
    }

    /// Read the `{ key: file }` manifest, an unreadable file yields an empty one
    pub fn load_manifest<P: AsRef<Path>>(path: P) -> HashMap<String, String> {
        let path = path.as_ref();
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<HashMap<String, String>>(&raw).map_err(|e| e.to_string()));

        match parsed {
            Ok(manifest) => {
                tracing::info!("Loaded {} image manifest entries from {}", manifest.len(), path.display());
                manifest
            }
            Err(e) => {
                tracing::warn!("Image manifest {} unavailable: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    /// Whether online search is unavailable
    pub fn is_offline(&self) -> bool {
        self.search.is_none()
    }

    pub async fn resolve(&self, request: &ImageRequest) -> ImageResponse {
        if let Some(file) = non_empty(&request.local_image) {
            return self.local(file);
        }

        if let Some(file) = non_empty(&request.id).and_then(|id| self.manifest.get(id)) {
            return self.local(file);
        }

        let manufacturer = non_empty(&request.manufacturer).unwrap_or_default();
        let model = non_empty(&request.model).unwrap_or_default();
        if !manufacturer.is_empty() || !model.is_empty() {
            if let Some(file) = self.manifest.get(&canonical_key(manufacturer, model)) {
                return self.local(file);
            }
        }

        let query = non_empty(&request.query)
            .map(str::to_string)
            .or_else(|| {
                let label = format!("{} {}", manufacturer, model);
                let label = label.trim();
                (!label.is_empty()).then(|| label.to_string())
            });

        if let (Some(search), Some(query)) = (&self.search, query) {
            let domain = non_empty(&request.mfr_domain);
            let cache_key = format!("{}|{}|{}", query.to_lowercase(), domain.unwrap_or(""), request.limit);

            if let Some(images) = self.cache.get(&cache_key).await {
                tracing::trace!("Image cache hit: {}", cache_key);
                if !images.is_empty() {
                    return ImageResponse {
                        source: ImageSource::Search,
                        images,
                    };
                }
            } else {
                match search.search(&query, domain, request.limit).await {
                    Ok(images) => {
                        self.cache.insert(cache_key, images.clone()).await;
                        if !images.is_empty() {
                            return ImageResponse {
                                source: ImageSource::Search,
                                images,
                            };
                        }
                    }
                    Err(e) => tracing::warn!("Image search for '{}' failed, using fallback: {}", query, e),
                }
            }
        }

        self.fallback()
    }

    fn local(&self, file: &str) -> ImageResponse {
        ImageResponse {
            source: ImageSource::Local,
            images: vec![self.stock_image(file)],
        }
    }

    pub fn fallback(&self) -> ImageResponse {
        ImageResponse {
            source: ImageSource::Fallback,
            images: vec![self.stock_image(&self.fallback_image)],
        }
    }

    fn stock_image(&self, file: &str) -> ImageResult {
        let file = file.trim_start_matches('/');
        let file = file.strip_prefix("stock_images/").unwrap_or(file);
        ImageResult {
            url: format!("{}/{}", self.static_prefix.trim_end_matches('/'), file),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
