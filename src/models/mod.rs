// Model exports
pub mod domain;
pub mod plan;
pub mod requests;
pub mod responses;

pub use domain::{
    BikeType, DedupKey, Experience, ExternalCandidate, ItemSource, ItemView, RiderProfile,
    ScoredCandidate, ScoringWeights, VehicleRecord,
};
pub use plan::{Plan, PlanAction};
pub use requests::{ChatRequest, ImageRequest, RecommendRequest};
pub use responses::{
    CatalogHealth, ChatResponse, ErrorResponse, HealthResponse, ImageResponse, ImageResult,
    ImageSource, KeysPresent, RecommendResponse,
};
