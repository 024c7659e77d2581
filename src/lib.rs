//! RideReady - Beginner motorcycle recommendation service
//!
//! This library provides the recommendation core used by the RideReady app:
//! profile normalization, rule-based fit scoring, shortlist ranking and the
//! merge of pinned, external and ranked candidates.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_fit_score, normalize_profile, Catalog, Ranker, Recommender, Shortlist};
pub use models::{BikeType, Experience, ItemView, RiderProfile, ScoringWeights, VehicleRecord};
