// Core algorithm exports
pub mod catalog;
pub mod filters;
pub mod merge;
pub mod normalizer;
pub mod ranker;
pub mod recommender;
pub mod scoring;

pub use catalog::{Catalog, CatalogError, CatalogWarning};
pub use filters::matches_bike_types;
pub use merge::{normalize_external, Assembler, MergeSources};
pub use normalizer::{merge_patch, normalize_profile};
pub use ranker::{RankResult, Ranker};
pub use recommender::{ChatOutcome, Recommender, Shortlist};
pub use scoring::{build_reasons, calculate_fit_score};
