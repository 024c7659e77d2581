// Service exports
pub mod images;
pub mod nlu;

pub use images::{canonical_key, ImageError, ImageResolver, ImageSearchClient};
pub use nlu::{extract_models, keyword_plan, NluClient, NluError};
