//! Remote catalog representation and operations
//!
//! - `SkuDetails` and `ImageRecord` mirror the remote JSON
//! - `CatalogApi` fetches details, lists images, and writes image labels

mod api;
mod types;

pub use api::{ApiFailure, CatalogApi, DetailsFetch, ImagesFetch, UpdateResult};
pub use types::{ImageRecord, SkuDetails};
