//! Typed operations against the catalog's SKU and SKU-file endpoints

use crate::catalog::{ImageRecord, SkuDetails};
use crate::client::{CallOutcome, NoResponseKind, ResilientClient};
use crate::SkuId;
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Why a catalog call did not produce a usable answer
#[derive(Debug, Clone, Error)]
pub enum ApiFailure {
    #[error("no response ({kind:?}): {error}")]
    NoResponse { kind: NoResponseKind, error: String },

    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result of fetching SKU details
#[derive(Debug)]
pub enum DetailsFetch {
    Found(SkuDetails),
    NotFound,
    Failed(ApiFailure),
}

/// Result of listing a SKU's images
#[derive(Debug)]
pub enum ImagesFetch {
    Images(Vec<ImageRecord>),
    NotFound,
    Failed(ApiFailure),
}

/// Result of writing one image record back
#[derive(Debug)]
pub enum UpdateResult {
    Updated,
    AuthExpired,
    Failed(ApiFailure),
}

/// Catalog API bound to a base URL
#[derive(Debug, Clone)]
pub struct CatalogApi {
    client: ResilientClient,
    base_url: String,
}

impl CatalogApi {
    pub fn new(client: ResilientClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn sku_url(&self, sku_id: SkuId) -> String {
        format!("{}/stockkeepingunit/{}", self.base_url, sku_id)
    }

    fn files_url(&self, sku_id: SkuId) -> String {
        format!("{}/file", self.sku_url(sku_id))
    }

    fn file_url(&self, sku_id: SkuId, file_id: i64) -> String {
        format!("{}/{}", self.files_url(sku_id), file_id)
    }

    /// GET the SKU's details
    pub async fn sku_details(&self, sku_id: SkuId) -> DetailsFetch {
        let outcome = self
            .client
            .execute(Method::GET, &self.sku_url(sku_id), None)
            .await;

        match into_body(outcome) {
            Ok((status, body)) if status == StatusCode::OK => match serde_json::from_str::<SkuDetails>(&body) {
                Ok(details) => DetailsFetch::Found(details),
                Err(e) => DetailsFetch::Failed(ApiFailure::Malformed(e.to_string())),
            },
            Ok((status, _)) if status == StatusCode::NOT_FOUND => DetailsFetch::NotFound,
            Ok((status, body)) => DetailsFetch::Failed(ApiFailure::Status { status, body }),
            Err(failure) => DetailsFetch::Failed(failure),
        }
    }

    /// GET the list of image records attached to the SKU
    pub async fn list_images(&self, sku_id: SkuId) -> ImagesFetch {
        let outcome = self
            .client
            .execute(Method::GET, &self.files_url(sku_id), None)
            .await;

        match into_body(outcome) {
            Ok((status, body)) if status == StatusCode::OK => parse_image_list(&body),
            Ok((status, _)) if status == StatusCode::NOT_FOUND => ImagesFetch::NotFound,
            Ok((status, body)) => ImagesFetch::Failed(ApiFailure::Status { status, body }),
            Err(failure) => ImagesFetch::Failed(failure),
        }
    }

    /// PUT the record back with its label fields replaced by `alt_text`
    pub async fn update_image(
        &self,
        sku_id: SkuId,
        image: &ImageRecord,
        alt_text: &str,
    ) -> UpdateResult {
        let payload = match serde_json::to_value(image.with_alt_text(alt_text)) {
            Ok(payload) => payload,
            Err(e) => return UpdateResult::Failed(ApiFailure::Malformed(e.to_string())),
        };

        let outcome = self
            .client
            .execute(Method::PUT, &self.file_url(sku_id, image.id), Some(&payload))
            .await;

        match into_body(outcome) {
            Ok((status, _)) if status.is_success() => UpdateResult::Updated,
            Ok((status, _)) if status == StatusCode::UNAUTHORIZED => UpdateResult::AuthExpired,
            Ok((status, body)) => UpdateResult::Failed(ApiFailure::Status { status, body }),
            Err(failure) => UpdateResult::Failed(failure),
        }
    }
}

fn into_body(outcome: CallOutcome) -> Result<(StatusCode, String), ApiFailure> {
    match outcome {
        CallOutcome::Response { status, body } => Ok((status, body)),
        CallOutcome::NoResponse { kind, error } => Err(ApiFailure::NoResponse { kind, error }),
        CallOutcome::RateLimited { attempts, .. } => Err(ApiFailure::RateLimited { attempts }),
    }
}

fn parse_image_list(body: &str) -> ImagesFetch {
    // Some stores answer an empty body instead of []
    if body.trim().is_empty() {
        return ImagesFetch::Images(Vec::new());
    }

    match serde_json::from_str::<Option<Vec<ImageRecord>>>(body) {
        Ok(images) => ImagesFetch::Images(images.unwrap_or_default()),
        Err(e) => ImagesFetch::Failed(ApiFailure::Malformed(e.to_string())),
    }
}
