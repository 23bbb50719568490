//! Per-SKU processing
//!
//! For one SKU the processor:
//! 1. Fetches the SKU details and resolves a product name
//! 2. Lists the SKU's images
//! 3. Skips the SKU if every image already has a label
//! 4. Rewrites each image whose label differs from the normalized name
//!
//! The processor never touches the checkpoint; it reports an [`ItemOutcome`]
//! and the scheduler decides what to record.

use crate::alt_text::generate_alt_text;
use crate::catalog::{CatalogApi, DetailsFetch, ImageRecord, ImagesFetch, UpdateResult};
use crate::state::ItemOutcome;
use crate::{critical, SkuId};
use std::future::Future;

/// Something the scheduler can hand one SKU to
pub trait SkuProcessor: Send + Sync + 'static {
    /// Processes one SKU to completion and reports how it ended
    fn process_sku(&self, sku_id: SkuId) -> impl Future<Output = ItemOutcome> + Send;
}

/// Runs the per-SKU state machine against the catalog API
#[derive(Debug, Clone)]
pub struct ItemProcessor {
    api: CatalogApi,
    fallback_alt: String,
}

impl ItemProcessor {
    /// Creates a processor using `fallback_alt` for names that normalize to nothing
    pub fn new(api: CatalogApi, fallback_alt: impl Into<String>) -> Self {
        Self {
            api,
            fallback_alt: fallback_alt.into(),
        }
    }

    /// Processes one SKU to completion
    pub async fn process(&self, sku_id: SkuId) -> ItemOutcome {
        let details = match self.api.sku_details(sku_id).await {
            DetailsFetch::Found(details) => details,
            DetailsFetch::NotFound => {
                tracing::warn!("SKU ID: {} | Ignored (not found)", sku_id);
                return ItemOutcome::NoDetails;
            }
            DetailsFetch::Failed(failure) => {
                tracing::error!("[DETAILS ERROR] SKU {}: {}", sku_id, failure);
                return ItemOutcome::DetailsUnavailable;
            }
        };

        let Some(product_name) = details.display_name() else {
            tracing::warn!("SKU ID: {} | Ignored (no details)", sku_id);
            return ItemOutcome::NoDetails;
        };

        tracing::info!(
            "SKU ID: {} | RefId: {} | Product: {}",
            sku_id,
            details.reference().unwrap_or_else(|| "-".to_string()),
            product_name
        );

        self.process_images(sku_id, product_name).await
    }

    async fn process_images(&self, sku_id: SkuId, product_name: &str) -> ItemOutcome {
        let images = match self.api.list_images(sku_id).await {
            ImagesFetch::Images(images) => images,
            ImagesFetch::NotFound => {
                tracing::info!("      [NO IMAGES] SKU {} - image list not found", sku_id);
                return ItemOutcome::ImagesNotFound;
            }
            ImagesFetch::Failed(failure) => {
                tracing::error!("[GET ERROR] SKU {} - {}", sku_id, failure);
                return ItemOutcome::ImagesUnavailable;
            }
        };

        if images.is_empty() {
            tracing::info!("      [NO IMAGES] SKU {} has no images", sku_id);
            return ItemOutcome::NoImages;
        }

        if images.iter().all(ImageRecord::has_label) {
            tracing::info!(
                "      [SKIP SKU] All images already have alt text - SKU {}",
                sku_id
            );
            return ItemOutcome::AlreadyLabelled;
        }

        let alt_text = generate_alt_text(product_name, &self.fallback_alt);
        let mut updated = 0;
        let mut unchanged = 0;
        let mut failed = 0;
        let mut auth_expired = false;

        for image in &images {
            if image.label_matches(&alt_text) {
                tracing::info!("      [SKIP] Already correct: {}", alt_text);
                unchanged += 1;
                continue;
            }

            match self.api.update_image(sku_id, image, &alt_text).await {
                UpdateResult::Updated => {
                    tracing::info!("      [OK] Image updated: '{}'", alt_text);
                    updated += 1;
                }
                UpdateResult::AuthExpired => {
                    critical!(
                        "      [AUTH ERROR] Cookie expired (SKU {}, image {})",
                        sku_id,
                        image.id
                    );
                    auth_expired = true;
                    failed += 1;
                }
                UpdateResult::Failed(failure) => {
                    tracing::error!(
                        "      [UPDATE ERROR] SKU {} image {}: {}",
                        sku_id,
                        image.id,
                        failure
                    );
                    failed += 1;
                }
            }
        }

        if failed == 0 {
            ItemOutcome::Updated { updated, unchanged }
        } else {
            ItemOutcome::UpdateFailed {
                failed,
                auth_expired,
            }
        }
    }
}

impl SkuProcessor for ItemProcessor {
    fn process_sku(&self, sku_id: SkuId) -> impl Future<Output = ItemOutcome> + Send {
        self.process(sku_id)
    }
}
