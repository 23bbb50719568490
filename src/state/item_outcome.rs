/// Outcome definitions for a single SKU
///
/// Terminal outcomes are checkpointed and never retried; unresolved outcomes
/// leave the SKU eligible for the next run.
use std::fmt;

/// Represents how processing of one SKU ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    // ===== Terminal Skip States =====
    /// SKU was already in the checkpoint; nothing was fetched
    AlreadyProcessed,

    /// SKU appeared earlier in the same input list
    Duplicate,

    /// SKU has no usable product name, or does not exist
    NoDetails,

    /// SKU has no images
    NoImages,

    /// Image listing returned 404
    ImagesNotFound,

    /// Every image already carries a label; no writes issued
    AlreadyLabelled,

    // ===== Terminal Success States =====
    /// All images that needed a new label were updated
    Updated {
        /// Images rewritten
        updated: u32,
        /// Images whose label already matched
        unchanged: u32,
    },

    // ===== Unresolved States =====
    /// Details request failed for a transient reason
    DetailsUnavailable,

    /// Image listing failed for a reason other than 404
    ImagesUnavailable,

    /// At least one image update failed
    UpdateFailed {
        /// Images that could not be written
        failed: u32,
        /// Whether any failure was an expired credential
        auth_expired: bool,
    },
}

impl ItemOutcome {
    /// Returns true if the SKU must be recorded in the checkpoint
    ///
    /// `AlreadyProcessed` and `Duplicate` are terminal but already recorded
    /// or about to be recorded by another occurrence.
    pub fn should_checkpoint(&self) -> bool {
        matches!(
            self,
            Self::NoDetails
                | Self::NoImages
                | Self::ImagesNotFound
                | Self::AlreadyLabelled
                | Self::Updated { .. }
        )
    }

    /// Returns true if the SKU stays eligible for a later run
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            Self::DetailsUnavailable | Self::ImagesUnavailable | Self::UpdateFailed { .. }
        )
    }

    /// Returns true if the credential was reported expired
    pub fn auth_expired(&self) -> bool {
        matches!(
            self,
            Self::UpdateFailed {
                auth_expired: true,
                ..
            }
        )
    }

    /// Short machine-friendly name of the outcome
    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyProcessed => "already_processed",
            Self::Duplicate => "duplicate",
            Self::NoDetails => "no_details",
            Self::NoImages => "no_images",
            Self::ImagesNotFound => "images_not_found",
            Self::AlreadyLabelled => "already_labelled",
            Self::Updated { .. } => "updated",
            Self::DetailsUnavailable => "details_unavailable",
            Self::ImagesUnavailable => "images_unavailable",
            Self::UpdateFailed { .. } => "update_failed",
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated { updated, unchanged } => {
                write!(f, "updated ({} written, {} unchanged)", updated, unchanged)
            }
            Self::UpdateFailed {
                failed,
                auth_expired,
            } => {
                if *auth_expired {
                    write!(f, "update failed ({} images, credential expired)", failed)
                } else {
                    write!(f, "update failed ({} images)", failed)
                }
            }
            other => write!(f, "{}", other.label().replace('_', " ")),
        }
    }
}
