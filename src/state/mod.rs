//! State module for tracking per-SKU results
//!
//! - `ItemOutcome`: how processing of a SKU ended, and whether it is checkpointed

mod item_outcome;

pub use item_outcome::ItemOutcome;
