//! Typed error hierarchy for the editorial engine.
//!
//! `EditorialError` covers the review repository, the quality gate and the
//! persistence layer. Application code (CLI, config loading) wraps these in
//! `anyhow` with context.

use thiserror::Error;

use crate::review::{ReviewItem, ReviewStatus};

/// Errors raised by the editorial engine.
#[derive(Debug, Error)]
pub enum EditorialError {
    /// Not a failure: the gate created a review item and the caller must route
    /// it to the human queue instead of publishing.
    #[error("Content requires review: {issues}")]
    ReviewRequired {
        item: Option<Box<ReviewItem>>,
        issues: String,
    },

    #[error("Review item {id} not found")]
    ItemNotFound { id: String },

    #[error("Checklist item {checklist_id} not found on review item {item_id}")]
    ChecklistItemNotFound { item_id: String, checklist_id: String },

    #[error("Change request {change_id} not found on review item {item_id}")]
    ChangeRequestNotFound { item_id: String, change_id: String },

    #[error("Cannot move review item {id} from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ReviewStatus,
        to: ReviewStatus,
    },

    #[error("Review item {id} cannot be approved: {missing} checklist item(s) unchecked")]
    ChecklistIncomplete { id: String, missing: usize },

    #[error("Review item {id} reached the limit of {max_rounds} change request rounds")]
    ChangeRequestLimit { id: String, max_rounds: u32 },

    #[error("Review item {id} is {status} and cannot be published")]
    NotPublishable { id: String, status: ReviewStatus },

    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EditorialError {
    /// Whether this error is the review-required control signal rather than a
    /// genuine failure.
    pub fn is_review_required(&self) -> bool {
        matches!(self, Self::ReviewRequired { .. })
    }
}
