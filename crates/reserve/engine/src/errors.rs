//! Error types for the engine
//!
//! Every protocol entry point returns `EngineResult`; the error's
//! display string is the human-readable message surfaced to callers.
//! Validation failures are detected before any write wherever possible.

use reserve_store::StoreError;
use reserve_types::{ApprovalId, ConfirmationId, ProjectId, ReportId, ReviewId, TodoId};

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("approval not found: {0}")]
    ApprovalNotFound(ApprovalId),

    #[error("monthly review not found: {0}")]
    ReviewNotFound(ReviewId),

    #[error("approval report not found: {0}")]
    ReportNotFound(ReportId),

    #[error("confirmation not found: {0}")]
    ConfirmationNotFound(ConfirmationId),

    #[error("todo not found: {0}")]
    TodoNotFound(TodoId),

    #[error("todo already processed: {0}")]
    AlreadyProcessed(TodoId),

    #[error("approval already decided: {0}")]
    AlreadyDecided(ApprovalId),

    #[error("project already submitted for approval: {0}")]
    AlreadySubmitted(ProjectId),

    #[error("a rejection requires a comment")]
    MissingComment,

    #[error("partial failure, manual reconciliation needed: {context}")]
    PartialFailure { context: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn partial_failure(context: impl Into<String>) -> Self {
        Self::PartialFailure {
            context: context.into(),
        }
    }
}
