//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Error taxonomy of the review domain. Mutations surface these to the caller; the
// recompute-and-publish step that follows a mutation never does.
//
// | Name            | Description                                               |
// |-----------------|-----------------------------------------------------------|
// | ReviewError     | Failure of a review, like or report operation              |
// | ValidationError | Malformed input or a rule violation on well-formed input   |
//--------------------------------------------------------------------------------------------------

use thiserror::Error;

use crate::domain::models::report::ReportStatus;
use crate::domain::services::review_store::StoreError;

pub type ReviewResult<T> = Result<T, ReviewError>;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// The referenced review or report does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requester is not allowed to touch the record.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence failed while carrying out the mutation itself.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ReviewError {
    pub fn review_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Review",
            id: id.to_string(),
        }
    }

    pub fn report_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Report",
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i32),

    #[error("comment must be at most 1000 characters, got {0}")]
    CommentTooLong(usize),

    #[error("total cost must not be negative")]
    NegativeTotalCost,

    #[error("number of people must be at least 1, got {0}")]
    InvalidNumberOfPeople(i32),

    #[error("report description is required")]
    MissingDescription,

    #[error("report description must be at most 500 characters, got {0}")]
    DescriptionTooLong(usize),

    #[error("You have already reported this review")]
    DuplicateReport,

    #[error("report cannot move from {from} to {to}")]
    InvalidStatusTransition { from: ReportStatus, to: ReportStatus },

    #[error("at least one review id is required")]
    EmptyBatch,
}
