//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Persistence contract for reviews, likes and reports.
//--------------------------------------------------------------------------------------------------

/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------------------------------------------------------+
/// | Exports:                                                 |
/// |   - ReviewStore (trait)                                  |
/// |   - StoreError (enum)                                    |
/// |   - InMemoryReviewStore (struct)                         |
/// +----------------------------------------------------------+
pub mod in_memory;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::models::{
    Page, PageRequest, ReportDraft, ReportId, ReportStatus, Review, ReviewDraft, ReviewFilter,
    ReviewId, ReviewLike, ReviewPatch, ReviewReport, StallId, StallReviewSort,
};

pub use in_memory::InMemoryReviewStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },

    /// A write targeted a record that does not exist.
    #[error("{entity} does not exist: {key}")]
    Missing { entity: &'static str, key: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Owns review, like and report records.
///
/// Every method is a single atomic operation. Nothing spans calls, so writes
/// go through methods that modify the stored record in place rather than
/// replacing it with a copy read earlier.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persists a new review under a fresh id and returns it.
    async fn insert_review(&self, draft: ReviewDraft) -> StoreResult<Review>;

    /// Applies a validated patch to the stored review and returns the result.
    /// Fields the patch does not carry, `likes_count` included, keep their
    /// stored value. Returns `None` if the review does not exist.
    async fn update_review(
        &self,
        id: ReviewId,
        patch: ReviewPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Review>>;

    async fn find_review(&self, id: ReviewId) -> StoreResult<Option<Review>>;

    /// Removes a review together with its likes. Returns the removed review.
    async fn delete_review(&self, id: ReviewId) -> StoreResult<Option<Review>>;

    /// Every review of a stall, unordered. Used for aggregation.
    async fn reviews_for_stall(&self, stall_id: StallId) -> StoreResult<Vec<Review>>;

    async fn page_by_stall(
        &self,
        stall_id: StallId,
        sort: StallReviewSort,
        page: PageRequest,
    ) -> StoreResult<Page<Review>>;

    /// A user's reviews, newest first.
    async fn page_by_user(&self, user_id: &str, page: PageRequest) -> StoreResult<Page<Review>>;

    async fn search_reviews(&self, filter: &ReviewFilter, page: PageRequest) -> StoreResult<Page<Review>>;

    /// Every review in the store, unordered.
    async fn all_reviews(&self) -> StoreResult<Vec<Review>>;

    /// Adds `delta` to a review's `likes_count`, never going below zero.
    /// Returns the new count, or `None` if the review does not exist.
    async fn adjust_likes_count(&self, id: ReviewId, delta: i64) -> StoreResult<Option<u32>>;

    async fn like_exists(&self, review_id: ReviewId, user_id: &str) -> StoreResult<bool>;

    /// # Errors
    /// `StoreError::Conflict` if the user already likes the review.
    async fn insert_like(&self, like: ReviewLike) -> StoreResult<()>;

    /// Returns whether a like was removed.
    async fn delete_like(&self, review_id: ReviewId, user_id: &str) -> StoreResult<bool>;

    async fn count_likes(&self, review_id: ReviewId) -> StoreResult<u64>;

    /// # Errors
    /// `StoreError::Conflict` if the reporter already reported the review.
    async fn insert_report(&self, draft: ReportDraft) -> StoreResult<ReviewReport>;

    async fn report_exists(&self, review_id: ReviewId, reporter_id: &str) -> StoreResult<bool>;

    async fn find_report(&self, id: ReportId) -> StoreResult<Option<ReviewReport>>;

    async fn save_report(&self, report: &ReviewReport) -> StoreResult<()>;

    /// Reports filed against a review, oldest first.
    async fn reports_for_review(&self, review_id: ReviewId) -> StoreResult<Vec<ReviewReport>>;

    /// Reports in a given state, newest first.
    async fn page_reports_by_status(
        &self,
        status: ReportStatus,
        page: PageRequest,
    ) -> StoreResult<Page<ReviewReport>>;
}
