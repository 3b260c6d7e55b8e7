//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The review orchestrator is the only writer of reviews. Every successful create, update and
// delete is followed by a recomputation of the affected stall's statistics and a best-effort
// publication of the two resulting snapshots.
//--------------------------------------------------------------------------------------------------

/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------------------------------------------------------+
/// | Exports:                                                 |
/// |   - ReviewService (trait)                                |
/// |   - ReviewServiceImpl (struct)                           |
/// |   - BulkDeleteOutcome (struct)                           |
/// |   - MockReviewService (for tests)                        |
/// +----------------------------------------------------------+
pub mod review_orchestrator_service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ReviewResult;
use crate::domain::models::{
    Author, NewReview, OverallReviewStats, Page, PageRequest, RatingDistribution, Review,
    ReviewFilter, ReviewId, ReviewPatch, StallId, StallReviewSort, StallReviewStats,
};

pub use review_orchestrator_service::ReviewServiceImpl;

/// Result of an administrative bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<ReviewId>,
    /// Ids that did not exist (or were deleted concurrently).
    pub missing: Vec<ReviewId>,
    /// Distinct stalls recomputed, in the order they were first touched.
    pub affected_stalls: Vec<StallId>,
}

/// Review lifecycle and queries.
///
/// Mutations return once the record is persisted and the recompute-and-publish
/// cycle has run; failures of that cycle are logged and never change the
/// mutation's result.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Creates a review authored by `author`.
    ///
    /// # Errors
    /// * `ReviewError::Validation` - If the input breaks a field rule
    /// * `ReviewError::Store` - If the review could not be persisted
    async fn create_review(&self, input: NewReview, author: Author) -> ReviewResult<Review>;

    /// Applies the present fields of `patch` to a review owned by `requester_id`.
    ///
    /// # Errors
    /// * `ReviewError::NotFound` - If the review does not exist
    /// * `ReviewError::Unauthorized` - If the requester is not the author
    /// * `ReviewError::Validation` - If a present field breaks a field rule
    async fn update_review(&self, id: ReviewId, patch: ReviewPatch, requester_id: &str) -> ReviewResult<Review>;

    /// Deletes a review owned by `requester_id`.
    ///
    /// # Errors
    /// * `ReviewError::NotFound` - If the review does not exist
    /// * `ReviewError::Unauthorized` - If the requester is not the author
    async fn delete_review(&self, id: ReviewId, requester_id: &str) -> ReviewResult<()>;

    /// Deletes any review, skipping the ownership check.
    async fn admin_delete_review(&self, id: ReviewId) -> ReviewResult<()>;

    /// Deletes every existing review in `ids`, then recomputes each distinct
    /// affected stall exactly once.
    async fn admin_bulk_delete(&self, ids: Vec<ReviewId>) -> ReviewResult<BulkDeleteOutcome>;

    async fn get_review(&self, id: ReviewId) -> ReviewResult<Review>;

    async fn reviews_for_stall(
        &self,
        stall_id: StallId,
        sort: StallReviewSort,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>>;

    async fn reviews_by_user(&self, user_id: &str, page: PageRequest) -> ReviewResult<Page<Review>>;

    async fn search_reviews(&self, filter: ReviewFilter, page: PageRequest) -> ReviewResult<Page<Review>>;

    async fn rating_distribution(&self, stall_id: StallId) -> ReviewResult<RatingDistribution>;

    async fn stall_stats(&self, stall_id: StallId) -> ReviewResult<StallReviewStats>;

    async fn overall_stats(&self) -> ReviewResult<OverallReviewStats>;

    /// Recomputes both statistics of a stall and publishes them. Never fails.
    async fn recompute_and_publish(&self, stall_id: StallId);
}

#[cfg(test)]
use mockall::mock;

#[cfg(test)]
mock! {
    pub ReviewService {}

    #[async_trait]
    impl ReviewService for ReviewService {
        async fn create_review(&self, input: NewReview, author: Author) -> ReviewResult<Review>;
        async fn update_review(&self, id: ReviewId, patch: ReviewPatch, requester_id: &str) -> ReviewResult<Review>;
        async fn delete_review(&self, id: ReviewId, requester_id: &str) -> ReviewResult<()>;
        async fn admin_delete_review(&self, id: ReviewId) -> ReviewResult<()>;
        async fn admin_bulk_delete(&self, ids: Vec<ReviewId>) -> ReviewResult<BulkDeleteOutcome>;
        async fn get_review(&self, id: ReviewId) -> ReviewResult<Review>;
        async fn reviews_for_stall(&self, stall_id: StallId, sort: StallReviewSort, page: PageRequest) -> ReviewResult<Page<Review>>;
        async fn reviews_by_user(&self, user_id: &str, page: PageRequest) -> ReviewResult<Page<Review>>;
        async fn search_reviews(&self, filter: ReviewFilter, page: PageRequest) -> ReviewResult<Page<Review>>;
        async fn rating_distribution(&self, stall_id: StallId) -> ReviewResult<RatingDistribution>;
        async fn stall_stats(&self, stall_id: StallId) -> ReviewResult<StallReviewStats>;
        async fn overall_stats(&self) -> ReviewResult<OverallReviewStats>;
        async fn recompute_and_publish(&self, stall_id: StallId);
    }
}
