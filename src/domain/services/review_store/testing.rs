//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name              | Description                                          | Key Methods       |
// |-------------------|------------------------------------------------------|-------------------|
// | InterleavingStore | InMemoryReviewStore that runs one concurrent write   | new, interleave   |
// |                   | between two steps of a caller                        |                   |
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::models::{
    Page, PageRequest, ReportDraft, ReportId, ReportStatus, Review, ReviewDraft, ReviewFilter,
    ReviewId, ReviewLike, ReviewPatch, ReviewReport, StallId, StallReviewSort,
};

use super::{InMemoryReviewStore, ReviewStore, StoreResult};

/// A write that lands while another operation is in flight.
#[derive(Debug, Clone)]
pub(crate) enum Interleave {
    /// `user_id` likes the review right after it has been read.
    LikeAfterFind { user_id: String },
    /// The review is deleted right before a like is inserted.
    DeleteBeforeLike,
}

#[derive(Default)]
pub(crate) struct InterleavingStore {
    pub(crate) inner: InMemoryReviewStore,
    pending: Mutex<Option<Interleave>>,
}

impl InterleavingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arms a single interleaved write; it fires once.
    pub(crate) fn interleave(&self, write: Interleave) {
        *self.pending.lock() = Some(write);
    }

    fn take_if(&self, wanted: impl Fn(&Interleave) -> bool) -> Option<Interleave> {
        let mut pending = self.pending.lock();
        if pending.as_ref().is_some_and(wanted) {
            pending.take()
        } else {
            None
        }
    }
}

#[async_trait]
impl ReviewStore for InterleavingStore {
    async fn insert_review(&self, draft: ReviewDraft) -> StoreResult<Review> {
        self.inner.insert_review(draft).await
    }

    async fn update_review(
        &self,
        id: ReviewId,
        patch: ReviewPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Review>> {
        self.inner.update_review(id, patch, now).await
    }

    async fn find_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        let found = self.inner.find_review(id).await?;
        let hook = self.take_if(|write| matches!(write, Interleave::LikeAfterFind { .. }));
        if let Some(Interleave::LikeAfterFind { user_id }) = hook {
            self.inner.insert_like(ReviewLike::new(id, &user_id, Utc::now())).await?;
            self.inner.adjust_likes_count(id, 1).await?;
        }
        Ok(found)
    }

    async fn delete_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        self.inner.delete_review(id).await
    }

    async fn reviews_for_stall(&self, stall_id: StallId) -> StoreResult<Vec<Review>> {
        self.inner.reviews_for_stall(stall_id).await
    }

    async fn page_by_stall(
        &self,
        stall_id: StallId,
        sort: StallReviewSort,
        page: PageRequest,
    ) -> StoreResult<Page<Review>> {
        self.inner.page_by_stall(stall_id, sort, page).await
    }

    async fn page_by_user(&self, user_id: &str, page: PageRequest) -> StoreResult<Page<Review>> {
        self.inner.page_by_user(user_id, page).await
    }

    async fn search_reviews(&self, filter: &ReviewFilter, page: PageRequest) -> StoreResult<Page<Review>> {
        self.inner.search_reviews(filter, page).await
    }

    async fn all_reviews(&self) -> StoreResult<Vec<Review>> {
        self.inner.all_reviews().await
    }

    async fn adjust_likes_count(&self, id: ReviewId, delta: i64) -> StoreResult<Option<u32>> {
        self.inner.adjust_likes_count(id, delta).await
    }

    async fn like_exists(&self, review_id: ReviewId, user_id: &str) -> StoreResult<bool> {
        self.inner.like_exists(review_id, user_id).await
    }

    async fn insert_like(&self, like: ReviewLike) -> StoreResult<()> {
        if self
            .take_if(|write| matches!(write, Interleave::DeleteBeforeLike))
            .is_some()
        {
            self.inner.delete_review(like.review_id).await?;
        }
        self.inner.insert_like(like).await
    }

    async fn delete_like(&self, review_id: ReviewId, user_id: &str) -> StoreResult<bool> {
        self.inner.delete_like(review_id, user_id).await
    }

    async fn count_likes(&self, review_id: ReviewId) -> StoreResult<u64> {
        self.inner.count_likes(review_id).await
    }

    async fn insert_report(&self, draft: ReportDraft) -> StoreResult<ReviewReport> {
        self.inner.insert_report(draft).await
    }

    async fn report_exists(&self, review_id: ReviewId, reporter_id: &str) -> StoreResult<bool> {
        self.inner.report_exists(review_id, reporter_id).await
    }

    async fn find_report(&self, id: ReportId) -> StoreResult<Option<ReviewReport>> {
        self.inner.find_report(id).await
    }

    async fn save_report(&self, report: &ReviewReport) -> StoreResult<()> {
        self.inner.save_report(report).await
    }

    async fn reports_for_review(&self, review_id: ReviewId) -> StoreResult<Vec<ReviewReport>> {
        self.inner.reports_for_review(review_id).await
    }

    async fn page_reports_by_status(
        &self,
        status: ReportStatus,
        page: PageRequest,
    ) -> StoreResult<Page<ReviewReport>> {
        self.inner.page_reports_by_status(status, page).await
    }
}
