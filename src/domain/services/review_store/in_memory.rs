//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                | Description                                   | Key Methods         |
// |---------------------|-----------------------------------------------|---------------------|
// | InMemoryReviewStore | ReviewStore kept in process memory            | new, with_reviews   |
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::models::{
    Page, PageRequest, ReportDraft, ReportId, ReportStatus, Review, ReviewDraft, ReviewFilter,
    ReviewId, ReviewLike, ReviewPatch, ReviewReport, StallId, StallReviewSort,
};

use super::{ReviewStore, StoreError, StoreResult};

/// Process-local [`ReviewStore`].
///
/// Each collection sits behind its own `parking_lot::RwLock`; locks are taken
/// for the duration of one method and never held across an `.await`.
#[derive(Default)]
pub struct InMemoryReviewStore {
    reviews: RwLock<HashMap<ReviewId, Review>>,
    likes: RwLock<HashMap<(ReviewId, String), ReviewLike>>,
    reports: RwLock<HashMap<ReportId, ReviewReport>>,
    /// Unique `(review, reporter)` index over `reports`.
    reporters: RwLock<BTreeSet<(ReviewId, String)>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with existing reviews, keyed by their ids.
    pub fn with_reviews(reviews: impl IntoIterator<Item = Review>) -> Self {
        let store = Self::new();
        store
            .reviews
            .write()
            .extend(reviews.into_iter().map(|review| (review.id, review)));
        store
    }

    fn sorted_page(
        &self,
        predicate: impl Fn(&Review) -> bool,
        compare: impl Fn(&Review, &Review) -> std::cmp::Ordering,
        page: PageRequest,
    ) -> Page<Review> {
        let mut matching: Vec<Review> = self
            .reviews
            .read()
            .values()
            .filter(|&review| predicate(review))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b).then_with(|| a.id.cmp(&b.id)));
        Page::slice(matching, page)
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn insert_review(&self, draft: ReviewDraft) -> StoreResult<Review> {
        let review = draft.into_review(Uuid::new_v4());
        self.reviews.write().insert(review.id, review.clone());
        Ok(review)
    }

    async fn update_review(
        &self,
        id: ReviewId,
        patch: ReviewPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Review>> {
        Ok(self.reviews.write().get_mut(&id).map(|review| {
            review.apply(patch, now);
            review.clone()
        }))
    }

    async fn find_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        Ok(self.reviews.read().get(&id).cloned())
    }

    async fn delete_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        let removed = self.reviews.write().remove(&id);
        if removed.is_some() {
            self.likes.write().retain(|(review_id, _), _| *review_id != id);
        }
        Ok(removed)
    }

    async fn reviews_for_stall(&self, stall_id: StallId) -> StoreResult<Vec<Review>> {
        Ok(self
            .reviews
            .read()
            .values()
            .filter(|review| review.stall_id == stall_id)
            .cloned()
            .collect())
    }

    async fn page_by_stall(
        &self,
        stall_id: StallId,
        sort: StallReviewSort,
        page: PageRequest,
    ) -> StoreResult<Page<Review>> {
        Ok(self.sorted_page(
            |review| review.stall_id == stall_id,
            |a, b| sort.compare(a, b),
            page,
        ))
    }

    async fn page_by_user(&self, user_id: &str, page: PageRequest) -> StoreResult<Page<Review>> {
        Ok(self.sorted_page(
            |review| review.user_id == user_id,
            |a, b| b.created_at.cmp(&a.created_at),
            page,
        ))
    }

    async fn search_reviews(&self, filter: &ReviewFilter, page: PageRequest) -> StoreResult<Page<Review>> {
        Ok(self.sorted_page(|review| filter.matches(review), |a, b| filter.compare(a, b), page))
    }

    async fn all_reviews(&self) -> StoreResult<Vec<Review>> {
        Ok(self.reviews.read().values().cloned().collect())
    }

    async fn adjust_likes_count(&self, id: ReviewId, delta: i64) -> StoreResult<Option<u32>> {
        let mut reviews = self.reviews.write();
        Ok(reviews.get_mut(&id).map(|review| {
            let next = (i64::from(review.likes_count) + delta).clamp(0, i64::from(u32::MAX));
            review.likes_count = next as u32;
            review.likes_count
        }))
    }

    async fn like_exists(&self, review_id: ReviewId, user_id: &str) -> StoreResult<bool> {
        Ok(self.likes.read().contains_key(&(review_id, user_id.to_owned())))
    }

    async fn insert_like(&self, like: ReviewLike) -> StoreResult<()> {
        let key = (like.review_id, like.user_id.clone());
        let mut likes = self.likes.write();
        if likes.contains_key(&key) {
            return Err(StoreError::Conflict {
                entity: "ReviewLike",
                key: format!("{}/{}", key.0, key.1),
            });
        }
        likes.insert(key, like);
        Ok(())
    }

    async fn delete_like(&self, review_id: ReviewId, user_id: &str) -> StoreResult<bool> {
        Ok(self
            .likes
            .write()
            .remove(&(review_id, user_id.to_owned()))
            .is_some())
    }

    async fn count_likes(&self, review_id: ReviewId) -> StoreResult<u64> {
        Ok(self
            .likes
            .read()
            .keys()
            .filter(|(id, _)| *id == review_id)
            .count() as u64)
    }

    async fn insert_report(&self, draft: ReportDraft) -> StoreResult<ReviewReport> {
        let key = (draft.review_id, draft.reporter_id.clone());
        let mut reporters = self.reporters.write();
        if reporters.contains(&key) {
            return Err(StoreError::Conflict {
                entity: "ReviewReport",
                key: format!("{}/{}", key.0, key.1),
            });
        }

        let report = draft.into_report(Uuid::new_v4());
        self.reports.write().insert(report.id, report.clone());
        reporters.insert(key);
        Ok(report)
    }

    async fn report_exists(&self, review_id: ReviewId, reporter_id: &str) -> StoreResult<bool> {
        Ok(self
            .reporters
            .read()
            .contains(&(review_id, reporter_id.to_owned())))
    }

    async fn find_report(&self, id: ReportId) -> StoreResult<Option<ReviewReport>> {
        Ok(self.reports.read().get(&id).cloned())
    }

    async fn save_report(&self, report: &ReviewReport) -> StoreResult<()> {
        let mut reports = self.reports.write();
        match reports.get_mut(&report.id) {
            Some(existing) => {
                *existing = report.clone();
                Ok(())
            }
            None => Err(StoreError::Missing {
                entity: "ReviewReport",
                key: report.id.to_string(),
            }),
        }
    }

    async fn reports_for_review(&self, review_id: ReviewId) -> StoreResult<Vec<ReviewReport>> {
        let mut reports: Vec<ReviewReport> = self
            .reports
            .read()
            .values()
            .filter(|report| report.review_id == review_id)
            .cloned()
            .collect();
        reports.sort_by_key(|report| report.created_at);
        Ok(reports)
    }

    async fn page_reports_by_status(
        &self,
        status: ReportStatus,
        page: PageRequest,
    ) -> StoreResult<Page<ReviewReport>> {
        let mut reports: Vec<ReviewReport> = self
            .reports
            .read()
            .values()
            .filter(|report| report.status == status)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(Page::slice(reports, page))
    }
}
