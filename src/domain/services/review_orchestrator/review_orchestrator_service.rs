//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name              | Description                                       | Key Methods          |
// |-------------------|---------------------------------------------------|----------------------|
// | ReviewServiceImpl | Store-backed review lifecycle with propagation    | create_review        |
// |                   |                                                   | update_review        |
// |                   |                                                   | delete_review        |
// |                   |                                                   | admin_bulk_delete    |
// |                   |                                                   | recompute_and_publish|
//--------------------------------------------------------------------------------------------------

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::domain::errors::{ReviewError, ReviewResult, ValidationError};
use crate::domain::models::{
    Author, NewReview, OverallReviewStats, Page, PageRequest, RatingDistribution, Review,
    ReviewFilter, ReviewId, ReviewPatch, StallId, StallReviewSort, StallReviewStats,
};
use crate::domain::services::aggregation::{self, AggregationEngine};
use crate::domain::services::review_store::ReviewStore;
use crate::outbounds::EventPublisher;
use crate::outbounds::events::{PriceChangedEvent, RatingChangedEvent};

use super::{BulkDeleteOutcome, ReviewService};

pub struct ReviewServiceImpl {
    store: Arc<dyn ReviewStore>,
    aggregation: AggregationEngine,
    publisher: Arc<EventPublisher>,
}

impl ReviewServiceImpl {
    pub fn new(store: Arc<dyn ReviewStore>, publisher: Arc<EventPublisher>) -> Self {
        Self {
            aggregation: AggregationEngine::new(store.clone()),
            store,
            publisher,
        }
    }

    async fn load(&self, id: ReviewId) -> ReviewResult<Review> {
        self.store
            .find_review(id)
            .await?
            .ok_or_else(|| ReviewError::review_not_found(id))
    }

    fn ensure_owner(review: &Review, requester_id: &str) -> ReviewResult<()> {
        if review.is_owned_by(requester_id) {
            Ok(())
        } else {
            warn!(review_id = %review.id, requester_id, "ownership check failed");
            Err(ReviewError::Unauthorized(format!(
                "user {} does not own review {}",
                requester_id, review.id
            )))
        }
    }

    /// Deletes a loaded review and recomputes its stall.
    async fn remove(&self, review: Review) -> ReviewResult<()> {
        let stall_id = review.stall_id;
        if self.store.delete_review(review.id).await?.is_none() {
            return Err(ReviewError::review_not_found(review.id));
        }
        info!(review_id = %review.id, stall_id, "review deleted");
        self.recompute_and_publish(stall_id).await;
        Ok(())
    }
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    async fn create_review(&self, input: NewReview, author: Author) -> ReviewResult<Review> {
        info!(stall_id = input.stall_id, user_id = %author.user_id, "creating review");
        let draft = input.into_draft(&author, Utc::now())?;
        let review = self.store.insert_review(draft).await?;
        info!(review_id = %review.id, stall_id = review.stall_id, "review created");

        self.recompute_and_publish(review.stall_id).await;
        Ok(review)
    }

    async fn update_review(&self, id: ReviewId, patch: ReviewPatch, requester_id: &str) -> ReviewResult<Review> {
        info!(review_id = %id, requester_id, "updating review");
        let current = self.load(id).await?;
        Self::ensure_owner(&current, requester_id)?;
        patch.validate()?;

        // applied to the stored record so concurrent like counts survive
        let review = self
            .store
            .update_review(id, patch, Utc::now())
            .await?
            .ok_or_else(|| ReviewError::review_not_found(id))?;
        info!(review_id = %id, stall_id = review.stall_id, "review updated");

        self.recompute_and_publish(review.stall_id).await;
        Ok(review)
    }

    async fn delete_review(&self, id: ReviewId, requester_id: &str) -> ReviewResult<()> {
        info!(review_id = %id, requester_id, "deleting review");
        let review = self.load(id).await?;
        Self::ensure_owner(&review, requester_id)?;
        self.remove(review).await
    }

    async fn admin_delete_review(&self, id: ReviewId) -> ReviewResult<()> {
        info!(review_id = %id, "admin deleting review");
        let review = self.load(id).await?;
        self.remove(review).await
    }

    async fn admin_bulk_delete(&self, ids: Vec<ReviewId>) -> ReviewResult<BulkDeleteOutcome> {
        if ids.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        info!(count = ids.len(), "admin bulk delete");

        let mut outcome = BulkDeleteOutcome {
            deleted: Vec::new(),
            missing: Vec::new(),
            affected_stalls: Vec::new(),
        };
        let mut seen_ids = HashSet::new();
        let mut seen_stalls = HashSet::new();
        let mut failure = None;

        for id in ids {
            if !seen_ids.insert(id) {
                continue;
            }
            match self.store.delete_review(id).await {
                Ok(Some(review)) => {
                    outcome.deleted.push(id);
                    if seen_stalls.insert(review.stall_id) {
                        outcome.affected_stalls.push(review.stall_id);
                    }
                }
                Ok(None) => outcome.missing.push(id),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        // stalls already touched are recomputed even if the batch stopped early
        for stall_id in &outcome.affected_stalls {
            self.recompute_and_publish(*stall_id).await;
        }

        if let Some(err) = failure {
            error!(deleted = outcome.deleted.len(), error = %err, "bulk delete aborted");
            return Err(err.into());
        }
        info!(
            deleted = outcome.deleted.len(),
            missing = outcome.missing.len(),
            stalls = outcome.affected_stalls.len(),
            "bulk delete finished"
        );
        Ok(outcome)
    }

    async fn get_review(&self, id: ReviewId) -> ReviewResult<Review> {
        self.load(id).await
    }

    async fn reviews_for_stall(
        &self,
        stall_id: StallId,
        sort: StallReviewSort,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>> {
        Ok(self.store.page_by_stall(stall_id, sort, page).await?)
    }

    async fn reviews_by_user(&self, user_id: &str, page: PageRequest) -> ReviewResult<Page<Review>> {
        Ok(self.store.page_by_user(user_id, page).await?)
    }

    async fn search_reviews(&self, filter: ReviewFilter, page: PageRequest) -> ReviewResult<Page<Review>> {
        Ok(self.store.search_reviews(&filter, page).await?)
    }

    async fn rating_distribution(&self, stall_id: StallId) -> ReviewResult<RatingDistribution> {
        Ok(self.aggregation.rating_distribution(stall_id).await?)
    }

    async fn stall_stats(&self, stall_id: StallId) -> ReviewResult<StallReviewStats> {
        Ok(self.aggregation.stall_stats(stall_id).await?)
    }

    async fn overall_stats(&self) -> ReviewResult<OverallReviewStats> {
        let reviews = self.store.all_reviews().await?;
        let now = Utc::now();
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now);
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);
        let created_since = |since| reviews.iter().filter(|r| r.created_at >= since).count() as u64;

        let rating = aggregation::rating_snapshot(&reviews);
        Ok(OverallReviewStats {
            total_reviews: rating.count,
            average_rating: rating.average_rating,
            rating_distribution: aggregation::distribution(&reviews),
            today_count: created_since(start_of_day),
            week_count: created_since(week_ago),
            month_count: created_since(month_ago),
        })
    }

    async fn recompute_and_publish(&self, stall_id: StallId) {
        let timestamp = Utc::now();

        match self.aggregation.compute_rating(stall_id).await {
            Ok(snapshot) => {
                let event = RatingChangedEvent::from_snapshot(stall_id, snapshot, timestamp);
                self.publisher.publish_rating_changed(&event).await;
            }
            Err(err) => error!(stall_id, error = %err, "rating recompute failed, event skipped"),
        }

        match self.aggregation.compute_price(stall_id).await {
            Ok(snapshot) => {
                let event = PriceChangedEvent::from_snapshot(stall_id, snapshot, timestamp);
                self.publisher.publish_price_changed(&event).await;
            }
            Err(err) => error!(stall_id, error = %err, "price recompute failed, event skipped"),
        }
    }
}
