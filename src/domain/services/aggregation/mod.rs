//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Rating and price aggregation for one stall. Every call re-reads the stall's full review
// corpus and reduces it from scratch; nothing is cached between calls, so a result always
// reflects the corpus as of the scan.
//
// | Component          | Description                                               |
// |--------------------|-----------------------------------------------------------|
// | AggregationEngine  | Store-backed aggregation entry points                      |
// | rating_snapshot    | Mean rating and count over a slice of reviews              |
// | price_snapshot     | Mean per-person price over reviews with a price sample     |
// | distribution       | Zero-filled count per rating value                         |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use tracing::debug;

use crate::domain::models::review::{MAX_RATING, MIN_RATING};
use crate::domain::models::{
    Distribution, PriceSnapshot, RatingDistribution, RatingSnapshot, Review, StallId,
    StallReviewStats,
};
use crate::domain::services::review_store::{ReviewStore, StoreResult};

pub struct AggregationEngine {
    store: Arc<dyn ReviewStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Mean rating and review count of a stall; `(0.0, 0)` without reviews.
    ///
    /// # Errors
    /// Propagates the store error if the corpus cannot be read.
    pub async fn compute_rating(&self, stall_id: StallId) -> StoreResult<RatingSnapshot> {
        let reviews = self.store.reviews_for_stall(stall_id).await?;
        let snapshot = rating_snapshot(&reviews);
        debug!(stall_id, ?snapshot, "rating recomputed");
        Ok(snapshot)
    }

    /// Mean per-person price of a stall over reviews with a valid price
    /// sample; `(0.0, 0)` when none qualify.
    ///
    /// # Errors
    /// Propagates the store error if the corpus cannot be read.
    pub async fn compute_price(&self, stall_id: StallId) -> StoreResult<PriceSnapshot> {
        let reviews = self.store.reviews_for_stall(stall_id).await?;
        let snapshot = price_snapshot(&reviews);
        debug!(stall_id, ?snapshot, "price recomputed");
        Ok(snapshot)
    }

    /// Count of reviews per rating value, all five keys present.
    pub async fn rating_distribution(&self, stall_id: StallId) -> StoreResult<RatingDistribution> {
        let reviews = self.store.reviews_for_stall(stall_id).await?;
        let rating = rating_snapshot(&reviews);
        Ok(RatingDistribution {
            stall_id,
            average_rating: rating.average_rating,
            total_reviews: rating.count,
            distribution: distribution(&reviews),
        })
    }

    /// Rating and price statistics from a single corpus scan.
    pub async fn stall_stats(&self, stall_id: StallId) -> StoreResult<StallReviewStats> {
        let reviews = self.store.reviews_for_stall(stall_id).await?;
        let rating = rating_snapshot(&reviews);
        let price = price_snapshot(&reviews);
        Ok(StallReviewStats {
            stall_id,
            average_rating: rating.average_rating,
            total_reviews: rating.count,
            average_price: price.average_price,
            total_price_reviews: price.count,
        })
    }
}

pub fn rating_snapshot(reviews: &[Review]) -> RatingSnapshot {
    if reviews.is_empty() {
        return RatingSnapshot::default();
    }
    let sum: f64 = reviews.iter().map(|review| f64::from(review.rating)).sum();
    RatingSnapshot {
        average_rating: sum / reviews.len() as f64,
        count: reviews.len() as i64,
    }
}

pub fn price_snapshot(reviews: &[Review]) -> PriceSnapshot {
    let samples: Vec<f64> = reviews.iter().filter_map(Review::price_sample).collect();
    if samples.is_empty() {
        return PriceSnapshot::default();
    }
    PriceSnapshot {
        average_price: samples.iter().sum::<f64>() / samples.len() as f64,
        count: samples.len() as i64,
    }
}

pub fn distribution(reviews: &[Review]) -> Distribution {
    let mut counts: Distribution = (MIN_RATING..=MAX_RATING).map(|rating| (rating, 0)).collect();
    for review in reviews {
        *counts.entry(review.rating).or_insert(0) += 1;
    }
    counts
}
