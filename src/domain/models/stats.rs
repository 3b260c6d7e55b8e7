use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::review::StallId;

/// Mean rating over a stall's reviews. `(0.0, 0)` when there are none.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSnapshot {
    pub average_rating: f64,
    pub count: i64,
}

/// Mean per-person cost over the reviews that carry a valid price sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub average_price: f64,
    pub count: i64,
}

/// Count per rating value. Always holds the keys 1 through 5.
pub type Distribution = BTreeMap<u8, u64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDistribution {
    pub stall_id: StallId,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallReviewStats {
    pub stall_id: StallId,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub average_price: f64,
    pub total_price_reviews: i64,
}

/// Corpus-wide figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallReviewStats {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub rating_distribution: Distribution,
    pub today_count: u64,
    pub week_count: u64,
    pub month_count: u64,
}
