//! Stall statistics events published after every review mutation.
//!
//! Each event is a full snapshot of one statistic for one stall. There is no
//! sequence number: consumers order snapshots of the same stall by `timestamp`
//! and keep the newest one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{PriceSnapshot, RatingSnapshot, StallId};

/// +----------------------------------------------------------+
/// | STRUCTS                                                  |
/// +----------------------------------------------------------+
/// |   - RatingChangedEvent                                   |
/// |   - PriceChangedEvent                                    |
/// +----------------------------------------------------------+

/// New average rating of a stall.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingChangedEvent {
    pub stall_id: StallId,
    /// 0.0 when the stall has no reviews.
    pub new_average_rating: f64,
    pub review_count: i64,
    /// When the snapshot was computed.
    pub timestamp: DateTime<Utc>,
}

impl RatingChangedEvent {
    pub fn from_snapshot(stall_id: StallId, snapshot: RatingSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            stall_id,
            new_average_rating: snapshot.average_rating,
            review_count: snapshot.count,
            timestamp,
        }
    }
}

/// New average per-person price of a stall.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangedEvent {
    pub stall_id: StallId,
    /// 0.0 when no review carries a valid price sample.
    pub new_average_price: f64,
    pub price_count: i64,
    pub timestamp: DateTime<Utc>,
}

impl PriceChangedEvent {
    pub fn from_snapshot(stall_id: StallId, snapshot: PriceSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            stall_id,
            new_average_price: snapshot.average_price,
            price_count: snapshot.count,
            timestamp,
        }
    }
}
