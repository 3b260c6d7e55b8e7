//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Consumer side of the stall statistics events. Snapshots carry no sequence number, so the cache
// keeps, per stall and per statistic, the snapshot with the newest timestamp and ignores anything
// older. Rating and price are tracked independently.
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::models::StallId;
use crate::outbounds::events::{PriceChangedEvent, RatingChangedEvent};

/// Latest known statistics of one stall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallStatistics {
    pub average_rating: f64,
    pub review_count: i64,
    pub rating_updated_at: Option<DateTime<Utc>>,
    pub average_price: f64,
    pub price_count: i64,
    pub price_updated_at: Option<DateTime<Utc>>,
}

/// Last-writer-wins view of every stall's statistics.
#[derive(Debug, Default)]
pub struct StallStatsCache {
    stalls: RwLock<HashMap<StallId, StallStatistics>>,
}

impl StallStatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a rating snapshot unless a newer one was already applied.
    /// Returns whether the cache changed.
    pub fn apply_rating(&self, event: &RatingChangedEvent) -> bool {
        let mut stalls = self.stalls.write();
        let entry = stalls.entry(event.stall_id).or_default();
        if is_stale(entry.rating_updated_at, event.timestamp) {
            debug!(stall_id = event.stall_id, timestamp = %event.timestamp, "stale rating snapshot ignored");
            return false;
        }
        entry.average_rating = event.new_average_rating;
        entry.review_count = event.review_count;
        entry.rating_updated_at = Some(event.timestamp);
        true
    }

    /// Applies a price snapshot unless a newer one was already applied.
    /// Returns whether the cache changed.
    pub fn apply_price(&self, event: &PriceChangedEvent) -> bool {
        let mut stalls = self.stalls.write();
        let entry = stalls.entry(event.stall_id).or_default();
        if is_stale(entry.price_updated_at, event.timestamp) {
            debug!(stall_id = event.stall_id, timestamp = %event.timestamp, "stale price snapshot ignored");
            return false;
        }
        entry.average_price = event.new_average_price;
        entry.price_count = event.price_count;
        entry.price_updated_at = Some(event.timestamp);
        true
    }

    pub fn get(&self, stall_id: StallId) -> Option<StallStatistics> {
        self.stalls.read().get(&stall_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.stalls.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stalls.read().is_empty()
    }
}

// equal timestamps are re-deliveries of the same snapshot
fn is_stale(current: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> bool {
    current.is_some_and(|applied| incoming < applied)
}
