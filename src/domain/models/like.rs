use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::review::ReviewId;

/// One user's like on one review. The pair `(review_id, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLike {
    pub review_id: ReviewId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewLike {
    pub fn new(review_id: ReviewId, user_id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            review_id,
            user_id: user_id.to_owned(),
            created_at,
        }
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub is_liked: bool,
    pub like_count: u64,
}
