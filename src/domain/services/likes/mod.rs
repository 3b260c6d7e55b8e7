//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Like toggling. The uniqueness of the (review, user) like record decides which of two
// concurrent toggles wins; the denormalized `likes_count` is only adjusted by the toggle that
// actually changed a record.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::errors::{ReviewError, ReviewResult};
use crate::domain::models::{LikeToggle, ReviewId, ReviewLike};
use crate::domain::services::review_store::{ReviewStore, StoreError};

pub struct LikeService {
    store: Arc<dyn ReviewStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Likes the review if `user_id` does not like it yet, unlikes it otherwise.
    ///
    /// # Errors
    /// * `ReviewError::NotFound` - If the review does not exist
    pub async fn toggle_like(&self, review_id: ReviewId, user_id: &str) -> ReviewResult<LikeToggle> {
        self.ensure_review(review_id).await?;

        let is_liked = if self.store.like_exists(review_id, user_id).await? {
            if self.store.delete_like(review_id, user_id).await? {
                self.adjust(review_id, -1).await?;
            } else {
                debug!(%review_id, user_id, "like already removed by a concurrent toggle");
            }
            false
        } else {
            match self.store.insert_like(ReviewLike::new(review_id, user_id, Utc::now())).await {
                Ok(()) => {
                    if let Err(err) = self.adjust(review_id, 1).await {
                        // the review was deleted after the existence check
                        self.store.delete_like(review_id, user_id).await?;
                        return Err(err);
                    }
                }
                Err(StoreError::Conflict { .. }) => {
                    debug!(%review_id, user_id, "like already added by a concurrent toggle");
                }
                Err(err) => return Err(err.into()),
            }
            true
        };

        let like_count = self.store.count_likes(review_id).await?;
        info!(%review_id, user_id, is_liked, like_count, "like toggled");
        Ok(LikeToggle { is_liked, like_count })
    }

    pub async fn is_liked(&self, review_id: ReviewId, user_id: &str) -> ReviewResult<bool> {
        Ok(self.store.like_exists(review_id, user_id).await?)
    }

    pub async fn like_count(&self, review_id: ReviewId) -> ReviewResult<u64> {
        self.ensure_review(review_id).await?;
        Ok(self.store.count_likes(review_id).await?)
    }

    async fn ensure_review(&self, review_id: ReviewId) -> ReviewResult<()> {
        match self.store.find_review(review_id).await? {
            Some(_) => Ok(()),
            None => Err(ReviewError::review_not_found(review_id)),
        }
    }

    async fn adjust(&self, review_id: ReviewId, delta: i64) -> ReviewResult<()> {
        // the review can vanish between the existence check and here
        if self.store.adjust_likes_count(review_id, delta).await?.is_none() {
            return Err(ReviewError::review_not_found(review_id));
        }
        Ok(())
    }
}
