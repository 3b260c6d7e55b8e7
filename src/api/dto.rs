//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                 | Description                               | Key Methods         |
// |----------------------|-------------------------------------------|---------------------|
// | ReviewResponse       | Review plus the caller's like state       | new                 |
// | PageQuery            | page/size query parameters                | page_request        |
// | StallReviewsQuery    | Stall listing parameters                  | sort                |
// | AdminSearchQuery     | Admin filtered search parameters          | filter              |
// | ReportsQuery         | Report listing parameters                 | status              |
// | HandleReportRequest  | Moderation decision                       |                     |
// | LikeCountResponse    | Number of likes of a review               |                     |
// | IsLikedResponse      | Whether the caller likes a review         |                     |
// | RepublishResponse    | Stall whose statistics were republished   |                     |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::domain::models::query::DEFAULT_PAGE_SIZE;
use crate::domain::models::{
    PageRequest, ReportStatus, Review, ReviewFilter, ReviewId, StallId, StallReviewSort,
};

use super::ApiError;

/// A review as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    /// Always false for anonymous callers
    pub is_liked_by_current_user: bool,
}

impl ReviewResponse {
    pub fn new(review: Review, is_liked_by_current_user: bool) -> Self {
        Self {
            review,
            is_liked_by_current_user,
        }
    }
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self::new(review, false)
    }
}

/// Zero-based paging parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallReviewsQuery {
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl StallReviewsQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }

    pub fn sort(&self) -> Result<StallReviewSort, ApiError> {
        match self.sort_by.as_deref() {
            None | Some("") => Ok(StallReviewSort::default()),
            Some(raw) => raw.parse().map_err(ApiError::BadRequest),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSearchQuery {
    pub keyword: Option<String>,
    pub rating: Option<u8>,
    pub stall_id: Option<StallId>,
    pub user_id: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl AdminSearchQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }

    pub fn filter(&self) -> Result<ReviewFilter, ApiError> {
        Ok(ReviewFilter {
            keyword: self.keyword.clone().filter(|keyword| !keyword.trim().is_empty()),
            rating: self.rating,
            stall_id: self.stall_id,
            user_id: self.user_id.clone(),
            sort_by: parse_or_default(self.sort_by.as_deref())?,
            direction: parse_or_default(self.direction.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ReportsQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }

    /// Pending reports unless a status is given
    pub fn status(&self) -> Result<ReportStatus, ApiError> {
        match self.status.as_deref() {
            None | Some("") => Ok(ReportStatus::Pending),
            Some(raw) => raw.parse().map_err(ApiError::BadRequest),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleReportRequest {
    pub status: ReportStatus,
    #[serde(default, alias = "note")]
    pub handle_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountResponse {
    pub review_id: ReviewId,
    pub like_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsLikedResponse {
    pub review_id: ReviewId,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepublishResponse {
    pub stall_id: StallId,
}

// query strings are flat, so every listing repeats page and size
fn page_request(page: Option<u32>, size: Option<u32>) -> PageRequest {
    PageRequest::new(page.unwrap_or(0), size.unwrap_or(DEFAULT_PAGE_SIZE))
}

fn parse_or_default<T>(raw: Option<&str>) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match raw {
        None | Some("") => Ok(T::default()),
        Some(raw) => raw.parse().map_err(ApiError::BadRequest),
    }
}
