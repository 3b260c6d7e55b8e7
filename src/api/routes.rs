//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                            | Return Type         |
// |-----------------------|----------------------------------------|---------------------|
// | health                | Health check endpoint                  | Response            |
// | create_review         | Create a review for the caller         | ApiResult<Response> |
// | get_review            | Get a review with the caller's like    | ApiResult<Response> |
// | update_review         | Update the caller's review             | ApiResult<Response> |
// | delete_review         | Delete the caller's review             | ApiResult<Response> |
// | toggle_like           | Like or unlike a review                | ApiResult<Response> |
// | is_liked              | Whether the caller likes a review      | ApiResult<Response> |
// | like_count            | Number of likes of a review            | ApiResult<Response> |
// | report_review         | File a report against a review         | ApiResult<Response> |
// | stall_reviews         | Paged reviews of a stall               | ApiResult<Response> |
// | rating_distribution   | Rating histogram of a stall            | ApiResult<Response> |
// | stall_stats           | Rating and price statistics            | ApiResult<Response> |
// | user_reviews          | Paged reviews written by a user        | ApiResult<Response> |
// | admin_*               | Moderation and reconciliation          | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::{
    AdminSearchQuery, ApiError, ApiResult, AppState, HandleReportRequest, IsLikedResponse,
    LikeCountResponse, PageQuery, ReportsQuery, RepublishResponse, ReviewResponse,
    StallReviewsQuery,
};
use crate::domain::models::{
    Author, NewReport, NewReview, Page, ReportId, Review, ReviewId, ReviewPatch, StallId,
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";
pub const AVATAR_HEADER: &str = "x-user-avatar";
pub const ROLE_HEADER: &str = "x-user-role";
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Identity forwarded by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}

impl Caller {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };

        let user_id = header(USER_ID_HEADER)?;
        Some(Self {
            username: header(USERNAME_HEADER).unwrap_or_else(|| user_id.clone()),
            avatar_url: header(AVATAR_HEADER),
            is_admin: header(ROLE_HEADER).is_some_and(|role| role == ADMIN_ROLE),
            user_id,
        })
    }

    fn author(&self) -> Author {
        Author {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

fn require_user(headers: &HeaderMap) -> ApiResult<Caller> {
    Caller::from_headers(headers)
        .ok_or_else(|| ApiError::Unauthenticated(format!("missing {} header", USER_ID_HEADER)))
}

fn require_admin(headers: &HeaderMap) -> ApiResult<Caller> {
    let caller = require_user(headers)?;
    if !caller.is_admin {
        warn!(user_id = %caller.user_id, "non-admin on admin route");
        return Err(ApiError::Forbidden("administrator role required".to_string()));
    }
    Ok(caller)
}

/// Attaches the caller's like state to each review
async fn with_like_state(state: &AppState, caller: Option<&Caller>, review: Review) -> ApiResult<ReviewResponse> {
    let liked = match caller {
        Some(caller) => state.likes.is_liked(review.id, &caller.user_id).await?,
        None => false,
    };
    Ok(ReviewResponse::new(review, liked))
}

async fn page_with_like_state(
    state: &AppState,
    caller: Option<&Caller>,
    page: Page<Review>,
) -> ApiResult<Page<ReviewResponse>> {
    let Page {
        content,
        page,
        size,
        total_elements,
        total_pages,
    } = page;

    let mut responses = Vec::with_capacity(content.len());
    for review in content {
        responses.push(with_like_state(state, caller, review).await?);
    }
    Ok(Page {
        content: responses,
        page,
        size,
        total_elements,
        total_pages,
    })
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

//--------------------------------------------------------------------------------------------------
//  REVIEWS
//--------------------------------------------------------------------------------------------------

pub async fn create_review(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<Response> {
    let caller = require_user(&headers)?;
    let Json(input) = body?;

    let review = state.reviews.create_review(input, caller.author()).await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))).into_response())
}

pub async fn get_review(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let caller = Caller::from_headers(&headers);

    let review = state.reviews.get_review(id).await?;
    let response = with_like_state(&state, caller.as_ref(), review).await?;
    Ok(Json(response).into_response())
}

pub async fn update_review(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
    body: Result<Json<ReviewPatch>, JsonRejection>,
) -> ApiResult<Response> {
    let caller = require_user(&headers)?;
    let Path(id) = id?;
    let Json(patch) = body?;

    let review = state.reviews.update_review(id, patch, &caller.user_id).await?;
    let response = with_like_state(&state, Some(&caller), review).await?;
    Ok(Json(response).into_response())
}

pub async fn delete_review(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    let caller = require_user(&headers)?;
    let Path(id) = id?;

    state.reviews.delete_review(id, &caller.user_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

//--------------------------------------------------------------------------------------------------
//  LIKES AND REPORTS
//--------------------------------------------------------------------------------------------------

pub async fn toggle_like(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    let caller = require_user(&headers)?;
    let Path(id) = id?;

    let toggle = state.likes.toggle_like(id, &caller.user_id).await?;
    Ok(Json(toggle).into_response())
}

pub async fn is_liked(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    let Path(review_id) = id?;

    let is_liked = match Caller::from_headers(&headers) {
        Some(caller) => state.likes.is_liked(review_id, &caller.user_id).await?,
        None => false,
    };
    Ok(Json(IsLikedResponse { review_id, is_liked }).into_response())
}

pub async fn like_count(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    let Path(review_id) = id?;

    let like_count = state.likes.like_count(review_id).await?;
    Ok(Json(LikeCountResponse { review_id, like_count }).into_response())
}

pub async fn report_review(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
    body: Result<Json<NewReport>, JsonRejection>,
) -> ApiResult<Response> {
    let caller = require_user(&headers)?;
    let Path(review_id) = id?;
    let Json(request) = body?;

    let report = state
        .reports
        .create_report(review_id, request, &caller.user_id, &caller.username)
        .await?;
    Ok((StatusCode::CREATED, Json(report)).into_response())
}

//--------------------------------------------------------------------------------------------------
//  STALLS AND USERS
//--------------------------------------------------------------------------------------------------

pub async fn stall_reviews(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    stall_id: Result<Path<StallId>, PathRejection>,
    query: Result<Query<StallReviewsQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Path(stall_id) = stall_id?;
    let Query(query) = query?;
    let caller = Caller::from_headers(&headers);

    let page = state
        .reviews
        .reviews_for_stall(stall_id, query.sort()?, query.page_request())
        .await?;
    let page = page_with_like_state(&state, caller.as_ref(), page).await?;
    Ok(Json(page).into_response())
}

pub async fn rating_distribution(
    Extension(state): Extension<Arc<AppState>>,
    stall_id: Result<Path<StallId>, PathRejection>,
) -> ApiResult<Response> {
    let Path(stall_id) = stall_id?;

    let distribution = state.reviews.rating_distribution(stall_id).await?;
    Ok(Json(distribution).into_response())
}

pub async fn stall_stats(
    Extension(state): Extension<Arc<AppState>>,
    stall_id: Result<Path<StallId>, PathRejection>,
) -> ApiResult<Response> {
    let Path(stall_id) = stall_id?;

    let stats = state.reviews.stall_stats(stall_id).await?;
    Ok(Json(stats).into_response())
}

pub async fn user_reviews(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    user_id: Result<Path<String>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Path(user_id) = user_id?;
    let Query(query) = query?;
    let caller = Caller::from_headers(&headers);

    let page = state.reviews.reviews_by_user(&user_id, query.page_request()).await?;
    let page = page_with_like_state(&state, caller.as_ref(), page).await?;
    Ok(Json(page).into_response())
}

//--------------------------------------------------------------------------------------------------
//  ADMINISTRATION
//--------------------------------------------------------------------------------------------------

pub async fn admin_search_reviews(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<AdminSearchQuery>, QueryRejection>,
) -> ApiResult<Response> {
    require_admin(&headers)?;
    let Query(query) = query?;

    let page = state
        .reviews
        .search_reviews(query.filter()?, query.page_request())
        .await?;
    Ok(Json(page.map(ReviewResponse::from)).into_response())
}

pub async fn admin_bulk_delete(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Vec<ReviewId>>, JsonRejection>,
) -> ApiResult<Response> {
    require_admin(&headers)?;
    let Json(ids) = body?;

    let outcome = state.reviews.admin_bulk_delete(ids).await?;
    Ok(Json(outcome).into_response())
}

pub async fn admin_delete_review(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    require_admin(&headers)?;
    let Path(id) = id?;

    state.reviews.admin_delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn review_reports(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Response> {
    require_admin(&headers)?;
    let Path(id) = id?;

    let reports = state.reports.reports_for_review(id).await?;
    Ok(Json(reports).into_response())
}

pub async fn overall_stats(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    require_admin(&headers)?;

    let stats = state.reviews.overall_stats().await?;
    Ok(Json(stats).into_response())
}

pub async fn reports_by_status(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<ReportsQuery>, QueryRejection>,
) -> ApiResult<Response> {
    require_admin(&headers)?;
    let Query(query) = query?;

    let page = state
        .reports
        .reports_by_status(query.status()?, query.page_request())
        .await?;
    Ok(Json(page).into_response())
}

pub async fn handle_report(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<ReportId>, PathRejection>,
    body: Result<Json<HandleReportRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let admin = require_admin(&headers)?;
    let Path(id) = id?;
    let Json(request) = body?;

    let report = state
        .reports
        .handle_report(id, request.status, request.handle_note, &admin.user_id)
        .await?;
    Ok(Json(report).into_response())
}

pub async fn republish_stall(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    stall_id: Result<Path<StallId>, PathRejection>,
) -> ApiResult<Response> {
    require_admin(&headers)?;
    let Path(stall_id) = stall_id?;

    state.reviews.recompute_and_publish(stall_id).await;
    Ok((StatusCode::ACCEPTED, Json(RepublishResponse { stall_id })).into_response())
}
