//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the REST API of the review service using Axum.
// It exposes review CRUD, likes, reports, stall statistics and the admin surface.
//
// | Component      | Description                                                |
// |----------------|-----------------------------------------------------------|
// | API            | Main API structure coordinating routes and services        |
// | Routes         | Handler functions for API endpoints                        |
// | States         | Shared application state                                   |
// | DTOs           | Data transfer objects for API requests/responses           |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                                       | Key Methods       |
// |----------------|---------------------------------------------------|-------------------|
// | AppState       | Shared application state                          | new, with_store   |
// | Api            | Main API structure                                | routes, serve     |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::domain::services::likes::LikeService;
use crate::domain::services::reports::ReportService;
use crate::domain::services::review_orchestrator::{ReviewService, ReviewServiceImpl};
use crate::domain::services::review_store::ReviewStore;
use crate::outbounds::EventPublisher;

pub use dto::*;
pub use error::{ApiError, ApiResult};
pub use routes::{Caller, ADMIN_ROLE, AVATAR_HEADER, ROLE_HEADER, USERNAME_HEADER, USER_ID_HEADER};

/// Shared application state accessible by all handlers
pub struct AppState {
    pub reviews: Arc<dyn ReviewService>,
    pub likes: Arc<LikeService>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(reviews: Arc<dyn ReviewService>, likes: Arc<LikeService>, reports: Arc<ReportService>) -> Self {
        Self {
            reviews,
            likes,
            reports,
        }
    }

    /// Builds every service on top of one store and one publisher
    pub fn with_store(store: Arc<dyn ReviewStore>, publisher: Arc<EventPublisher>) -> Self {
        Self::new(
            Arc::new(ReviewServiceImpl::new(store.clone(), publisher)),
            Arc::new(LikeService::new(store.clone())),
            Arc::new(ReportService::new(store)),
        )
    }
}

/// Main API structure
pub struct Api {
    /// API address
    addr: SocketAddr,
    /// Shared application state
    state: Arc<AppState>,
}

impl Api {
    pub fn new(addr: SocketAddr, state: Arc<AppState>) -> Self {
        Self { addr, state }
    }

    /// Creates all routes for the API
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://localhost:5173"),
                HeaderValue::from_static("http://127.0.0.1:5173"),
            ])
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                HeaderName::from_static(USER_ID_HEADER),
                HeaderName::from_static(USERNAME_HEADER),
                HeaderName::from_static(AVATAR_HEADER),
                HeaderName::from_static(ROLE_HEADER),
            ])
            .allow_credentials(true);

        Router::new()
            // Health check
            .route("/health", get(routes::health))

            // Reviews
            .route("/api/reviews", post(routes::create_review))
            .route(
                "/api/reviews/:id",
                get(routes::get_review).put(routes::update_review).delete(routes::delete_review),
            )
            .route("/api/reviews/:id/like", post(routes::toggle_like))
            .route("/api/reviews/:id/is-liked", get(routes::is_liked))
            .route("/api/reviews/:id/like-count", get(routes::like_count))
            .route("/api/reviews/:id/report", post(routes::report_review))

            // Stalls and users
            .route("/api/stalls/:stall_id/reviews", get(routes::stall_reviews))
            .route("/api/stalls/:stall_id/rating-distribution", get(routes::rating_distribution))
            .route("/api/stalls/:stall_id/stats", get(routes::stall_stats))
            .route("/api/users/:user_id/reviews", get(routes::user_reviews))

            // Administration
            .route(
                "/api/admin/reviews",
                get(routes::admin_search_reviews).delete(routes::admin_bulk_delete),
            )
            .route("/api/admin/reviews/:id", delete(routes::admin_delete_review))
            .route("/api/admin/reviews/:id/reports", get(routes::review_reports))
            .route("/api/admin/stats", get(routes::overall_stats))
            .route("/api/admin/reports", get(routes::reports_by_status))
            .route("/api/admin/reports/:id/handle", put(routes::handle_report))
            .route("/api/admin/stalls/:stall_id/republish", post(routes::republish_stall))

            // Attach application state
            .layer(Extension(self.state.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Starts the API server and runs until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.routes();

        let listener = TcpListener::bind(self.addr).await?;
        info!("API listening on {}", listener.local_addr()?);
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await
    }
}
