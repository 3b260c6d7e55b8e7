// Expose the modules
pub mod api;
pub mod config;
pub mod domain;
pub mod inbounds;
pub mod outbounds;

// Re-export key types for easier usage
pub use api::{Api, ApiError, AppState};
pub use config::{Config, ConfigError};
pub use domain::errors::{ReviewError, ReviewResult, ValidationError};
pub use domain::models::{
    Author, LikeToggle, NewReport, NewReview, Page, PageRequest, ReportReason, ReportStatus,
    Review, ReviewFilter, ReviewId, ReviewPatch, ReviewReport, StallId, StallReviewSort,
};
pub use domain::services::aggregation::AggregationEngine;
pub use domain::services::likes::LikeService;
pub use domain::services::reports::ReportService;
pub use domain::services::review_orchestrator::{BulkDeleteOutcome, ReviewService, ReviewServiceImpl};
pub use domain::services::review_store::{InMemoryReviewStore, ReviewStore, StoreError};
pub use domain::services::stall_stats::{StallStatistics, StallStatsCache};
pub use outbounds::events::{PriceChangedEvent, RatingChangedEvent};
pub use outbounds::{
    BrokerClient, BrokerError, DisconnectedBroker, EventPublisher, EventRoutes, RabbitBroker,
};
