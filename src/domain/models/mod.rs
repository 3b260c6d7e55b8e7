pub mod like;
pub mod query;
pub mod report;
pub mod review;
pub mod stats;

pub use like::{LikeToggle, ReviewLike};
pub use query::{Page, PageRequest, ReviewFilter, SortDirection, SortField, StallReviewSort};
pub use report::{NewReport, ReportDraft, ReportId, ReportReason, ReportStatus, ReviewReport};
pub use review::{Author, NewReview, Review, ReviewDraft, ReviewId, ReviewPatch, StallId};
pub use stats::{
    Distribution, OverallReviewStats, PriceSnapshot, RatingDistribution, RatingSnapshot,
    StallReviewStats,
};
