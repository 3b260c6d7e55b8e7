/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------------------------------------------------------+
/// | Exports:                                                 |
/// |   - aggregation                                          |
/// |   - likes                                                |
/// |   - reports                                              |
/// |   - review_orchestrator                                  |
/// |   - review_store                                         |
/// |   - stall_stats                                          |
/// +----------------------------------------------------------+

/// Rating and price statistics over a stall's reviews.
pub mod aggregation;

pub mod likes;

pub mod reports;

/// Review lifecycle and the recompute-and-publish cycle that follows it.
pub mod review_orchestrator;

/// Persistence of reviews, likes and reports.
pub mod review_store;

/// Last-writer-wins view of published stall statistics.
pub mod stall_stats;
