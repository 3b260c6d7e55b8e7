//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Abuse reports: filing by users, moderation by administrators. Reports outlive the review they
// point at so moderation history is kept after a review is deleted.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::errors::{ReviewError, ReviewResult, ValidationError};
use crate::domain::models::{
    NewReport, Page, PageRequest, ReportDraft, ReportId, ReportStatus, ReviewId, ReviewReport,
};
use crate::domain::services::review_store::{ReviewStore, StoreError};

pub struct ReportService {
    store: Arc<dyn ReviewStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Files a report against an existing review.
    ///
    /// # Errors
    /// * `ReviewError::NotFound` - If the review does not exist
    /// * `ReviewError::Validation` - If the description is missing or too long,
    ///   or the reporter already reported this review
    pub async fn create_report(
        &self,
        review_id: ReviewId,
        request: NewReport,
        reporter_id: &str,
        reporter_name: &str,
    ) -> ReviewResult<ReviewReport> {
        if self.store.find_review(review_id).await?.is_none() {
            return Err(ReviewError::review_not_found(review_id));
        }
        request.validate()?;
        if self.store.report_exists(review_id, reporter_id).await? {
            warn!(%review_id, reporter_id, "duplicate report rejected");
            return Err(ValidationError::DuplicateReport.into());
        }

        let draft = ReportDraft {
            review_id,
            reporter_id: reporter_id.to_owned(),
            reporter_name: reporter_name.to_owned(),
            reason: request.reason,
            description: request.description.trim().to_owned(),
            created_at: Utc::now(),
        };
        let report = self.store.insert_report(draft).await.map_err(|err| match err {
            // lost a race against the same reporter
            StoreError::Conflict { .. } => ReviewError::from(ValidationError::DuplicateReport),
            other => other.into(),
        })?;

        info!(report_id = %report.id, %review_id, reason = ?report.reason, "report filed");
        Ok(report)
    }

    pub async fn reports_for_review(&self, review_id: ReviewId) -> ReviewResult<Vec<ReviewReport>> {
        Ok(self.store.reports_for_review(review_id).await?)
    }

    pub async fn reports_by_status(
        &self,
        status: ReportStatus,
        page: PageRequest,
    ) -> ReviewResult<Page<ReviewReport>> {
        Ok(self.store.page_reports_by_status(status, page).await?)
    }

    /// Moves a report to `status` on behalf of `handler_id`.
    ///
    /// # Errors
    /// * `ReviewError::NotFound` - If the report does not exist
    /// * `ReviewError::Validation` - If the lifecycle forbids the move
    pub async fn handle_report(
        &self,
        report_id: ReportId,
        status: ReportStatus,
        note: Option<String>,
        handler_id: &str,
    ) -> ReviewResult<ReviewReport> {
        let mut report = self
            .store
            .find_report(report_id)
            .await?
            .ok_or_else(|| ReviewError::report_not_found(report_id))?;

        let previous = report.status;
        report.handle(status, handler_id, note, Utc::now())?;
        self.store.save_report(&report).await.map_err(|err| match err {
            StoreError::Missing { .. } => ReviewError::report_not_found(report_id),
            other => other.into(),
        })?;

        info!(%report_id, from = %previous, to = %status, handler_id, "report handled");
        Ok(report)
    }
}
