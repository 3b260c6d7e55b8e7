//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Abuse reports filed against reviews and the moderation lifecycle they go through.
//
// | Name         | Description                                              |
// |--------------|----------------------------------------------------------|
// | ReportReason | Why the review was reported                               |
// | ReportStatus | Moderation state, with its allowed transitions            |
// | ReviewReport | Persisted report                                          |
// | ReportDraft  | Validated report waiting for an id from the store         |
// | NewReport    | Raw report input                                          |
//--------------------------------------------------------------------------------------------------

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::review::ReviewId;
use crate::domain::errors::ValidationError;

pub type ReportId = Uuid;

pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    Spam,
    Offensive,
    Inappropriate,
    FalseInfo,
    OffTopic,
    Duplicate,
    Other,
}

/// Moderation state of a report.
///
/// ```text
/// PENDING ──> REVIEWING ──> RESOLVED | REJECTED | CLOSED
///    └──────────────────────> RESOLVED | REJECTED | CLOSED
/// ```
/// Resolved, rejected and closed reports are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Reviewing,
    Resolved,
    Rejected,
    Closed,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected | Self::Closed)
    }

    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Reviewing) => true,
            (Self::Pending | Self::Reviewing, next) => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewing => "REVIEWING",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "REVIEWING" => Ok(Self::Reviewing),
            "RESOLVED" => Ok(Self::Resolved),
            "REJECTED" => Ok(Self::Rejected),
            "CLOSED" => Ok(Self::Closed),
            other => Err(format!("unknown report status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub id: ReportId,
    pub review_id: ReviewId,
    pub reporter_id: String,
    pub reporter_name: String,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub handled_by: Option<String>,
    pub handled_at: Option<DateTime<Utc>>,
    pub handle_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewReport {
    /// Moves the report to `status` and records who handled it.
    pub fn handle(
        &mut self,
        status: ReportStatus,
        handler_id: &str,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if !self.status.can_transition_to(status) {
            return Err(ValidationError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.handled_by = Some(handler_id.to_owned());
        self.handled_at = Some(now);
        self.handle_note = note;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub review_id: ReviewId,
    pub reporter_id: String,
    pub reporter_name: String,
    pub reason: ReportReason,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ReportDraft {
    pub fn into_report(self, id: ReportId) -> ReviewReport {
        ReviewReport {
            id,
            review_id: self.review_id,
            reporter_id: self.reporter_id,
            reporter_name: self.reporter_name,
            reason: self.reason,
            description: self.description,
            status: ReportStatus::Pending,
            handled_by: None,
            handled_at: None,
            handle_note: None,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub reason: ReportReason,
    #[serde(default)]
    pub description: String,
}

impl NewReport {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong(len));
        }
        Ok(())
    }
}
