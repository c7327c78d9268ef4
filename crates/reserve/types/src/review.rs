//! Monthly reviews: one review per project, batched into meeting groups
//!
//! A MeetingGroup is the correlation key shared by every review created
//! in one "initiate meeting" call. It is the join key used by the
//! participant confirmation protocol and by approval reports.

use crate::{ActorId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a monthly review
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation key for all reviews created by one "initiate meeting" call
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingGroup(pub String);

impl MeetingGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build the conventional key: date, meeting slot, reviewer name
    pub fn from_parts(date: &str, slot: &str, reviewer: &str) -> Self {
        Self(format!("{}_{}_{}", date, slot, reviewer))
    }
}

impl std::fmt::Display for MeetingGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Review Status ────────────────────────────────────────────────────

/// Status of a monthly review
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReviewStatus {
    #[default]
    PendingReview,
    Reviewed,
    Rejected,
}

// ── Meeting Info ─────────────────────────────────────────────────────

/// Scheduling details attached to a review when its meeting is initiated
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeetingInfo {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    /// Shared by every review of the same meeting
    pub meeting_group: MeetingGroup,
}

// ── Monthly Review ───────────────────────────────────────────────────

/// A monthly review of one project
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthlyReview {
    /// Unique identifier
    pub id: ReviewId,
    /// The project under review (at most one review per project)
    pub project_id: ProjectId,
    /// Scheduled review date
    pub review_date: DateTime<Utc>,
    /// The reviewing actor
    pub reviewer: ActorId,
    /// Current status
    pub status: ReviewStatus,
    /// Meeting details, set when the meeting is initiated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingInfo>,
    /// Review comments (carries the rejection reason on report rollback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl MonthlyReview {
    /// Create a new review in PendingReview
    pub fn new(project_id: ProjectId, review_date: DateTime<Utc>, reviewer: ActorId) -> Self {
        Self {
            id: ReviewId::generate(),
            project_id,
            review_date,
            reviewer,
            status: ReviewStatus::PendingReview,
            meeting: None,
            comments: None,
        }
    }

    pub fn with_meeting(mut self, meeting: MeetingInfo) -> Self {
        self.meeting = Some(meeting);
        self
    }

    /// The meeting group this review belongs to, if a meeting was initiated
    pub fn meeting_group(&self) -> Option<&MeetingGroup> {
        self.meeting.as_ref().map(|m| &m.meeting_group)
    }

    /// Reset the review to PendingReview, recording why
    pub fn reset_pending(&mut self, reason: impl Into<String>) {
        self.status = ReviewStatus::PendingReview;
        self.comments = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_group_key() {
        let group = MeetingGroup::from_parts("2025-07-01", "t1", "ReviewerX");
        assert_eq!(group.0, "2025-07-01_t1_ReviewerX");
    }

    #[test]
    fn test_new_review_is_pending() {
        let review = MonthlyReview::new(ProjectId::new("p1"), Utc::now(), ActorId::new("rev-1"));
        assert_eq!(review.status, ReviewStatus::PendingReview);
        assert!(review.meeting_group().is_none());
    }

    #[test]
    fn test_reset_pending_records_reason() {
        let mut review =
            MonthlyReview::new(ProjectId::new("p1"), Utc::now(), ActorId::new("rev-1"));
        review.status = ReviewStatus::Reviewed;
        review.reset_pending("report rejected: incomplete");
        assert_eq!(review.status, ReviewStatus::PendingReview);
        assert_eq!(
            review.comments.as_deref(),
            Some("report rejected: incomplete")
        );
    }

    #[test]
    fn test_meeting_group_accessor() {
        let group = MeetingGroup::new("g1");
        let meeting = MeetingInfo {
            start_time: Utc::now(),
            end_time: Utc::now(),
            location: "Room 301".into(),
            meeting_group: group.clone(),
        };
        let review = MonthlyReview::new(ProjectId::new("p1"), Utc::now(), ActorId::new("rev-1"))
            .with_meeting(meeting);
        assert_eq!(review.meeting_group(), Some(&group));
    }
}
