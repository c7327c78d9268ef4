//! Approvals: the owner-level submission gate for a draft project
//!
//! At most one Pending approval exists per project at a time; the
//! lifecycle component enforces this at submission, not the store.

use crate::{ActorId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Approval Identifier ──────────────────────────────────────────────

/// Unique identifier for an approval
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub String);

impl ApprovalId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Approval Status ──────────────────────────────────────────────────

/// Status of an approval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApprovalStatus {
    /// Waiting for the approver's decision
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// The decision an approver can take on a Pending approval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    Accept,
    Reject,
}

// ── Approval ─────────────────────────────────────────────────────────

/// A submission-for-approval record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Approval {
    /// Unique identifier
    pub id: ApprovalId,
    /// The project under approval
    pub project_id: ProjectId,
    /// Who submitted the project
    pub submitter: ActorId,
    /// Who decides
    pub approver: ActorId,
    /// When the project was submitted
    pub submitted_at: DateTime<Utc>,
    /// Current status
    pub status: ApprovalStatus,
    /// When the decision was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    /// Decision comments (required on rejection)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Approval {
    /// Create a new Pending approval
    pub fn new(project_id: ProjectId, submitter: ActorId, approver: ActorId) -> Self {
        Self {
            id: ApprovalId::generate(),
            project_id,
            submitter,
            approver,
            submitted_at: Utc::now(),
            status: ApprovalStatus::Pending,
            decided_at: None,
            comments: None,
        }
    }

    /// Record the approver's decision
    pub fn decide(&mut self, decision: ApprovalDecision, comments: Option<String>) {
        self.status = match decision {
            ApprovalDecision::Accept => ApprovalStatus::Approved,
            ApprovalDecision::Reject => ApprovalStatus::Rejected,
        };
        self.decided_at = Some(Utc::now());
        self.comments = comments;
    }

    /// Check if the approval is still waiting for a decision
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_approval() -> Approval {
        Approval::new(
            ProjectId::new("p1"),
            ActorId::new("owner-1"),
            ActorId::new("lead-1"),
        )
    }

    #[test]
    fn test_new_approval_is_pending() {
        let approval = make_approval();
        assert!(approval.is_pending());
        assert!(approval.decided_at.is_none());
    }

    #[test]
    fn test_accept() {
        let mut approval = make_approval();
        approval.decide(ApprovalDecision::Accept, None);
        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert!(approval.decided_at.is_some());
        assert!(!approval.is_pending());
    }

    #[test]
    fn test_reject_with_comments() {
        let mut approval = make_approval();
        approval.decide(ApprovalDecision::Reject, Some("budget missing".into()));
        assert_eq!(approval.status, ApprovalStatus::Rejected);
        assert_eq!(approval.comments.as_deref(), Some("budget missing"));
    }
}
