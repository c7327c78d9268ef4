//! Approval reports: one report per meeting group, driven through a
//! three-step confirmation chain and a final institute-lead decision
//!
//! A report selects monthly reviews, not projects. Every consumer
//! reaches the project by hopping through the selected review; the
//! field name makes the indirection explicit.

use crate::{ActorId, MeetingGroup, ReviewId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Report Identifier ────────────────────────────────────────────────

/// Unique identifier for an approval report
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Report Status ────────────────────────────────────────────────────

/// Status of an approval report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReportStatus {
    /// Being assembled; workflow not started
    #[default]
    Draft,
    /// Queued for confirmation (workflow requested but chain not issued)
    PendingConfirm,
    /// The three-step confirmation chain is running
    Confirming,
    /// All three steps confirmed; waiting for the final decision
    PendingApproval,
    Approved,
    Rejected,
}

impl ReportStatus {
    /// Check if the report has reached a final decision
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

// ── Confirmation Steps ───────────────────────────────────────────────

/// The fixed three-step confirmation chain preceding final approval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmStep {
    CenterSpecialist,
    CenterLead,
    DepartmentSpecialist,
}

impl ConfirmStep {
    /// 1-based position in the chain
    pub fn number(&self) -> u32 {
        match self {
            Self::CenterSpecialist => 1,
            Self::CenterLead => 2,
            Self::DepartmentSpecialist => 3,
        }
    }

    /// The step issued after this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::CenterSpecialist => Some(Self::CenterLead),
            Self::CenterLead => Some(Self::DepartmentSpecialist),
            Self::DepartmentSpecialist => None,
        }
    }

    /// The step owning the given number of already-completed steps
    pub fn after_completed(count: usize) -> Option<Self> {
        match count {
            0 => Some(Self::CenterSpecialist),
            1 => Some(Self::CenterLead),
            2 => Some(Self::DepartmentSpecialist),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfirmStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::CenterSpecialist => "center specialist",
            Self::CenterLead => "center lead",
            Self::DepartmentSpecialist => "department specialist",
        };
        write!(f, "step {} ({})", self.number(), name)
    }
}

// ── Approval Report ──────────────────────────────────────────────────

/// An approval report over one meeting group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalReport {
    /// Unique identifier
    pub id: ReportId,
    /// The meeting this report covers
    pub meeting_group: MeetingGroup,
    /// Which report template was used
    pub template_type: String,
    /// The monthly reviews this report covers. Review ids, not project
    /// ids: projects are reached through their review.
    pub selected_reviews: Vec<ReviewId>,
    /// Free-form table content rendered by the presentation layer
    pub table_data: serde_json::Value,
    /// Current status
    pub status: ReportStatus,
    /// The institute lead assigned at the end of the chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_approver: Option<ActorId>,
    /// When the final decision was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_approved_at: Option<DateTime<Utc>>,
    /// Final decision comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_comments: Option<String>,
    /// When the report was created
    pub created_at: DateTime<Utc>,
    /// When the report was last updated
    pub updated_at: DateTime<Utc>,
}

impl ApprovalReport {
    /// Create a new Draft report
    pub fn new(
        meeting_group: MeetingGroup,
        template_type: impl Into<String>,
        selected_reviews: Vec<ReviewId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReportId::generate(),
            meeting_group,
            template_type: template_type.into(),
            selected_reviews,
            table_data: serde_json::Value::Null,
            status: ReportStatus::Draft,
            final_approver: None,
            final_approved_at: None,
            final_comments: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_table_data(mut self, table_data: serde_json::Value) -> Self {
        self.table_data = table_data;
        self
    }

    /// Set the report status
    pub fn set_status(&mut self, status: ReportStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Stamp the final decision
    pub fn record_final_decision(&mut self, approved: bool, comments: Option<String>) {
        self.status = if approved {
            ReportStatus::Approved
        } else {
            ReportStatus::Rejected
        };
        self.final_approved_at = Some(Utc::now());
        self.final_comments = comments;
        self.updated_at = Utc::now();
    }
}
