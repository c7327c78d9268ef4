//! Todo items: the sole unit of human-actionable work
//!
//! Processing a todo is the only way a protocol advances. The kind is
//! a tagged variant carrying exactly the fields that kind needs; the
//! dispatcher matches on it exhaustively. A Pending todo transitions
//! to Processed exactly once.

use crate::{ActorId, ApprovalId, ConfirmStep, ConfirmationId, MeetingGroup, ProjectId, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Todo Identifier ──────────────────────────────────────────────────

/// Unique identifier for a todo item
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Todo Kind ────────────────────────────────────────────────────────

/// What a todo asks its assignee to do
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoKind {
    /// Decide a pending project approval
    ProjectApproval { approval_id: ApprovalId },
    /// Confirm one step of a report's confirmation chain
    ReportConfirm { report_id: ReportId, step: ConfirmStep },
    /// Read-only notice that a report was rejected; no protocol effect
    ReportNotice { report_id: ReportId },
    /// Give the final decision on a report
    ReportApprove { report_id: ReportId },
    /// Confirm a meeting group's treatment of the actor's projects
    ParticipantConfirm {
        meeting_group: MeetingGroup,
        confirmation_id: ConfirmationId,
        project_ids: Vec<ProjectId>,
        confirmation_order: u32,
    },
}

// ── Todo Status / Action / Priority ──────────────────────────────────

/// Status of a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TodoStatus {
    #[default]
    Pending,
    Processed,
    Ignored,
}

/// The action a human takes when processing a todo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    Confirm,
    Reject,
    Approve,
}

/// Display priority of a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

// ── Todo Item ────────────────────────────────────────────────────────

/// An actionable work item assigned to one actor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// What this todo asks for, with the fields that kind needs
    pub kind: TodoKind,
    /// Short title shown in todo lists
    pub title: String,
    /// Longer description
    pub description: String,
    /// The actor who must act
    pub assigned_to: ActorId,
    /// Who issued the todo (a human actor or the engine itself)
    pub assigned_by: ActorId,
    /// Current status
    pub status: TodoStatus,
    /// When the todo was processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Comments recorded at processing time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Display priority
    pub priority: Priority,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Create a Pending todo
    pub fn new(
        kind: TodoKind,
        title: impl Into<String>,
        assigned_to: ActorId,
        assigned_by: ActorId,
    ) -> Self {
        Self {
            id: TodoId::generate(),
            kind,
            title: title.into(),
            description: String::new(),
            assigned_to,
            assigned_by,
            status: TodoStatus::Pending,
            processed_at: None,
            comments: None,
            priority: Priority::Normal,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Create a project-approval todo for the approver
    pub fn project_approval(
        approval_id: ApprovalId,
        project_name: &str,
        assigned_to: ActorId,
        assigned_by: ActorId,
    ) -> Self {
        Self::new(
            TodoKind::ProjectApproval { approval_id },
            format!("Approve project \"{}\"", project_name),
            assigned_to,
            assigned_by,
        )
        .with_priority(Priority::High)
    }

    /// Create a chain-step confirmation todo
    pub fn report_confirm(report_id: ReportId, step: ConfirmStep, assigned_to: ActorId) -> Self {
        Self::new(
            TodoKind::ReportConfirm {
                report_id: report_id.clone(),
                step,
            },
            format!("Confirm report {} ({})", report_id.short(), step),
            assigned_to,
            ActorId::system(),
        )
    }

    /// Create a read-only rejection notice
    pub fn report_notice(report_id: ReportId, assigned_to: ActorId) -> Self {
        Self::new(
            TodoKind::ReportNotice {
                report_id: report_id.clone(),
            },
            format!("Report {} was rejected", report_id.short()),
            assigned_to,
            ActorId::system(),
        )
        .with_priority(Priority::Low)
    }

    /// Create a final-approval todo for the institute lead
    pub fn report_approve(report_id: ReportId, assigned_to: ActorId) -> Self {
        Self::new(
            TodoKind::ReportApprove {
                report_id: report_id.clone(),
            },
            format!("Final approval for report {}", report_id.short()),
            assigned_to,
            ActorId::system(),
        )
        .with_priority(Priority::High)
    }

    /// Create a participant-confirmation todo
    pub fn participant_confirm(
        meeting_group: MeetingGroup,
        confirmation_id: ConfirmationId,
        project_ids: Vec<ProjectId>,
        confirmation_order: u32,
        assigned_to: ActorId,
    ) -> Self {
        Self::new(
            TodoKind::ParticipantConfirm {
                meeting_group: meeting_group.clone(),
                confirmation_id,
                project_ids,
                confirmation_order,
            },
            format!("Confirm meeting {} (#{}) ", meeting_group, confirmation_order),
            assigned_to,
            ActorId::system(),
        )
    }

    /// Mark the todo Processed, stamping time and comments
    pub fn mark_processed(&mut self, comments: Option<String>) {
        self.status = TodoStatus::Processed;
        self.processed_at = Some(Utc::now());
        self.comments = comments;
    }

    /// Check if the todo is still actionable
    pub fn is_pending(&self) -> bool {
        self.status == TodoStatus::Pending
    }

    /// Check if this is a system-issued chain-step todo for the report
    pub fn is_chain_step_for(&self, report: &ReportId) -> bool {
        matches!(&self.kind, TodoKind::ReportConfirm { report_id, .. } if report_id == report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_todo_is_pending() {
        let todo = TodoItem::project_approval(
            ApprovalId::new("ap-1"),
            "Sensor Platform",
            ActorId::new("lead-1"),
            ActorId::new("owner-1"),
        );
        assert!(todo.is_pending());
        assert_eq!(todo.priority, Priority::High);
        assert!(todo.title.contains("Sensor Platform"));
    }

    #[test]
    fn test_mark_processed() {
        let mut todo = TodoItem::report_notice(ReportId::new("rep-1"), ActorId::new("a1"));
        todo.mark_processed(Some("seen".into()));
        assert_eq!(todo.status, TodoStatus::Processed);
        assert!(todo.processed_at.is_some());
        assert!(!todo.is_pending());
    }

    #[test]
    fn test_chain_step_predicate() {
        let report_id = ReportId::new("rep-1");
        let confirm = TodoItem::report_confirm(
            report_id.clone(),
            ConfirmStep::CenterSpecialist,
            ActorId::new("spec-1"),
        );
        let notice = TodoItem::report_notice(report_id.clone(), ActorId::new("a1"));
        let approve = TodoItem::report_approve(report_id.clone(), ActorId::new("lead"));

        assert!(confirm.is_chain_step_for(&report_id));
        assert!(!notice.is_chain_step_for(&report_id));
        assert!(!approve.is_chain_step_for(&report_id));
        assert!(!confirm.is_chain_step_for(&ReportId::new("other")));
    }

    #[test]
    fn test_kind_serde_round_trip() {
        let todo = TodoItem::participant_confirm(
            MeetingGroup::new("2025-07-01_t1_ReviewerX"),
            ConfirmationId::new("c1"),
            vec![ProjectId::new("p1"), ProjectId::new("p2")],
            2,
            ActorId::new("a1"),
        );

        let json = serde_json::to_string(&todo).unwrap();
        assert!(json.contains("ParticipantConfirm"));
        // Unset optional fields are omitted from the wire form.
        assert!(!json.contains("processed_at"));

        let back: TodoItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, todo.kind);
        assert_eq!(back.assigned_to, todo.assigned_to);
        assert!(back.is_pending());
    }

    #[test]
    fn test_system_issued_todos() {
        let todo = TodoItem::report_confirm(
            ReportId::new("rep-1"),
            ConfirmStep::CenterLead,
            ActorId::new("lead-1"),
        );
        assert_eq!(todo.assigned_by, ActorId::system());
    }
}
