//! Projects: the reserve/capital projects whose lifecycle this engine owns
//!
//! A project is affiliated with exactly one center or one department,
//! never both. Its status only moves along the defined edges:
//! Drafting -> UnderReview -> Approved -> Released, with rollbacks to
//! Drafting on rejection paths. Released is reached by the external
//! planning-compilation step and is terminal for this engine.

use crate::{ActorId, ApprovalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Project Identifier ───────────────────────────────────────────────

/// Unique identifier for a project
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
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

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Affiliation ──────────────────────────────────────────────────────

/// The owning unit of a project: a center or a department, never both
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affiliation {
    Center(String),
    Department(String),
}

impl Affiliation {
    pub fn center(name: impl Into<String>) -> Self {
        Self::Center(name.into())
    }

    pub fn department(name: impl Into<String>) -> Self {
        Self::Department(name.into())
    }

    pub fn is_center_owned(&self) -> bool {
        matches!(self, Self::Center(_))
    }
}

// ── Project Status ───────────────────────────────────────────────────

/// Lifecycle status of a project
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProjectStatus {
    /// Editable by the owner; the starting state and every rollback target
    #[default]
    Drafting,
    /// Passed owner-level approval; eligible for monthly review
    UnderReview,
    /// Covered by an approved report
    Approved,
    /// Compiled into the plan (external step); terminal for this engine
    Released,
}

impl ProjectStatus {
    /// Check if this status is terminal for the engine
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released)
    }
}

// ── Project ──────────────────────────────────────────────────────────

/// A reserve project
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// The owning center or department
    pub affiliation: Affiliation,
    /// The actor who owns and drafts this project
    pub owner: ActorId,
    /// Current lifecycle status
    pub status: ProjectStatus,
    /// True only while a Pending approval exists for this project
    pub submitted_for_approval: bool,
    /// The active approval, if submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<ApprovalId>,
    /// When the project was created
    pub created_at: DateTime<Utc>,
    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project in Drafting
    pub fn new(name: impl Into<String>, affiliation: Affiliation, owner: ActorId) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::generate(),
            name: name.into(),
            affiliation,
            owner,
            status: ProjectStatus::Drafting,
            submitted_for_approval: false,
            approval_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the project as submitted, linking the active approval
    pub fn mark_submitted(&mut self, approval_id: ApprovalId) {
        self.submitted_for_approval = true;
        self.approval_id = Some(approval_id);
        self.updated_at = Utc::now();
    }

    /// Clear the submission flag and the approval link
    pub fn clear_submission(&mut self) {
        self.submitted_for_approval = false;
        self.approval_id = None;
        self.updated_at = Utc::now();
    }

    /// Set the lifecycle status
    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Check if the project can be edited (only while Drafting)
    pub fn is_editable(&self) -> bool {
        self.status == ProjectStatus::Drafting
    }
}
