//! Confirmation records: per-actor attestations referenced by todos
//!
//! Two kinds exist. Report confirmations belong to one step of the
//! sequential chain and are created lazily, one per step, when that
//! step's todo is issued. Participant confirmations are created
//! eagerly, all at once, when a meeting group's confirmation starts.

use crate::{ActorId, ConfirmStep, MeetingGroup, ProjectId, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Confirmation Identifier ──────────────────────────────────────────

/// Unique identifier for a confirmation record of either kind
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfirmationId(pub String);

impl ConfirmationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ConfirmationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Confirmation Status ──────────────────────────────────────────────

/// Status shared by both confirmation kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConfirmationStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

// ── Report Confirmation ──────────────────────────────────────────────

/// One step's attestation in the report confirmation chain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfirmation {
    /// Unique identifier
    pub id: ConfirmationId,
    /// The report being confirmed
    pub report_id: ReportId,
    /// The chain step this record belongs to
    pub step: ConfirmStep,
    /// The confirming actor
    pub actor: ActorId,
    /// Display name captured at creation
    pub actor_name: String,
    /// Current status
    pub status: ConfirmationStatus,
    /// When the actor decided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Decision comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl ReportConfirmation {
    /// Create a Pending confirmation for one chain step
    pub fn new(
        report_id: ReportId,
        step: ConfirmStep,
        actor: ActorId,
        actor_name: impl Into<String>,
    ) -> Self {
        Self {
            id: ConfirmationId::generate(),
            report_id,
            step,
            actor,
            actor_name: actor_name.into(),
            status: ConfirmationStatus::Pending,
            confirmed_at: None,
            comments: None,
        }
    }

    /// Record the actor's decision
    pub fn record(&mut self, confirmed: bool, comments: Option<String>) {
        self.status = if confirmed {
            ConfirmationStatus::Confirmed
        } else {
            ConfirmationStatus::Rejected
        };
        self.confirmed_at = Some(Utc::now());
        self.comments = comments;
    }
}

// ── Participant Confirmation ─────────────────────────────────────────

/// One participant's attestation for a meeting group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantConfirmation {
    /// Unique identifier
    pub id: ConfirmationId,
    /// The meeting group this confirmation belongs to
    pub meeting_group: MeetingGroup,
    /// The confirming actor
    pub actor: ActorId,
    /// Display name captured at creation
    pub actor_name: String,
    /// The subset of the meeting's projects this actor is tied to
    pub project_ids: Vec<ProjectId>,
    /// Current status
    pub status: ConfirmationStatus,
    /// When the actor decided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Decision comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// 1-based rank assigned at creation, stable for the meeting group
    pub confirmation_order: u32,
}

impl ParticipantConfirmation {
    /// Create a Pending participant confirmation with its rank
    pub fn new(
        meeting_group: MeetingGroup,
        actor: ActorId,
        actor_name: impl Into<String>,
        project_ids: Vec<ProjectId>,
        confirmation_order: u32,
    ) -> Self {
        Self {
            id: ConfirmationId::generate(),
            meeting_group,
            actor,
            actor_name: actor_name.into(),
            project_ids,
            status: ConfirmationStatus::Pending,
            confirmed_at: None,
            comments: None,
            confirmation_order,
        }
    }

    /// Record the actor's decision
    pub fn record(&mut self, confirmed: bool, comments: Option<String>) {
        self.status = if confirmed {
            ConfirmationStatus::Confirmed
        } else {
            ConfirmationStatus::Rejected
        };
        self.confirmed_at = Some(Utc::now());
        self.comments = comments;
    }
}
