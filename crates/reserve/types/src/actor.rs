//! Actors: the human participants of the workflow
//!
//! The directory of actors is injected data supplied by the embedding
//! application. Roles and affiliations are static for the life of a
//! process; the engine never mutates actors.

use serde::{Deserialize, Serialize};

/// The department that owns step 3 of the report confirmation chain.
pub const PLANNING_DEPARTMENT: &str = "planning";

// ── Actor Identifier ─────────────────────────────────────────────────

/// Unique identifier for an actor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id used as `assigned_by` on todos the engine issues itself.
    pub fn system() -> Self {
        Self("system".to_string())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Role ─────────────────────────────────────────────────────────────

/// Static role of an actor in the institute directory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Owns and drafts projects
    Owner,
    /// Leads a center; approves center-owned projects, confirms step 2
    CenterLead,
    /// Leads a department; approves department-owned projects
    DepartmentLead,
    /// Center-side specialist; confirms step 1 of the report chain
    CenterSpecialist,
    /// Department-side specialist; confirms step 3 (planning department)
    DepartmentSpecialist,
    /// Conducts monthly reviews
    Reviewer,
    /// Gives final approval on reports
    InstituteLead,
}

// ── Actor ────────────────────────────────────────────────────────────

/// A human participant resolved by the directory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier
    pub id: ActorId,
    /// Display name
    pub name: String,
    /// Static role
    pub role: Role,
    /// Department affiliation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Center affiliation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
}

impl Actor {
    /// Create a new actor with a generated id
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId::generate(),
            name: name.into(),
            role,
            department: None,
            center: None,
        }
    }

    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = id;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_center(mut self, center: impl Into<String>) -> Self {
        self.center = Some(center.into());
        self
    }

    /// Check if this actor belongs to the given center
    pub fn in_center(&self, center: &str) -> bool {
        self.center.as_deref() == Some(center)
    }

    /// Check if this actor belongs to the given department
    pub fn in_department(&self, department: &str) -> bool {
        self.department.as_deref() == Some(department)
    }
}
