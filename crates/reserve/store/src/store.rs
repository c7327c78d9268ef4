//! The aggregated entity store: one collection per entity type

use crate::{Collection, Entity};
use reserve_types::{
    Approval, ApprovalId, ApprovalReport, ConfirmationId, MonthlyReview, ParticipantConfirmation,
    Project, ProjectId, ReportConfirmation, ReportId, ReviewId, TodoId, TodoItem,
};

impl Entity for Project {
    type Id = ProjectId;
    const KIND: &'static str = "project";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Approval {
    type Id = ApprovalId;
    const KIND: &'static str = "approval";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for MonthlyReview {
    type Id = ReviewId;
    const KIND: &'static str = "monthly review";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for ApprovalReport {
    type Id = ReportId;
    const KIND: &'static str = "approval report";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for ReportConfirmation {
    type Id = ConfirmationId;
    const KIND: &'static str = "report confirmation";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for ParticipantConfirmation {
    type Id = ConfirmationId;
    const KIND: &'static str = "participant confirmation";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for TodoItem {
    type Id = TodoId;
    const KIND: &'static str = "todo";

    fn entity_id(&self) -> &Self::Id {
        &self.id
    }
}

/// The store owned by the process and passed explicitly into every
/// protocol component. No global singletons.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    pub projects: Collection<Project>,
    pub approvals: Collection<Approval>,
    pub reviews: Collection<MonthlyReview>,
    pub reports: Collection<ApprovalReport>,
    pub report_confirmations: Collection<ReportConfirmation>,
    pub participant_confirmations: Collection<ParticipantConfirmation>,
    pub todos: Collection<TodoItem>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}
