//! The engine facade: the inbound surface of the crate
//!
//! [`ReserveEngine`] owns the entity store and the actor directory and
//! composes the protocol components around them. Embedding applications
//! call it directly; every human decision still flows through
//! [`process_todo`](ReserveEngine::process_todo).

use crate::{
    ActorDirectory, EngineError, EngineResult, ParticipantConfirmationProtocol, ProjectLifecycle,
    ReportProtocol, TodoDispatcher,
};
use chrono::{DateTime, Utc};
use reserve_store::EntityStore;
use reserve_types::{
    ActorId, Affiliation, Approval, ApprovalDecision, ApprovalId, ApprovalReport, MeetingGroup,
    MeetingInfo, MonthlyReview, ParticipantConfirmation, Project, ProjectId, ReportId, ReviewId,
    ReviewStatus, TodoAction, TodoId, TodoItem,
};

/// Orchestrates the reserve project workflow over an in-memory store
pub struct ReserveEngine {
    store: EntityStore,
    directory: ActorDirectory,
    lifecycle: ProjectLifecycle,
    participants: ParticipantConfirmationProtocol,
    reports: ReportProtocol,
    dispatcher: TodoDispatcher,
}

impl ReserveEngine {
    /// Create an engine with an empty store and the given directory
    pub fn new(directory: ActorDirectory) -> Self {
        Self {
            store: EntityStore::new(),
            directory,
            lifecycle: ProjectLifecycle::new(),
            participants: ParticipantConfirmationProtocol::new(),
            reports: ReportProtocol::new(),
            dispatcher: TodoDispatcher::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn directory(&self) -> &ActorDirectory {
        &self.directory
    }

    // ── Projects ─────────────────────────────────────────────────────

    /// Create a project in Drafting, owned by a registered actor
    pub fn create_project(
        &mut self,
        name: impl Into<String>,
        affiliation: Affiliation,
        owner: ActorId,
    ) -> EngineResult<Project> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::validation("project name must not be empty"));
        }
        if self.directory.get(&owner).is_none() {
            return Err(EngineError::validation(format!(
                "owner {} is not a registered actor",
                owner
            )));
        }
        let project = self
            .store
            .projects
            .insert(Project::new(name, affiliation, owner))?;
        tracing::info!(project = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Rename a draft. Edits are allowed only while the project is in
    /// Drafting; any other status is a validation error.
    pub fn update_draft(
        &mut self,
        project_id: &ProjectId,
        name: impl Into<String>,
    ) -> EngineResult<Project> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::validation("project name must not be empty"));
        }
        let project = self
            .store
            .projects
            .get(project_id)
            .ok_or_else(|| EngineError::ProjectNotFound(project_id.clone()))?;
        if !project.is_editable() {
            return Err(EngineError::validation(format!(
                "project {} is not editable (status {:?})",
                project_id.short(),
                project.status
            )));
        }
        let project = self
            .store
            .projects
            .update(project_id, |p| {
                p.name = name;
                p.updated_at = Utc::now();
            })?
            .clone();
        Ok(project)
    }

    pub fn get_project(&self, project_id: &ProjectId) -> EngineResult<Project> {
        self.store
            .projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| EngineError::ProjectNotFound(project_id.clone()))
    }

    pub fn projects_owned_by(&self, owner: &ActorId) -> Vec<Project> {
        self.store
            .projects
            .find(|p| &p.owner == owner)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Submit a draft for owner-level approval
    pub fn submit_for_approval(
        &mut self,
        project_id: &ProjectId,
        submitter: ActorId,
        approver: ActorId,
    ) -> EngineResult<Approval> {
        self.lifecycle
            .submit_for_approval(&mut self.store, project_id, submitter, approver)
    }

    /// Decide a pending approval directly, bypassing its todo
    pub fn decide_approval(
        &mut self,
        approval_id: &ApprovalId,
        decision: ApprovalDecision,
        comments: Option<String>,
    ) -> EngineResult<Approval> {
        self.lifecycle
            .decide_approval(&mut self.store, approval_id, decision, comments)
    }

    // ── Monthly reviews ──────────────────────────────────────────────

    /// Schedule one review meeting covering several projects.
    ///
    /// Creates one MonthlyReview per project, all sharing a meeting
    /// group keyed on date, slot, and reviewer name. Fails before any
    /// write if the reviewer is unknown, a project is missing or not
    /// UnderReview, or a project already has a review.
    #[allow(clippy::too_many_arguments)]
    pub fn initiate_review_meeting(
        &mut self,
        project_ids: &[ProjectId],
        reviewer: ActorId,
        slot: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location: impl Into<String>,
    ) -> EngineResult<MeetingGroup> {
        let reviewer_name = self
            .directory
            .get(&reviewer)
            .map(|a| a.name.clone())
            .ok_or_else(|| {
                EngineError::validation(format!("reviewer {} is not a registered actor", reviewer))
            })?;
        for project_id in project_ids {
            let project = self
                .store
                .projects
                .get(project_id)
                .ok_or_else(|| EngineError::ProjectNotFound(project_id.clone()))?;
            if project.status != reserve_types::ProjectStatus::UnderReview {
                return Err(EngineError::validation(format!(
                    "project {} is not under review (status {:?})",
                    project_id.short(),
                    project.status
                )));
            }
            if self
                .store
                .reviews
                .find_one(|r| &r.project_id == project_id)
                .is_some()
            {
                return Err(EngineError::validation(format!(
                    "project {} already has a monthly review",
                    project_id.short()
                )));
            }
        }

        let group = MeetingGroup::from_parts(
            &start_time.format("%Y-%m-%d").to_string(),
            slot,
            &reviewer_name,
        );
        let location = location.into();
        for project_id in project_ids {
            self.store.reviews.insert(
                MonthlyReview::new(project_id.clone(), start_time, reviewer.clone()).with_meeting(
                    MeetingInfo {
                        start_time,
                        end_time,
                        location: location.clone(),
                        meeting_group: group.clone(),
                    },
                ),
            )?;
        }
        tracing::info!(group = %group, projects = project_ids.len(), "review meeting initiated");
        Ok(group)
    }

    /// Record that a review took place
    pub fn mark_reviewed(
        &mut self,
        review_id: &ReviewId,
        comments: Option<String>,
    ) -> EngineResult<MonthlyReview> {
        let review = self
            .store
            .reviews
            .get(review_id)
            .ok_or_else(|| EngineError::ReviewNotFound(review_id.clone()))?;
        if review.status != ReviewStatus::PendingReview {
            return Err(EngineError::validation(format!(
                "review {} is not pending (status {:?})",
                review_id, review.status
            )));
        }
        let review = self
            .store
            .reviews
            .update(review_id, |r| {
                r.status = ReviewStatus::Reviewed;
                r.comments = comments;
            })?
            .clone();
        tracing::info!(review = %review.id, "review recorded");
        Ok(review)
    }

    /// Start the participant confirmation round for one meeting group
    pub fn start_participant_confirmation(
        &mut self,
        meeting_group: &MeetingGroup,
    ) -> EngineResult<Vec<ParticipantConfirmation>> {
        let review_ids: Vec<ReviewId> = self
            .store
            .reviews
            .find(|r| r.meeting_group() == Some(meeting_group))
            .into_iter()
            .map(|r| r.id.clone())
            .collect();
        self.participants
            .start(&mut self.store, &self.directory, meeting_group, &review_ids)
    }

    /// Check whether every participant of the meeting group confirmed
    pub fn all_participants_confirmed(&self, meeting_group: &MeetingGroup) -> bool {
        self.participants.all_confirmed(&self.store, meeting_group)
    }

    // ── Approval reports ─────────────────────────────────────────────

    /// Create a Draft report over reviews of one meeting group
    pub fn create_report(
        &mut self,
        meeting_group: MeetingGroup,
        template_type: impl Into<String>,
        selected_reviews: Vec<ReviewId>,
        table_data: serde_json::Value,
    ) -> EngineResult<ApprovalReport> {
        if selected_reviews.is_empty() {
            return Err(EngineError::validation(
                "a report must select at least one review",
            ));
        }
        for review_id in &selected_reviews {
            let review = self
                .store
                .reviews
                .get(review_id)
                .ok_or_else(|| EngineError::ReviewNotFound(review_id.clone()))?;
            if review.meeting_group() != Some(&meeting_group) {
                return Err(EngineError::validation(format!(
                    "review {} does not belong to meeting {}",
                    review_id, meeting_group
                )));
            }
        }
        let report = self.store.reports.insert(
            ApprovalReport::new(meeting_group, template_type, selected_reviews)
                .with_table_data(table_data),
        )?;
        tracing::info!(report = %report.id, "report created");
        Ok(report)
    }

    /// Start the confirmation chain of a Draft report
    pub fn start_report_workflow(&mut self, report_id: &ReportId) -> EngineResult<()> {
        self.reports
            .start_workflow(&mut self.store, &self.directory, report_id)
    }

    /// Give the final decision on a report directly, bypassing its todo
    pub fn finalize_report(
        &mut self,
        report_id: &ReportId,
        approved: bool,
        comments: Option<String>,
    ) -> EngineResult<ApprovalReport> {
        self.reports
            .finalize(&mut self.store, &self.directory, report_id, approved, comments)
    }

    // ── Todos ────────────────────────────────────────────────────────

    /// Register a manually issued todo
    pub fn create_todo(&mut self, todo: TodoItem) -> EngineResult<TodoItem> {
        self.dispatcher.create(&mut self.store, todo)
    }

    /// All Pending todos for one actor, highest priority first
    pub fn pending_todos_for(&self, actor: &ActorId) -> Vec<TodoItem> {
        self.dispatcher.pending_for(&self.store, actor)
    }

    /// Process one todo. The single entry point for human decisions.
    pub fn process_todo(
        &mut self,
        todo_id: &TodoId,
        action: TodoAction,
        comments: Option<String>,
    ) -> EngineResult<TodoItem> {
        self.dispatcher
            .process(&mut self.store, &self.directory, todo_id, action, comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use reserve_types::{
        Actor, ConfirmStep, ProjectStatus, ReportStatus, Role, TodoKind, TodoStatus,
        PLANNING_DEPARTMENT,
    };

    /// A directory with one actor per role, centered on "sensor-center"
    fn make_directory() -> ActorDirectory {
        let mut directory = ActorDirectory::new();
        directory.add(Actor::new("Owner A", Role::Owner).with_id(ActorId::new("owner-a")));
        directory.add(
            Actor::new("Center Lead", Role::CenterLead)
                .with_id(ActorId::new("lead-c"))
                .with_center("sensor-center"),
        );
        directory.add(
            Actor::new("Center Specialist", Role::CenterSpecialist)
                .with_id(ActorId::new("spec-c")),
        );
        directory.add(
            Actor::new("Planning Specialist", Role::DepartmentSpecialist)
                .with_id(ActorId::new("spec-p"))
                .with_department(PLANNING_DEPARTMENT),
        );
        directory.add(Actor::new("Reviewer", Role::Reviewer).with_id(ActorId::new("rev-x")));
        directory.add(
            Actor::new("Institute Lead", Role::InstituteLead).with_id(ActorId::new("ilead")),
        );
        directory
    }

    fn make_engine() -> ReserveEngine {
        ReserveEngine::new(make_directory())
    }

    /// Drive one project from creation to UnderReview via its todo
    fn reviewed_project(engine: &mut ReserveEngine, name: &str) -> ProjectId {
        let project = engine
            .create_project(name, Affiliation::center("sensor-center"), ActorId::new("owner-a"))
            .unwrap();
        engine
            .submit_for_approval(&project.id, ActorId::new("owner-a"), ActorId::new("lead-c"))
            .unwrap();
        let todo = engine.pending_todos_for(&ActorId::new("lead-c"))[0].clone();
        engine
            .process_todo(&todo.id, TodoAction::Approve, None)
            .unwrap();
        project.id
    }

    /// Run a meeting with reviews for the given projects up to a Draft
    /// report in the Confirming state
    fn confirming_report(
        engine: &mut ReserveEngine,
        project_ids: &[ProjectId],
    ) -> (MeetingGroup, ReportId) {
        let start = Utc::now();
        let group = engine
            .initiate_review_meeting(
                project_ids,
                ActorId::new("rev-x"),
                "t1",
                start,
                start + Duration::hours(2),
                "Room 301",
            )
            .unwrap();
        let review_ids: Vec<ReviewId> = engine
            .store()
            .reviews
            .find(|r| r.meeting_group() == Some(&group))
            .into_iter()
            .map(|r| r.id.clone())
            .collect();
        for review_id in &review_ids {
            engine.mark_reviewed(review_id, Some("on track".into())).unwrap();
        }
        let report = engine
            .create_report(
                group.clone(),
                "monthly",
                review_ids,
                serde_json::json!({ "rows": [] }),
            )
            .unwrap();
        engine.start_report_workflow(&report.id).unwrap();
        (group, report.id)
    }

    /// Process the currently open chain-step todo of a report
    fn confirm_open_step(engine: &mut ReserveEngine, report_id: &ReportId) {
        let todo = engine
            .store()
            .todos
            .find_one(|t| t.is_chain_step_for(report_id) && t.is_pending())
            .unwrap()
            .id
            .clone();
        engine
            .process_todo(&todo, TodoAction::Confirm, None)
            .unwrap();
    }

    #[test]
    fn test_full_scenario_submit_to_approved() {
        let mut engine = make_engine();
        let project_id = reviewed_project(&mut engine, "Sensor Platform");
        assert_eq!(
            engine.get_project(&project_id).unwrap().status,
            ProjectStatus::UnderReview
        );

        let (_, report_id) = confirming_report(&mut engine, &[project_id.clone()]);

        // Three chain steps: center specialist, center lead, planning.
        confirm_open_step(&mut engine, &report_id);
        confirm_open_step(&mut engine, &report_id);
        confirm_open_step(&mut engine, &report_id);

        let approve_todo = engine.pending_todos_for(&ActorId::new("ilead"))[0].clone();
        assert!(matches!(approve_todo.kind, TodoKind::ReportApprove { .. }));
        engine
            .process_todo(&approve_todo.id, TodoAction::Approve, Some("approved".into()))
            .unwrap();

        assert_eq!(
            engine.get_project(&project_id).unwrap().status,
            ProjectStatus::Approved
        );
        let report = engine.store().reports.get(&report_id).unwrap();
        assert_eq!(report.status, ReportStatus::Approved);
    }

    #[test]
    fn test_chain_steps_reach_expected_actors_in_order() {
        let mut engine = make_engine();
        let project_id = reviewed_project(&mut engine, "Sensor Platform");
        let (_, report_id) = confirming_report(&mut engine, &[project_id]);

        let expected = [
            (ActorId::new("spec-c"), ConfirmStep::CenterSpecialist),
            (ActorId::new("lead-c"), ConfirmStep::CenterLead),
            (ActorId::new("spec-p"), ConfirmStep::DepartmentSpecialist),
        ];
        for (actor, step) in expected {
            let open: Vec<&TodoItem> = engine
                .store()
                .todos
                .find(|t| t.is_chain_step_for(&report_id) && t.is_pending());
            assert_eq!(open.len(), 1);
            assert_eq!(open[0].assigned_to, actor);
            assert!(
                matches!(open[0].kind, TodoKind::ReportConfirm { step: s, .. } if s == step)
            );
            confirm_open_step(&mut engine, &report_id);
        }
    }

    #[test]
    fn test_processing_a_todo_twice_fails() {
        let mut engine = make_engine();
        let project = engine
            .create_project(
                "Sensor Platform",
                Affiliation::center("sensor-center"),
                ActorId::new("owner-a"),
            )
            .unwrap();
        engine
            .submit_for_approval(&project.id, ActorId::new("owner-a"), ActorId::new("lead-c"))
            .unwrap();
        let todo = engine.pending_todos_for(&ActorId::new("lead-c"))[0].clone();

        engine
            .process_todo(&todo.id, TodoAction::Approve, None)
            .unwrap();
        let result = engine.process_todo(&todo.id, TodoAction::Approve, None);
        assert!(matches!(result, Err(EngineError::AlreadyProcessed(_))));

        // The project advanced exactly once.
        assert_eq!(
            engine.get_project(&project.id).unwrap().status,
            ProjectStatus::UnderReview
        );
    }

    #[test]
    fn test_final_rejection_rolls_back_project_and_review() {
        let mut engine = make_engine();
        let project_id = reviewed_project(&mut engine, "Sensor Platform");
        let (group, report_id) = confirming_report(&mut engine, &[project_id.clone()]);
        for _ in 0..3 {
            confirm_open_step(&mut engine, &report_id);
        }

        let approve_todo = engine.pending_todos_for(&ActorId::new("ilead"))[0].clone();
        engine
            .process_todo(
                &approve_todo.id,
                TodoAction::Reject,
                Some("budget mismatch".into()),
            )
            .unwrap();

        let project = engine.get_project(&project_id).unwrap();
        assert_eq!(project.status, ProjectStatus::Drafting);
        assert!(!project.submitted_for_approval);

        let review = engine
            .store()
            .reviews
            .find_one(|r| r.meeting_group() == Some(&group))
            .unwrap();
        assert_eq!(review.status, ReviewStatus::PendingReview);
        assert!(review.comments.as_deref().unwrap().contains("budget mismatch"));

        // Related actors each received a rejection notice.
        let notices = engine.store().todos.find(|t| {
            matches!(&t.kind, TodoKind::ReportNotice { report_id: r } if r == &report_id)
        });
        assert!(!notices.is_empty());
        assert!(engine
            .pending_todos_for(&ActorId::new("owner-a"))
            .iter()
            .any(|t| matches!(&t.kind, TodoKind::ReportNotice { .. })));
    }

    #[test]
    fn test_one_report_covers_a_whole_meeting_group() {
        let mut engine = make_engine();
        let first = reviewed_project(&mut engine, "Sensor Platform");
        let second = reviewed_project(&mut engine, "Optics Bench");
        let (_, report_id) = confirming_report(&mut engine, &[first.clone(), second.clone()]);

        for _ in 0..3 {
            confirm_open_step(&mut engine, &report_id);
        }
        let approve_todo = engine.pending_todos_for(&ActorId::new("ilead"))[0].clone();
        engine
            .process_todo(&approve_todo.id, TodoAction::Approve, None)
            .unwrap();

        for project_id in [&first, &second] {
            assert_eq!(
                engine.get_project(project_id).unwrap().status,
                ProjectStatus::Approved
            );
        }
    }

    #[test]
    fn test_participant_confirmation_round() {
        let mut engine = make_engine();
        let project_id = reviewed_project(&mut engine, "Sensor Platform");
        let start = Utc::now();
        let group = engine
            .initiate_review_meeting(
                &[project_id],
                ActorId::new("rev-x"),
                "t1",
                start,
                start + Duration::hours(2),
                "Room 301",
            )
            .unwrap();

        let confirmations = engine.start_participant_confirmation(&group).unwrap();
        // Owner, center lead, reviewer.
        assert_eq!(confirmations.len(), 3);
        assert!(!engine.all_participants_confirmed(&group));

        for confirmation in &confirmations {
            let todo = engine
                .pending_todos_for(&confirmation.actor)
                .into_iter()
                .find(|t| matches!(&t.kind, TodoKind::ParticipantConfirm { .. }))
                .unwrap();
            engine
                .process_todo(&todo.id, TodoAction::Confirm, None)
                .unwrap();
        }
        assert!(engine.all_participants_confirmed(&group));
    }

    #[test]
    fn test_meeting_rejects_projects_with_existing_reviews() {
        let mut engine = make_engine();
        let project_id = reviewed_project(&mut engine, "Sensor Platform");
        let start = Utc::now();
        engine
            .initiate_review_meeting(
                &[project_id.clone()],
                ActorId::new("rev-x"),
                "t1",
                start,
                start + Duration::hours(2),
                "Room 301",
            )
            .unwrap();

        let result = engine.initiate_review_meeting(
            &[project_id],
            ActorId::new("rev-x"),
            "t2",
            start,
            start + Duration::hours(2),
            "Room 301",
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(engine.store().reviews.len(), 1);
    }

    #[test]
    fn test_meeting_requires_projects_under_review() {
        let mut engine = make_engine();
        let project = engine
            .create_project(
                "Sensor Platform",
                Affiliation::center("sensor-center"),
                ActorId::new("owner-a"),
            )
            .unwrap();
        let start = Utc::now();
        let result = engine.initiate_review_meeting(
            &[project.id],
            ActorId::new("rev-x"),
            "t1",
            start,
            start + Duration::hours(2),
            "Room 301",
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_update_draft_only_while_drafting() {
        let mut engine = make_engine();
        let project = engine
            .create_project(
                "Sensor Platform",
                Affiliation::center("sensor-center"),
                ActorId::new("owner-a"),
            )
            .unwrap();

        let renamed = engine.update_draft(&project.id, "Sensor Platform v2").unwrap();
        assert_eq!(renamed.name, "Sensor Platform v2");

        engine
            .submit_for_approval(&project.id, ActorId::new("owner-a"), ActorId::new("lead-c"))
            .unwrap();
        let todo = engine.pending_todos_for(&ActorId::new("lead-c"))[0].clone();
        engine
            .process_todo(&todo.id, TodoAction::Approve, None)
            .unwrap();

        let result = engine.update_draft(&project.id, "Sensor Platform v3");
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_create_project_requires_registered_owner() {
        let mut engine = make_engine();
        let result = engine.create_project(
            "Sensor Platform",
            Affiliation::center("sensor-center"),
            ActorId::new("nobody"),
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_create_report_validates_reviews() {
        let mut engine = make_engine();
        let result = engine.create_report(
            MeetingGroup::new("g1"),
            "monthly",
            vec![ReviewId::new("missing")],
            serde_json::Value::Null,
        );
        assert!(matches!(result, Err(EngineError::ReviewNotFound(_))));

        let empty = engine.create_report(
            MeetingGroup::new("g1"),
            "monthly",
            vec![],
            serde_json::Value::Null,
        );
        assert!(matches!(empty, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_manual_todo_roundtrip() {
        let mut engine = make_engine();
        let todo = engine
            .create_todo(
                TodoItem::new(
                    TodoKind::ReportNotice {
                        report_id: ReportId::new("rep-1"),
                    },
                    "Read the meeting minutes",
                    ActorId::new("owner-a"),
                    ActorId::new("lead-c"),
                )
                .with_description("Minutes attached to the shared drive"),
            )
            .unwrap();

        let pending = engine.pending_todos_for(&ActorId::new("owner-a"));
        assert_eq!(pending.len(), 1);

        let processed = engine
            .process_todo(&todo.id, TodoAction::Confirm, Some("read".into()))
            .unwrap();
        assert_eq!(processed.status, TodoStatus::Processed);
        assert!(engine.pending_todos_for(&ActorId::new("owner-a")).is_empty());
    }
}
