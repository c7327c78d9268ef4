//! Project lifecycle: the four-state status machine
//!
//! Drafting -> UnderReview -> Approved -> Released. This component
//! owns the submission/approval transitions; report finalization (see
//! `report`) performs the UnderReview -> Approved step and the
//! rejection rollback for covered projects. Released is reached only
//! by the external planning-compilation step.

use crate::{EngineError, EngineResult};
use reserve_store::EntityStore;
use reserve_types::{
    Approval, ApprovalDecision, ApprovalId, ActorId, ProjectId, ProjectStatus, TodoItem,
};

/// The project lifecycle state machine
#[derive(Clone, Debug, Default)]
pub struct ProjectLifecycle;

impl ProjectLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Submit a Drafting project for approval.
    ///
    /// Creates a Pending approval and a project-approval todo for the
    /// approver, and marks the project submitted. Fails before any
    /// write if the project is missing, not Drafting, or already
    /// submitted.
    pub fn submit_for_approval(
        &self,
        store: &mut EntityStore,
        project_id: &ProjectId,
        submitter: ActorId,
        approver: ActorId,
    ) -> EngineResult<Approval> {
        let project = store
            .projects
            .get(project_id)
            .ok_or_else(|| EngineError::ProjectNotFound(project_id.clone()))?;

        if project.status != ProjectStatus::Drafting {
            return Err(EngineError::validation(format!(
                "project \"{}\" is not in Drafting",
                project.name
            )));
        }
        if project.submitted_for_approval {
            return Err(EngineError::AlreadySubmitted(project_id.clone()));
        }
        let project_name = project.name.clone();

        let approval = store.approvals.insert(Approval::new(
            project_id.clone(),
            submitter.clone(),
            approver.clone(),
        ))?;

        store
            .projects
            .update(project_id, |p| p.mark_submitted(approval.id.clone()))
            .map_err(|e| {
                tracing::warn!(
                    project = %project_id,
                    approval = %approval.id,
                    error = %e,
                    "approval created but project could not be marked submitted"
                );
                EngineError::partial_failure(format!(
                    "approval {} created but project {} not updated",
                    approval.id, project_id
                ))
            })?;

        store.todos.insert(TodoItem::project_approval(
            approval.id.clone(),
            &project_name,
            approver,
            submitter,
        ))?;

        tracing::info!(
            project = %project_id,
            approval = %approval.id,
            "project submitted for approval"
        );
        Ok(approval)
    }

    /// Decide a Pending approval.
    ///
    /// Accept moves the project to UnderReview; Reject returns it to
    /// Drafting. Both clear the submission flag and link. A rejection
    /// requires a non-empty comment.
    pub fn decide_approval(
        &self,
        store: &mut EntityStore,
        approval_id: &ApprovalId,
        decision: ApprovalDecision,
        comments: Option<String>,
    ) -> EngineResult<Approval> {
        let approval = store
            .approvals
            .get(approval_id)
            .ok_or_else(|| EngineError::ApprovalNotFound(approval_id.clone()))?;

        if !approval.is_pending() {
            return Err(EngineError::AlreadyDecided(approval_id.clone()));
        }
        if decision == ApprovalDecision::Reject
            && comments.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(EngineError::MissingComment);
        }
        let project_id = approval.project_id.clone();

        let approval = store
            .approvals
            .update(approval_id, |a| a.decide(decision, comments))?
            .clone();

        let next_status = match decision {
            ApprovalDecision::Accept => ProjectStatus::UnderReview,
            ApprovalDecision::Reject => ProjectStatus::Drafting,
        };
        store
            .projects
            .update(&project_id, |p| {
                p.set_status(next_status);
                p.clear_submission();
            })
            .map_err(|e| {
                tracing::warn!(
                    approval = %approval_id,
                    project = %project_id,
                    error = %e,
                    "approval decided but project status not updated"
                );
                EngineError::partial_failure(format!(
                    "approval {} decided but project {} not updated",
                    approval_id, project_id
                ))
            })?;

        tracing::info!(
            approval = %approval_id,
            project = %project_id,
            decision = ?decision,
            "approval decided"
        );
        Ok(approval)
    }

    /// Force a project back to Drafting after a failed monthly review.
    ///
    /// Unconditional recovery transition: callers invoke it only from
    /// the review-rejection path.
    pub fn reject_review(&self, store: &mut EntityStore, project_id: &ProjectId) -> EngineResult<()> {
        store
            .projects
            .update(project_id, |p| {
                p.set_status(ProjectStatus::Drafting);
                p.clear_submission();
            })
            .map_err(|_| EngineError::ProjectNotFound(project_id.clone()))?;

        tracing::info!(project = %project_id, "project returned to Drafting after review rejection");
        Ok(())
    }
}
