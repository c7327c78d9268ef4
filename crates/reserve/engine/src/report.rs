//! Approval report protocol: sequential three-step confirmation
//! followed by one terminal approve/reject decision
//!
//! The chain is gated by counting Processed chain-step todos for the
//! report, re-read from the store at every check. At most one chain
//! todo is outstanding per report at any time: an open step suppresses
//! creation of the next, which makes advancement idempotent under
//! duplicate completion events.

use crate::{ActorDirectory, EngineError, EngineResult, ProjectLifecycle};
use reserve_store::EntityStore;
use reserve_types::{
    ActorId, ApprovalReport, ConfirmStep, ProjectStatus, ReportConfirmation, ReportId,
    ReportStatus, TodoItem, TodoStatus,
};

/// The approval report confirmation-and-approval protocol
#[derive(Clone, Debug, Default)]
pub struct ReportProtocol {
    lifecycle: ProjectLifecycle,
}

impl ReportProtocol {
    pub fn new() -> Self {
        Self {
            lifecycle: ProjectLifecycle::new(),
        }
    }

    /// Start the confirmation workflow for a Draft report.
    ///
    /// Moves the report to Confirming and issues the step-1 todo for
    /// the center specialist. Later steps are materialized lazily as
    /// earlier ones complete.
    pub fn start_workflow(
        &self,
        store: &mut EntityStore,
        directory: &ActorDirectory,
        report_id: &ReportId,
    ) -> EngineResult<()> {
        let report = store
            .reports
            .get(report_id)
            .ok_or_else(|| EngineError::ReportNotFound(report_id.clone()))?;
        match report.status {
            ReportStatus::Draft | ReportStatus::PendingConfirm => {}
            status => {
                return Err(EngineError::validation(format!(
                    "report {} workflow already started (status {:?})",
                    report_id.short(),
                    status
                )))
            }
        }

        let assignee = directory
            .step_assignee(ConfirmStep::CenterSpecialist)
            .ok_or_else(|| EngineError::validation("no center specialist registered"))?
            .clone();

        store
            .reports
            .update(report_id, |r| r.set_status(ReportStatus::Confirming))?;
        self.issue_step(store, report_id, ConfirmStep::CenterSpecialist, &assignee.id, &assignee.name)?;

        tracing::info!(report = %report_id, "report confirmation workflow started");
        Ok(())
    }

    /// Check that the actor owed work once one more step completes is
    /// registered: the next step's assignee, or the institute lead when
    /// the chain is about to finish.
    ///
    /// Callers run this before consuming a step todo so that a missing
    /// assignee fails the whole call with nothing written and the todo
    /// still Pending.
    pub fn ensure_next_assignee(
        &self,
        store: &EntityStore,
        directory: &ActorDirectory,
        report_id: &ReportId,
    ) -> EngineResult<()> {
        let report = store
            .reports
            .get(report_id)
            .ok_or_else(|| EngineError::ReportNotFound(report_id.clone()))?;
        if report.status != ReportStatus::Confirming {
            return Ok(());
        }
        let completed = store
            .todos
            .find(|t| t.is_chain_step_for(report_id) && t.status == TodoStatus::Processed)
            .len();
        match ConfirmStep::after_completed(completed + 1) {
            Some(step) => directory.step_assignee(step).map(|_| ()).ok_or_else(|| {
                EngineError::validation(format!("no assignee registered for {}", step))
            }),
            None => directory
                .institute_lead()
                .map(|_| ())
                .ok_or_else(|| EngineError::validation("no institute lead registered")),
        }
    }

    /// Advance the chain after a step todo was processed.
    ///
    /// Counts Processed chain todos for this report and issues the
    /// next step, or moves the report to PendingApproval after step 3.
    /// Idempotent: an open chain todo, or a report already past
    /// Confirming, makes this a no-op.
    pub fn advance_on_step_completion(
        &self,
        store: &mut EntityStore,
        directory: &ActorDirectory,
        report_id: &ReportId,
    ) -> EngineResult<()> {
        let report = store
            .reports
            .get(report_id)
            .ok_or_else(|| EngineError::ReportNotFound(report_id.clone()))?;
        if report.status != ReportStatus::Confirming {
            tracing::debug!(report = %report_id, status = ?report.status, "nothing to advance");
            return Ok(());
        }

        // A step still outstanding: duplicate completion event.
        if store
            .todos
            .find_one(|t| t.is_chain_step_for(report_id) && t.is_pending())
            .is_some()
        {
            tracing::debug!(report = %report_id, "open chain step, not advancing");
            return Ok(());
        }

        let completed = store
            .todos
            .find(|t| t.is_chain_step_for(report_id) && t.status == TodoStatus::Processed)
            .len();

        match ConfirmStep::after_completed(completed) {
            Some(step) if completed > 0 => {
                let assignee = directory.step_assignee(step).ok_or_else(|| {
                    EngineError::validation(format!("no assignee registered for {}", step))
                })?;
                let (assignee_id, assignee_name) = (assignee.id.clone(), assignee.name.clone());
                self.issue_step(store, report_id, step, &assignee_id, &assignee_name)?;
            }
            Some(_) => {
                // Nothing processed yet and no open todo; the workflow
                // was never started for this report.
                tracing::debug!(report = %report_id, "no completed steps, not advancing");
            }
            None => {
                // All three steps processed: hand over for final approval.
                let lead = directory
                    .institute_lead()
                    .ok_or_else(|| EngineError::validation("no institute lead registered"))?;
                let lead_id = lead.id.clone();
                store.reports.update(report_id, |r| {
                    r.final_approver = Some(lead_id.clone());
                    r.set_status(ReportStatus::PendingApproval);
                })?;
                store
                    .todos
                    .insert(TodoItem::report_approve(report_id.clone(), lead_id.clone()))?;
                tracing::info!(
                    report = %report_id,
                    approver = %lead_id,
                    "all steps confirmed, report pending final approval"
                );
            }
        }
        Ok(())
    }

    /// Give the final decision on a report that completed the chain.
    ///
    /// Approved: every project reached through the selected reviews
    /// that is still UnderReview moves to Approved; projects in any
    /// other state are logged and skipped. Rejected: every such
    /// project rolls back to
    /// Drafting, its review resets to PendingReview carrying the
    /// rejection reason, and a notice todo goes to every related actor.
    /// Propagation is best-effort sequential; unreachable records are
    /// logged and skipped.
    pub fn finalize(
        &self,
        store: &mut EntityStore,
        directory: &ActorDirectory,
        report_id: &ReportId,
        approved: bool,
        comments: Option<String>,
    ) -> EngineResult<ApprovalReport> {
        let report = store
            .reports
            .get(report_id)
            .ok_or_else(|| EngineError::ReportNotFound(report_id.clone()))?;
        if report.status != ReportStatus::PendingApproval {
            return Err(EngineError::validation(format!(
                "report {} is not awaiting final approval (status {:?})",
                report_id.short(),
                report.status
            )));
        }
        let selected_reviews = report.selected_reviews.clone();

        let report = store
            .reports
            .update(report_id, |r| r.record_final_decision(approved, comments.clone()))?
            .clone();

        let reason = comments.unwrap_or_default();
        for review_id in &selected_reviews {
            let Some(review) = store.reviews.get(review_id) else {
                tracing::warn!(report = %report_id, review = %review_id, "selected review missing, skipped");
                continue;
            };
            let project_id = review.project_id.clone();

            if approved {
                match store.projects.get(&project_id).map(|p| p.status) {
                    Some(ProjectStatus::UnderReview) => {
                        store
                            .projects
                            .update(&project_id, |p| p.set_status(ProjectStatus::Approved))?;
                    }
                    Some(status) => {
                        tracing::warn!(report = %report_id, project = %project_id, ?status, "project not under review, skipped");
                    }
                    None => {
                        tracing::warn!(report = %report_id, project = %project_id, "project missing, skipped");
                    }
                }
            } else {
                if let Err(e) = self.lifecycle.reject_review(store, &project_id) {
                    tracing::warn!(report = %report_id, project = %project_id, error = %e, "project not rolled back, skipped");
                }
                store.reviews.update(review_id, |r| {
                    r.reset_pending(format!("report rejected: {}", reason))
                })?;
            }
        }

        if !approved {
            for actor in directory.related_actors(store, &selected_reviews) {
                store
                    .todos
                    .insert(TodoItem::report_notice(report_id.clone(), actor.id))?;
            }
        }

        tracing::info!(report = %report_id, approved, "report finalized");
        Ok(report)
    }

    /// Create the confirmation record and todo for one chain step.
    fn issue_step(
        &self,
        store: &mut EntityStore,
        report_id: &ReportId,
        step: ConfirmStep,
        assignee_id: &ActorId,
        assignee_name: &str,
    ) -> EngineResult<()> {
        store.report_confirmations.insert(ReportConfirmation::new(
            report_id.clone(),
            step,
            assignee_id.clone(),
            assignee_name,
        ))?;
        store.todos.insert(TodoItem::report_confirm(
            report_id.clone(),
            step,
            assignee_id.clone(),
        ))?;
        tracing::info!(report = %report_id, %step, assignee = %assignee_id, "chain step issued");
        Ok(())
    }
}
