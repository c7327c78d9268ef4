//! Todo dispatch: the single entry point through which humans act
//!
//! Every protocol advances by processing a todo. The dispatcher
//! validates the action against the todo's kind and the current record
//! state, marks the todo Processed, and only then delegates to the
//! owning protocol. The order matters: chain advancement counts
//! Processed todos, so the completion must be visible before the
//! protocol looks.

use crate::{
    ActorDirectory, EngineError, EngineResult, ParticipantConfirmationProtocol, ProjectLifecycle,
    ReportProtocol,
};
use reserve_store::EntityStore;
use reserve_types::{
    ActorId, ApprovalDecision, ConfirmStep, ConfirmationId, ConfirmationStatus, ReportId,
    ReportStatus, TodoAction, TodoId, TodoItem, TodoKind,
};

/// Routes processed todos to the protocol that owns them
#[derive(Clone, Debug, Default)]
pub struct TodoDispatcher {
    lifecycle: ProjectLifecycle,
    participants: ParticipantConfirmationProtocol,
    reports: ReportProtocol,
}

impl TodoDispatcher {
    pub fn new() -> Self {
        Self {
            lifecycle: ProjectLifecycle::new(),
            participants: ParticipantConfirmationProtocol::new(),
            reports: ReportProtocol::new(),
        }
    }

    /// Register a todo. Todos start Pending; manual todos issued by one
    /// actor to another go through here as well as system-issued ones.
    pub fn create(&self, store: &mut EntityStore, todo: TodoItem) -> EngineResult<TodoItem> {
        let todo = store.todos.insert(todo)?;
        tracing::info!(todo = %todo.id, assigned_to = %todo.assigned_to, "todo created");
        Ok(todo)
    }

    /// All Pending todos assigned to one actor
    pub fn pending_for(&self, store: &EntityStore, actor: &ActorId) -> Vec<TodoItem> {
        let mut todos: Vec<TodoItem> = store
            .todos
            .find(|t| t.is_pending() && &t.assigned_to == actor)
            .into_iter()
            .cloned()
            .collect();
        todos.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        todos
    }

    /// Process one todo with the given action.
    ///
    /// A todo is consumed exactly once; processing it again is an
    /// AlreadyProcessed error. Preconditions are checked before any
    /// write, so a failed call leaves the todo Pending and actionable.
    pub fn process(
        &self,
        store: &mut EntityStore,
        directory: &ActorDirectory,
        todo_id: &TodoId,
        action: TodoAction,
        comments: Option<String>,
    ) -> EngineResult<TodoItem> {
        let todo = store
            .todos
            .get(todo_id)
            .ok_or_else(|| EngineError::TodoNotFound(todo_id.clone()))?;
        if !todo.is_pending() {
            return Err(EngineError::AlreadyProcessed(todo_id.clone()));
        }
        let kind = todo.kind.clone();

        match kind {
            TodoKind::ProjectApproval { approval_id } => {
                let decision = match action {
                    TodoAction::Approve | TodoAction::Confirm => ApprovalDecision::Accept,
                    TodoAction::Reject => {
                        require_comment(&comments)?;
                        ApprovalDecision::Reject
                    }
                };
                let approval = store.approvals.get_or_err(&approval_id)?;
                if !approval.is_pending() {
                    return Err(EngineError::AlreadyDecided(approval_id.clone()));
                }
                self.mark_processed(store, todo_id, comments.clone())?;
                self.lifecycle
                    .decide_approval(store, &approval_id, decision, comments)?;
            }

            TodoKind::ReportConfirm { report_id, step } => {
                let confirmed = match action {
                    TodoAction::Confirm | TodoAction::Approve => true,
                    TodoAction::Reject => {
                        require_comment(&comments)?;
                        false
                    }
                };
                let confirmation_id = self.pending_step(store, &report_id, step)?;
                if confirmed {
                    self.reports.ensure_next_assignee(store, directory, &report_id)?;
                }
                self.mark_processed(store, todo_id, comments.clone())?;
                store
                    .report_confirmations
                    .update(&confirmation_id, |c| c.record(confirmed, comments))?;
                if confirmed {
                    self.reports
                        .advance_on_step_completion(store, directory, &report_id)?;
                } else {
                    tracing::warn!(
                        report = %report_id,
                        %step,
                        "chain step rejected, report stalled pending manual restart"
                    );
                }
            }

            TodoKind::ReportNotice { report_id } => {
                // Read-only acknowledgement, no protocol effect.
                self.mark_processed(store, todo_id, comments)?;
                tracing::debug!(report = %report_id, "rejection notice acknowledged");
            }

            TodoKind::ReportApprove { report_id } => {
                let approved = match action {
                    TodoAction::Approve | TodoAction::Confirm => true,
                    TodoAction::Reject => {
                        require_comment(&comments)?;
                        false
                    }
                };
                let report = store.reports.get_or_err(&report_id)?;
                if report.status != ReportStatus::PendingApproval {
                    return Err(EngineError::validation(format!(
                        "report {} is not awaiting final approval (status {:?})",
                        report_id.short(),
                        report.status
                    )));
                }
                self.mark_processed(store, todo_id, comments.clone())?;
                self.reports
                    .finalize(store, directory, &report_id, approved, comments)?;
            }

            TodoKind::ParticipantConfirm {
                meeting_group,
                confirmation_id,
                ..
            } => {
                let confirmed = match action {
                    TodoAction::Confirm | TodoAction::Approve => true,
                    TodoAction::Reject => {
                        require_comment(&comments)?;
                        false
                    }
                };
                self.mark_processed(store, todo_id, comments.clone())?;
                self.participants
                    .record_decision(store, &confirmation_id, confirmed, comments)?;
                if confirmed && self.participants.all_confirmed(store, &meeting_group) {
                    tracing::info!(group = %meeting_group, "all participants confirmed");
                }
            }
        }

        store
            .todos
            .get_or_err(todo_id)
            .map(|t| t.clone())
            .map_err(EngineError::from)
    }

    fn mark_processed(
        &self,
        store: &mut EntityStore,
        todo_id: &TodoId,
        comments: Option<String>,
    ) -> EngineResult<()> {
        store
            .todos
            .update(todo_id, |t| t.mark_processed(comments))?;
        tracing::info!(todo = %todo_id, "todo processed");
        Ok(())
    }

    /// The pending confirmation record of one chain step.
    fn pending_step(
        &self,
        store: &EntityStore,
        report_id: &ReportId,
        step: ConfirmStep,
    ) -> EngineResult<ConfirmationId> {
        store
            .report_confirmations
            .find_one(|c| {
                &c.report_id == report_id
                    && c.step == step
                    && c.status == ConfirmationStatus::Pending
            })
            .map(|c| c.id.clone())
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "no pending confirmation for report {} at {}",
                    report_id.short(),
                    step
                ))
            })
    }
}

fn require_comment(comments: &Option<String>) -> EngineResult<()> {
    match comments {
        Some(c) if !c.trim().is_empty() => Ok(()),
        _ => Err(EngineError::MissingComment),
    }
}
