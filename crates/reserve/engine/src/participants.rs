//! Participant confirmation: every actor tied to a meeting group
//! confirms the report's treatment of their projects
//!
//! Unlike the report chain, all confirmation records and todos are
//! created eagerly and in parallel; any actor may confirm
//! independently and out of order. `confirmation_order` drives display
//! and todo numbering, it is not a gate.

use crate::{ActorDirectory, EngineError, EngineResult};
use chrono::{DateTime, Utc};
use reserve_store::EntityStore;
use reserve_types::{
    ConfirmationId, ConfirmationStatus, MeetingGroup, ParticipantConfirmation, ReviewId, TodoItem,
};

/// The meeting-group participant confirmation protocol
#[derive(Clone, Debug, Default)]
pub struct ParticipantConfirmationProtocol;

impl ParticipantConfirmationProtocol {
    pub fn new() -> Self {
        Self
    }

    /// Start confirmation for a meeting group.
    ///
    /// Resolves every distinct related actor with their project
    /// subset, ranks them by the earliest creation timestamp among
    /// their projects (ties keep resolution order: owner before center
    /// lead before department lead), and eagerly creates one Pending
    /// confirmation record plus one todo per actor.
    pub fn start(
        &self,
        store: &mut EntityStore,
        directory: &ActorDirectory,
        meeting_group: &MeetingGroup,
        review_ids: &[ReviewId],
    ) -> EngineResult<Vec<ParticipantConfirmation>> {
        let participants = directory.related_participants(store, review_ids);
        if participants.is_empty() {
            tracing::info!(meeting_group = %meeting_group, "no related actors, nothing to confirm");
            return Ok(Vec::new());
        }

        // Stable sort: identical timestamps keep resolution order.
        let mut ranked: Vec<_> = participants
            .into_iter()
            .map(|participant| {
                let earliest: DateTime<Utc> = participant
                    .project_ids
                    .iter()
                    .filter_map(|id| store.projects.get(id))
                    .map(|p| p.created_at)
                    .min()
                    .unwrap_or_else(Utc::now);
                (earliest, participant)
            })
            .collect();
        ranked.sort_by_key(|(earliest, _)| *earliest);

        let mut confirmations = Vec::with_capacity(ranked.len());
        for (index, (_, participant)) in ranked.into_iter().enumerate() {
            let order = index as u32 + 1;
            let confirmation = store.participant_confirmations.insert(
                ParticipantConfirmation::new(
                    meeting_group.clone(),
                    participant.actor.id.clone(),
                    participant.actor.name.clone(),
                    participant.project_ids.clone(),
                    order,
                ),
            )?;
            store.todos.insert(TodoItem::participant_confirm(
                meeting_group.clone(),
                confirmation.id.clone(),
                participant.project_ids,
                order,
                participant.actor.id.clone(),
            ))?;
            confirmations.push(confirmation);
        }

        tracing::info!(
            meeting_group = %meeting_group,
            participants = confirmations.len(),
            "participant confirmation started"
        );
        Ok(confirmations)
    }

    /// Record one participant's decision
    pub fn record_decision(
        &self,
        store: &mut EntityStore,
        confirmation_id: &ConfirmationId,
        confirmed: bool,
        comments: Option<String>,
    ) -> EngineResult<ParticipantConfirmation> {
        let confirmation = store
            .participant_confirmations
            .update(confirmation_id, |c| c.record(confirmed, comments))
            .map_err(|_| EngineError::ConfirmationNotFound(confirmation_id.clone()))?
            .clone();

        tracing::info!(
            confirmation = %confirmation_id,
            meeting_group = %confirmation.meeting_group,
            confirmed,
            "participant decision recorded"
        );
        Ok(confirmation)
    }

    /// Check whether every confirmation record for the group is
    /// Confirmed. Pending or Rejected records make this false, and so
    /// does a group with no records at all (not started, or a mistyped
    /// key). No side effects; the caller decides what happens when it
    /// becomes true.
    pub fn all_confirmed(&self, store: &EntityStore, meeting_group: &MeetingGroup) -> bool {
        let confirmations = store
            .participant_confirmations
            .find(|c| &c.meeting_group == meeting_group);
        !confirmations.is_empty()
            && confirmations
                .iter()
                .all(|c| c.status == ConfirmationStatus::Confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use reserve_types::{
        Actor, ActorId, Affiliation, MonthlyReview, Project, Role, TodoKind,
    };

    fn setup() -> (EntityStore, ActorDirectory, MeetingGroup, Vec<ReviewId>) {
        let mut directory = ActorDirectory::new();
        directory.add(Actor::new("Actor A", Role::Owner).with_id(ActorId::new("actor-a")));
        directory.add(Actor::new("Actor B", Role::Owner).with_id(ActorId::new("actor-b")));
        directory.add(Actor::new("Reviewer X", Role::Reviewer).with_id(ActorId::new("rev-x")));

        let mut store = EntityStore::new();

        // P1 created on day 1 (owner A), P2 on day 3 (owner B).
        let day_one = Utc::now() - Duration::days(3);
        let p1 = store
            .projects
            .insert(Project::new(
                "P1",
                Affiliation::center("c1"),
                ActorId::new("actor-a"),
            ))
            .unwrap();
        store
            .projects
            .update(&p1.id, |p| p.created_at = day_one)
            .unwrap();
        let p2 = store
            .projects
            .insert(Project::new(
                "P2",
                Affiliation::center("c1"),
                ActorId::new("actor-b"),
            ))
            .unwrap();

        let r1 = store
            .reviews
            .insert(MonthlyReview::new(
                p1.id.clone(),
                Utc::now(),
                ActorId::new("rev-x"),
            ))
            .unwrap();
        let r2 = store
            .reviews
            .insert(MonthlyReview::new(
                p2.id.clone(),
                Utc::now(),
                ActorId::new("rev-x"),
            ))
            .unwrap();

        let group = MeetingGroup::new("2025-07-01_t1_ReviewerX");
        (store, directory, group, vec![r1.id, r2.id])
    }

    #[test]
    fn test_ranking_by_earliest_project_creation() {
        let (mut store, directory, group, review_ids) = setup();

        let confirmations = ParticipantConfirmationProtocol::new()
            .start(&mut store, &directory, &group, &review_ids)
            .unwrap();

        // A owns the day-1 project, B the day-3 project; the reviewer
        // is tied to both so shares A's earliest timestamp.
        let order_of = |actor: &str| {
            confirmations
                .iter()
                .find(|c| c.actor == ActorId::new(actor))
                .unwrap()
                .confirmation_order
        };
        assert_eq!(order_of("actor-a"), 1);
        assert_eq!(order_of("rev-x"), 2);
        assert_eq!(order_of("actor-b"), 3);
    }

    #[test]
    fn test_eager_fanout_creates_all_todos_at_once() {
        let (mut store, directory, group, review_ids) = setup();

        ParticipantConfirmationProtocol::new()
            .start(&mut store, &directory, &group, &review_ids)
            .unwrap();

        let todos = store.todos.list();
        assert_eq!(todos.len(), 3);
        for todo in todos {
            assert!(todo.is_pending());
            assert!(matches!(
                &todo.kind,
                TodoKind::ParticipantConfirm { meeting_group, .. } if meeting_group == &group
            ));
        }
        assert_eq!(store.participant_confirmations.len(), 3);
    }

    #[test]
    fn test_all_confirmed() {
        let (mut store, directory, group, review_ids) = setup();
        let protocol = ParticipantConfirmationProtocol::new();

        let confirmations = protocol
            .start(&mut store, &directory, &group, &review_ids)
            .unwrap();
        assert!(!protocol.all_confirmed(&store, &group));

        // Confirm all but one: still false.
        for confirmation in &confirmations[..2] {
            protocol
                .record_decision(&mut store, &confirmation.id, true, None)
                .unwrap();
        }
        assert!(!protocol.all_confirmed(&store, &group));

        protocol
            .record_decision(&mut store, &confirmations[2].id, true, None)
            .unwrap();
        assert!(protocol.all_confirmed(&store, &group));
    }

    #[test]
    fn test_rejection_blocks_completion() {
        let (mut store, directory, group, review_ids) = setup();
        let protocol = ParticipantConfirmationProtocol::new();

        let confirmations = protocol
            .start(&mut store, &directory, &group, &review_ids)
            .unwrap();
        for confirmation in &confirmations[..2] {
            protocol
                .record_decision(&mut store, &confirmation.id, true, None)
                .unwrap();
        }
        protocol
            .record_decision(&mut store, &confirmations[2].id, false, Some("wrong".into()))
            .unwrap();

        assert!(!protocol.all_confirmed(&store, &group));
    }

    #[test]
    fn test_unstarted_group_is_not_confirmed() {
        let store = EntityStore::new();
        let protocol = ParticipantConfirmationProtocol::new();
        assert!(!protocol.all_confirmed(&store, &MeetingGroup::new("never-started")));
    }

    #[test]
    fn test_empty_resolution_is_noop() {
        let mut store = EntityStore::new();
        let directory = ActorDirectory::new();
        let group = MeetingGroup::new("empty");

        let confirmations = ParticipantConfirmationProtocol::new()
            .start(&mut store, &directory, &group, &[ReviewId::new("missing")])
            .unwrap();
        assert!(confirmations.is_empty());
        assert!(store.todos.is_empty());
    }

    #[test]
    fn test_record_decision_missing_confirmation() {
        let mut store = EntityStore::new();
        let result = ParticipantConfirmationProtocol::new().record_decision(
            &mut store,
            &ConfirmationId::new("missing"),
            true,
            None,
        );
        assert!(matches!(result, Err(EngineError::ConfirmationNotFound(_))));
    }
}
