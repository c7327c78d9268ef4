//! Actor directory: resolves the human actors relevant to a project
//! or meeting from static role/affiliation rules
//!
//! Pure lookups, no side effects. An empty result set is not an
//! error; downstream protocols treat it as "nothing to notify."

use reserve_store::EntityStore;
use reserve_types::{
    Actor, ActorId, Affiliation, ConfirmStep, Project, ProjectId, ReviewId, Role,
    PLANNING_DEPARTMENT,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A related actor with the subset of meeting projects they are tied to
#[derive(Clone, Debug)]
pub struct Participant {
    pub actor: Actor,
    pub project_ids: Vec<ProjectId>,
}

/// The static directory of institute actors
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActorDirectory {
    actors: Vec<Actor>,
}

impl ActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor, returning its id
    pub fn add(&mut self, actor: Actor) -> ActorId {
        let id = actor.id.clone();
        tracing::debug!(actor = %id, role = ?actor.role, "actor registered");
        self.actors.push(actor);
        id
    }

    /// Look up an actor by id
    pub fn get(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| &a.id == id)
    }

    /// All actors with the given role, in registration order
    pub fn actors_with_role(&self, role: Role) -> Vec<&Actor> {
        self.actors.iter().filter(|a| a.role == role).collect()
    }

    /// The approvers for a project: center leads of the owning center,
    /// or department leads of the owning department
    pub fn approvers_for(&self, project: &Project) -> Vec<&Actor> {
        match &project.affiliation {
            Affiliation::Center(center) => self
                .actors
                .iter()
                .filter(|a| a.role == Role::CenterLead && a.in_center(center))
                .collect(),
            Affiliation::Department(department) => self
                .actors
                .iter()
                .filter(|a| a.role == Role::DepartmentLead && a.in_department(department))
                .collect(),
        }
    }

    /// The assignee of one report confirmation chain step. Step 3 is
    /// fixed to the planning department's specialist.
    pub fn step_assignee(&self, step: ConfirmStep) -> Option<&Actor> {
        match step {
            ConfirmStep::CenterSpecialist => {
                self.actors_with_role(Role::CenterSpecialist).into_iter().next()
            }
            ConfirmStep::CenterLead => self.actors_with_role(Role::CenterLead).into_iter().next(),
            ConfirmStep::DepartmentSpecialist => self
                .actors
                .iter()
                .find(|a| a.role == Role::DepartmentSpecialist && a.in_department(PLANNING_DEPARTMENT)),
        }
    }

    /// The institute lead who gives final approval on reports
    pub fn institute_lead(&self) -> Option<&Actor> {
        self.actors_with_role(Role::InstituteLead).into_iter().next()
    }

    /// Every actor tied to any project reachable from the given review
    /// ids, each carrying their project subset. De-duplicated by actor
    /// id; order is resolution order (per review: owner, then the
    /// affiliation lead, then the reviewer). Unresolvable reviews or
    /// projects are skipped.
    pub fn related_participants(
        &self,
        store: &EntityStore,
        review_ids: &[ReviewId],
    ) -> Vec<Participant> {
        let mut participants: Vec<Participant> = Vec::new();
        let mut seen: HashSet<ActorId> = HashSet::new();

        let mut attach = |participants: &mut Vec<Participant>,
                          seen: &mut HashSet<ActorId>,
                          actor: &Actor,
                          project_id: &ProjectId| {
            if seen.insert(actor.id.clone()) {
                participants.push(Participant {
                    actor: actor.clone(),
                    project_ids: vec![project_id.clone()],
                });
            } else if let Some(existing) =
                participants.iter_mut().find(|p| p.actor.id == actor.id)
            {
                if !existing.project_ids.contains(project_id) {
                    existing.project_ids.push(project_id.clone());
                }
            }
        };

        for review_id in review_ids {
            let Some(review) = store.reviews.get(review_id) else {
                continue;
            };
            let Some(project) = store.projects.get(&review.project_id) else {
                continue;
            };

            if let Some(owner) = self.get(&project.owner) {
                attach(&mut participants, &mut seen, owner, &project.id);
            }
            for lead in self.approvers_for(project) {
                attach(&mut participants, &mut seen, lead, &project.id);
            }
            if let Some(reviewer) = self.get(&review.reviewer) {
                attach(&mut participants, &mut seen, reviewer, &project.id);
            }
        }

        participants
    }

    /// Every related actor, without project subsets
    pub fn related_actors(&self, store: &EntityStore, review_ids: &[ReviewId]) -> Vec<Actor> {
        self.related_participants(store, review_ids)
            .into_iter()
            .map(|p| p.actor)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
