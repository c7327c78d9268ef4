//! Keyed collections: list / find / insert / update over one entity type

use crate::{StoreError, StoreResult};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A record the store can hold: a stable typed id plus a kind name
/// used in error messages and log events.
pub trait Entity: Clone {
    type Id: Clone + Eq + Hash + Display + Debug;

    /// The kind name, e.g. "project"
    const KIND: &'static str;

    fn entity_id(&self) -> &Self::Id;
}

/// A keyed collection of one entity type
#[derive(Clone, Debug)]
pub struct Collection<T: Entity> {
    records: HashMap<T::Id, T>,
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Insert a record. Ids are generated by entity constructors;
    /// inserting an id that already exists is a conflict.
    pub fn insert(&mut self, record: T) -> StoreResult<T> {
        let id = record.entity_id().clone();
        if self.records.contains_key(&id) {
            return Err(StoreError::conflict(T::KIND, &id));
        }
        self.records.insert(id.clone(), record.clone());
        tracing::debug!(kind = T::KIND, id = %id, "record inserted");
        Ok(record)
    }

    /// Get a record by id
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.records.get(id)
    }

    /// Get a record by id, NotFound if absent
    pub fn get_or_err(&self, id: &T::Id) -> StoreResult<&T> {
        self.records
            .get(id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    /// Apply a mutation to a record, returning the updated record
    pub fn update(&mut self, id: &T::Id, mutate: impl FnOnce(&mut T)) -> StoreResult<&T> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;
        mutate(record);
        tracing::debug!(kind = T::KIND, id = %id, "record updated");
        Ok(record)
    }

    /// All records matching a predicate
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<&T> {
        self.records.values().filter(|r| predicate(r)).collect()
    }

    /// First record matching a predicate
    pub fn find_one(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.records.values().find(|r| predicate(r))
    }

    /// All records
    pub fn list(&self) -> Vec<&T> {
        self.records.values().collect()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}
