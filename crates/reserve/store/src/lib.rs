//! Injected entity store: the single source of truth for the engine
//!
//! One keyed collection per entity type, pure CRUD. Protocol
//! components never cache state across calls; every decision re-reads
//! the store. No operation spans two collections: callers that must
//! keep two entities consistent perform sequential writes and tolerate
//! partial completion.
//!
//! Exclusive mutation goes through `&mut EntityStore`, which serializes
//! racing read-check-write sequences by construction. Embedders that
//! share a store across threads wrap it in their own lock.

#![deny(unsafe_code)]

mod collection;
mod error;
mod store;

pub use collection::{Collection, Entity};
pub use error::{StoreError, StoreResult};
pub use store::EntityStore;
