//! Workflow orchestration for reserve projects
//!
//! The engine coordinates the human actions that move a reserve
//! project through its lifecycle. It never acts on its own: every
//! advancement is triggered by an external request, usually the
//! processing of a todo item.
//!
//! # Architecture
//!
//! The [`ReserveEngine`] composes specialized components around an
//! injected [`reserve_store::EntityStore`]:
//!
//! - [`ActorDirectory`] — resolves the human actors relevant to a
//!   project or meeting from static role/affiliation rules
//! - [`ProjectLifecycle`] — the four-state project status machine and
//!   the submission/approval transitions
//! - [`ParticipantConfirmationProtocol`] — eager, ordered fan-out of
//!   per-actor confirmations for one review meeting
//! - [`ReportProtocol`] — the sequential three-step confirmation chain
//!   and the final approve/reject decision on an approval report
//! - [`TodoDispatcher`] — the single entry point through which a human
//!   action advances any protocol
//!
//! # Example
//!
//! ```rust
//! use reserve_engine::{ActorDirectory, ReserveEngine};
//! use reserve_types::{Actor, Affiliation, Role};
//!
//! let mut directory = ActorDirectory::new();
//! let owner = directory.add(Actor::new("Owner A", Role::Owner));
//! let lead = directory.add(
//!     Actor::new("Center Lead A", Role::CenterLead).with_center("sensor-center"),
//! );
//!
//! let mut engine = ReserveEngine::new(directory);
//! let project = engine
//!     .create_project("Sensor Platform", Affiliation::center("sensor-center"), owner.clone())
//!     .unwrap();
//!
//! let approval = engine
//!     .submit_for_approval(&project.id, owner, lead)
//!     .unwrap();
//! assert!(approval.is_pending());
//! ```

#![deny(unsafe_code)]

pub mod directory;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod participants;
pub mod report;

pub use directory::ActorDirectory;
pub use dispatcher::TodoDispatcher;
pub use engine::ReserveEngine;
pub use errors::{EngineError, EngineResult};
pub use lifecycle::ProjectLifecycle;
pub use participants::ParticipantConfirmationProtocol;
pub use report::ReportProtocol;
