//! Domain types for the reserve project workflow engine
//!
//! Reserve projects move through a fixed four-state lifecycle
//! (Drafting, UnderReview, Approved, Released). Everything that drives
//! a project between those states is a human action delivered through
//! a todo item:
//!
//! - **Project / Approval**: one Pending approval at a time moves a
//!   draft into review.
//! - **MonthlyReview**: one review per project, batched into a meeting
//!   group by the "initiate meeting" action.
//! - **ApprovalReport**: a report over one meeting group, driven
//!   through a three-step confirmation chain and a final decision.
//! - **Confirmations**: per-actor attestation records, distinct from
//!   but referenced by todo items.
//! - **TodoItem**: the sole unit of human-actionable work. Processing
//!   a todo is the only way a protocol advances.

#![deny(unsafe_code)]

mod actor;
mod approval;
mod confirmation;
mod project;
mod report;
mod review;
mod todo;

pub use actor::*;
pub use approval::*;
pub use confirmation::*;
pub use project::*;
pub use report::*;
pub use review::*;
pub use todo::*;
