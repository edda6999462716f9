#![forbid(unsafe_code)]
//! Authorization rules as pure functions.
//!
//! Every rule takes the requester's [`Capability`] explicitly; nothing in
//! this crate reads ambient state. Visibility is expressed as a scope value
//! the store compiles into its WHERE clause, so an out-of-scope record is
//! indistinguishable from a missing one.

mod capability;
mod mutation;
mod visibility;

pub use capability::{Capability, Requester};
pub use mutation::{authorize, Action, Denied, Resource};
pub use visibility::{report_scope, task_scope, ReportScope, TaskScope};

pub const CRATE_NAME: &str = "taskhive-policies";
