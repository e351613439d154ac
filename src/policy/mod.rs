//! Pure policy functions: mutation rights and occupant disclosure.
//!
//! Nothing here performs a mutation or holds state. Callers consult these
//! before acting.

pub mod permission;
pub mod visibility;

pub use permission::{Affordances, Operation, affordances, can_mutate, can_set_privacy, require};
pub use visibility::{project, project_all, resolve_disclosure, view_occupant};
