//! # Property Hierarchy Model
//!
//! Clean DTOs that cross every boundary: repository ↔ navigator ↔ caller.
//!
//! Design rule: this module is pure data — no I/O, no state, no async.

pub mod role;
pub mod entity;
pub mod occupant;
pub mod payload;

pub use role::{Role, HierarchyLevel};
pub use entity::{Entity, EntityId, EntityDetails, UnitDetails};
pub use occupant::{Occupant, OccupantId, OccupantView, DisclosurePolicy};
pub use payload::{CreatePayload, AdminContact, NewOccupant};

/// An entity as handed to callers, occupant already filtered.
pub type EntityView = Entity<OccupantView>;
