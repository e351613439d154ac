//! # Entity Repository Trait
//!
//! The contract between the session core and whatever persists the
//! hierarchy. The core never stores entities itself: it reads children,
//! requests creation and deletion, and caches what it was given.
//!
//! ## Implementations
//!
//! | Repository | Module | Description |
//! |------------|--------|-------------|
//! | `MemoryRepository` | `memory` | In-memory for testing/embedding |

pub mod memory;

use async_trait::async_trait;

use crate::model::*;
use crate::Result;

pub use memory::MemoryRepository;

/// The universal persistence contract.
///
/// Errors map onto the core's error kinds: reads fail with `FetchFailed`,
/// writes with `PersistenceFailed`, `InvalidPayload` or `NotFound`. Retry
/// policy, if any, belongs to the implementation.
#[async_trait]
pub trait EntityRepository: Send + Sync + 'static {
    /// All entities of `level` whose parent is `parent` (`None` for Zones).
    async fn fetch_children(
        &self,
        parent: Option<EntityId>,
        level: HierarchyLevel,
    ) -> Result<Vec<Entity>>;

    /// Whether an entity with this id is stored at `level`. A read, so it
    /// fails with `FetchFailed`.
    async fn exists(&self, level: HierarchyLevel, id: EntityId) -> Result<bool>;

    /// Persist a new entity under `parent` and return it as stored.
    async fn create(&self, parent: Option<EntityId>, payload: CreatePayload) -> Result<Entity>;

    /// Remove an entity and everything below it.
    ///
    /// `NotFound` if no entity with this id exists at `level`, including
    /// when it was already deleted.
    async fn delete(&self, level: HierarchyLevel, id: EntityId) -> Result<()>;

    /// Flip the privacy flag of the occupant of `unit`, returning the
    /// updated record. `NotFound` if the unit does not exist or is vacant.
    async fn set_occupant_privacy(&self, unit: EntityId, is_public: bool) -> Result<Occupant>;
}

#[async_trait]
impl<R: EntityRepository> EntityRepository for std::sync::Arc<R> {
    async fn fetch_children(
        &self,
        parent: Option<EntityId>,
        level: HierarchyLevel,
    ) -> Result<Vec<Entity>> {
        (**self).fetch_children(parent, level).await
    }

    async fn exists(&self, level: HierarchyLevel, id: EntityId) -> Result<bool> {
        (**self).exists(level, id).await
    }

    async fn create(&self, parent: Option<EntityId>, payload: CreatePayload) -> Result<Entity> {
        (**self).create(parent, payload).await
    }

    async fn delete(&self, level: HierarchyLevel, id: EntityId) -> Result<()> {
        (**self).delete(level, id).await
    }

    async fn set_occupant_privacy(&self, unit: EntityId, is_public: bool) -> Result<Occupant> {
        (**self).set_occupant_privacy(unit, is_public).await
    }
}
