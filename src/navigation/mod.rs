//! Hierarchy navigator.
//!
//! Holds the current [`NavigationState`] snapshot and the child listing that
//! was fetched for it. Transitions swap in a new snapshot under a lock; a
//! fetch remembers the version it was issued against and is thrown away if
//! the snapshot moved on while it was in flight.

pub mod state;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::model::{Entity, EntityId, EntityView, HierarchyLevel, Occupant, Role};
use crate::policy::project_all;
use crate::storage::EntityRepository;
use crate::{Error, Result};

pub use state::{AncestorChain, Breadcrumb, NavigationState};

/// Children of the active level, as fetched for one snapshot version.
#[derive(Debug, Clone)]
struct ChildCache {
    version: u64,
    parent: Option<EntityId>,
    level: HierarchyLevel,
    entities: Vec<Entity>,
}

/// Per-session navigation state machine.
///
/// Lock order is always `state` before `cache`. Neither lock is held across
/// an await.
#[derive(Debug, Default)]
pub struct Navigator {
    state: Mutex<Arc<NavigationState>>,
    cache: Mutex<Option<ChildCache>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<NavigationState> {
        self.state.lock().clone()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn transition(
        &self,
        op: &'static str,
        f: impl FnOnce(&NavigationState) -> Result<NavigationState>,
    ) -> Result<Arc<NavigationState>> {
        let mut state = self.state.lock();
        let next = Arc::new(f(&**state)?);
        debug!(
            op,
            from = state.version,
            to = next.version,
            level = %next.active_level,
            depth = next.chain.len(),
            "navigation transition"
        );
        *state = next.clone();
        Ok(next)
    }

    pub fn descend(&self, selected: &Entity) -> Result<Arc<NavigationState>> {
        self.transition("descend", |s| s.descended(selected))
    }

    pub fn ascend(&self) -> Result<Arc<NavigationState>> {
        self.transition("ascend", NavigationState::ascended)
    }

    /// Breadcrumb jump. Jumping to the active level changes nothing.
    pub fn jump_to(&self, level: HierarchyLevel) -> Result<Arc<NavigationState>> {
        let current = self.state();
        if current.active_level == level {
            return Ok(current);
        }
        self.transition("jump", |s| s.truncated(level))
    }

    /// Always succeeds. Drops the cached listing as well.
    pub fn reset(&self) -> Arc<NavigationState> {
        let mut state = self.state.lock();
        let next = Arc::new(state.reset());
        debug!(from = state.version, to = next.version, "navigation reset");
        *state = next.clone();
        *self.cache.lock() = None;
        next
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Fetch the children of the active level and cache them for this
    /// snapshot. Occupants are filtered for `viewer` before returning.
    ///
    /// `StaleListing` if the snapshot changed while the fetch was in flight;
    /// the response is dropped and the cache left alone.
    pub async fn list_children<R: EntityRepository>(
        &self,
        repository: &R,
        viewer: Role,
        config: &SessionConfig,
    ) -> Result<Vec<EntityView>> {
        let snapshot = self.state();
        let parent = snapshot.parent_id();
        let level = snapshot.active_level;
        debug!(version = snapshot.version, %level, ?parent, "fetching children");

        let fetched = tokio::time::timeout(
            config.fetch_timeout(),
            repository.fetch_children(parent, level),
        )
        .await
        .map_err(|_| {
            Error::FetchFailed(format!(
                "listing {level} children timed out after {:?}",
                config.fetch_timeout()
            ))
        })??;

        let total = fetched.len();
        let entities: Vec<Entity> = fetched
            .into_iter()
            .filter(|e| e.level == level && e.parent_id == parent)
            .collect();
        if entities.len() != total {
            warn!(
                %level,
                ?parent,
                dropped = total - entities.len(),
                "repository returned entities outside the requested parent"
            );
        }

        let state = self.state.lock();
        if state.version != snapshot.version {
            debug!(
                requested = snapshot.version,
                current = state.version,
                "discarding stale listing"
            );
            return Err(Error::StaleListing {
                requested: snapshot.version,
                current: state.version,
            });
        }

        let views = project_all(viewer, &entities, &config.redacted_placeholder);
        *self.cache.lock() = Some(ChildCache {
            version: snapshot.version,
            parent,
            level,
            entities,
        });
        Ok(views)
    }

    /// The cached listing for the current snapshot, filtered for `viewer`.
    /// `None` if nothing was fetched since the last transition.
    pub fn cached_children(&self, viewer: Role, placeholder: &str) -> Option<Vec<EntityView>> {
        let state = self.state.lock();
        let cache = self.cache.lock();
        cache
            .as_ref()
            .filter(|c| c.version == state.version)
            .map(|c| project_all(viewer, &c.entities, placeholder))
    }

    /// A raw cached entity of the current listing.
    pub(crate) fn cached(&self, id: EntityId) -> Option<Entity> {
        self.with_current_cache(|c| c.entities.iter().find(|e| e.id == id).cloned())
            .flatten()
    }

    // ========================================================================
    // Cache maintenance (driven by the mutation coordinator)
    // ========================================================================

    fn with_current_cache<T>(&self, f: impl FnOnce(&mut ChildCache) -> T) -> Option<T> {
        let state = self.state.lock();
        let mut cache = self.cache.lock();
        cache.as_mut().filter(|c| c.version == state.version).map(f)
    }

    /// Append a freshly created entity if it belongs to the current listing.
    pub(crate) fn cache_insert(&self, entity: &Entity) -> bool {
        self.with_current_cache(|c| {
            if c.level == entity.level && c.parent == entity.parent_id {
                c.entities.push(entity.clone());
                true
            } else {
                false
            }
        })
        .unwrap_or(false)
    }

    /// Remove a deleted entity from the current listing.
    pub(crate) fn cache_remove(&self, id: EntityId) -> bool {
        self.with_current_cache(|c| {
            let before = c.entities.len();
            c.entities.retain(|e| e.id != id);
            c.entities.len() != before
        })
        .unwrap_or(false)
    }

    /// Replace the occupant record of a cached unit.
    pub(crate) fn cache_update_occupant(&self, unit: EntityId, occupant: Occupant) -> bool {
        self.with_current_cache(|c| {
            c.entities
                .iter_mut()
                .find(|e| e.id == unit)
                .and_then(|e| e.unit_details_mut())
                .map(|u| u.occupant = Some(occupant))
                .is_some()
        })
        .unwrap_or(false)
    }

    /// A selected ancestor was deleted: fall back to the level it was listed
    /// at. Returns the new snapshot if the chain changed.
    pub(crate) fn forget(&self, id: EntityId) -> Option<Arc<NavigationState>> {
        let mut state = self.state.lock();
        let position = state.chain.iter().position(|e| e.id == id)?;
        let level = HierarchyLevel::from_depth(position)?;
        let next = Arc::new(state.truncated(level).ok()?);
        debug!(%id, to = next.version, level = %level, "deleted ancestor dropped from chain");
        *state = next.clone();
        Some(next)
    }
}
