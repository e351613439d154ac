//! In-memory entity repository.
//!
//! This is the reference implementation of `EntityRepository`.
//! It uses hashbrown maps protected by RwLock.
//!
//! ## Behaviour
//!
//! - **Cascading delete**: removing a Zone, Block or Building removes every
//!   descendant in the same call.
//! - **Outage switch**: `set_available(false)` makes every call fail the way
//!   an unreachable backend would (`FetchFailed` / `PersistenceFailed`).
//! - **Insertion order**: children are listed in creation order.
//!
//! Use this repository for:
//! - Testing navigation, visibility and mutation flows
//! - Embedding the core in tools that don't need persistence

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::EntityRepository;

// ============================================================================
// MemoryRepository
// ============================================================================

/// In-memory property hierarchy. Cloning shares the same storage.
#[derive(Clone)]
pub struct MemoryRepository {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    entities: RwLock<HashMap<EntityId, Entity>>,
    /// parent id (None for Zones) → child ids in creation order
    children: RwLock<HashMap<Option<EntityId>, Vec<EntityId>>>,
    next_entity_id: AtomicU64,
    next_occupant_id: AtomicU64,
    available: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                entities: RwLock::new(HashMap::new()),
                children: RwLock::new(HashMap::new()),
                next_entity_id: AtomicU64::new(1),
                next_occupant_id: AtomicU64::new(1),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Simulate the backend going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.inner.entities.read().get(&id).cloned()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.entities.read().contains_key(&id)
    }

    /// Total number of stored entities across all levels.
    pub fn len(&self) -> usize {
        self.inner.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::SeqCst)
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// The parent a `level` entity must hang under, checked against storage.
fn check_parent(
    entities: &HashMap<EntityId, Entity>,
    parent: Option<EntityId>,
    level: HierarchyLevel,
) -> std::result::Result<Option<Entity>, String> {
    match (level.parent(), parent) {
        (None, None) => Ok(None),
        (None, Some(p)) => Err(format!("a Zone has no parent, got {p}")),
        (Some(expected), None) => Err(format!("a {level} needs a {expected} parent")),
        (Some(expected), Some(p)) => match entities.get(&p) {
            Some(e) if e.level == expected => Ok(Some(e.clone())),
            Some(e) => Err(format!("parent {p} is a {}, expected a {expected}", e.level)),
            None => Err(format!("parent {p} does not exist")),
        },
    }
}

// ============================================================================
// EntityRepository impl
// ============================================================================

#[async_trait]
impl EntityRepository for MemoryRepository {
    async fn fetch_children(
        &self,
        parent: Option<EntityId>,
        level: HierarchyLevel,
    ) -> Result<Vec<Entity>> {
        if !self.is_available() {
            return Err(Error::FetchFailed("repository unavailable".into()));
        }

        let entities = self.inner.entities.read();
        check_parent(&entities, parent, level).map_err(Error::FetchFailed)?;

        let children = self.inner.children.read();
        let ids = children.get(&parent).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| entities.get(id))
            .filter(|e| e.level == level)
            .cloned()
            .collect())
    }

    async fn exists(&self, level: HierarchyLevel, id: EntityId) -> Result<bool> {
        if !self.is_available() {
            return Err(Error::FetchFailed("repository unavailable".into()));
        }
        Ok(self.inner.entities.read().get(&id).is_some_and(|e| e.level == level))
    }

    async fn create(&self, parent: Option<EntityId>, payload: CreatePayload) -> Result<Entity> {
        if !self.is_available() {
            return Err(Error::PersistenceFailed("repository unavailable".into()));
        }

        let mut entities = self.inner.entities.write();
        let parent_entity =
            check_parent(&entities, parent, payload.level()).map_err(Error::InvalidPayload)?;
        payload.validate(parent_entity.as_ref())?;

        let id = EntityId(self.inner.next_entity_id.fetch_add(1, Ordering::Relaxed));
        let next_occupant = &self.inner.next_occupant_id;
        let entity = payload
            .into_entity(id, parent, || OccupantId(next_occupant.fetch_add(1, Ordering::Relaxed)))
            .with_created_at(Utc::now());

        entities.insert(id, entity.clone());
        self.inner.children.write().entry(parent).or_default().push(id);

        Ok(entity)
    }

    async fn delete(&self, level: HierarchyLevel, id: EntityId) -> Result<()> {
        if !self.is_available() {
            return Err(Error::PersistenceFailed("repository unavailable".into()));
        }

        let mut entities = self.inner.entities.write();
        let parent = match entities.get(&id) {
            Some(e) if e.level == level => e.parent_id,
            _ => return Err(Error::NotFound(format!("{level} {id}"))),
        };

        let mut children = self.inner.children.write();
        if let Some(siblings) = children.get_mut(&parent) {
            siblings.retain(|sid| *sid != id);
        }

        // Cascade: walk the subtree depth-first.
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            entities.remove(&current);
            if let Some(below) = children.remove(&Some(current)) {
                pending.extend(below);
            }
        }

        Ok(())
    }

    async fn set_occupant_privacy(&self, unit: EntityId, is_public: bool) -> Result<Occupant> {
        if !self.is_available() {
            return Err(Error::PersistenceFailed("repository unavailable".into()));
        }

        let mut entities = self.inner.entities.write();
        let entity = entities
            .get_mut(&unit)
            .filter(|e| e.level == HierarchyLevel::Unit)
            .ok_or_else(|| Error::NotFound(format!("Unit {unit}")))?;
        let occupant = entity
            .unit_details_mut()
            .and_then(|u| u.occupant.as_mut())
            .ok_or_else(|| Error::NotFound(format!("occupant of vacant Unit {unit}")))?;

        occupant.is_public_profile = is_public;
        Ok(occupant.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn tree(repo: &MemoryRepository) -> (Entity, Entity, Entity, Entity) {
        let z = repo.create(None, CreatePayload::zone("Kilamba")).await.unwrap();
        let b = repo.create(Some(z.id), CreatePayload::block("Block A")).await.unwrap();
        let p = repo
            .create(Some(b.id), CreatePayload::building("Building 1").with_floors(4))
            .await
            .unwrap();
        let u = repo
            .create(
                Some(p.id),
                CreatePayload::unit("101", "T3").with_floor(1).with_occupant(NewOccupant::new("Jane")),
            )
            .await
            .unwrap();
        (z, b, p, u)
    }

    #[tokio::test]
    async fn test_create_and_fetch_in_order() {
        let repo = MemoryRepository::new();
        let (z, b, _, _) = tree(&repo).await;
        let b2 = repo.create(Some(z.id), CreatePayload::block("Block B")).await.unwrap();

        let zones = repo.fetch_children(None, HierarchyLevel::Zone).await.unwrap();
        assert_eq!(zones.len(), 1);
        assert!(zones[0].created_at.is_some());

        let blocks = repo.fetch_children(Some(z.id), HierarchyLevel::Block).await.unwrap();
        let ids: Vec<_> = blocks.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b.id, b2.id]);
    }

    #[tokio::test]
    async fn test_exists_checks_level() {
        let repo = MemoryRepository::new();
        let (z, b, _, _) = tree(&repo).await;

        assert!(repo.exists(HierarchyLevel::Block, b.id).await.unwrap());
        assert!(!repo.exists(HierarchyLevel::Zone, b.id).await.unwrap());
        repo.delete(HierarchyLevel::Zone, z.id).await.unwrap();
        assert!(!repo.exists(HierarchyLevel::Block, b.id).await.unwrap());

        repo.set_available(false);
        assert!(matches!(repo.exists(HierarchyLevel::Zone, z.id).await, Err(Error::FetchFailed(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_wrong_parent() {
        let repo = MemoryRepository::new();
        let (z, _, p, _) = tree(&repo).await;

        let err = repo.create(Some(z.id), CreatePayload::unit("9", "T2")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));

        let err = repo.create(None, CreatePayload::building("Orphan")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));

        let err = repo
            .create(Some(p.id), CreatePayload::unit("901", "T3").with_floor(9))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_occupant_ids_assigned() {
        let repo = MemoryRepository::new();
        let (_, _, _, u) = tree(&repo).await;
        assert_eq!(u.occupant().unwrap().id, OccupantId(1));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let repo = MemoryRepository::new();
        let (z, b, p, u) = tree(&repo).await;
        assert_eq!(repo.len(), 4);

        repo.delete(HierarchyLevel::Block, b.id).await.unwrap();
        assert!(repo.contains(z.id));
        for gone in [b.id, p.id, u.id] {
            assert!(!repo.contains(gone));
        }
        assert!(repo.fetch_children(Some(z.id), HierarchyLevel::Block).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_double_delete_is_not_found() {
        let repo = MemoryRepository::new();
        let (_, _, _, u) = tree(&repo).await;

        repo.delete(HierarchyLevel::Unit, u.id).await.unwrap();
        let err = repo.delete(HierarchyLevel::Unit, u.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_checks_level() {
        let repo = MemoryRepository::new();
        let (z, _, _, _) = tree(&repo).await;
        let err = repo.delete(HierarchyLevel::Block, z.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(repo.contains(z.id));
    }

    #[tokio::test]
    async fn test_privacy_toggle() {
        let repo = MemoryRepository::new();
        let (_, _, p, u) = tree(&repo).await;

        let occupant = repo.set_occupant_privacy(u.id, true).await.unwrap();
        assert!(occupant.is_public_profile);
        assert!(repo.get(u.id).unwrap().occupant().unwrap().is_public_profile);

        let vacant = repo.create(Some(p.id), CreatePayload::unit("102", "T2")).await.unwrap();
        assert!(matches!(
            repo.set_occupant_privacy(vacant.id, true).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_outage() {
        let repo = MemoryRepository::new();
        let (z, _, _, _) = tree(&repo).await;
        repo.set_available(false);

        assert!(matches!(
            repo.fetch_children(None, HierarchyLevel::Zone).await,
            Err(Error::FetchFailed(_))
        ));
        assert!(matches!(
            repo.delete(HierarchyLevel::Zone, z.id).await,
            Err(Error::PersistenceFailed(_))
        ));

        repo.set_available(true);
        assert!(repo.contains(z.id));
    }
}
