//! Navigation snapshot: active level plus selected ancestor chain.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::{Entity, EntityId, HierarchyLevel};
use crate::{Error, Result};

/// Ancestors above the active level. Never longer than three.
pub type AncestorChain = SmallVec<[Entity; 3]>;

/// Immutable navigation snapshot.
///
/// Invariant: `chain.len() == active_level.depth()` and `chain[i]` is at
/// level depth `i`, each element the parent of the next.
///
/// `version` tags the snapshot; every transition produces a higher one. It
/// is not part of the navigation position (see [`same_position`]).
///
/// [`same_position`]: NavigationState::same_position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub version: u64,
    pub active_level: HierarchyLevel,
    pub chain: AncestorChain,
}

/// One step of the breadcrumb trail. Selecting it shows `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub level: HierarchyLevel,
    /// The ancestor whose children are shown; `None` for the root crumb.
    pub entity_id: Option<EntityId>,
    pub label: String,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::root()
    }
}

impl NavigationState {
    /// `{Zone, []}` at version 0.
    pub fn root() -> Self {
        Self {
            version: 0,
            active_level: HierarchyLevel::Zone,
            chain: SmallVec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.chain.is_empty()
    }

    /// Id of the entity whose children are listed at the active level.
    pub fn parent_id(&self) -> Option<EntityId> {
        self.chain.last().map(|e| e.id)
    }

    /// The selected ancestor at `level`, if the chain reaches that far.
    pub fn selected(&self, level: HierarchyLevel) -> Option<&Entity> {
        self.chain.get(level.depth())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.chain.iter().any(|e| e.id == id)
    }

    /// Same level and same chain, regardless of version.
    pub fn same_position(&self, other: &NavigationState) -> bool {
        self.active_level == other.active_level && self.chain == other.chain
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = Vec::with_capacity(self.chain.len() + 1);
        crumbs.push(Breadcrumb {
            level: HierarchyLevel::Zone,
            entity_id: None,
            label: "Zones".to_string(),
        });
        for (depth, ancestor) in self.chain.iter().enumerate() {
            if let Some(level) = HierarchyLevel::from_depth(depth + 1) {
                crumbs.push(Breadcrumb {
                    level,
                    entity_id: Some(ancestor.id),
                    label: ancestor.display_name.clone(),
                });
            }
        }
        crumbs
    }

    // ========================================================================
    // Transitions (pure; the navigator swaps the result in)
    // ========================================================================

    /// Select one of the listed entities and move one level down.
    pub fn descended(&self, selected: &Entity) -> Result<Self> {
        let Some(next) = self.active_level.child() else {
            return Err(Error::InvalidDescent(format!(
                "no level below {}; {} {} cannot be entered",
                self.active_level, selected.level, selected.id
            )));
        };
        if selected.level != self.active_level {
            return Err(Error::InvalidDescent(format!(
                "{} {} is not listed at {} level",
                selected.level, selected.id, self.active_level
            )));
        }
        if selected.parent_id != self.parent_id() {
            let expected = self
                .parent_id()
                .map_or_else(|| "no parent".to_string(), |p| format!("parent {p}"));
            return Err(Error::InvalidDescent(format!(
                "{} {} does not belong to the current selection ({expected})",
                selected.level, selected.id
            )));
        }

        let mut chain = self.chain.clone();
        chain.push(selected.clone());
        Ok(Self {
            version: self.version + 1,
            active_level: next,
            chain,
        })
    }

    /// Pop the last ancestor; its level becomes active again.
    pub fn ascended(&self) -> Result<Self> {
        let mut chain = self.chain.clone();
        let popped = chain.pop().ok_or(Error::AtRoot)?;
        Ok(Self {
            version: self.version + 1,
            active_level: popped.level,
            chain,
        })
    }

    /// Cut the chain back so that `level` is active.
    pub fn truncated(&self, level: HierarchyLevel) -> Result<Self> {
        if level > self.active_level {
            return Err(Error::InvalidDescent(format!(
                "cannot jump to {level} from {}; descend instead",
                self.active_level
            )));
        }
        let mut chain = self.chain.clone();
        chain.truncate(level.depth());
        Ok(Self {
            version: self.version + 1,
            active_level: level,
            chain,
        })
    }

    /// Back to `{Zone, []}` with a fresh version.
    pub fn reset(&self) -> Self {
        Self {
            version: self.version + 1,
            ..Self::root()
        }
    }
}
