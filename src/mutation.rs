//! Mutation coordinator: create, confirm-then-delete, privacy updates.
//!
//! Every pipeline is: permission → validation / confirmation → repository →
//! cache maintenance → notification. A failure at any step leaves the
//! navigator untouched.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SessionConfig;
use crate::model::*;
use crate::navigation::Navigator;
use crate::notify::{ConfirmRequest, Notifier, Severity};
use crate::policy::{self, Operation};
use crate::storage::EntityRepository;
use crate::{Error, Result};

/// How a delete request ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmation was declined. Nothing changed.
    Cancelled,
}

/// Borrowed view of one session's collaborators for the duration of a
/// mutation.
pub struct MutationCoordinator<'s, R, N> {
    repository: &'s R,
    notifier: &'s N,
    navigator: &'s Navigator,
    config: &'s SessionConfig,
}

impl<'s, R: EntityRepository, N: Notifier> MutationCoordinator<'s, R, N> {
    pub fn new(
        repository: &'s R,
        notifier: &'s N,
        navigator: &'s Navigator,
        config: &'s SessionConfig,
    ) -> Self {
        Self { repository, notifier, navigator, config }
    }

    async fn persist<T>(
        &self,
        what: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.persist_timeout();
        tokio::time::timeout(timeout, call).await.map_err(|_| {
            Error::PersistenceFailed(format!("{what} timed out after {timeout:?}"))
        })?
    }

    fn report<T>(&self, result: &Result<T>, success: impl FnOnce(&T) -> String) {
        match result {
            Ok(value) => self.notifier.notify(&success(value), Severity::Success),
            Err(err) => self.notifier.notify(&err.to_string(), Severity::Error),
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Create an entity under the selected ancestor of the payload's level.
    pub async fn create(&self, role: Role, payload: CreatePayload) -> Result<EntityView> {
        let result = self.create_inner(role, payload).await;
        self.report(&result, |e| format!("{} '{}' created.", e.level, e.display_name));
        result
    }

    async fn create_inner(&self, role: Role, payload: CreatePayload) -> Result<EntityView> {
        let level = payload.level();
        policy::require(role, level, Operation::Create)?;

        let state = self.navigator.state();
        let parent = match level.parent() {
            None => None,
            Some(parent_level) => Some(state.selected(parent_level).cloned().ok_or_else(|| {
                Error::InvalidPayload(format!("no {parent_level} selected to create a {level} in"))
            })?),
        };
        payload.validate(parent.as_ref())?;

        let parent_id = parent.as_ref().map(|p| p.id);
        let entity = self
            .persist("create", self.repository.create(parent_id, payload))
            .await?;

        let cached = self.navigator.cache_insert(&entity);
        info!(id = %entity.id, level = %entity.level, ?parent_id, cached, "entity created");
        Ok(policy::project(role, &entity, &self.config.redacted_placeholder))
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Delete an entity and, through the repository, everything below it.
    /// Proceeds only after the notifier confirms. An id that is neither in
    /// the current listing nor stored fails with `NotFound` without a prompt.
    pub async fn delete(&self, role: Role, level: HierarchyLevel, id: EntityId) -> Result<DeleteOutcome> {
        let result = self.delete_inner(role, level, id).await;
        match &result {
            Ok(DeleteOutcome::Cancelled) => {}
            _ => self.report(&result, |_| format!("{level} {id} deleted.")),
        }
        result
    }

    async fn delete_inner(&self, role: Role, level: HierarchyLevel, id: EntityId) -> Result<DeleteOutcome> {
        policy::require(role, level, Operation::Delete)?;

        let name = match self.navigator.cached(id) {
            Some(listed) => listed.display_name,
            None => {
                let stored = self
                    .persist("lookup", self.repository.exists(level, id))
                    .await
                    .map_err(|e| match e {
                        Error::FetchFailed(msg) => Error::PersistenceFailed(msg),
                        other => other,
                    })?;
                if !stored {
                    return Err(Error::NotFound(format!("{level} {id}")));
                }
                format!("{level} {id}")
            }
        };
        let request = confirm_request(level, &name);
        if !self.notifier.confirm(request).await {
            info!(%id, %level, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        self.persist("delete", self.repository.delete(level, id)).await?;

        let cached = self.navigator.cache_remove(id);
        let unwound = self.navigator.forget(id).is_some();
        info!(%id, %level, cached, unwound, "entity deleted");
        Ok(DeleteOutcome::Deleted)
    }

    // ========================================================================
    // Occupant privacy
    // ========================================================================

    /// Flip the privacy flag of a unit's occupant. Administrators may do this
    /// for any listed unit, a resident only for their own record.
    pub async fn set_occupant_privacy(
        &self,
        role: Role,
        own: Option<OccupantId>,
        unit: EntityId,
        is_public: bool,
    ) -> Result<OccupantView> {
        let result = self.set_privacy_inner(role, own, unit, is_public).await;
        self.report(&result, |_| "Profile visibility updated.".to_string());
        result
    }

    async fn set_privacy_inner(
        &self,
        role: Role,
        own: Option<OccupantId>,
        unit: EntityId,
        is_public: bool,
    ) -> Result<OccupantView> {
        let allowed = role.is_admin()
            || self
                .navigator
                .cached(unit)
                .and_then(|e| e.occupant().map(|o| o.id))
                .is_some_and(|target| policy::can_set_privacy(role, target, own));
        if !allowed {
            return Err(Error::Forbidden {
                role,
                level: HierarchyLevel::Unit,
                operation: "set privacy".to_string(),
            });
        }

        let occupant = self
            .persist("privacy update", self.repository.set_occupant_privacy(unit, is_public))
            .await?;

        self.navigator.cache_update_occupant(unit, occupant.clone());
        info!(%unit, occupant = %occupant.id, is_public, "occupant privacy updated");
        Ok(policy::view_occupant(role, &occupant, &self.config.redacted_placeholder))
    }
}

/// Destructive prompt; above Unit it spells out what goes with the entity.
pub fn confirm_request(level: HierarchyLevel, name: &str) -> ConfirmRequest {
    let cascade = match level {
        HierarchyLevel::Zone => Some("blocks, buildings and units"),
        HierarchyLevel::Block => Some("buildings and units"),
        HierarchyLevel::Building => Some("units and their occupant records"),
        HierarchyLevel::Unit => None,
    };
    let mut message = format!("Delete {} '{name}'? This cannot be undone.", level.name().to_lowercase());
    if let Some(descendants) = cascade {
        message.push_str(&format!(" All {descendants} under it will be removed as well."));
    }
    ConfirmRequest {
        title: format!("Delete {level}"),
        message,
        is_destructive: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_warning_above_unit_only() {
        for level in [HierarchyLevel::Zone, HierarchyLevel::Block, HierarchyLevel::Building] {
            let req = confirm_request(level, "X");
            assert!(req.is_destructive);
            assert!(req.message.contains("removed as well"), "{level}: {}", req.message);
        }
        let req = confirm_request(HierarchyLevel::Unit, "101");
        assert!(!req.message.contains("removed as well"));
        assert!(req.message.contains("'101'"));
        assert_eq!(req.title, "Delete Unit");
    }
}
