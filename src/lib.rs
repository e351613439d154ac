//! # estate-rs — Role-gated Property Hierarchy Core
//!
//! Navigation, mutation rights and occupant disclosure over a four-level
//! hierarchy: Zone → Block → Building → Unit.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `EntityRepository`, `Notifier` and `Authenticator` are
//!    the contracts with the outside world
//! 2. **Pure policy**: permissions and disclosure are lookup functions over
//!    two fixed enums
//! 3. **Snapshots, not mutation**: navigation state is an immutable,
//!    versioned value; late fetch responses are recognised and dropped
//! 4. **Views at the edge**: callers only ever see occupants after the
//!    visibility rule ran
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use estate_rs::{CreatePayload, Role, Session};
//!
//! # async fn example() -> estate_rs::Result<()> {
//! let session = Session::open_memory(Role::NetworkAdmin);
//!
//! let zone = session.create(CreatePayload::zone("Kilamba")).await?;
//! let zones = session.list_children().await?;
//! session.descend(zones[0].id)?;
//!
//! for block in session.list_children().await? {
//!     println!("{} in {}", block.display_name, zone.display_name);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod policy;
pub mod navigation;
pub mod mutation;
pub mod storage;
pub mod notify;
pub mod auth;
pub mod config;

use std::sync::Arc;

use parking_lot::Mutex;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Role, HierarchyLevel, Entity, EntityId, EntityDetails, UnitDetails, EntityView,
    Occupant, OccupantId, OccupantView, DisclosurePolicy,
    CreatePayload, AdminContact, NewOccupant,
};
pub use policy::{Affordances, Operation, can_mutate, resolve_disclosure};
pub use navigation::{Breadcrumb, NavigationState, Navigator};
pub use mutation::{DeleteOutcome, MutationCoordinator};
pub use storage::{EntityRepository, MemoryRepository};
pub use notify::{
    ChannelNotifier, ConfirmPrompt, ConfirmRequest, Notification, Notifier, NotifierHandle,
    ScriptedNotifier, Severity,
};
pub use auth::{Authenticator, StaticAuthenticator};
pub use config::SessionConfig;

// ============================================================================
// Session handle
// ============================================================================

/// One viewer's session: the exposed surface of the core.
///
/// Owns its navigator; nothing is shared across sessions. The role is
/// resolved from the authenticator on every call, and a change of role or
/// of signed-in occupant resets navigation.
pub struct Session<R: EntityRepository, N: Notifier, A: Authenticator> {
    repository: R,
    notifier: N,
    authenticator: A,
    config: SessionConfig,
    navigator: Navigator,
    /// Role and occupant seen on the previous call.
    last_identity: Mutex<Option<(Role, Option<OccupantId>)>>,
    /// Serializes mutation pipelines of this session.
    mutation_gate: tokio::sync::Mutex<()>,
}

impl<R: EntityRepository, N: Notifier, A: Authenticator> Session<R, N, A> {
    pub fn new(repository: R, notifier: N, authenticator: A, config: SessionConfig) -> Self {
        Self {
            repository,
            notifier,
            authenticator,
            config,
            navigator: Navigator::new(),
            last_identity: Mutex::new(None),
            mutation_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Resolve the role and reset navigation if the role or the signed-in
    /// occupant changed since the last call.
    pub fn role(&self) -> Result<Role> {
        let role = self.authenticator.current_role().inspect_err(|e| trace_failure("role", e))?;
        let identity = (role, self.authenticator.current_occupant());
        let mut last = self.last_identity.lock();
        match *last {
            Some((previous, _)) if previous != role => {
                tracing::info!(from = %previous, to = %role, "role changed, navigation reset");
                self.navigator.reset();
            }
            Some(previous) if previous != identity => {
                tracing::info!(role = %role, "occupant changed, navigation reset");
                self.navigator.reset();
            }
            _ => {}
        }
        *last = Some(identity);
        Ok(role)
    }

    fn coordinator(&self) -> MutationCoordinator<'_, R, N> {
        MutationCoordinator::new(&self.repository, &self.notifier, &self.navigator, &self.config)
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn state(&self) -> Arc<NavigationState> {
        self.navigator.state()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.navigator.state().breadcrumbs()
    }

    /// Which mutation affordances to show at the active level.
    pub fn affordances(&self) -> Result<Affordances> {
        let role = self.role()?;
        Ok(policy::affordances(role, self.navigator.state().active_level))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Enter one of the entities of the current listing, by id.
    pub fn descend(&self, id: EntityId) -> Result<Arc<NavigationState>> {
        self.role()?;
        let result = match self.navigator.cached(id) {
            Some(selected) => self.navigator.descend(&selected),
            None => Err(Error::InvalidDescent(format!(
                "{id} is not part of the current listing"
            ))),
        };
        result.inspect_err(|e| trace_failure("descend", e))
    }

    /// Enter a specific entity, listed or not, as long as it hangs under the
    /// current selection.
    pub fn descend_into(&self, selected: &Entity) -> Result<Arc<NavigationState>> {
        self.role()?;
        self.navigator
            .descend(selected)
            .inspect_err(|e| trace_failure("descend", e))
    }

    pub fn ascend(&self) -> Result<Arc<NavigationState>> {
        self.role()?;
        self.navigator.ascend().inspect_err(|e| trace_failure("ascend", e))
    }

    pub fn jump_to(&self, level: HierarchyLevel) -> Result<Arc<NavigationState>> {
        self.role()?;
        self.navigator.jump_to(level).inspect_err(|e| trace_failure("jump", e))
    }

    pub fn reset(&self) -> Arc<NavigationState> {
        self.navigator.reset()
    }

    /// Fetch and cache the children of the active level, occupants filtered
    /// for the current role.
    pub async fn list_children(&self) -> Result<Vec<EntityView>> {
        let role = self.role()?;
        self.navigator
            .list_children(&self.repository, role, &self.config)
            .await
            .inspect_err(|e| trace_failure("list_children", e))
    }

    /// The last listing, if it still belongs to the current snapshot.
    pub fn cached_children(&self) -> Result<Option<Vec<EntityView>>> {
        let role = self.role()?;
        Ok(self.navigator.cached_children(role, &self.config.redacted_placeholder))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    pub async fn create(&self, payload: CreatePayload) -> Result<EntityView> {
        let _gate = self.mutation_gate.lock().await;
        let role = self.role()?;
        self.coordinator()
            .create(role, payload)
            .await
            .inspect_err(|e| trace_failure("create", e))
    }

    pub async fn delete(&self, level: HierarchyLevel, id: EntityId) -> Result<DeleteOutcome> {
        let _gate = self.mutation_gate.lock().await;
        let role = self.role()?;
        self.coordinator()
            .delete(role, level, id)
            .await
            .inspect_err(|e| trace_failure("delete", e))
    }

    pub async fn set_occupant_privacy(&self, unit: EntityId, is_public: bool) -> Result<OccupantView> {
        let _gate = self.mutation_gate.lock().await;
        let role = self.role()?;
        let own = self.authenticator.current_occupant();
        self.coordinator()
            .set_occupant_privacy(role, own, unit, is_public)
            .await
            .inspect_err(|e| trace_failure("set_occupant_privacy", e))
    }
}

/// In-memory session for testing and embedding.
impl Session<MemoryRepository, ScriptedNotifier, StaticAuthenticator> {
    /// Empty memory repository, notifier that confirms everything.
    pub fn open_memory(role: Role) -> Self {
        Self::new(
            MemoryRepository::new(),
            ScriptedNotifier::accepting(),
            StaticAuthenticator::for_role(role),
            SessionConfig::default(),
        )
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    #[error("Invalid descent: {0}")]
    InvalidDescent(String),

    #[error("Already at the top level")]
    AtRoot,

    #[error("Forbidden: {role} may not {operation} at {level} level")]
    Forbidden {
        role: Role,
        level: HierarchyLevel,
        operation: String,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stale listing: requested at version {requested}, navigation is at {current}")]
    StaleListing { requested: u64, current: u64 },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// External failures a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::FetchFailed(_) | Error::PersistenceFailed(_))
    }

    /// The UI offered something it should have hidden.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Error::Forbidden { .. } | Error::InvalidDescent(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn trace_failure(op: &'static str, err: &Error) {
    if err.is_misuse() {
        tracing::error!(target: "estate::misuse", op, error = %err, "rejected operation");
    } else if err.is_transient() {
        tracing::warn!(op, error = %err, "external failure");
    } else {
        tracing::debug!(op, error = %err, "operation failed");
    }
}
