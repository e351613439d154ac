//! Authenticator contract: who is looking.
//!
//! Credential issuance lives elsewhere. The core only asks for the role of
//! the active session, and asks again on every check.

use parking_lot::RwLock;

use crate::model::{OccupantId, Role};
use crate::Result;

pub trait Authenticator: Send + Sync + 'static {
    /// Role of the active session. `UnknownRole` if the session carries a
    /// role code this crate does not recognize.
    fn current_role(&self) -> Result<Role>;

    /// The occupant record belonging to the signed-in resident, if any.
    fn current_occupant(&self) -> Option<OccupantId> {
        None
    }
}

/// Holds a raw role code, as delivered by a login response.
///
/// `sign_in` swaps the identity in place, which is how a re-login looks from
/// the session's point of view.
pub struct StaticAuthenticator {
    identity: RwLock<Identity>,
}

struct Identity {
    role_code: String,
    occupant: Option<OccupantId>,
}

impl StaticAuthenticator {
    pub fn new(role_code: impl Into<String>) -> Self {
        Self {
            identity: RwLock::new(Identity { role_code: role_code.into(), occupant: None }),
        }
    }

    pub fn for_role(role: Role) -> Self {
        Self::new(role.code())
    }

    pub fn resident(occupant: OccupantId) -> Self {
        let auth = Self::for_role(Role::Resident);
        auth.identity.write().occupant = Some(occupant);
        auth
    }

    pub fn sign_in(&self, role_code: impl Into<String>, occupant: Option<OccupantId>) {
        let mut identity = self.identity.write();
        identity.role_code = role_code.into();
        identity.occupant = occupant;
    }
}

impl Authenticator for StaticAuthenticator {
    fn current_role(&self) -> Result<Role> {
        Role::parse(&self.identity.read().role_code)
    }

    fn current_occupant(&self) -> Option<OccupantId> {
        self.identity.read().occupant
    }
}

impl<A: Authenticator> Authenticator for std::sync::Arc<A> {
    fn current_role(&self) -> Result<Role> {
        (**self).current_role()
    }

    fn current_occupant(&self) -> Option<OccupantId> {
        (**self).current_occupant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_resolves_on_every_call() {
        let auth = StaticAuthenticator::for_role(Role::BlockAdmin);
        assert_eq!(auth.current_role().unwrap(), Role::BlockAdmin);

        auth.sign_in("morador", Some(OccupantId(3)));
        assert_eq!(auth.current_role().unwrap(), Role::Resident);
        assert_eq!(auth.current_occupant(), Some(OccupantId(3)));
    }

    #[test]
    fn test_unknown_code() {
        let auth = StaticAuthenticator::new("root");
        assert!(matches!(auth.current_role(), Err(Error::UnknownRole(_))));
    }
}
