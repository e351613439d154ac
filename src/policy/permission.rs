//! Permission resolver: who may create or delete at which level.
//!
//! | Level    | Create / Delete allowed by                    |
//! |----------|-----------------------------------------------|
//! | Zone     | NetworkAdmin                                  |
//! | Block    | NetworkAdmin                                  |
//! | Building | NetworkAdmin, BlockAdmin                      |
//! | Unit     | NetworkAdmin, BlockAdmin, BuildingAdmin       |
//!
//! Residents never mutate hierarchy entities.

use serde::{Deserialize, Serialize};

use crate::model::{HierarchyLevel, OccupantId, Role};
use crate::{Error, Result};

/// A mutating operation on a hierarchy entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => f.write_str("create"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

/// Total over every (role, level, operation) triple.
///
/// Create and delete rights coincide at every level: a role may mutate at its
/// mutation scope and everything below it.
pub fn can_mutate(role: Role, level: HierarchyLevel, _operation: Operation) -> bool {
    role.mutation_scope().is_some_and(|scope| level >= scope)
}

/// [`can_mutate`] as a gate: `Forbidden` on deny.
pub fn require(role: Role, level: HierarchyLevel, operation: Operation) -> Result<()> {
    if can_mutate(role, level, operation) {
        Ok(())
    } else {
        Err(Error::Forbidden { role, level, operation: operation.to_string() })
    }
}

/// Whether `role` may flip the privacy flag of `occupant`.
///
/// Administrators may change anyone's; a resident only their own record.
pub fn can_set_privacy(role: Role, occupant: OccupantId, own: Option<OccupantId>) -> bool {
    role.is_admin() || own == Some(occupant)
}

/// Mutation affordances to expose for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordances {
    pub level: HierarchyLevel,
    pub can_create: bool,
    pub can_delete: bool,
}

pub fn affordances(role: Role, level: HierarchyLevel) -> Affordances {
    Affordances {
        level,
        can_create: can_mutate(role, level, Operation::Create),
        can_delete: can_mutate(role, level, Operation::Delete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HierarchyLevel::*;
    use crate::model::Role::*;

    /// The canonical table, written out literally.
    fn table(level: HierarchyLevel) -> &'static [Role] {
        match level {
            Zone => &[NetworkAdmin],
            Block => &[NetworkAdmin],
            Building => &[NetworkAdmin, BlockAdmin],
            Unit => &[NetworkAdmin, BlockAdmin, BuildingAdmin],
        }
    }

    #[test]
    fn test_matches_table_exactly() {
        for role in Role::ALL {
            for level in HierarchyLevel::ALL {
                for op in [Operation::Create, Operation::Delete] {
                    assert_eq!(
                        can_mutate(role, level, op),
                        table(level).contains(&role),
                        "{role} {op} at {level}",
                    );
                }
            }
        }
    }

    #[test]
    fn test_resident_never_mutates() {
        for level in HierarchyLevel::ALL {
            assert!(!can_mutate(Resident, level, Operation::Create));
            assert!(!can_mutate(Resident, level, Operation::Delete));
        }
    }

    #[test]
    fn test_require_reports_triple() {
        let err = require(BuildingAdmin, Zone, Operation::Create).unwrap_err();
        match err {
            Error::Forbidden { role, level, operation } => {
                assert_eq!(role, BuildingAdmin);
                assert_eq!(level, Zone);
                assert_eq!(operation, "create");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
        assert!(require(BlockAdmin, Building, Operation::Delete).is_ok());
    }

    #[test]
    fn test_privacy_rights() {
        let own = OccupantId(4);
        assert!(can_set_privacy(BuildingAdmin, OccupantId(9), None));
        assert!(can_set_privacy(Resident, own, Some(own)));
        assert!(!can_set_privacy(Resident, OccupantId(9), Some(own)));
        assert!(!can_set_privacy(Resident, own, None));
    }

    #[test]
    fn test_affordances() {
        let a = affordances(BlockAdmin, Block);
        assert!(!a.can_create && !a.can_delete);
        let a = affordances(BlockAdmin, Unit);
        assert!(a.can_create && a.can_delete);
    }
}
