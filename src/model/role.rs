//! Role registry and hierarchy levels.
//!
//! Both tables are fixed: four roles, four levels. Everything the policy
//! layer decides is a pure function over these two enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// HierarchyLevel
// ============================================================================

/// A level of the property hierarchy, ordered `Zone < Block < Building < Unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HierarchyLevel {
    Zone,
    Block,
    Building,
    Unit,
}

impl HierarchyLevel {
    pub const ALL: [HierarchyLevel; 4] = [
        HierarchyLevel::Zone,
        HierarchyLevel::Block,
        HierarchyLevel::Building,
        HierarchyLevel::Unit,
    ];

    /// Position in the level order; also the length of the ancestor chain
    /// while this level is active.
    pub fn depth(self) -> usize {
        match self {
            HierarchyLevel::Zone => 0,
            HierarchyLevel::Block => 1,
            HierarchyLevel::Building => 2,
            HierarchyLevel::Unit => 3,
        }
    }

    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth).copied()
    }

    /// The level directly above. Zone has none.
    pub fn parent(self) -> Option<Self> {
        self.depth().checked_sub(1).and_then(Self::from_depth)
    }

    /// The level directly below. Unit has none.
    pub fn child(self) -> Option<Self> {
        Self::from_depth(self.depth() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            HierarchyLevel::Zone => "Zone",
            HierarchyLevel::Block => "Block",
            HierarchyLevel::Building => "Building",
            HierarchyLevel::Unit => "Unit",
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Role
// ============================================================================

/// Actor role. Exactly one per authenticated session.
///
/// Serialized with the wire codes used by the account service
/// (`admin_global`, `admin_bloco`, `admin_predio`, `morador`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin_global")]
    NetworkAdmin,
    #[serde(rename = "admin_bloco")]
    BlockAdmin,
    #[serde(rename = "admin_predio")]
    BuildingAdmin,
    #[serde(rename = "morador")]
    Resident,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::NetworkAdmin,
        Role::BlockAdmin,
        Role::BuildingAdmin,
        Role::Resident,
    ];

    /// Wire code of the role.
    pub fn code(self) -> &'static str {
        match self {
            Role::NetworkAdmin => "admin_global",
            Role::BlockAdmin => "admin_bloco",
            Role::BuildingAdmin => "admin_predio",
            Role::Resident => "morador",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Role::NetworkAdmin => "Network Admin",
            Role::BlockAdmin => "Block Admin",
            Role::BuildingAdmin => "Building Admin",
            Role::Resident => "Resident",
        }
    }

    pub fn is_admin(self) -> bool {
        !matches!(self, Role::Resident)
    }

    /// The highest level this role may create or delete at. Every level
    /// below it is in scope as well; `None` means no mutation rights at all.
    pub fn mutation_scope(self) -> Option<HierarchyLevel> {
        match self {
            Role::NetworkAdmin => Some(HierarchyLevel::Zone),
            Role::BlockAdmin => Some(HierarchyLevel::Building),
            Role::BuildingAdmin => Some(HierarchyLevel::Unit),
            Role::Resident => None,
        }
    }

    /// Resolve a role from its wire code or variant name.
    pub fn parse(raw: &str) -> Result<Self> {
        let role = match raw.trim() {
            "admin_global" | "NetworkAdmin" => Role::NetworkAdmin,
            "admin_bloco" | "BlockAdmin" => Role::BlockAdmin,
            "admin_predio" | "BuildingAdmin" => Role::BuildingAdmin,
            "morador" | "Resident" => Role::Resident,
            other => return Err(Error::UnknownRole(other.to_string())),
        };
        Ok(role)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::parse(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
