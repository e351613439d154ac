//! Hierarchy entity: a Zone, Block, Building or Unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AdminContact, HierarchyLevel, Occupant};

/// Opaque entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the property hierarchy.
///
/// Generic over the occupant representation: repositories hand out
/// `Entity<Occupant>` with the stored record, callers receive
/// `Entity<OccupantView>` (see [`crate::EntityView`]) after the visibility
/// rule has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<O = Occupant> {
    pub id: EntityId,
    pub level: HierarchyLevel,
    pub display_name: String,
    /// `None` only for Zones.
    pub parent_id: Option<EntityId>,
    pub created_at: Option<DateTime<Utc>>,
    pub details: EntityDetails<O>,
}

/// Level-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityDetails<O = Occupant> {
    Zone {
        /// Location / province.
        address: Option<String>,
        admin: Option<AdminContact>,
    },
    Block {
        street: Option<String>,
        admin: Option<AdminContact>,
    },
    Building {
        managing_entity: Option<String>,
        floors: Option<u32>,
        admin: Option<AdminContact>,
    },
    Unit(UnitDetails<O>),
}

/// Attributes of a dwelling unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDetails<O = Occupant> {
    /// Door number, e.g. `"102"`.
    pub designation: String,
    /// Typology code, e.g. `"T3"`.
    pub unit_type: String,
    pub floor: Option<i32>,
    /// `None` means the unit is vacant.
    pub occupant: Option<O>,
}

impl<O> EntityDetails<O> {
    /// Empty details for the given level.
    pub fn empty(level: HierarchyLevel) -> Self {
        match level {
            HierarchyLevel::Zone => EntityDetails::Zone { address: None, admin: None },
            HierarchyLevel::Block => EntityDetails::Block { street: None, admin: None },
            HierarchyLevel::Building => EntityDetails::Building {
                managing_entity: None,
                floors: None,
                admin: None,
            },
            HierarchyLevel::Unit => EntityDetails::Unit(UnitDetails {
                designation: String::new(),
                unit_type: String::new(),
                floor: None,
                occupant: None,
            }),
        }
    }

    pub fn level(&self) -> HierarchyLevel {
        match self {
            EntityDetails::Zone { .. } => HierarchyLevel::Zone,
            EntityDetails::Block { .. } => HierarchyLevel::Block,
            EntityDetails::Building { .. } => HierarchyLevel::Building,
            EntityDetails::Unit(_) => HierarchyLevel::Unit,
        }
    }
}

impl<O> Entity<O> {
    fn with_level(
        id: EntityId,
        level: HierarchyLevel,
        parent_id: Option<EntityId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            level,
            display_name: name.into(),
            parent_id,
            created_at: None,
            details: EntityDetails::empty(level),
        }
    }

    pub fn zone(id: EntityId, name: impl Into<String>) -> Self {
        Self::with_level(id, HierarchyLevel::Zone, None, name)
    }

    pub fn block(id: EntityId, zone: EntityId, name: impl Into<String>) -> Self {
        Self::with_level(id, HierarchyLevel::Block, Some(zone), name)
    }

    pub fn building(id: EntityId, block: EntityId, name: impl Into<String>) -> Self {
        Self::with_level(id, HierarchyLevel::Building, Some(block), name)
    }

    /// A vacant unit. The door designation doubles as display name.
    pub fn unit(
        id: EntityId,
        building: EntityId,
        designation: impl Into<String>,
        unit_type: impl Into<String>,
    ) -> Self {
        let designation = designation.into();
        Self {
            id,
            level: HierarchyLevel::Unit,
            display_name: designation.clone(),
            parent_id: Some(building),
            created_at: None,
            details: EntityDetails::Unit(UnitDetails {
                designation,
                unit_type: unit_type.into(),
                floor: None,
                occupant: None,
            }),
        }
    }

    pub fn with_occupant(mut self, occupant: O) -> Self {
        if let EntityDetails::Unit(unit) = &mut self.details {
            unit.occupant = Some(occupant);
        }
        self
    }

    pub fn with_floor(mut self, floor: i32) -> Self {
        if let EntityDetails::Unit(unit) = &mut self.details {
            unit.floor = Some(floor);
        }
        self
    }

    pub fn with_floors(mut self, count: u32) -> Self {
        if let EntityDetails::Building { floors, .. } = &mut self.details {
            *floors = Some(count);
        }
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn unit_details(&self) -> Option<&UnitDetails<O>> {
        match &self.details {
            EntityDetails::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn unit_details_mut(&mut self) -> Option<&mut UnitDetails<O>> {
        match &mut self.details {
            EntityDetails::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn occupant(&self) -> Option<&O> {
        self.unit_details().and_then(|u| u.occupant.as_ref())
    }

    /// Administrator linked to a Zone, Block or Building. Units have none.
    pub fn admin(&self) -> Option<&AdminContact> {
        match &self.details {
            EntityDetails::Zone { admin, .. }
            | EntityDetails::Block { admin, .. }
            | EntityDetails::Building { admin, .. } => admin.as_ref(),
            EntityDetails::Unit(_) => None,
        }
    }

    /// Floor count of a Building, if recorded.
    pub fn floors(&self) -> Option<u32> {
        match &self.details {
            EntityDetails::Building { floors, .. } => *floors,
            _ => None,
        }
    }

    /// Replace the occupant representation, keeping everything else.
    pub fn map_occupant<P>(self, f: impl FnOnce(O) -> P) -> Entity<P> {
        let details = match self.details {
            EntityDetails::Zone { address, admin } => EntityDetails::Zone { address, admin },
            EntityDetails::Block { street, admin } => EntityDetails::Block { street, admin },
            EntityDetails::Building { managing_entity, floors, admin } => {
                EntityDetails::Building { managing_entity, floors, admin }
            }
            EntityDetails::Unit(unit) => EntityDetails::Unit(UnitDetails {
                designation: unit.designation,
                unit_type: unit.unit_type,
                floor: unit.floor,
                occupant: unit.occupant.map(f),
            }),
        };
        Entity {
            id: self.id,
            level: self.level,
            display_name: self.display_name,
            parent_id: self.parent_id,
            created_at: self.created_at,
            details,
        }
    }
}
