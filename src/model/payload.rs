//! Creation payloads, one shape per hierarchy level.

use serde::{Deserialize, Serialize};

use super::{Entity, EntityDetails, EntityId, HierarchyLevel, Occupant, OccupantId, UnitDetails};
use crate::{Error, Result};

/// Administrator linked to a newly created Zone, Block or Building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminContact {
    pub name: String,
    pub email: String,
}

/// Resident linked to a newly created Unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOccupant {
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub is_public_profile: bool,
}

impl NewOccupant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            national_id: String::new(),
            phone: String::new(),
            email: String::new(),
            is_public_profile: false,
        }
    }

    pub fn into_occupant(self, id: OccupantId) -> Occupant {
        Occupant {
            id,
            name: self.name,
            national_id: self.national_id,
            phone: self.phone,
            email: self.email,
            is_public_profile: self.is_public_profile,
        }
    }
}

/// What a caller submits to create an entity. The variant fixes the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum CreatePayload {
    Zone {
        name: String,
        address: Option<String>,
        admin: Option<AdminContact>,
    },
    Block {
        name: String,
        street: Option<String>,
        admin: Option<AdminContact>,
    },
    Building {
        name: String,
        managing_entity: Option<String>,
        floors: Option<u32>,
        admin: Option<AdminContact>,
    },
    Unit {
        designation: String,
        unit_type: String,
        floor: Option<i32>,
        occupant: Option<NewOccupant>,
    },
}

impl CreatePayload {
    pub fn zone(name: impl Into<String>) -> Self {
        CreatePayload::Zone { name: name.into(), address: None, admin: None }
    }

    pub fn block(name: impl Into<String>) -> Self {
        CreatePayload::Block { name: name.into(), street: None, admin: None }
    }

    pub fn building(name: impl Into<String>) -> Self {
        CreatePayload::Building {
            name: name.into(),
            managing_entity: None,
            floors: None,
            admin: None,
        }
    }

    pub fn unit(designation: impl Into<String>, unit_type: impl Into<String>) -> Self {
        CreatePayload::Unit {
            designation: designation.into(),
            unit_type: unit_type.into(),
            floor: None,
            occupant: None,
        }
    }

    /// Link an administrator. No effect on Unit payloads.
    pub fn with_admin(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        let contact = AdminContact { name: name.into(), email: email.into() };
        match &mut self {
            CreatePayload::Zone { admin, .. }
            | CreatePayload::Block { admin, .. }
            | CreatePayload::Building { admin, .. } => *admin = Some(contact),
            CreatePayload::Unit { .. } => {}
        }
        self
    }

    pub fn with_floors(mut self, count: u32) -> Self {
        if let CreatePayload::Building { floors, .. } = &mut self {
            *floors = Some(count);
        }
        self
    }

    pub fn with_floor(mut self, number: i32) -> Self {
        if let CreatePayload::Unit { floor, .. } = &mut self {
            *floor = Some(number);
        }
        self
    }

    pub fn with_occupant(mut self, resident: NewOccupant) -> Self {
        if let CreatePayload::Unit { occupant, .. } = &mut self {
            *occupant = Some(resident);
        }
        self
    }

    pub fn level(&self) -> HierarchyLevel {
        match self {
            CreatePayload::Zone { .. } => HierarchyLevel::Zone,
            CreatePayload::Block { .. } => HierarchyLevel::Block,
            CreatePayload::Building { .. } => HierarchyLevel::Building,
            CreatePayload::Unit { .. } => HierarchyLevel::Unit,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CreatePayload::Zone { name, .. }
            | CreatePayload::Block { name, .. }
            | CreatePayload::Building { name, .. } => name,
            CreatePayload::Unit { designation, .. } => designation,
        }
    }

    /// Check required fields. `parent` is the entity the new one will hang
    /// under; its floor count bounds a unit's floor number when known.
    pub fn validate(&self, parent: Option<&Entity>) -> Result<()> {
        match self {
            CreatePayload::Zone { name, admin, .. } | CreatePayload::Block { name, admin, .. } => {
                require_text("name", name)?;
                validate_admin(admin.as_ref())
            }
            CreatePayload::Building { name, floors, admin, .. } => {
                require_text("name", name)?;
                if *floors == Some(0) {
                    return Err(Error::InvalidPayload("floors must be at least 1".into()));
                }
                validate_admin(admin.as_ref())
            }
            CreatePayload::Unit { designation, unit_type, floor, occupant } => {
                require_text("designation", designation)?;
                require_text("unit_type", unit_type)?;
                if let Some(floor) = *floor {
                    if floor < 0 {
                        return Err(Error::InvalidPayload(format!("floor {floor} is below ground")));
                    }
                    if let Some(floors) = parent.and_then(|p| p.floors()) {
                        if i64::from(floor) >= i64::from(floors) {
                            return Err(Error::InvalidPayload(format!(
                                "floor {floor} exceeds building with {floors} floors"
                            )));
                        }
                    }
                }
                if let Some(resident) = occupant {
                    require_text("occupant name", &resident.name)?;
                    if !resident.email.is_empty() {
                        require_email(&resident.email)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Materialize the entity a repository stores for this payload.
    /// `occupant_id` is only called when a resident is linked.
    pub fn into_entity(
        self,
        id: EntityId,
        parent_id: Option<EntityId>,
        occupant_id: impl FnOnce() -> OccupantId,
    ) -> Entity {
        let level = self.level();
        let display_name = self.display_name().trim().to_string();
        let details = match self {
            CreatePayload::Zone { address, admin, .. } => EntityDetails::Zone { address, admin },
            CreatePayload::Block { street, admin, .. } => EntityDetails::Block { street, admin },
            CreatePayload::Building { managing_entity, floors, admin, .. } => {
                EntityDetails::Building { managing_entity, floors, admin }
            }
            CreatePayload::Unit { designation, unit_type, floor, occupant } => {
                EntityDetails::Unit(UnitDetails {
                    designation: designation.trim().to_string(),
                    unit_type: unit_type.trim().to_string(),
                    floor,
                    occupant: occupant.map(|o| o.into_occupant(occupant_id())),
                })
            }
        };
        Entity {
            id,
            level,
            display_name,
            parent_id,
            created_at: None,
            details,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidPayload(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::InvalidPayload(format!("'{email}' is not an email address"))),
    }
}

fn validate_admin(admin: Option<&AdminContact>) -> Result<()> {
    if let Some(admin) = admin {
        require_text("admin name", &admin.name)?;
        require_email(&admin.email)?;
    }
    Ok(())
}
