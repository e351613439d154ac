//! Occupant records and their caller-facing projection.

use serde::{Deserialize, Serialize};

/// Opaque occupant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantId(pub u64);

impl std::fmt::Display for OccupantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resident associated with a unit, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: OccupantId,
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
    /// When set, residents of the same building may see this profile.
    pub is_public_profile: bool,
}

impl Occupant {
    /// A private occupant with only a name on record.
    pub fn new(id: OccupantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            national_id: String::new(),
            phone: String::new(),
            email: String::new(),
            is_public_profile: false,
        }
    }

    pub fn with_contact(
        mut self,
        national_id: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.national_id = national_id.into();
        self.phone = phone.into();
        self.email = email.into();
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public_profile = is_public;
        self
    }
}

/// How much of an occupant a viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisclosurePolicy {
    /// Every stored field is shown.
    Full,
    /// The unit is known to be occupied; personal fields are placeholders.
    Redacted,
    /// The unit is vacant; there is nobody to disclose.
    Absent,
}

/// An occupant as handed to a caller.
///
/// The privacy flag is not part of the view, and a redacted view carries
/// nothing derived from the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantView {
    /// `Full` or `Redacted`; vacant units have no view at all.
    pub disclosure: DisclosurePolicy,
    /// Only present under full disclosure.
    pub occupant_id: Option<OccupantId>,
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
}

impl OccupantView {
    pub fn full(occupant: &Occupant) -> Self {
        Self {
            disclosure: DisclosurePolicy::Full,
            occupant_id: Some(occupant.id),
            name: occupant.name.clone(),
            national_id: occupant.national_id.clone(),
            phone: occupant.phone.clone(),
            email: occupant.email.clone(),
        }
    }

    pub fn redacted(placeholder: &str) -> Self {
        Self {
            disclosure: DisclosurePolicy::Redacted,
            occupant_id: None,
            name: placeholder.to_string(),
            national_id: placeholder.to_string(),
            phone: placeholder.to_string(),
            email: placeholder.to_string(),
        }
    }

    pub fn is_redacted(&self) -> bool {
        self.disclosure == DisclosurePolicy::Redacted
    }
}
