//! Visibility resolver: how much of an occupant a viewer may see.

use crate::model::{DisclosurePolicy, Entity, EntityView, Occupant, OccupantView, Role};

/// Administrators always see everything. Residents see public profiles only.
/// A vacant unit is `Absent` for everyone.
pub fn resolve_disclosure(viewer: Role, occupant: Option<&Occupant>) -> DisclosurePolicy {
    match occupant {
        None => DisclosurePolicy::Absent,
        Some(_) if viewer.is_admin() => DisclosurePolicy::Full,
        Some(o) if o.is_public_profile => DisclosurePolicy::Full,
        Some(_) => DisclosurePolicy::Redacted,
    }
}

/// Build the caller-facing view of one occupant.
pub fn view_occupant(viewer: Role, occupant: &Occupant, placeholder: &str) -> OccupantView {
    match resolve_disclosure(viewer, Some(occupant)) {
        DisclosurePolicy::Full => OccupantView::full(occupant),
        _ => OccupantView::redacted(placeholder),
    }
}

/// Project a repository entity for `viewer`. Non-unit entities carry no
/// personal data and pass through unchanged.
pub fn project(viewer: Role, entity: &Entity, placeholder: &str) -> EntityView {
    entity
        .clone()
        .map_occupant(|occupant| view_occupant(viewer, &occupant, placeholder))
}

pub fn project_all<'a>(
    viewer: Role,
    entities: impl IntoIterator<Item = &'a Entity>,
    placeholder: &str,
) -> Vec<EntityView> {
    entities
        .into_iter()
        .map(|e| project(viewer, e, placeholder))
        .collect()
}
