//! Occupant disclosure as seen through listings.

use estate_rs::{
    CreatePayload, DisclosurePolicy, Entity, EntityRepository, EntityView, MemoryRepository,
    NewOccupant, OccupantView, Role, ScriptedNotifier, Session, SessionConfig,
    StaticAuthenticator,
};
use pretty_assertions::assert_eq;

/// One building with a private, a public and a vacant unit.
async fn seed(repo: &MemoryRepository) -> Vec<Entity> {
    let zone = repo.create(None, CreatePayload::zone("Kilamba")).await.unwrap();
    let block = repo.create(Some(zone.id), CreatePayload::block("Block A")).await.unwrap();
    let building = repo
        .create(Some(block.id), CreatePayload::building("Building 1").with_floors(3))
        .await
        .unwrap();

    let mut jane = NewOccupant::new("Jane");
    jane.national_id = "00123LA012".into();
    jane.phone = "923 456 789".into();
    jane.email = "jane@example.com".into();
    repo.create(Some(building.id), CreatePayload::unit("101", "T3").with_occupant(jane))
        .await
        .unwrap();

    let mut paulo = NewOccupant::new("Paulo");
    paulo.is_public_profile = true;
    repo.create(Some(building.id), CreatePayload::unit("102", "T2").with_occupant(paulo))
        .await
        .unwrap();

    repo.create(Some(building.id), CreatePayload::unit("103", "T1"))
        .await
        .unwrap();

    vec![zone, block, building]
}

async fn units_as(role: Role, config: SessionConfig) -> Vec<EntityView> {
    let repo = MemoryRepository::new();
    let chain = seed(&repo).await;
    let session = Session::new(
        repo,
        ScriptedNotifier::accepting(),
        StaticAuthenticator::for_role(role),
        config,
    );
    for ancestor in &chain {
        session.descend_into(ancestor).unwrap();
    }
    session.list_children().await.unwrap()
}

fn occupant<'a>(units: &'a [EntityView], designation: &str) -> Option<&'a OccupantView> {
    units
        .iter()
        .find(|u| u.display_name == designation)
        .and_then(|u| u.occupant())
}

#[tokio::test]
async fn test_resident_sees_placeholder_for_private_profile() {
    let units = units_as(Role::Resident, SessionConfig::default()).await;

    let view = occupant(&units, "101").unwrap();
    assert!(view.is_redacted());
    assert_eq!(view.name, "Private");
    assert_eq!(view.occupant_id, None);

    let json = serde_json::to_string(&units).unwrap();
    assert!(!json.contains("Jane"));
    assert!(!json.contains("00123LA012"));
    assert!(!json.contains("jane@example.com"));
}

#[tokio::test]
async fn test_resident_sees_public_profile() {
    let units = units_as(Role::Resident, SessionConfig::default()).await;
    let view = occupant(&units, "102").unwrap();
    assert_eq!(view.disclosure, DisclosurePolicy::Full);
    assert_eq!(view.name, "Paulo");
}

#[tokio::test]
async fn test_admins_see_everything() {
    for role in [Role::NetworkAdmin, Role::BlockAdmin, Role::BuildingAdmin] {
        let units = units_as(role, SessionConfig::default()).await;
        let view = occupant(&units, "101").unwrap();
        assert_eq!(view.disclosure, DisclosurePolicy::Full, "{role}");
        assert_eq!(view.name, "Jane");
        assert_eq!(view.email, "jane@example.com");
    }
}

#[tokio::test]
async fn test_vacant_unit_has_no_occupant() {
    let units = units_as(Role::Resident, SessionConfig::default()).await;
    assert_eq!(units.len(), 3);
    assert!(occupant(&units, "103").is_none());
}

#[tokio::test]
async fn test_configured_placeholder() {
    let config = SessionConfig::default().with_placeholder("Privado");
    let units = units_as(Role::Resident, config).await;
    assert_eq!(occupant(&units, "101").unwrap().name, "Privado");
}

#[tokio::test]
async fn test_cached_listing_filtered_for_current_role() {
    let repo = MemoryRepository::new();
    let chain = seed(&repo).await;
    let session = Session::new(
        repo,
        ScriptedNotifier::accepting(),
        StaticAuthenticator::for_role(Role::Resident),
        SessionConfig::default(),
    );
    for ancestor in &chain {
        session.descend_into(ancestor).unwrap();
    }
    session.list_children().await.unwrap();

    let cached = session.cached_children().unwrap().unwrap();
    assert!(occupant(&cached, "101").unwrap().is_redacted());
}
