//! Property tests over the permission table and navigation transitions.

use estate_rs::policy::{can_mutate, require, Operation};
use estate_rs::{Entity, EntityId, Error, HierarchyLevel, NavigationState, Role};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn any_level() -> impl Strategy<Value = HierarchyLevel> {
    prop::sample::select(HierarchyLevel::ALL.to_vec())
}

fn any_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![Just(Operation::Create), Just(Operation::Delete)]
}

/// Rows of the permission table, written out by hand.
fn allowed(role: Role, level: HierarchyLevel) -> bool {
    use HierarchyLevel::*;
    match role {
        Role::NetworkAdmin => true,
        Role::BlockAdmin => matches!(level, Building | Unit),
        Role::BuildingAdmin => matches!(level, Unit),
        Role::Resident => false,
    }
}

#[derive(Debug, Clone)]
enum Step {
    Descend(u64),
    Ascend,
    Jump(HierarchyLevel),
    Reset,
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (1u64..1_000).prop_map(Step::Descend),
        2 => Just(Step::Ascend),
        1 => any_level().prop_map(Step::Jump),
        1 => Just(Step::Reset),
    ]
}

/// An entity that may legally be descended into from `state`, if any.
fn listed_child(state: &NavigationState, id: u64) -> Option<Entity> {
    state.active_level.child()?;
    let id = EntityId(id);
    Some(match (state.active_level, state.parent_id()) {
        (HierarchyLevel::Zone, _) => Entity::zone(id, format!("Zone {id}")),
        (HierarchyLevel::Block, Some(p)) => Entity::block(id, p, format!("Block {id}")),
        (HierarchyLevel::Building, Some(p)) => Entity::building(id, p, format!("Building {id}")),
        _ => return None,
    })
}

fn assert_well_formed(state: &NavigationState) -> Result<(), TestCaseError> {
    prop_assert_eq!(state.chain.len(), state.active_level.depth());
    for (depth, ancestor) in state.chain.iter().enumerate() {
        prop_assert_eq!(Some(ancestor.level), HierarchyLevel::from_depth(depth));
        let expected_parent = depth.checked_sub(1).map(|i| state.chain[i].id);
        prop_assert_eq!(ancestor.parent_id, expected_parent);
    }
    Ok(())
}

proptest! {
    #[test]
    fn permission_table_is_total(role in any_role(), level in any_level(), op in any_operation()) {
        prop_assert_eq!(can_mutate(role, level, op), allowed(role, level));
        match require(role, level, op) {
            Ok(()) => prop_assert!(allowed(role, level)),
            Err(Error::Forbidden { role: r, level: l, .. }) => {
                prop_assert!(!allowed(role, level));
                prop_assert_eq!((r, l), (role, level));
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn create_and_delete_rights_coincide(role in any_role(), level in any_level()) {
        prop_assert_eq!(
            can_mutate(role, level, Operation::Create),
            can_mutate(role, level, Operation::Delete)
        );
    }

    #[test]
    fn transitions_keep_chain_well_formed(steps in prop::collection::vec(any_step(), 0..40)) {
        let mut state = NavigationState::root();
        for step in steps {
            let before = state.version;
            let next = match step {
                Step::Descend(id) => match listed_child(&state, id) {
                    Some(child) => state.descended(&child),
                    None => continue,
                },
                Step::Ascend => state.ascended(),
                Step::Jump(level) => state.truncated(level),
                Step::Reset => Ok(state.reset()),
            };
            match next {
                Ok(next) => {
                    prop_assert!(next.version > before);
                    state = next;
                }
                Err(Error::AtRoot) => prop_assert!(state.is_root()),
                Err(Error::InvalidDescent(_)) => {}
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
            assert_well_formed(&state)?;
        }
    }

    #[test]
    fn descend_then_ascend_returns_to_start(
        ids in prop::collection::vec(1u64..1_000, 0..3),
        child in 1_000u64..2_000,
    ) {
        let mut state = NavigationState::root();
        for id in ids {
            let Some(next) = listed_child(&state, id) else { break };
            state = state.descended(&next).unwrap();
        }

        let entered = listed_child(&state, child).unwrap();
        let back = state.descended(&entered).unwrap().ascended().unwrap();
        prop_assert!(back.same_position(&state));
        prop_assert!(back.version > state.version);
    }
}
