// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use proptest::prelude::*;
use uuid::Uuid;
use warden_authz::{
	registry, AbilityFactory, Action, Decision, Principal, Resource, Role, SubjectType, UserId,
};

/// Type-level grants per role, written out independently of the compiler.
fn granted(role: Role, action: Action, subject_type: SubjectType) -> bool {
	match role {
		Role::Admin => true,
		Role::Member => match subject_type {
			SubjectType::User => action == Action::Read,
			SubjectType::Project => true,
			_ => false,
		},
		Role::Billing => subject_type == SubjectType::Billing,
	}
}

fn legal_pairs() -> Vec<(Action, SubjectType)> {
	registry()
		.subject_types()
		.flat_map(|st| {
			registry()
				.actions_for(st)
				.chain([Action::Manage])
				.map(move |action| (action, st))
		})
		.collect()
}

fn arb_role() -> impl Strategy<Value = Role> {
	prop_oneof![Just(Role::Admin), Just(Role::Member), Just(Role::Billing)]
}

fn user(n: u128) -> UserId {
	UserId::new(Uuid::from_u128(n))
}

#[test]
fn test_type_level_decisions_match_grant_table() {
	let factory = AbilityFactory::new().unwrap();
	for role in Role::all() {
		let ability = factory
			.for_principal(&Principal::new(UserId::generate(), *role), None)
			.unwrap();
		for (action, subject_type) in legal_pairs() {
			assert_eq!(
				ability.can(action, subject_type).unwrap(),
				granted(*role, action, subject_type),
				"{role} {action} {subject_type}"
			);
		}
	}
}

proptest! {
	#[test]
	fn default_deny_holds_for_instances(
		role in arb_role(),
		principal_uuid in any::<u128>(),
		owner_uuid in any::<u128>(),
	) {
		let principal = Principal::new(user(principal_uuid), role);
		let ability = AbilityFactory::new().unwrap().for_principal(&principal, None).unwrap();

		for (action, subject_type) in legal_pairs() {
			let resource = Resource::new(subject_type).with_owner(user(owner_uuid));
			if ability.can(action, &resource).unwrap() {
				prop_assert!(
					granted(role, action, subject_type),
					"{} allowed {} on {}", role, action, subject_type
				);
			}
		}
	}

	#[test]
	fn admin_org_changes_require_ownership(
		principal_uuid in any::<u128>(),
		owner_uuid in any::<u128>(),
	) {
		let principal = Principal::new(user(principal_uuid), Role::Admin);
		let ability = AbilityFactory::new().unwrap().for_principal(&principal, None).unwrap();
		let org = Resource::organization(user(owner_uuid));
		let expected = if principal_uuid == owner_uuid { Decision::Allow } else { Decision::Deny };

		for action in [Action::TransferOwnership, Action::Update, Action::Delete] {
			prop_assert_eq!(ability.evaluate(action, &org).unwrap(), expected);
		}
		prop_assert!(ability.can(Action::Read, &org).unwrap());
	}

	#[test]
	fn admin_always_owns_own_org(principal_uuid in any::<u128>()) {
		let principal = Principal::new(user(principal_uuid), Role::Admin);
		let ability = AbilityFactory::new().unwrap().for_principal(&principal, None).unwrap();
		let org = Resource::organization(principal.id);
		prop_assert!(ability.can(Action::TransferOwnership, &org).unwrap());
	}

	#[test]
	fn member_manages_only_own_projects(
		principal_uuid in any::<u128>(),
		owner_uuid in any::<u128>(),
	) {
		prop_assume!(principal_uuid != owner_uuid);

		let principal = Principal::new(user(principal_uuid), Role::Member);
		let ability = AbilityFactory::new().unwrap().for_principal(&principal, None).unwrap();

		prop_assert!(ability.can(Action::Manage, &Resource::project(principal.id)).unwrap());
		prop_assert!(ability.cannot(Action::Manage, &Resource::project(user(owner_uuid))).unwrap());
	}

	#[test]
	fn factory_is_deterministic(
		role in arb_role(),
		principal_uuid in any::<u128>(),
		owner_uuid in any::<u128>(),
	) {
		let principal = Principal::new(user(principal_uuid), role);
		let first = AbilityFactory::new().unwrap().for_principal(&principal, None).unwrap();
		let second = AbilityFactory::uncached().for_principal(&principal, None).unwrap();

		for (action, subject_type) in legal_pairs() {
			let own = Resource::new(subject_type).with_owner(principal.id);
			let other = Resource::new(subject_type).with_owner(user(owner_uuid));

			prop_assert_eq!(first.evaluate(action, subject_type), second.evaluate(action, subject_type));
			prop_assert_eq!(first.evaluate(action, &own), second.evaluate(action, &own));
			prop_assert_eq!(first.evaluate(action, &other), second.evaluate(action, &other));
		}
	}

	#[test]
	fn evaluation_is_idempotent(
		role in arb_role(),
		principal_uuid in any::<u128>(),
		owner_uuid in any::<u128>(),
	) {
		let principal = Principal::new(user(principal_uuid), role);
		let ability = AbilityFactory::new().unwrap().for_principal(&principal, None).unwrap();
		let rules_before = ability.rules().to_vec();

		for (action, subject_type) in legal_pairs() {
			let resource = Resource::new(subject_type).with_owner(user(owner_uuid));
			let once = ability.explain(action, &resource);
			let twice = ability.explain(action, &resource);
			prop_assert_eq!(once, twice);
		}
		prop_assert_eq!(ability.rules(), rules_before.as_slice());
	}
}
