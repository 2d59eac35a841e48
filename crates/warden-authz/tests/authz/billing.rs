// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_authz::{registry, Action, Decision, Resource, Role, SubjectType, UserId};

use super::support::TestPrincipal;

#[test]
fn test_billing_can_do_anything_with_billing() {
	let billing = TestPrincipal::new(Role::Billing);
	let account = Resource::billing(UserId::generate());

	for action in registry().actions_for(SubjectType::Billing).chain([Action::Manage]) {
		assert_eq!(
			billing.ability.evaluate(action, SubjectType::Billing).unwrap(),
			Decision::Allow,
			"type-level {action}"
		);
		assert_eq!(
			billing.ability.evaluate(action, &account).unwrap(),
			Decision::Allow,
			"instance {action}"
		);
	}
}

#[test]
fn test_billing_has_nothing_else() {
	let billing = TestPrincipal::new(Role::Billing);

	for subject_type in registry()
		.subject_types()
		.filter(|st| *st != SubjectType::Billing)
	{
		for action in registry().actions_for(subject_type).chain([Action::Manage]) {
			assert_eq!(
				billing.ability.evaluate(action, subject_type).unwrap(),
				Decision::Deny,
				"{action} {subject_type}"
			);
		}
	}
}
