// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_authz::{Action, AuthzError, Decision, Resource, Role, SubjectType, UserId};

use super::support::{run_authz_cases, AuthzCase, CaseSubject, TestPrincipal};

#[test]
fn test_admin_authorization() {
	let admin = TestPrincipal::new(Role::Admin);
	let own_org = Resource::organization(admin.id());
	let other_org = Resource::organization(UserId::generate());

	let cases = vec![
		AuthzCase {
			name: "owner_admin_can_transfer_ownership",
			action: Action::TransferOwnership,
			subject: CaseSubject::Instance(own_org.clone()),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "non_owner_admin_cannot_transfer_ownership",
			action: Action::TransferOwnership,
			subject: CaseSubject::Instance(other_org.clone()),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "owner_admin_can_update_org",
			action: Action::Update,
			subject: CaseSubject::Instance(own_org.clone()),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "non_owner_admin_cannot_update_org",
			action: Action::Update,
			subject: CaseSubject::Instance(other_org.clone()),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "owner_admin_can_delete_org",
			action: Action::Delete,
			subject: CaseSubject::Instance(own_org),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "non_owner_admin_cannot_delete_org",
			action: Action::Delete,
			subject: CaseSubject::Instance(other_org.clone()),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "admin_can_read_any_org",
			action: Action::Read,
			subject: CaseSubject::Instance(other_org.clone()),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "admin_can_export_any_org",
			action: Action::Export,
			subject: CaseSubject::Instance(other_org.clone()),
			expected: Decision::Allow,
		},
		// The ownership denies name concrete actions; a `manage` query only
		// meets the blanket grant.
		AuthzCase {
			name: "non_owner_admin_manage_query_hits_blanket_grant",
			action: Action::Manage,
			subject: CaseSubject::Instance(other_org),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "admin_can_manage_foreign_projects",
			action: Action::Manage,
			subject: CaseSubject::Instance(Resource::project(UserId::generate())),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "admin_can_manage_billing",
			action: Action::Manage,
			subject: CaseSubject::Type(SubjectType::Billing),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "admin_can_send_invites",
			action: Action::Invite,
			subject: CaseSubject::Type(SubjectType::Invite),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "type_level_update_org_is_allowed_for_some_org",
			action: Action::Update,
			subject: CaseSubject::Type(SubjectType::Organization),
			expected: Decision::Allow,
		},
	];

	run_authz_cases(&admin.ability, &cases);
}

#[test]
fn test_admin_org_without_owner_is_ambiguous() {
	let admin = TestPrincipal::new(Role::Admin);
	let org = Resource::new(SubjectType::Organization);

	for action in [Action::Update, Action::Delete, Action::TransferOwnership] {
		let err = admin.ability.evaluate(action, &org).unwrap_err();
		assert_eq!(
			err,
			AuthzError::MissingResourceAttribute {
				subject_type: SubjectType::Organization,
				attribute: "owner_id".to_string(),
			},
			"action {action}"
		);
	}

	// Reading does not consult ownership, so an incomplete snapshot is fine.
	assert!(admin.ability.can(Action::Read, &org).unwrap());
}

#[test]
fn test_admin_manage_on_foreign_org_is_decided_by_blanket_grant() {
	let admin = TestPrincipal::new(Role::Admin);
	let other_org = Resource::organization(UserId::generate());

	let evaluation = admin.ability.explain(Action::Manage, &other_org).unwrap();
	assert_eq!(evaluation.decision, Decision::Allow);
	let index = evaluation.rule_index.unwrap();
	assert!(admin.ability.rules()[index].is_blanket_grant());

	for action in [Action::Update, Action::Delete, Action::TransferOwnership] {
		assert!(admin.ability.cannot(action, &other_org).unwrap(), "{action}");
	}
}

#[test]
fn test_admin_ensure_blocks_foreign_transfer() {
	let admin = TestPrincipal::new(Role::Admin);
	let other_org = Resource::organization(UserId::generate());
	assert!(matches!(
		admin.ability.ensure(Action::TransferOwnership, &other_org),
		Err(AuthzError::Forbidden { .. })
	));
}
