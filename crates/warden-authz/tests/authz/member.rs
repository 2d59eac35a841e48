// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_authz::{
	Action, CompileContext, Decision, Resource, ResourceId, Role, SubjectType, UserId,
};

use super::support::{run_authz_cases, AuthzCase, CaseSubject, TestPrincipal};

#[test]
fn test_member_authorization() {
	let member = TestPrincipal::new(Role::Member);
	let own_project = Resource::project(member.id());
	let other_project = Resource::project(UserId::generate());

	let cases = vec![
		AuthzCase {
			name: "member_can_manage_own_project",
			action: Action::Manage,
			subject: CaseSubject::Instance(own_project.clone()),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "member_can_delete_own_project",
			action: Action::Delete,
			subject: CaseSubject::Instance(own_project),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "member_cannot_manage_other_project",
			action: Action::Manage,
			subject: CaseSubject::Instance(other_project.clone()),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "member_cannot_read_other_project",
			action: Action::Read,
			subject: CaseSubject::Instance(other_project),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "member_can_create_projects",
			action: Action::Create,
			subject: CaseSubject::Type(SubjectType::Project),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "member_can_read_users",
			action: Action::Read,
			subject: CaseSubject::Instance(Resource::user(UserId::generate())),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "member_cannot_update_users",
			action: Action::Update,
			subject: CaseSubject::Type(SubjectType::User),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "member_cannot_read_billing",
			action: Action::Read,
			subject: CaseSubject::Type(SubjectType::Billing),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "member_cannot_read_organization",
			action: Action::Read,
			subject: CaseSubject::Instance(Resource::organization(UserId::generate())),
			expected: Decision::Deny,
		},
		AuthzCase {
			name: "member_cannot_send_invites",
			action: Action::Invite,
			subject: CaseSubject::Type(SubjectType::Invite),
			expected: Decision::Deny,
		},
	];

	run_authz_cases(&member.ability, &cases);
}

#[test]
fn test_member_context_ownership() {
	let project_id = ResourceId::generate();
	let context = CompileContext::owning([project_id]);
	let member = TestPrincipal::with_context(Role::Member, Some(&context));

	let cases = vec![
		AuthzCase {
			name: "member_can_manage_project_owned_by_context",
			action: Action::Manage,
			subject: CaseSubject::Instance(
				Resource::project(UserId::generate()).with_id(project_id),
			),
			expected: Decision::Allow,
		},
		AuthzCase {
			name: "member_cannot_manage_unlisted_project",
			action: Action::Manage,
			subject: CaseSubject::Instance(
				Resource::project(UserId::generate()).with_id(ResourceId::generate()),
			),
			expected: Decision::Deny,
		},
	];

	run_authz_cases(&member.ability, &cases);
}
