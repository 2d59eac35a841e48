// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_authz::{
	Ability, AbilityFactory, Action, CompileContext, Decision, Principal, Resource, Role,
	SubjectType, UserId,
};

/// A principal together with the ability the factory built for it.
pub struct TestPrincipal {
	pub principal: Principal,
	pub ability: Ability,
}

impl TestPrincipal {
	pub fn new(role: Role) -> Self {
		Self::with_context(role, None)
	}

	pub fn with_context(role: Role, context: Option<&CompileContext>) -> Self {
		let principal = Principal::new(UserId::generate(), role);
		let ability = AbilityFactory::new()
			.unwrap()
			.for_principal(&principal, context)
			.unwrap();
		Self { principal, ability }
	}

	pub fn id(&self) -> UserId {
		self.principal.id
	}
}

pub enum CaseSubject {
	Type(SubjectType),
	Instance(Resource),
}

pub struct AuthzCase {
	pub name: &'static str,
	pub action: Action,
	pub subject: CaseSubject,
	pub expected: Decision,
}

pub fn run_authz_cases(ability: &Ability, cases: &[AuthzCase]) {
	for case in cases {
		let result = match &case.subject {
			CaseSubject::Type(subject_type) => ability.evaluate(case.action, *subject_type),
			CaseSubject::Instance(resource) => ability.evaluate(case.action, resource),
		};

		match result {
			Ok(decision) if decision == case.expected => {}
			Ok(decision) => panic!(
				"Case '{}': {} - expected {}, got {}",
				case.name, case.action, case.expected, decision
			),
			Err(e) => panic!("Case '{}': {} - unexpected error: {e}", case.name, case.action),
		}
	}
}
