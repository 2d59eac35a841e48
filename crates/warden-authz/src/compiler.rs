// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role compiler: maps a role to its ordered rule sequence.
//!
//! Compilation is a pure function of `(role, context)`. Every rule is validated
//! against the subject registry, and the output always lists deny rules before
//! allow rules so that first-match evaluation lets a scoped exception win over
//! a blanket grant.
//!
//! | role      | rules                                                                  |
//! |-----------|------------------------------------------------------------------------|
//! | `ADMIN`   | deny `transfer_ownership` / `update` / `delete` on foreign organizations, then `manage` everything |
//! | `MEMBER`  | `read` users, `create` projects, `manage` owned projects               |
//! | `BILLING` | `manage` billing                                                       |

use crate::error::Result;
use crate::registry::{Action, SubjectType};
use crate::rule::{Condition, Rule};
use crate::types::{ResourceId, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Extra facts about the principal known to the caller at compile time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompileContext {
	/// Resources an external ownership source attributes to the principal.
	#[serde(default)]
	pub owned_resource_ids: BTreeSet<ResourceId>,
}

impl CompileContext {
	pub fn owning(ids: impl IntoIterator<Item = ResourceId>) -> Self {
		Self {
			owned_resource_ids: ids.into_iter().collect(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.owned_resource_ids.is_empty()
	}
}

/// Compiles the rule sequence for `role`.
///
/// Fails with [`AuthzError::InvalidRuleDefinition`](crate::AuthzError::InvalidRuleDefinition)
/// only if a policy below references vocabulary outside the registry.
pub fn compile(role: Role, context: Option<&CompileContext>) -> Result<Vec<Rule>> {
	let mut rules = match role {
		Role::Admin => admin_rules()?,
		Role::Member => member_rules(context)?,
		Role::Billing => billing_rules()?,
	};

	order_rules(&mut rules);

	debug!(
		role = %role,
		rules = rules.len(),
		deny_rules = rules.iter().filter(|r| r.is_deny()).count(),
		owned_resources = context.map_or(0, |c| c.owned_resource_ids.len()),
		"compiled role"
	);

	Ok(rules)
}

/// Stable partition: deny rules first, otherwise preserving definition order.
pub fn order_rules(rules: &mut [Rule]) {
	rules.sort_by_key(|rule| !rule.is_deny());
}

/// Returns true if no allow rule precedes a deny rule.
pub fn is_deny_first(rules: &[Rule]) -> bool {
	rules
		.iter()
		.skip_while(|rule| rule.is_deny())
		.all(|rule| !rule.is_deny())
}

fn admin_rules() -> Result<Vec<Rule>> {
	let not_owner = Condition::not(Condition::OwnedByPrincipal);

	Ok(vec![
		Rule::deny([Action::TransferOwnership], [SubjectType::Organization])?
			.when(not_owner.clone())?
			.because("only the organization owner can transfer ownership"),
		Rule::deny([Action::Update, Action::Delete], [SubjectType::Organization])?
			.when(not_owner)?
			.because("only the organization owner can update or delete it"),
		Rule::allow([Action::Manage], SubjectType::all().iter().copied())?,
	])
}

fn member_rules(context: Option<&CompileContext>) -> Result<Vec<Rule>> {
	let mut rules = vec![
		Rule::allow([Action::Read], [SubjectType::User])?,
		Rule::allow([Action::Create], [SubjectType::Project])?,
		Rule::allow([Action::Manage], [SubjectType::Project])?.when(Condition::OwnedByPrincipal)?,
	];

	if let Some(context) = context.filter(|c| !c.is_empty()) {
		rules.push(
			Rule::allow([Action::Manage], [SubjectType::Project])?
				.when(Condition::id_in(context.owned_resource_ids.iter().copied()))?,
		);
	}

	Ok(rules)
}

fn billing_rules() -> Result<Vec<Rule>> {
	Ok(vec![Rule::allow([Action::Manage], [SubjectType::Billing])?])
}
