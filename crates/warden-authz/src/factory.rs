// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builds abilities for authenticated principals.

use crate::ability::Ability;
use crate::compiler::{compile, CompileContext};
use crate::error::Result;
use crate::rule::Rule;
use crate::types::{Principal, Role};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Composes role compilation with principal identity.
///
/// Compilation is pure, so the factory may compile every role once up front
/// and hand the same rule sequence to every ability for that role. The cache is
/// filled at construction and never written again.
#[derive(Debug, Clone, Default)]
pub struct AbilityFactory {
	compiled: HashMap<Role, Arc<[Rule]>>,
	log_decisions: bool,
}

impl AbilityFactory {
	/// Creates a factory with every role precompiled.
	pub fn new() -> Result<Self> {
		let mut compiled: HashMap<Role, Arc<[Rule]>> = HashMap::with_capacity(Role::all().len());
		for role in Role::all() {
			compiled.insert(*role, Arc::from(compile(*role, None)?));
		}
		debug!(roles = compiled.len(), "precompiled role rule sets");

		Ok(Self {
			compiled,
			log_decisions: false,
		})
	}

	/// Creates a factory that compiles on every call.
	pub fn uncached() -> Self {
		Self::default()
	}

	/// Builder: abilities log each decision at `info`.
	pub fn with_decision_logging(mut self, enabled: bool) -> Self {
		self.log_decisions = enabled;
		self
	}

	/// Builds the ability for `principal`.
	///
	/// A non-empty `context` always compiles fresh; otherwise the precompiled
	/// rule set for the principal's role is shared.
	pub fn for_principal(
		&self,
		principal: &Principal,
		context: Option<&CompileContext>,
	) -> Result<Ability> {
		let context = context.filter(|c| !c.is_empty());

		let rules = match (context, self.compiled.get(&principal.role)) {
			(None, Some(rules)) => Arc::clone(rules),
			_ => Arc::from(compile(principal.role, context)?),
		};

		Ok(Ability::new(principal.clone(), rules).with_decision_logging(self.log_decisions))
	}

	pub fn is_precompiled(&self, role: Role) -> bool {
		self.compiled.contains_key(&role)
	}
}
