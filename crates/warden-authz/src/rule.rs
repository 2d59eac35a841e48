// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Atomic permission statements.
//!
//! A [`Rule`] says "`effect` for `actions` on `subjects` when `condition`
//! holds". Rules are validated against the [subject registry](crate::registry)
//! when they are built and are immutable afterwards. They carry no behavior of
//! their own beyond matching; ordering and first-match semantics belong to the
//! [`Ability`](crate::Ability).

use crate::error::{AuthzError, Result};
use crate::registry::{registry, Action, SubjectType, ID_ATTRIBUTE, OWNER_ATTRIBUTE};
use crate::resource::{Resource, Subject};
use crate::types::{Principal, ResourceId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Whether a matching rule grants or refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
	Allow,
	Deny,
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Effect::Allow => write!(f, "allow"),
			Effect::Deny => write!(f, "deny"),
		}
	}
}

// =============================================================================
// Conditions
// =============================================================================

/// Attribute predicate over `(principal, resource)`.
///
/// Conditions are data so compiled rule sets can be serialized and compared.
/// The principal is bound when the ability evaluates, never when the rule is
/// defined. Resource attributes are read through [`Resource::attribute`], so
/// `id` and `owner_id` resolve the same way for every variant. Principal
/// attributes are whatever the identity source supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
	/// `resource.owner_id == principal.id`
	OwnedByPrincipal,
	/// `resource.id` is one of `ids`
	IdIn { ids: BTreeSet<ResourceId> },
	/// A resource attribute equals `value`.
	AttributeEquals {
		attribute: String,
		value: serde_json::Value,
	},
	/// A principal attribute equals `value`.
	PrincipalAttributeEquals {
		attribute: String,
		value: serde_json::Value,
	},
	/// `resource[attribute] == principal[principal_attribute]`
	AttributeMatchesPrincipal {
		attribute: String,
		principal_attribute: String,
	},
	Not { condition: Box<Condition> },
}

impl Condition {
	/// Negates `condition`.
	pub fn not(condition: Condition) -> Self {
		Condition::Not {
			condition: Box::new(condition),
		}
	}

	pub fn id_in(ids: impl IntoIterator<Item = ResourceId>) -> Self {
		Condition::IdIn {
			ids: ids.into_iter().collect(),
		}
	}

	pub fn attribute_equals(attribute: impl Into<String>, value: serde_json::Value) -> Self {
		Condition::AttributeEquals {
			attribute: attribute.into(),
			value,
		}
	}

	pub fn principal_attribute_equals(
		attribute: impl Into<String>,
		value: serde_json::Value,
	) -> Self {
		Condition::PrincipalAttributeEquals {
			attribute: attribute.into(),
			value,
		}
	}

	pub fn attribute_matches_principal(
		attribute: impl Into<String>,
		principal_attribute: impl Into<String>,
	) -> Self {
		Condition::AttributeMatchesPrincipal {
			attribute: attribute.into(),
			principal_attribute: principal_attribute.into(),
		}
	}

	/// Resource attributes this condition reads.
	pub fn attributes(&self) -> Vec<&str> {
		match self {
			Condition::OwnedByPrincipal => vec![OWNER_ATTRIBUTE],
			Condition::IdIn { .. } => vec![ID_ATTRIBUTE],
			Condition::AttributeEquals { attribute, .. }
			| Condition::AttributeMatchesPrincipal { attribute, .. } => vec![attribute.as_str()],
			Condition::PrincipalAttributeEquals { .. } => Vec::new(),
			Condition::Not { condition } => condition.attributes(),
		}
	}

	/// Evaluates the predicate against a resource snapshot.
	///
	/// Fails with [`AuthzError::MissingResourceAttribute`] when the snapshot
	/// lacks an attribute the predicate reads, and with
	/// [`AuthzError::MissingPrincipalAttribute`] when the principal does.
	pub fn evaluate(&self, principal: &Principal, resource: &Resource) -> Result<bool> {
		match self {
			Condition::OwnedByPrincipal => {
				let owner_id = resource
					.owner_id
					.ok_or_else(|| missing(resource, OWNER_ATTRIBUTE))?;
				Ok(owner_id == principal.id)
			}
			Condition::IdIn { ids } => {
				let id = resource.id.ok_or_else(|| missing(resource, ID_ATTRIBUTE))?;
				Ok(ids.contains(&id))
			}
			Condition::AttributeEquals { attribute, value } => {
				let actual = resource
					.attribute(attribute)
					.ok_or_else(|| missing(resource, attribute))?;
				Ok(&actual == value)
			}
			Condition::PrincipalAttributeEquals { attribute, value } => {
				Ok(principal_attribute(principal, attribute)? == value)
			}
			Condition::AttributeMatchesPrincipal {
				attribute,
				principal_attribute: expected,
			} => {
				let actual = resource
					.attribute(attribute)
					.ok_or_else(|| missing(resource, attribute))?;
				Ok(&actual == principal_attribute(principal, expected)?)
			}
			Condition::Not { condition } => Ok(!condition.evaluate(principal, resource)?),
		}
	}
}

fn principal_attribute<'p>(principal: &'p Principal, attribute: &str) -> Result<&'p serde_json::Value> {
	principal
		.attributes
		.get(attribute)
		.ok_or_else(|| AuthzError::MissingPrincipalAttribute {
			attribute: attribute.to_string(),
		})
}

fn missing(resource: &Resource, attribute: &str) -> AuthzError {
	AuthzError::MissingResourceAttribute {
		subject_type: resource.subject_type,
		attribute: attribute.to_string(),
	}
}

// =============================================================================
// Rules
// =============================================================================

/// An allow or deny statement scoping actions on subject types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
	effect: Effect,
	actions: BTreeSet<Action>,
	subjects: BTreeSet<SubjectType>,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<BTreeSet<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	condition: Option<Condition>,
	#[serde(skip_serializing_if = "Option::is_none")]
	reason: Option<String>,
}

impl Rule {
	/// Creates an unconditional grant.
	pub fn allow(
		actions: impl IntoIterator<Item = Action>,
		subjects: impl IntoIterator<Item = SubjectType>,
	) -> Result<Self> {
		Self::new(Effect::Allow, actions, subjects)
	}

	/// Creates an unconditional refusal.
	pub fn deny(
		actions: impl IntoIterator<Item = Action>,
		subjects: impl IntoIterator<Item = SubjectType>,
	) -> Result<Self> {
		Self::new(Effect::Deny, actions, subjects)
	}

	/// Creates a rule, rejecting any pair the registry does not know.
	pub fn new(
		effect: Effect,
		actions: impl IntoIterator<Item = Action>,
		subjects: impl IntoIterator<Item = SubjectType>,
	) -> Result<Self> {
		let actions: BTreeSet<Action> = actions.into_iter().collect();
		let subjects: BTreeSet<SubjectType> = subjects.into_iter().collect();

		if actions.is_empty() {
			return Err(AuthzError::invalid_rule("rule names no actions"));
		}
		if subjects.is_empty() {
			return Err(AuthzError::invalid_rule("rule names no subjects"));
		}

		let registry = registry();
		for subject_type in &subjects {
			for action in &actions {
				if !registry.is_valid(*action, *subject_type) {
					return Err(AuthzError::invalid_rule(format!(
						"`{action}` is not an action of `{subject_type}`"
					)));
				}
			}
		}

		Ok(Self {
			effect,
			actions,
			subjects,
			fields: None,
			condition: None,
			reason: None,
		})
	}

	/// Builder: guard the rule with a condition.
	pub fn when(mut self, condition: Condition) -> Result<Self> {
		for attribute in condition.attributes() {
			self.require_attribute(attribute, "condition reads")?;
		}
		self.condition = Some(condition);
		Ok(self)
	}

	/// Builder: restrict the rule to specific resource fields.
	pub fn on_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Result<Self> {
		let fields: BTreeSet<String> = fields.into_iter().map(Into::into).collect();
		if fields.is_empty() {
			return Err(AuthzError::invalid_rule("field list is empty"));
		}
		for field in &fields {
			self.require_attribute(field, "field")?;
		}
		self.fields = Some(fields);
		Ok(self)
	}

	/// Builder: attach a human readable reason, reported on decisions.
	pub fn because(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());
		self
	}

	fn require_attribute(&self, attribute: &str, what: &str) -> Result<()> {
		let registry = registry();
		match self
			.subjects
			.iter()
			.find(|st| !registry.has_attribute(**st, attribute))
		{
			Some(subject_type) => Err(AuthzError::invalid_rule(format!(
				"{what} `{attribute}` which `{subject_type}` does not have"
			))),
			None => Ok(()),
		}
	}

	pub fn effect(&self) -> Effect {
		self.effect
	}

	pub fn actions(&self) -> &BTreeSet<Action> {
		&self.actions
	}

	pub fn subjects(&self) -> &BTreeSet<SubjectType> {
		&self.subjects
	}

	pub fn fields(&self) -> Option<&BTreeSet<String>> {
		self.fields.as_ref()
	}

	pub fn condition(&self) -> Option<&Condition> {
		self.condition.as_ref()
	}

	pub fn reason(&self) -> Option<&str> {
		self.reason.as_deref()
	}

	pub fn is_deny(&self) -> bool {
		self.effect == Effect::Deny
	}

	/// True if the rule grants everything on its subjects.
	pub fn is_blanket_grant(&self) -> bool {
		self.effect == Effect::Allow
			&& self.condition.is_none()
			&& self.fields.is_none()
			&& self.actions.contains(&Action::Manage)
	}

	/// The literal action or the `manage` wildcard.
	pub fn matches_action(&self, action: Action) -> bool {
		self.actions.contains(&action) || self.actions.contains(&Action::Manage)
	}

	pub fn matches_subject(&self, subject_type: SubjectType) -> bool {
		self.subjects.contains(&subject_type)
	}

	/// Field-scoped rules match listed fields. Without a queried field, an
	/// allow rule matches (some field is permitted) and a deny rule does not.
	pub fn matches_field(&self, field: Option<&str>) -> bool {
		match (&self.fields, field) {
			(None, _) => true,
			(Some(_), None) => !self.is_deny(),
			(Some(fields), Some(field)) => fields.contains(field),
		}
	}

	/// Type-level queries match conditional allows and skip conditional denies;
	/// instance queries evaluate the condition.
	pub fn matches_conditions(&self, principal: &Principal, subject: Subject<'_>) -> Result<bool> {
		let Some(condition) = &self.condition else {
			return Ok(true);
		};

		match subject {
			Subject::Type(_) => Ok(!self.is_deny()),
			Subject::Instance(resource) => condition.evaluate(principal, resource),
		}
	}
}
