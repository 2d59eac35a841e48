// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subject registry: the action vocabulary and attribute shape per subject type.
//!
//! The registry is the single source of truth for which `(Action, SubjectType)`
//! pairs are legal. Rule construction consults it so nonsensical rules (such as
//! `transfer_ownership` on `User`) are rejected when the role is compiled, and
//! the [`Ability`](crate::Ability) consults it again for every query.
//!
//! The process-wide instance returned by [`registry`] is built on first use and
//! never mutated afterwards, so concurrent reads need no synchronization.

use crate::error::AuthzError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Attribute holding the resource's own id.
pub const ID_ATTRIBUTE: &str = "id";
/// Attribute holding the id of the user that owns the resource.
pub const OWNER_ATTRIBUTE: &str = "owner_id";

static REGISTRY: LazyLock<SubjectRegistry> = LazyLock::new(SubjectRegistry::standard);

/// Returns the process-wide subject registry.
pub fn registry() -> &'static SubjectRegistry {
	&REGISTRY
}

// =============================================================================
// Vocabulary
// =============================================================================

/// Operations that can be authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	/// Wildcard: every action legal for the subject type.
	Manage,
	Create,
	Read,
	Update,
	Delete,
	TransferOwnership,
	Export,
	Invite,
}

impl Action {
	/// Returns every action, wildcard first.
	pub fn all() -> &'static [Action] {
		&[
			Action::Manage,
			Action::Create,
			Action::Read,
			Action::Update,
			Action::Delete,
			Action::TransferOwnership,
			Action::Export,
			Action::Invite,
		]
	}

	pub fn is_wildcard(&self) -> bool {
		matches!(self, Action::Manage)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Manage => write!(f, "manage"),
			Action::Create => write!(f, "create"),
			Action::Read => write!(f, "read"),
			Action::Update => write!(f, "update"),
			Action::Delete => write!(f, "delete"),
			Action::TransferOwnership => write!(f, "transfer_ownership"),
			Action::Export => write!(f, "export"),
			Action::Invite => write!(f, "invite"),
		}
	}
}

impl FromStr for Action {
	type Err = AuthzError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::all()
			.iter()
			.copied()
			.find(|action| action.to_string() == s)
			.ok_or_else(|| AuthzError::UnknownAction(s.to_string()))
	}
}

/// Kinds of resource that can be protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubjectType {
	Organization,
	Project,
	User,
	Billing,
	Invite,
}

impl SubjectType {
	pub fn all() -> &'static [SubjectType] {
		&[
			SubjectType::Organization,
			SubjectType::Project,
			SubjectType::User,
			SubjectType::Billing,
			SubjectType::Invite,
		]
	}
}

impl fmt::Display for SubjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SubjectType::Organization => write!(f, "Organization"),
			SubjectType::Project => write!(f, "Project"),
			SubjectType::User => write!(f, "User"),
			SubjectType::Billing => write!(f, "Billing"),
			SubjectType::Invite => write!(f, "Invite"),
		}
	}
}

impl FromStr for SubjectType {
	type Err = AuthzError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		SubjectType::all()
			.iter()
			.copied()
			.find(|subject| subject.to_string().eq_ignore_ascii_case(s))
			.ok_or_else(|| AuthzError::UnknownSubjectType(s.to_string()))
	}
}

// =============================================================================
// Registry
// =============================================================================

/// Legal actions and condition-readable attributes for one subject type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSchema {
	pub actions: BTreeSet<Action>,
	pub attributes: BTreeSet<&'static str>,
}

impl SubjectSchema {
	fn new(actions: &[Action], attributes: &[&'static str]) -> Self {
		let mut all_attributes: BTreeSet<&'static str> = [ID_ATTRIBUTE, OWNER_ATTRIBUTE].into();
		all_attributes.extend(attributes.iter().copied());
		Self {
			actions: actions.iter().copied().collect(),
			attributes: all_attributes,
		}
	}
}

/// Lookup table of legal `(Action, SubjectType)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubjectRegistry {
	schemas: BTreeMap<SubjectType, SubjectSchema>,
}

impl SubjectRegistry {
	/// Builds the standard vocabulary.
	pub fn standard() -> Self {
		use Action::*;

		let schemas = BTreeMap::from([
			(
				SubjectType::Organization,
				SubjectSchema::new(
					&[Read, Update, Delete, TransferOwnership, Export],
					&["slug", "plan"],
				),
			),
			(
				SubjectType::Project,
				SubjectSchema::new(
					&[Create, Read, Update, Delete, Export],
					&["organization_id", "archived"],
				),
			),
			(
				SubjectType::User,
				SubjectSchema::new(&[Read, Update, Delete], &["email", "role"]),
			),
			(
				SubjectType::Billing,
				SubjectSchema::new(&[Read, Update, Export], &["organization_id", "plan"]),
			),
			(
				SubjectType::Invite,
				SubjectSchema::new(
					&[Create, Read, Delete, Invite],
					&["organization_id", "email", "role"],
				),
			),
		]);

		Self { schemas }
	}

	/// Returns true if `action` may be performed on `subject_type`.
	///
	/// The `manage` wildcard is legal on every registered subject type.
	pub fn is_valid(&self, action: Action, subject_type: SubjectType) -> bool {
		match self.schemas.get(&subject_type) {
			Some(schema) => action.is_wildcard() || schema.actions.contains(&action),
			None => false,
		}
	}

	/// Returns the concrete actions legal for `subject_type`, excluding the wildcard.
	pub fn actions_for(&self, subject_type: SubjectType) -> impl Iterator<Item = Action> + '_ {
		self
			.schemas
			.get(&subject_type)
			.into_iter()
			.flat_map(|schema| schema.actions.iter().copied())
	}

	/// Returns true if conditions on `subject_type` may read `attribute`.
	pub fn has_attribute(&self, subject_type: SubjectType, attribute: &str) -> bool {
		self
			.schemas
			.get(&subject_type)
			.is_some_and(|schema| schema.attributes.contains(attribute))
	}

	pub fn subject_types(&self) -> impl Iterator<Item = SubjectType> + '_ {
		self.schemas.keys().copied()
	}

	pub fn schema(&self, subject_type: SubjectType) -> Option<&SubjectSchema> {
		self.schemas.get(&subject_type)
	}
}
