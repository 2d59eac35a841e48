// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource snapshots and query subjects.
//!
//! The engine never fetches resources. Callers load a snapshot from their own
//! repository and pass it in; conditions only ever read what is handed over.
//!
//! The core attributes `id` and `owner_id` always live in the typed fields.
//! Setting them through [`Resource::with_attribute`] or through the
//! `attributes` map of a JSON snapshot routes them there, and
//! [`Resource::attribute`] reads them back as JSON, so every condition sees
//! one view of the snapshot.

use crate::error::{AuthzError, Result};
use crate::registry::{SubjectType, ID_ATTRIBUTE, OWNER_ATTRIBUTE};
use crate::types::{ResourceId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Attribute snapshot of one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResourceSnapshot")]
pub struct Resource {
	pub subject_type: SubjectType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<ResourceId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owner_id: Option<UserId>,
	/// Type-specific attributes. Never holds `id` or `owner_id`.
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, serde_json::Value>,
}

/// Wire form of a [`Resource`] before core attributes are routed.
#[derive(Deserialize)]
struct ResourceSnapshot {
	subject_type: SubjectType,
	#[serde(default)]
	id: Option<ResourceId>,
	#[serde(default)]
	owner_id: Option<UserId>,
	#[serde(default)]
	attributes: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<ResourceSnapshot> for Resource {
	type Error = AuthzError;

	fn try_from(snapshot: ResourceSnapshot) -> Result<Self> {
		let mut resource = Resource {
			subject_type: snapshot.subject_type,
			id: snapshot.id,
			owner_id: snapshot.owner_id,
			attributes: BTreeMap::new(),
		};

		for (name, value) in snapshot.attributes {
			if let Some(existing) = resource.attribute(&name) {
				if existing != value {
					return Err(invalid(
						&resource,
						&name,
						"given both as a field and in attributes with different values",
					));
				}
			}
			resource.set_attribute(name, value)?;
		}

		Ok(resource)
	}
}

impl Resource {
	/// Creates an instance with no attributes at all.
	pub fn new(subject_type: SubjectType) -> Self {
		Self {
			subject_type,
			id: None,
			owner_id: None,
			attributes: BTreeMap::new(),
		}
	}

	/// Creates an organization owned by `owner_id`.
	pub fn organization(owner_id: UserId) -> Self {
		Self::new(SubjectType::Organization).with_owner(owner_id)
	}

	/// Creates a project owned by `owner_id`.
	pub fn project(owner_id: UserId) -> Self {
		Self::new(SubjectType::Project).with_owner(owner_id)
	}

	/// Creates a user profile; a user owns their own profile.
	pub fn user(user_id: UserId) -> Self {
		Self::new(SubjectType::User)
			.with_id(ResourceId::new(user_id.into_inner()))
			.with_owner(user_id)
	}

	/// Creates a billing account owned by `owner_id`.
	pub fn billing(owner_id: UserId) -> Self {
		Self::new(SubjectType::Billing).with_owner(owner_id)
	}

	/// Creates an invite issued by `owner_id`.
	pub fn invite(owner_id: UserId) -> Self {
		Self::new(SubjectType::Invite).with_owner(owner_id)
	}

	/// Builder: set the resource id.
	pub fn with_id(mut self, id: ResourceId) -> Self {
		self.id = Some(id);
		self
	}

	/// Builder: set the owner.
	pub fn with_owner(mut self, owner_id: UserId) -> Self {
		self.owner_id = Some(owner_id);
		self
	}

	/// Builder: set an attribute by name.
	///
	/// `id` and `owner_id` must be UUID strings and land in the typed fields.
	pub fn with_attribute(
		mut self,
		name: impl Into<String>,
		value: serde_json::Value,
	) -> Result<Self> {
		self.set_attribute(name, value)?;
		Ok(self)
	}

	/// Sets an attribute by name, routing core attributes to the typed fields.
	pub fn set_attribute(&mut self, name: impl Into<String>, value: serde_json::Value) -> Result<()> {
		let name = name.into();
		match name.as_str() {
			ID_ATTRIBUTE => self.id = Some(ResourceId::new(self.parse_uuid(&name, &value)?)),
			OWNER_ATTRIBUTE => self.owner_id = Some(UserId::new(self.parse_uuid(&name, &value)?)),
			_ => {
				self.attributes.insert(name, value);
			}
		}
		Ok(())
	}

	/// Reads an attribute as JSON; core attributes come from the typed fields.
	pub fn attribute(&self, name: &str) -> Option<serde_json::Value> {
		match name {
			ID_ATTRIBUTE => self.id.map(|id| serde_json::Value::String(id.to_string())),
			OWNER_ATTRIBUTE => self
				.owner_id
				.map(|owner_id| serde_json::Value::String(owner_id.to_string())),
			other => self.attributes.get(other).cloned(),
		}
	}

	/// Returns true if the snapshot carries `attribute`.
	pub fn has_attribute(&self, attribute: &str) -> bool {
		self.attribute(attribute).is_some()
	}

	fn parse_uuid(&self, name: &str, value: &serde_json::Value) -> Result<Uuid> {
		value
			.as_str()
			.and_then(|s| Uuid::parse_str(s).ok())
			.ok_or_else(|| invalid(self, name, format!("expected a UUID string, got {value}")))
	}
}

fn invalid(resource: &Resource, attribute: &str, message: impl Into<String>) -> AuthzError {
	AuthzError::InvalidResourceAttribute {
		subject_type: resource.subject_type,
		attribute: attribute.to_string(),
		message: message.into(),
	}
}

/// What a query is about: a bare subject type or a concrete instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a> {
	Type(SubjectType),
	Instance(&'a Resource),
}

impl Subject<'_> {
	pub fn subject_type(&self) -> SubjectType {
		match self {
			Subject::Type(subject_type) => *subject_type,
			Subject::Instance(resource) => resource.subject_type,
		}
	}

	pub fn resource(&self) -> Option<&Resource> {
		match self {
			Subject::Type(_) => None,
			Subject::Instance(resource) => Some(*resource),
		}
	}
}

impl From<SubjectType> for Subject<'_> {
	fn from(subject_type: SubjectType) -> Self {
		Subject::Type(subject_type)
	}
}

impl<'a> From<&'a Resource> for Subject<'a> {
	fn from(resource: &'a Resource) -> Self {
		Subject::Instance(resource)
	}
}
