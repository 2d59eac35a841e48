// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turning command-line arguments into authorization queries.

use serde::Serialize;
use uuid::Uuid;
use warden_authz::{
	Ability, Action, Evaluation, Principal, Resource, ResourceId, Role, Subject, SubjectType,
	UserId,
};

/// Parses `key=value`; the value is JSON if it parses as JSON, a string otherwise.
pub fn parse_attr(s: &str) -> Result<(String, serde_json::Value), String> {
	let (key, raw) = s
		.split_once('=')
		.ok_or_else(|| format!("expected key=value, got '{s}'"))?;
	if key.is_empty() {
		return Err(format!("attribute name is empty in '{s}'"));
	}

	let value = serde_json::from_str(raw)
		.unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
	Ok((key.to_string(), value))
}

/// Builds a resource snapshot, or `None` for a type-level query.
///
/// `--attr id=...` and `--attr owner_id=...` land in the same place as
/// `--id` and `--owner`.
pub fn build_resource(
	subject_type: SubjectType,
	id: Option<Uuid>,
	owner: Option<Uuid>,
	attrs: &[(String, serde_json::Value)],
) -> warden_authz::Result<Option<Resource>> {
	if id.is_none() && owner.is_none() && attrs.is_empty() {
		return Ok(None);
	}

	let mut resource = Resource::new(subject_type);
	resource.id = id.map(ResourceId::new);
	resource.owner_id = owner.map(UserId::new);
	for (key, value) in attrs {
		resource.set_attribute(key.clone(), value.clone())?;
	}
	Ok(Some(resource))
}

/// Builds the principal, attaching identity attributes.
pub fn build_principal(
	id: Uuid,
	role: Role,
	attrs: &[(String, serde_json::Value)],
) -> Principal {
	attrs.iter().fold(Principal::new(UserId::new(id), role), |principal, (key, value)| {
		principal.with_attribute(key.clone(), value.clone())
	})
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubjectReport<'a> {
	Type { subject_type: SubjectType },
	Instance { resource: &'a Resource },
}

/// JSON document printed by `warden check`.
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
	pub principal: &'a Principal,
	pub action: Action,
	pub subject: SubjectReport<'a>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<&'a str>,
	pub evaluation: Evaluation,
}

/// Runs one query against `ability`.
pub fn check<'a>(
	ability: &'a Ability,
	action: Action,
	subject_type: SubjectType,
	resource: Option<&'a Resource>,
	field: Option<&'a str>,
) -> warden_authz::Result<CheckReport<'a>> {
	let subject = match resource {
		Some(resource) => Subject::Instance(resource),
		None => Subject::Type(subject_type),
	};

	let evaluation = match field {
		Some(field) => ability.explain_field(action, subject, field)?,
		None => ability.explain(action, subject)?,
	};

	Ok(CheckReport {
		principal: ability.principal(),
		action,
		subject: match resource {
			Some(resource) => SubjectReport::Instance { resource },
			None => SubjectReport::Type { subject_type },
		},
		field,
		evaluation,
	})
}
