// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity types for authorization.
//!
//! - **ID newtypes**: [`UserId`] and [`ResourceId`] wrap UUIDs so that a
//!   principal id can never be compared against a resource id by accident
//! - **Roles**: the closed [`Role`] set, ordered by precedence
//! - **Principal**: the authenticated caller handed over by the identity source

use crate::error::AuthzError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user (principal).");
define_id_type!(ResourceId, "Unique identifier for a protected resource.");

// =============================================================================
// Roles
// =============================================================================

/// Roles a principal can hold. Exactly one per principal.
///
/// Variants are declared highest precedence first, so `Ord` orders by
/// precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
	/// Broad operational control of the tenant, short of ownership changes.
	Admin,
	/// Reads users and controls the projects they own.
	Member,
	/// Billing management only.
	Billing,
}

impl Role {
	/// Returns all roles, highest precedence first.
	pub fn all() -> &'static [Role] {
		&[Role::Admin, Role::Member, Role::Billing]
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "ADMIN"),
			Role::Member => write!(f, "MEMBER"),
			Role::Billing => write!(f, "BILLING"),
		}
	}
}

impl FromStr for Role {
	type Err = AuthzError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Role::all()
			.iter()
			.copied()
			.find(|role| role.to_string().eq_ignore_ascii_case(s))
			.ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
	}
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated entity whose permissions are evaluated.
///
/// Authentication happens elsewhere; a `Principal` is trusted as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub id: UserId,
	pub role: Role,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Principal {
	/// Creates a principal with no extra attributes.
	pub fn new(id: UserId, role: Role) -> Self {
		Self {
			id,
			role,
			attributes: BTreeMap::new(),
		}
	}

	/// Builder: attach an identity attribute.
	pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
		self.attributes.insert(name.into(), value);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod id_types {
		use super::*;

		#[test]
		fn user_id_serializes_as_uuid() {
			let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
			let json = serde_json::to_string(&UserId::new(uuid)).unwrap();
			assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
		}

		#[test]
		fn generated_ids_are_unique() {
			assert_ne!(ResourceId::generate(), ResourceId::generate());
		}

		proptest! {
			#[test]
			fn user_id_display_matches_uuid(a: u128) {
				let uuid = Uuid::from_u128(a);
				prop_assert_eq!(UserId::new(uuid).to_string(), uuid.to_string());
				prop_assert_eq!(Uuid::from(UserId::new(uuid)), uuid);
			}
		}
	}

	mod roles {
		use super::*;

		#[test]
		fn all_is_ordered_by_precedence() {
			assert!(Role::all().windows(2).all(|pair| pair[0] < pair[1]));
			assert!(Role::Admin < Role::Member);
			assert!(Role::Member < Role::Billing);
		}

		#[test]
		fn parses_case_insensitively() {
			assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
			assert_eq!("MEMBER".parse::<Role>().unwrap(), Role::Member);
			assert_eq!("Billing".parse::<Role>().unwrap(), Role::Billing);
		}

		#[test]
		fn rejects_unknown_role() {
			assert_eq!(
				"OWNER".parse::<Role>(),
				Err(AuthzError::UnknownRole("OWNER".to_string()))
			);
		}

		#[test]
		fn serializes_upper_case() {
			assert_eq!(serde_json::to_string(&Role::Billing).unwrap(), "\"BILLING\"");
		}
	}

	mod principal {
		use super::*;

		#[test]
		fn attributes_are_omitted_when_empty() {
			let principal = Principal::new(UserId::generate(), Role::Member);
			let json = serde_json::to_value(&principal).unwrap();
			assert!(json.get("attributes").is_none());
		}

		#[test]
		fn with_attribute_records_value() {
			let principal = Principal::new(UserId::generate(), Role::Admin)
				.with_attribute("department", serde_json::json!("ops"));
			assert_eq!(
				principal.attributes.get("department"),
				Some(&serde_json::json!("ops"))
			);
		}
	}
}
