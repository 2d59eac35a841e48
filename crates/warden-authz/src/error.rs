// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for rule compilation and authorization queries.
//!
//! A `deny` decision is not an error. Only malformed rules and malformed
//! queries surface here, plus [`AuthzError::Forbidden`] which is produced
//! exclusively by [`Ability::ensure`](crate::Ability::ensure) for callers that
//! want to abort with `?`.

use crate::registry::{Action, SubjectType};
use thiserror::Error;

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Errors that can occur while building rules or evaluating queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
	/// A rule references a pair, attribute or field outside the subject registry.
	#[error("invalid rule definition: {0}")]
	InvalidRuleDefinition(String),

	/// A query names an action that is not legal for the subject type.
	#[error("unknown action `{action}` for subject `{subject_type}`")]
	UnknownActionOrSubject {
		action: Action,
		subject_type: SubjectType,
	},

	/// A condition needs a resource attribute that the snapshot does not carry.
	#[error("resource `{subject_type}` is missing attribute `{attribute}`")]
	MissingResourceAttribute {
		subject_type: SubjectType,
		attribute: String,
	},

	/// A snapshot carries a core attribute in a shape the engine cannot read.
	#[error("resource `{subject_type}` has invalid attribute `{attribute}`: {message}")]
	InvalidResourceAttribute {
		subject_type: SubjectType,
		attribute: String,
		message: String,
	},

	/// A condition needs a principal attribute the identity source did not supply.
	#[error("principal is missing attribute `{attribute}`")]
	MissingPrincipalAttribute { attribute: String },

	#[error("unknown role: {0}")]
	UnknownRole(String),

	#[error("unknown action: {0}")]
	UnknownAction(String),

	#[error("unknown subject type: {0}")]
	UnknownSubjectType(String),

	/// The ability denied the request.
	#[error("forbidden: cannot {action} {subject_type}")]
	Forbidden {
		action: Action,
		subject_type: SubjectType,
		reason: Option<String>,
	},
}

impl AuthzError {
	pub(crate) fn invalid_rule(message: impl Into<String>) -> Self {
		Self::InvalidRuleDefinition(message.into())
	}

	/// Returns true for errors caused by the query rather than by the rules.
	pub fn is_query_error(&self) -> bool {
		matches!(
			self,
			Self::UnknownActionOrSubject { .. }
				| Self::MissingResourceAttribute { .. }
				| Self::InvalidResourceAttribute { .. }
				| Self::MissingPrincipalAttribute { .. }
		)
	}
}
