// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The compiled, queryable permission set of one principal.
//!
//! # Evaluation
//!
//! Rules are scanned in compiled order. The first rule that matches the action
//! (literally or through `manage`), the subject type, the queried field and its
//! condition decides. If nothing matches the answer is [`Decision::Deny`].
//!
//! Because compiled rule sets list deny rules first, a scoped deny such as
//! "ADMIN may not transfer an organization it does not own" is always seen
//! before the blanket `manage` grant.
//!
//! An `Ability` is immutable. Evaluation has no side effects other than
//! tracing, so a single ability can be shared across threads and queried
//! concurrently.

use crate::error::{AuthzError, Result};
use crate::registry::{registry, Action, SubjectType};
use crate::resource::Subject;
use crate::rule::{Effect, Rule};
use crate::types::Principal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of an authorization query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	Allow,
	Deny,
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow)
	}
}

impl From<Effect> for Decision {
	fn from(effect: Effect) -> Self {
		match effect {
			Effect::Allow => Decision::Allow,
			Effect::Deny => Decision::Deny,
		}
	}
}

impl fmt::Display for Decision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Decision::Allow => write!(f, "allow"),
			Decision::Deny => write!(f, "deny"),
		}
	}
}

/// A decision together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
	pub decision: Decision,
	/// Index into [`Ability::rules`]; `None` means default deny.
	pub rule_index: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

impl Evaluation {
	fn default_deny() -> Self {
		Self {
			decision: Decision::Deny,
			rule_index: None,
			reason: None,
		}
	}
}

/// Permission set for one principal.
#[derive(Debug, Clone)]
pub struct Ability {
	principal: Principal,
	rules: Arc<[Rule]>,
	log_decisions: bool,
}

impl Ability {
	/// Builds an ability over an already ordered rule sequence.
	pub fn new(principal: Principal, rules: impl Into<Arc<[Rule]>>) -> Self {
		Self {
			principal,
			rules: rules.into(),
			log_decisions: false,
		}
	}

	/// Builder: log every decision at `info` instead of `debug`.
	pub fn with_decision_logging(mut self, enabled: bool) -> Self {
		self.log_decisions = enabled;
		self
	}

	pub fn principal(&self) -> &Principal {
		&self.principal
	}

	/// The rules in evaluation order.
	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	/// Rules that could decide `(action, subject_type)`, in evaluation order.
	pub fn rules_for(&self, action: Action, subject_type: SubjectType) -> impl Iterator<Item = &Rule> {
		self
			.rules
			.iter()
			.filter(move |rule| rule.matches_action(action) && rule.matches_subject(subject_type))
	}

	/// Decides `action` on `subject`.
	pub fn evaluate<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> Result<Decision> {
		Ok(self.decide(action, subject.into(), None)?.decision)
	}

	/// Decides `action` on one field of `subject`.
	pub fn evaluate_field<'a>(
		&self,
		action: Action,
		subject: impl Into<Subject<'a>>,
		field: &str,
	) -> Result<Decision> {
		Ok(self.decide(action, subject.into(), Some(field))?.decision)
	}

	/// Like [`evaluate`](Self::evaluate), also reporting the deciding rule.
	pub fn explain<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> Result<Evaluation> {
		self.decide(action, subject.into(), None)
	}

	/// Like [`evaluate_field`](Self::evaluate_field), also reporting the deciding rule.
	pub fn explain_field<'a>(
		&self,
		action: Action,
		subject: impl Into<Subject<'a>>,
		field: &str,
	) -> Result<Evaluation> {
		self.decide(action, subject.into(), Some(field))
	}

	pub fn can<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> Result<bool> {
		Ok(self.evaluate(action, subject)?.is_allowed())
	}

	/// Negation of [`can`](Self::can) on the same inputs.
	pub fn cannot<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> Result<bool> {
		Ok(!self.can(action, subject)?)
	}

	pub fn can_field<'a>(
		&self,
		action: Action,
		subject: impl Into<Subject<'a>>,
		field: &str,
	) -> Result<bool> {
		Ok(self.evaluate_field(action, subject, field)?.is_allowed())
	}

	/// Returns `Err(AuthzError::Forbidden)` unless the action is allowed.
	///
	/// For callers that must abort before touching the resource.
	pub fn ensure<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> Result<()> {
		let subject = subject.into();
		let evaluation = self.decide(action, subject, None)?;
		match evaluation.decision {
			Decision::Allow => Ok(()),
			Decision::Deny => Err(AuthzError::Forbidden {
				action,
				subject_type: subject.subject_type(),
				reason: evaluation.reason,
			}),
		}
	}

	#[instrument(
		level = "debug",
		skip(self, action, subject),
		fields(
			principal_id = %self.principal.id,
			role = %self.principal.role,
			action = %action,
			subject_type = %subject.subject_type(),
			instance = subject.resource().is_some(),
		)
	)]
	fn decide(&self, action: Action, subject: Subject<'_>, field: Option<&str>) -> Result<Evaluation> {
		let subject_type = subject.subject_type();
		if !registry().is_valid(action, subject_type) {
			return Err(AuthzError::UnknownActionOrSubject {
				action,
				subject_type,
			});
		}

		let mut evaluation = Evaluation::default_deny();
		for (index, rule) in self.rules.iter().enumerate() {
			if !rule.matches_action(action)
				|| !rule.matches_subject(subject_type)
				|| !rule.matches_field(field)
			{
				continue;
			}
			if !rule.matches_conditions(&self.principal, subject)? {
				continue;
			}

			evaluation = Evaluation {
				decision: rule.effect().into(),
				rule_index: Some(index),
				reason: rule.reason().map(str::to_string),
			};
			break;
		}

		self.log(&evaluation);
		Ok(evaluation)
	}

	fn log(&self, evaluation: &Evaluation) {
		if self.log_decisions {
			info!(
				decision = %evaluation.decision,
				rule_index = ?evaluation.rule_index,
				"authorization decision"
			);
		} else {
			debug!(
				decision = %evaluation.decision,
				rule_index = ?evaluation.rule_index,
				"authorization decision"
			);
		}
	}
}
