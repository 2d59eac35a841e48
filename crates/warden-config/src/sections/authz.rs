// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization engine configuration section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AuthzConfigLayer {
	pub log_decisions: Option<bool>,
	pub precompile_roles: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.log_decisions.is_some() {
			self.log_decisions = other.log_decisions;
		}
		if other.precompile_roles.is_some() {
			self.precompile_roles = other.precompile_roles;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			log_decisions: self.log_decisions.unwrap_or(false),
			precompile_roles: self.precompile_roles.unwrap_or(true),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfig {
	/// Log every decision at `info` rather than `debug`.
	pub log_decisions: bool,
	/// Compile each role once when the factory is built.
	pub precompile_roles: bool,
}

impl Default for AuthzConfig {
	fn default() -> Self {
		AuthzConfigLayer::default().finalize()
	}
}
