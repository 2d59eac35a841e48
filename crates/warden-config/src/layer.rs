// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::{Deserialize, Serialize};

use crate::sections::{AuthzConfigLayer, LoggingConfigLayer};

/// One source's view of the configuration; unset sections stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WardenConfigLayer {
	pub logging: Option<LoggingConfigLayer>,
	pub authz: Option<AuthzConfigLayer>,
}

impl WardenConfigLayer {
	/// Overlay `other` on top of `self`; values set in `other` win.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(&mut self.authz, other.authz, AuthzConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(base), Some(other)) => merge(base, other),
		(None, Some(other)) => *base = Some(other),
		(_, None) => {}
	}
}
