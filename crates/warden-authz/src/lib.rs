// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-aware role-based authorization for Warden.
//!
//! Given an authenticated [`Principal`], an [`Action`] and a subject (a
//! [`SubjectType`] or a [`Resource`] snapshot), an [`Ability`] decides whether
//! the action is permitted.
//!
//! ```text
//! Principal ──► AbilityFactory ──► compile(role, context) ──► [Rule] (deny first)
//!                     │                                           │
//!                     └──────────────► Ability ◄──────────────────┘
//!                                        │
//!                       evaluate(action, subject) ──► Decision
//! ```
//!
//! # Design Principles
//!
//! 1. **No I/O**: resource attributes are handed in; nothing is fetched
//! 2. **Default deny**: a query no rule matches is denied
//! 3. **Deny first**: compiled rule sets list deny rules before allow rules and
//!    the first matching rule decides
//! 4. **Ambiguity is an error**: a condition that needs an attribute the
//!    snapshot lacks fails instead of guessing
//!
//! # Example
//!
//! ```
//! use warden_authz::{AbilityFactory, Action, Principal, Resource, Role, UserId};
//!
//! let factory = AbilityFactory::new()?;
//! let admin = Principal::new(UserId::generate(), Role::Admin);
//! let ability = factory.for_principal(&admin, None)?;
//!
//! let own_org = Resource::organization(admin.id);
//! let other_org = Resource::organization(UserId::generate());
//!
//! assert!(ability.can(Action::TransferOwnership, &own_org)?);
//! assert!(ability.cannot(Action::TransferOwnership, &other_org)?);
//! # Ok::<(), warden_authz::AuthzError>(())
//! ```

pub mod ability;
pub mod compiler;
pub mod error;
pub mod factory;
pub mod registry;
pub mod resource;
pub mod rule;
pub mod types;

pub use ability::{Ability, Decision, Evaluation};
pub use compiler::{compile, is_deny_first, order_rules, CompileContext};
pub use error::{AuthzError, Result};
pub use factory::AbilityFactory;
pub use registry::{registry, Action, SubjectRegistry, SubjectSchema, SubjectType};
pub use resource::{Resource, Subject};
pub use rule::{Condition, Effect, Rule};
pub use types::{Principal, ResourceId, Role, UserId};
