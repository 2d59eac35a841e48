// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden CLI - inspect and exercise the authorization engine.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use uuid::Uuid;
use warden_authz::{
	compile, registry, AbilityFactory, Action, CompileContext, ResourceId, Role, SubjectType,
};
use warden_config::WardenConfig;

mod logging;
mod query;

/// Exit status when the engine denies the request.
const EXIT_DENIED: u8 = 1;
/// Exit status for malformed queries and configuration problems.
const EXIT_ERROR: u8 = 2;

/// Warden - attribute-aware role-based authorization.
#[derive(Parser, Debug)]
#[command(name = "warden", about = "Warden authorization engine", version)]
struct Args {
	/// Config file (defaults to /etc/warden/warden.toml)
	#[arg(long, global = true, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the subject registry as JSON
	Vocabulary,

	/// Print the compiled rule sequence for a role as JSON
	Rules {
		#[arg(long)]
		role: Role,

		/// Resource the principal owns according to an external source (repeatable)
		#[arg(long = "owned")]
		owned: Vec<Uuid>,
	},

	/// Evaluate one authorization query; exits 0 on allow, 1 on deny
	Check(CheckArgs),

	/// Show version information
	Version,
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
	#[arg(long)]
	role: Role,

	/// Principal user id
	#[arg(long)]
	principal: Uuid,

	#[arg(long)]
	action: Action,

	#[arg(long)]
	subject: SubjectType,

	/// Resource id (makes the query instance-level)
	#[arg(long)]
	id: Option<Uuid>,

	/// Resource owner id (makes the query instance-level)
	#[arg(long)]
	owner: Option<Uuid>,

	/// Resource attribute as key=value, value parsed as JSON when possible (repeatable)
	#[arg(long = "attr", value_parser = query::parse_attr)]
	attrs: Vec<(String, serde_json::Value)>,

	/// Principal attribute as key=value, value parsed as JSON when possible (repeatable)
	#[arg(long = "principal-attr", value_parser = query::parse_attr)]
	principal_attrs: Vec<(String, serde_json::Value)>,

	/// Check a single field
	#[arg(long)]
	field: Option<String>,

	/// Resource the principal owns according to an external source (repeatable)
	#[arg(long = "owned")]
	owned: Vec<Uuid>,
}

fn main() -> ExitCode {
	let args = Args::parse();

	match run(args) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:#}");
			ExitCode::from(EXIT_ERROR)
		}
	}
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
	let Args { config, command } = args;

	match command {
		Command::Version => {
			println!("warden {}", env!("CARGO_PKG_VERSION"));
			Ok(ExitCode::SUCCESS)
		}
		Command::Vocabulary => {
			setup(config.as_deref())?;
			println!("{}", serde_json::to_string_pretty(registry())?);
			Ok(ExitCode::SUCCESS)
		}
		Command::Rules { role, owned } => {
			setup(config.as_deref())?;
			let context = owned_context(&owned);
			let rules = compile(role, Some(&context))
				.with_context(|| format!("failed to compile role {role}"))?;
			println!("{}", serde_json::to_string_pretty(&rules)?);
			Ok(ExitCode::SUCCESS)
		}
		Command::Check(check) => {
			let config = setup(config.as_deref())?;
			run_check(&config, check)
		}
	}
}

/// Loads configuration and installs logging.
fn setup(config_path: Option<&Path>) -> anyhow::Result<WardenConfig> {
	let config = match config_path {
		Some(path) => warden_config::load_config_with_file(path),
		None => warden_config::load_config(),
	}
	.context("failed to load configuration")?;

	logging::init(&config.logging);
	config.log_summary();
	debug!(config_path = ?config_path, "configuration loaded");
	Ok(config)
}

fn run_check(config: &WardenConfig, args: CheckArgs) -> anyhow::Result<ExitCode> {
	let factory = if config.authz.precompile_roles {
		AbilityFactory::new().context("failed to compile roles")?
	} else {
		AbilityFactory::uncached()
	}
	.with_decision_logging(config.authz.log_decisions);

	let principal = query::build_principal(args.principal, args.role, &args.principal_attrs);
	let context = owned_context(&args.owned);
	let ability = factory
		.for_principal(&principal, Some(&context))
		.with_context(|| format!("failed to build ability for role {}", args.role))?;
	debug!(
		role = %args.role,
		rules = ability.rules().len(),
		precompiled = factory.is_precompiled(args.role),
		"built ability"
	);

	let resource = query::build_resource(args.subject, args.id, args.owner, &args.attrs)
		.context("invalid resource attributes")?;
	let report = query::check(
		&ability,
		args.action,
		args.subject,
		resource.as_ref(),
		args.field.as_deref(),
	)
	.with_context(|| format!("cannot evaluate {} on {}", args.action, args.subject))?;

	println!("{}", serde_json::to_string_pretty(&report)?);

	if report.evaluation.decision.is_allowed() {
		Ok(ExitCode::SUCCESS)
	} else {
		Ok(ExitCode::from(EXIT_DENIED))
	}
}

fn owned_context(owned: &[Uuid]) -> CompileContext {
	CompileContext::owning(owned.iter().copied().map(ResourceId::new))
}
