// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for Warden.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`WARDEN_*`)
//!
//! # Usage
//!
//! ```ignore
//! use warden_config::load_config;
//!
//! let config = load_config()?;
//! println!("logging at {}", config.logging.level);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WardenConfig {
	pub logging: LoggingConfig,
	pub authz: AuthzConfig,
}

impl WardenConfig {
	/// Logs the resolved settings at `info`.
	///
	/// Loading happens before a subscriber exists, so callers emit this once
	/// logging has been initialised from [`WardenConfig::logging`].
	pub fn log_summary(&self) {
		info!(
			log_level = %self.logging.level,
			log_format = %self.logging.format,
			log_decisions = self.authz.log_decisions,
			precompile_roles = self.authz.precompile_roles,
			"Warden configuration loaded"
		);
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_*`)
/// 2. Config file (`/etc/warden/warden.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let logging = layer.logging.unwrap_or_default().finalize();
	let authz = layer.authz.unwrap_or_default().finalize();

	validate_config(&logging)?;

	let config = WardenConfig { logging, authz };
	debug!(?config, "configuration resolved");
	Ok(config)
}

fn validate_config(logging: &LoggingConfig) -> Result<(), ConfigError> {
	if logging.level.trim().is_empty() {
		return Err(ConfigError::Validation(
			"logging.level must not be blank".to_string(),
		));
	}

	Ok(())
}
