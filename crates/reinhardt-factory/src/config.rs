//! Factory configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FactoryError, FactoryResult};

/// Environment variable overriding [`FactoryConfig::max_resolution_depth`].
pub const MAX_DEPTH_ENV: &str = "REINHARDT_FACTORY_MAX_DEPTH";

/// Default cap on nested field resolution.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 100;

/// Settings applied to every build of a factory.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::{Factory, FactoryConfig};
///
/// let config = FactoryConfig::new().with_max_resolution_depth(16);
/// let factory = Factory::create().with_config(config.clone());
/// assert_eq!(factory.config(), &config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
	/// How deep compute functions may nest reads of other deferred fields.
	pub max_resolution_depth: usize,
}

impl Default for FactoryConfig {
	fn default() -> Self {
		Self {
			max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
		}
	}
}

impl FactoryConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
		self.max_resolution_depth = depth;
		self
	}

	/// Loads the configuration from the process environment.
	pub fn from_env() -> FactoryResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through an arbitrary variable lookup.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::FactoryConfig;
	///
	/// let config = FactoryConfig::from_lookup(|name| {
	///     (name == "REINHARDT_FACTORY_MAX_DEPTH").then(|| "8".to_string())
	/// })
	/// .unwrap();
	/// assert_eq!(config.max_resolution_depth, 8);
	/// ```
	pub fn from_lookup<F>(lookup: F) -> FactoryResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();

		if let Some(raw) = lookup(MAX_DEPTH_ENV) {
			let depth = raw.trim().parse::<usize>().map_err(|e| {
				FactoryError::ConfigError(format!("{}: invalid value '{}': {}", MAX_DEPTH_ENV, raw, e))
			})?;
			if depth == 0 {
				return Err(FactoryError::ConfigError(format!(
					"{} must be greater than zero",
					MAX_DEPTH_ENV
				)));
			}
			config.max_resolution_depth = depth;
		}

		Ok(config)
	}
}
