//! Error types for the factory module.
//!
//! Errors raised by caller-supplied compute functions and after-callbacks are
//! returned from `build` unchanged; the variants below only add the failures the
//! evaluation kernel itself can detect.

use thiserror::Error;

/// Errors that can occur while defining or building entities.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// A build selected a trait the factory does not define.
	#[error("Unknown trait: {0}")]
	UnknownTrait(String),

	/// A field (transitively) read itself through the evaluator.
	#[error("Circular attribute reference detected: {key}\n  Path: {path}")]
	CircularReference {
		/// Field whose resolution was re-entered.
		key: String,
		/// Resolution path (format: a -> b -> a).
		path: String,
	},

	/// Nested field resolution went deeper than the configured limit.
	#[error("Maximum resolution depth exceeded: {0}")]
	MaxDepthExceeded(usize),

	/// An override source was not map-shaped.
	#[error("Invalid overrides: {0}")]
	InvalidOverrides(String),

	/// A compute function rejected its input.
	#[error("Compute error: {key}: {message}")]
	Compute {
		/// Field being computed.
		key: String,
		/// Error message.
		message: String,
	},

	/// Invalid factory configuration.
	#[error("Configuration error: {0}")]
	ConfigError(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// Any other error raised by caller code.
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl FactoryError {
	/// Shorthand for [`FactoryError::Compute`].
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::FactoryError;
	///
	/// let error = FactoryError::compute("age", "birthday is in the future");
	/// assert_eq!(error.to_string(), "Compute error: age: birthday is in the future");
	/// ```
	pub fn compute(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Compute {
			key: key.into(),
			message: message.into(),
		}
	}
}

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
