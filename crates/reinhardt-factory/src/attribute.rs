//! Attribute definitions shared by factories and traits.
//!
//! Definitions are only ever appended. When two definitions share a key the
//! later one wins, but that decision is made when a build resolves the list,
//! never when the list is extended.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::FactoryResult;
use crate::evaluator::Evaluator;

/// Compute function of a property or transient option.
pub type ComputeFn = Arc<dyn Fn(&Evaluator) -> FactoryResult<Value> + Send + Sync>;

/// Compute function of a sequence; receives the counter value for the build.
pub type SequenceFn = Arc<dyn Fn(i64, &Evaluator) -> FactoryResult<Value> + Send + Sync>;

/// The kind of an attribute definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
	/// Ordinary field of the built entity.
	Property,
	/// Entity field computed from a monotonically advancing counter.
	Sequence,
	/// Build-time option, visible through the evaluator but never in the entity.
	Transient,
}

impl AttributeType {
	/// Returns a short label for log output.
	pub fn as_str(&self) -> &'static str {
		match self {
			AttributeType::Property => "property",
			AttributeType::Sequence => "sequence",
			AttributeType::Transient => "transient",
		}
	}
}

impl fmt::Display for AttributeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single attribute declared on a [`Factory`](crate::Factory) or [`Trait`](crate::Trait).
#[derive(Clone)]
pub enum AttributeDefinition {
	/// Derived or static entity field.
	Property {
		/// Field name.
		key: String,
		/// Compute function.
		compute: ComputeFn,
	},
	/// Entity field fed by a counter.
	Sequence {
		/// Field name.
		key: String,
		/// Compute function.
		compute: SequenceFn,
		/// Counter value handed to the next build.
		counter: i64,
		/// Amount the counter advances after each build.
		step: i64,
	},
	/// Transient option excluded from the entity.
	Transient {
		/// Option name.
		key: String,
		/// Compute function.
		compute: ComputeFn,
	},
}

impl AttributeDefinition {
	pub(crate) fn property<K, F, V>(key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::Property {
			key: key.into(),
			compute: Arc::new(move |ev: &Evaluator| -> FactoryResult<Value> {
				compute(ev).map(Into::into)
			}),
		}
	}

	pub(crate) fn sequence<K, F, V>(key: K, initial: i64, step: i64, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::Sequence {
			key: key.into(),
			compute: Arc::new(move |n: i64, ev: &Evaluator| -> FactoryResult<Value> {
				compute(n, ev).map(Into::into)
			}),
			counter: initial,
			step,
		}
	}

	pub(crate) fn transient<K, F, V>(key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::Transient {
			key: key.into(),
			compute: Arc::new(move |ev: &Evaluator| -> FactoryResult<Value> {
				compute(ev).map(Into::into)
			}),
		}
	}

	/// Returns the declared key.
	pub fn key(&self) -> &str {
		match self {
			Self::Property { key, .. } | Self::Sequence { key, .. } | Self::Transient { key, .. } => {
				key
			}
		}
	}

	/// Returns the definition kind.
	pub fn kind(&self) -> AttributeType {
		match self {
			Self::Property { .. } => AttributeType::Property,
			Self::Sequence { .. } => AttributeType::Sequence,
			Self::Transient { .. } => AttributeType::Transient,
		}
	}

	/// Returns the current counter of a sequence, `None` for other kinds.
	pub fn counter(&self) -> Option<i64> {
		match self {
			Self::Sequence { counter, .. } => Some(*counter),
			_ => None,
		}
	}

	/// Returns a copy whose sequence counter moved forward by `builds` steps.
	///
	/// Properties and options are returned unchanged.
	pub fn advanced(&self, builds: u64) -> Self {
		match self {
			Self::Sequence {
				key,
				compute,
				counter,
				step,
			} => Self::Sequence {
				key: key.clone(),
				compute: Arc::clone(compute),
				counter: counter.wrapping_add(step.wrapping_mul(builds as i64)),
				step: *step,
			},
			other => other.clone(),
		}
	}
}

impl fmt::Debug for AttributeDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sequence {
				key, counter, step, ..
			} => f
				.debug_struct("Sequence")
				.field("key", key)
				.field("counter", counter)
				.field("step", step)
				.finish_non_exhaustive(),
			other => f
				.debug_struct(match other.kind() {
					AttributeType::Property => "Property",
					_ => "Transient",
				})
				.field("key", &other.key())
				.finish_non_exhaustive(),
		}
	}
}

/// Advances every sequence in `attributes` by `builds` steps.
pub(crate) fn advance_all(attributes: &[AttributeDefinition], builds: u64) -> Vec<AttributeDefinition> {
	if builds == 0 {
		return attributes.to_vec();
	}
	attributes.iter().map(|attr| attr.advanced(builds)).collect()
}
