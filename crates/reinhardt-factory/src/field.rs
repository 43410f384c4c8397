//! Per-build field slots.
//!
//! A slot is either a fixed value taken from the override map or a deferred
//! computation that runs at most once and caches its result.

use std::cell::OnceCell;
use std::sync::Arc;

use serde_json::Value;

use crate::attribute::{AttributeDefinition, AttributeType, ComputeFn, SequenceFn};
use crate::overrides::Overrides;

pub(crate) enum Resolver {
	Compute(ComputeFn),
	Sequence { compute: SequenceFn, n: i64 },
}

pub(crate) enum Field {
	Fixed(Value),
	Deferred(Resolver),
}

pub(crate) struct LazyField {
	pub(crate) key: String,
	pub(crate) kind: AttributeType,
	pub(crate) field: Field,
	pub(crate) cache: OnceCell<Value>,
}

impl LazyField {
	/// Resolves a definition against the override map.
	///
	/// An overridden field never sees its compute function invoked.
	pub(crate) fn from_definition(definition: &AttributeDefinition, overrides: &Overrides) -> Self {
		let key = definition.key().to_string();
		let kind = definition.kind();
		let field = match overrides.get(&key) {
			Some(value) => Field::Fixed(value.clone()),
			None => Field::Deferred(match definition {
				AttributeDefinition::Sequence {
					compute, counter, ..
				} => Resolver::Sequence {
					compute: Arc::clone(compute),
					n: *counter,
				},
				AttributeDefinition::Property { compute, .. }
				| AttributeDefinition::Transient { compute, .. } => {
					Resolver::Compute(Arc::clone(compute))
				}
			}),
		};
		Self {
			key,
			kind,
			field,
			cache: OnceCell::new(),
		}
	}

	pub(crate) fn is_fixed(&self) -> bool {
		matches!(self.field, Field::Fixed(_))
	}
}
