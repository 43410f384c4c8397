//! Build-scoped, lazily memoized view over every resolved field.
//!
//! The evaluator is assembled in two phases. First every winning definition is
//! registered as a [`LazyField`] slot, then fields are resolved on demand: the
//! first read runs the compute function and caches the result, every later read
//! returns the cached value. A fresh evaluator is created for each build and is
//! dropped once the after-callbacks have run.
//!
//! ## Cycle detection
//!
//! Slots currently being resolved are tracked on a resolution path. Reading a
//! slot that is already on the path fails with
//! [`FactoryError::CircularReference`] instead of recursing forever, and the
//! path length is capped by [`FactoryConfig::max_resolution_depth`](crate::FactoryConfig).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::attribute::{AttributeDefinition, AttributeType};
use crate::entity::Entity;
use crate::error::{FactoryError, FactoryResult};
use crate::field::{Field, LazyField, Resolver};
use crate::overrides::Overrides;

/// Read-only access to the fields of the entity being built.
///
/// Compute functions and after-callbacks receive the evaluator and may read any
/// declared field or option through it, including ones declared later.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::Factory;
/// use serde_json::json;
///
/// let cat = Factory::create()
///     .attr("full_name", |ev| Ok(format!("{} The Cat", ev.get_as::<String>("name")?)))
///     .attr("name", |_| Ok("Bibi"))
///     .build()
///     .unwrap();
///
/// assert_eq!(cat, json!({ "name": "Bibi", "full_name": "Bibi The Cat" }));
/// ```
pub struct Evaluator {
	slots: Vec<LazyField>,
	/// Key -> slot visible through the evaluator (options included).
	index: HashMap<String, usize>,
	/// Key -> slot projected into the entity, in first-declaration order.
	entity_layout: Vec<(String, usize)>,
	/// Slots currently being resolved, outermost first.
	resolution_path: RefCell<Vec<usize>>,
	max_depth: usize,
}

impl Evaluator {
	/// Registers the resolvers for an effective attribute list.
	///
	/// Definitions are partitioned into options, sequences and properties; within
	/// each partition the last definition of a key wins. The entity takes property
	/// slots first and lets sequences replace them, while the evaluator
	/// additionally exposes options over both.
	pub(crate) fn assemble(
		attributes: &[AttributeDefinition],
		overrides: &Overrides,
		max_depth: usize,
	) -> Self {
		let mut slots = Vec::new();
		let mut register = |defs: Vec<&AttributeDefinition>| -> Vec<(String, usize)> {
			defs.into_iter()
				.map(|definition| {
					slots.push(LazyField::from_definition(definition, overrides));
					(definition.key().to_string(), slots.len() - 1)
				})
				.collect()
		};

		let options = register(last_wins(attributes, AttributeType::Transient));
		let sequences = register(last_wins(attributes, AttributeType::Sequence));
		let properties = register(last_wins(attributes, AttributeType::Property));

		let mut entity_layout = properties;
		for (key, slot) in sequences {
			match entity_layout.iter_mut().find(|(existing, _)| *existing == key) {
				Some(entry) => entry.1 = slot,
				None => entity_layout.push((key, slot)),
			}
		}

		let mut index: HashMap<String, usize> = entity_layout.iter().cloned().collect();
		index.extend(options);

		Self {
			slots,
			index,
			entity_layout,
			resolution_path: RefCell::new(Vec::new()),
			max_depth,
		}
	}

	/// Reads a field, computing it on first access.
	///
	/// Reading a key that was never declared yields `Value::Null`.
	pub fn get(&self, key: &str) -> FactoryResult<Value> {
		match self.index.get(key) {
			Some(&slot) => self.resolve(slot),
			None => Ok(Value::Null),
		}
	}

	/// Reads a field and deserializes it.
	///
	/// An undeclared key reads as `null`, so `Option<T>` accepts it.
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> FactoryResult<T> {
		Ok(serde_json::from_value(self.get(key)?)?)
	}

	/// Returns true if `key` is declared as an attribute, sequence or option.
	pub fn contains_key(&self, key: &str) -> bool {
		self.index.contains_key(key)
	}

	/// Returns true if `key` is declared and was replaced by an override.
	pub fn is_overridden(&self, key: &str) -> bool {
		self.index
			.get(key)
			.is_some_and(|&slot| self.slots[slot].is_fixed())
	}

	/// Iterates over every key readable through the evaluator.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.index.keys().map(String::as_str)
	}

	/// Projects property and sequence fields into a new entity.
	pub(crate) fn entity(&self) -> FactoryResult<Entity> {
		self.entity_layout
			.iter()
			.map(|(key, slot)| Ok((key.clone(), self.resolve(*slot)?)))
			.collect()
	}

	fn resolve(&self, slot: usize) -> FactoryResult<Value> {
		let field = &self.slots[slot];
		if let Some(value) = field.cache.get() {
			return Ok(value.clone());
		}

		let resolver = match &field.field {
			Field::Fixed(value) => {
				tracing::trace!(key = %field.key, kind = %field.kind, "using override");
				return Ok(value.clone());
			}
			Field::Deferred(resolver) => resolver,
		};

		let _guard = self.begin_resolution(slot)?;
		tracing::trace!(key = %field.key, kind = %field.kind, "computing field");
		let value = match resolver {
			Resolver::Compute(compute) => compute(self)?,
			Resolver::Sequence { compute, n } => compute(*n, self)?,
		};

		// The resolution path keeps the slot from being entered twice, so the
		// cache is still empty here.
		let stored = field.cache.set(value.clone());
		debug_assert!(stored.is_ok(), "field '{}' resolved twice", field.key);
		Ok(value)
	}

	fn begin_resolution(&self, slot: usize) -> FactoryResult<ResolutionGuard<'_>> {
		let mut path = self.resolution_path.borrow_mut();

		if let Some(start) = path.iter().position(|&entry| entry == slot) {
			let key = self.slots[slot].key.clone();
			let cycle: Vec<&str> = path[start..]
				.iter()
				.map(|&entry| self.slots[entry].key.as_str())
				.collect();
			return Err(FactoryError::CircularReference {
				path: format!("{} -> {}", cycle.join(" -> "), key),
				key,
			});
		}

		if path.len() >= self.max_depth {
			return Err(FactoryError::MaxDepthExceeded(path.len() + 1));
		}

		path.push(slot);
		Ok(ResolutionGuard {
			path: &self.resolution_path,
		})
	}
}

impl fmt::Debug for Evaluator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let resolved: Vec<&str> = self
			.slots
			.iter()
			.filter(|field| field.cache.get().is_some())
			.map(|field| field.key.as_str())
			.collect();
		f.debug_struct("Evaluator")
			.field("keys", &self.index.keys().collect::<Vec<_>>())
			.field("resolved", &resolved)
			.finish_non_exhaustive()
	}
}

/// RAII guard: removes the slot from the resolution path on drop.
struct ResolutionGuard<'a> {
	path: &'a RefCell<Vec<usize>>,
}

impl Drop for ResolutionGuard<'_> {
	fn drop(&mut self) {
		self.path.borrow_mut().pop();
	}
}

/// Keeps the last definition of each key for one attribute kind.
fn last_wins(attributes: &[AttributeDefinition], kind: AttributeType) -> Vec<&AttributeDefinition> {
	let mut winners: Vec<&AttributeDefinition> = Vec::new();
	let mut positions: HashMap<&str, usize> = HashMap::new();

	for definition in attributes.iter().filter(|definition| definition.kind() == kind) {
		match positions.get(definition.key()) {
			Some(&position) => winners[position] = definition,
			None => {
				positions.insert(definition.key(), winners.len());
				winners.push(definition);
			}
		}
	}
	winners
}
