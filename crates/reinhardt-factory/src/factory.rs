//! Declarative entity factories.
//!
//! Every definition method returns a new [`Factory`] and leaves the receiver
//! untouched. The only state a factory mutates is its own sequence cursor, which
//! advances each time [`build`](Factory::build) or
//! [`build_list`](Factory::build_list) succeeds on that instance.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::attribute::{AttributeDefinition, advance_all};
use crate::build::{AfterCallback, BuildArgs, effective_attributes};
use crate::config::FactoryConfig;
use crate::driver::BuildDriver;
use crate::entity::Entity;
use crate::error::FactoryResult;
use crate::evaluator::Evaluator;
use crate::traits::{IntoTrait, Trait};

/// Template producing entities from attribute definitions, traits and
/// after-build callbacks.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::{Factory, Overrides};
/// use serde_json::json;
///
/// let cat_factory = Factory::create()
///     .attr("name", |_| Ok("Bibi"))
///     .attr("age", |_| Ok(3));
///
/// assert_eq!(cat_factory.build().unwrap(), json!({ "name": "Bibi", "age": 3 }));
/// assert_eq!(
///     cat_factory.build_with(Overrides::new().set("age", 4)).unwrap(),
///     json!({ "name": "Bibi", "age": 4 })
/// );
/// ```
pub struct Factory {
	attributes: Vec<AttributeDefinition>,
	traits: HashMap<String, Trait>,
	callbacks: Vec<AfterCallback>,
	config: FactoryConfig,
	/// Builds drawn from this instance so far.
	builds: ReentrantMutex<Cell<u64>>,
}

impl Factory {
	pub fn new() -> Self {
		Self::with_parts(
			Vec::new(),
			HashMap::new(),
			Vec::new(),
			FactoryConfig::default(),
		)
	}

	/// Same as [`Factory::new`].
	pub fn create() -> Self {
		Self::new()
	}

	/// Merges factories left to right.
	///
	/// Attributes and callbacks are concatenated in argument order; for traits
	/// with the same name the later factory wins. An empty input yields an empty
	/// factory.
	pub fn compose_all<'a, I>(factories: I) -> Self
	where
		I: IntoIterator<Item = &'a Factory>,
	{
		let mut factories = factories.into_iter();
		match factories.next() {
			Some(first) => factories.fold(first.clone(), |composed, other| composed.compose(other)),
			None => Self::new(),
		}
	}

	/// Returns a factory holding this factory's definitions followed by `other`'s.
	///
	/// The result keeps this factory's configuration.
	pub fn compose(&self, other: &Factory) -> Self {
		let (mut attributes, mut traits) = self.snapshot();
		let (other_attributes, other_traits) = other.snapshot();
		attributes.extend(other_attributes);
		traits.extend(other_traits);

		let mut callbacks = self.callbacks.clone();
		callbacks.extend(other.callbacks.iter().cloned());

		Self::with_parts(attributes, traits, callbacks, self.config.clone())
	}

	/// Declares a property.
	///
	/// The compute function may read any other field through the evaluator.
	pub fn attr<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.with_attribute(AttributeDefinition::property(key, compute))
	}

	/// Declares a sequence starting at 0 and advancing by 1.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Factory;
	/// use serde_json::json;
	///
	/// let factory = Factory::create().sequence("name", |n, _| Ok(format!("Cat #{}", n + 1)));
	///
	/// assert_eq!(factory.build().unwrap(), json!({ "name": "Cat #1" }));
	/// assert_eq!(factory.build().unwrap(), json!({ "name": "Cat #2" }));
	/// ```
	pub fn sequence<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.sequence_from(key, 0, 1, compute)
	}

	/// Declares a sequence with an explicit initial value and step.
	pub fn sequence_from<K, F, V>(&self, key: K, initial: i64, step: i64, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.with_attribute(AttributeDefinition::sequence(key, initial, step, compute))
	}

	/// Alias for [`Factory::sequence_from`].
	pub fn seq<K, F, V>(&self, key: K, initial: i64, step: i64, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.sequence_from(key, initial, step, compute)
	}

	/// Declares a transient option: readable through the evaluator and by
	/// callbacks, never part of the entity.
	pub fn option<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.with_attribute(AttributeDefinition::transient(key, compute))
	}

	/// Alias for [`Factory::option`].
	pub fn opt<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.option(key, compute)
	}

	/// Registers a trait under `name`, replacing any trait with that name.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Factory;
	/// use serde_json::json;
	///
	/// let factory = Factory::create()
	///     .attr("name", |_| Ok("Bibi"))
	///     .with_trait("grumpy", |t: reinhardt_factory::Trait| t.attr("mood", |_| Ok("grumpy")));
	///
	/// assert_eq!(
	///     factory.build_with("grumpy").unwrap(),
	///     json!({ "name": "Bibi", "mood": "grumpy" })
	/// );
	/// ```
	pub fn with_trait(&self, name: impl Into<String>, definition: impl IntoTrait) -> Self {
		let (attributes, mut traits) = self.snapshot();
		traits.insert(name.into(), definition.into_trait());
		Self::with_parts(attributes, traits, self.callbacks.clone(), self.config.clone())
	}

	/// Appends an after-build callback.
	///
	/// The callback receives the current entity and the build's evaluator.
	/// Returning `Some` replaces the entity for the following callbacks.
	pub fn after<F>(&self, callback: F) -> Self
	where
		F: Fn(&Entity, &Evaluator) -> FactoryResult<Option<Entity>> + Send + Sync + 'static,
	{
		let (attributes, traits) = self.snapshot();
		let mut callbacks = self.callbacks.clone();
		callbacks.push(Arc::new(callback));
		Self::with_parts(attributes, traits, callbacks, self.config.clone())
	}

	/// Appends an after-build callback that edits the entity in place.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Factory;
	/// use serde_json::json;
	///
	/// let factory = Factory::create()
	///     .attr("name", |_| Ok("Bibi"))
	///     .option("hungry", |_| Ok(true))
	///     .after_mut(|cat, ev| {
	///         if ev.get_as::<bool>("hungry")? {
	///             cat.insert("meowing", true);
	///         }
	///         Ok(())
	///     });
	///
	/// assert_eq!(factory.build().unwrap(), json!({ "name": "Bibi", "meowing": true }));
	/// ```
	pub fn after_mut<F>(&self, callback: F) -> Self
	where
		F: Fn(&mut Entity, &Evaluator) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.after(move |entity: &Entity, evaluator: &Evaluator| {
			let mut modified = entity.clone();
			callback(&mut modified, evaluator)?;
			Ok(Some(modified))
		})
	}

	/// Returns a factory using `config` for its builds.
	pub fn with_config(&self, config: FactoryConfig) -> Self {
		let (attributes, traits) = self.snapshot();
		Self::with_parts(attributes, traits, self.callbacks.clone(), config)
	}

	/// Builds one entity with no traits and no overrides.
	pub fn build(&self) -> FactoryResult<Entity> {
		self.build_with(BuildArgs::new())
	}

	/// Builds one entity with the given traits and overrides.
	///
	/// The counter slot is reserved before any compute function runs, so a
	/// closure building this same factory again receives the next slot.
	pub fn build_with(&self, args: impl Into<BuildArgs>) -> FactoryResult<Entity> {
		let args = args.into();
		let builds = self.builds.lock();
		let reserved = builds.get();
		builds.set(reserved + 1);

		let result = self.driver_at(reserved, args).and_then(|driver| driver.next());
		if result.is_err() && builds.get() == reserved + 1 {
			builds.set(reserved);
		}
		result.map(|built| built.entity)
	}

	/// Builds `n` entities, each advancing the sequences by one step.
	pub fn build_list(&self, n: usize) -> FactoryResult<Vec<Entity>> {
		self.build_list_with(n, BuildArgs::new())
	}

	/// Builds `n` entities with the given traits and overrides.
	///
	/// The cursor only moves if all `n` builds succeed.
	pub fn build_list_with(&self, n: usize, args: impl Into<BuildArgs>) -> FactoryResult<Vec<Entity>> {
		let args = args.into();
		let builds = self.builds.lock();
		let reserved = builds.get();
		builds.set(reserved + n as u64);

		let result = self.driver_at(reserved, args).and_then(|driver| driver.take(n));
		if result.is_err() && builds.get() == reserved + n as u64 {
			builds.set(reserved);
		}
		result
	}

	/// Builds one entity and deserializes it into `T`.
	pub fn build_as<T: DeserializeOwned>(&self) -> FactoryResult<T> {
		self.build()?.deserialize()
	}

	/// Builds one entity with the given traits and overrides and deserializes it.
	pub fn build_as_with<T: DeserializeOwned>(&self, args: impl Into<BuildArgs>) -> FactoryResult<T> {
		self.build_with(args)?.deserialize()
	}

	/// Builds `n` entities and deserializes each into `T`.
	pub fn build_list_as<T: DeserializeOwned>(&self, n: usize) -> FactoryResult<Vec<T>> {
		self.build_list(n)?
			.iter()
			.map(Entity::deserialize::<T>)
			.collect()
	}

	/// Returns a driver starting from this factory's current sequence counters.
	///
	/// Builds made through the driver do not move this factory's cursor.
	pub fn driver(&self, args: impl Into<BuildArgs>) -> FactoryResult<BuildDriver> {
		let builds = self.builds.lock();
		self.driver_at(builds.get(), args.into())
	}

	/// The factory's own attribute definitions, without traits.
	pub fn attributes(&self) -> Vec<AttributeDefinition> {
		advance_all(&self.attributes, self.builds.lock().get())
	}

	pub fn trait_names(&self) -> impl Iterator<Item = &str> {
		self.traits.keys().map(String::as_str)
	}

	pub fn has_trait(&self, name: &str) -> bool {
		self.traits.contains_key(name)
	}

	pub fn callback_count(&self) -> usize {
		self.callbacks.len()
	}

	pub fn config(&self) -> &FactoryConfig {
		&self.config
	}

	fn with_parts(
		attributes: Vec<AttributeDefinition>,
		traits: HashMap<String, Trait>,
		callbacks: Vec<AfterCallback>,
		config: FactoryConfig,
	) -> Self {
		Self {
			attributes,
			traits,
			callbacks,
			config,
			builds: ReentrantMutex::new(Cell::new(0)),
		}
	}

	fn with_attribute(&self, definition: AttributeDefinition) -> Self {
		let (mut attributes, traits) = self.snapshot();
		attributes.push(definition);
		Self::with_parts(attributes, traits, self.callbacks.clone(), self.config.clone())
	}

	/// Attributes and traits with the sequence counters this instance has reached.
	fn snapshot(&self) -> (Vec<AttributeDefinition>, HashMap<String, Trait>) {
		let builds = self.builds.lock().get();
		let traits = self
			.traits
			.iter()
			.map(|(name, overlay)| (name.clone(), overlay.advanced(builds)))
			.collect();
		(advance_all(&self.attributes, builds), traits)
	}

	fn driver_at(&self, builds: u64, args: BuildArgs) -> FactoryResult<BuildDriver> {
		let BuildArgs { traits, overrides } = args;
		let attributes = effective_attributes(&self.attributes, &self.traits, &traits, builds)?;
		tracing::debug!(traits = ?traits, builds, "preparing build driver");
		Ok(BuildDriver::new(
			attributes,
			Arc::from(self.callbacks.clone()),
			traits,
			overrides,
			self.config.clone(),
		))
	}
}

impl Default for Factory {
	fn default() -> Self {
		Self::new()
	}
}

impl Clone for Factory {
	/// Copies the definitions with their current sequence counters; the clone
	/// advances independently of its source.
	fn clone(&self) -> Self {
		let (attributes, traits) = self.snapshot();
		Self::with_parts(attributes, traits, self.callbacks.clone(), self.config.clone())
	}
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Factory")
			.field("attributes", &self.attributes)
			.field("traits", &self.traits.keys().collect::<Vec<_>>())
			.field("callbacks", &self.callbacks.len())
			.field("config", &self.config)
			.field("builds", &self.builds.lock().get())
			.finish()
	}
}
