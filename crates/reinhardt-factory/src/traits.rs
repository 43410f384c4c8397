//! Named attribute overlays.
//!
//! A [`Trait`] carries the same attribute vocabulary as a factory but no
//! after-callbacks. Activating a trait appends its attributes after the
//! factory's own, so its definitions shadow same-keyed base attributes.

use serde_json::Value;

use crate::attribute::{AttributeDefinition, advance_all};
use crate::error::FactoryResult;
use crate::evaluator::Evaluator;

/// Reusable fragment of attribute definitions.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::{Factory, Trait};
/// use serde_json::json;
///
/// let senior = Trait::create().attr("age", |_| Ok(15));
/// let factory = Factory::create()
///     .attr("name", |_| Ok("Bibi"))
///     .attr("age", |_| Ok(3))
///     .with_trait("senior", senior);
///
/// assert_eq!(factory.build_with("senior").unwrap(), json!({ "name": "Bibi", "age": 15 }));
/// assert_eq!(factory.build().unwrap(), json!({ "name": "Bibi", "age": 3 }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trait {
	attributes: Vec<AttributeDefinition>,
}

impl Trait {
	pub fn new() -> Self {
		Self::default()
	}

	/// Same as [`Trait::new`].
	pub fn create() -> Self {
		Self::new()
	}

	/// Concatenates traits left to right.
	pub fn compose_all<'a, I>(traits: I) -> Self
	where
		I: IntoIterator<Item = &'a Trait>,
	{
		traits
			.into_iter()
			.fold(Self::new(), |composed, other| composed.compose(other))
	}

	/// Returns a trait holding this trait's attributes followed by `other`'s.
	pub fn compose(&self, other: &Trait) -> Self {
		let mut attributes = self.attributes.clone();
		attributes.extend(other.attributes.iter().cloned());
		Self { attributes }
	}

	pub fn attr<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.push(AttributeDefinition::property(key, compute))
	}

	/// Declares a sequence starting at 0 and advancing by 1.
	pub fn sequence<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.sequence_from(key, 0, 1, compute)
	}

	pub fn sequence_from<K, F, V>(&self, key: K, initial: i64, step: i64, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.push(AttributeDefinition::sequence(key, initial, step, compute))
	}

	/// Alias for [`Trait::sequence_from`].
	pub fn seq<K, F, V>(&self, key: K, initial: i64, step: i64, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(i64, &Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.sequence_from(key, initial, step, compute)
	}

	/// Declares a transient option.
	pub fn option<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.push(AttributeDefinition::transient(key, compute))
	}

	/// Alias for [`Trait::option`].
	pub fn opt<K, F, V>(&self, key: K, compute: F) -> Self
	where
		K: Into<String>,
		F: Fn(&Evaluator) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.option(key, compute)
	}

	pub fn attributes(&self) -> &[AttributeDefinition] {
		&self.attributes
	}

	pub fn len(&self) -> usize {
		self.attributes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}

	pub(crate) fn advanced(&self, builds: u64) -> Self {
		Self {
			attributes: advance_all(&self.attributes, builds),
		}
	}

	fn push(&self, definition: AttributeDefinition) -> Self {
		let mut attributes = self.attributes.clone();
		attributes.push(definition);
		Self { attributes }
	}
}

/// Anything that can be registered as a trait: a [`Trait`] value, or a builder
/// closure that receives an empty trait and returns the configured one.
pub trait IntoTrait {
	fn into_trait(self) -> Trait;
}

impl IntoTrait for Trait {
	fn into_trait(self) -> Trait {
		self
	}
}

impl<F> IntoTrait for F
where
	F: FnOnce(Trait) -> Trait,
{
	fn into_trait(self) -> Trait {
		self(Trait::new())
	}
}
