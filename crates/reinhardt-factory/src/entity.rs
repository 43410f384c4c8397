//! Built entities.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FactoryResult;

/// The map of property and sequence values produced by one build.
///
/// Transient options never appear here.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::Factory;
/// use serde_json::json;
///
/// let cat = Factory::create()
///     .attr("name", |_| Ok("Bibi"))
///     .build()
///     .unwrap();
///
/// assert_eq!(cat.get("name"), Some(&json!("Bibi")));
/// assert_eq!(cat, json!({ "name": "Bibi" }));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
		self.0.get_mut(key)
	}

	/// Inserts a field, returning the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns a copy with `key` set to `value`.
	///
	/// Handy in after-callbacks that return a modified entity.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.0.remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}

	/// Deserializes the entity into a model type.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Factory;
	/// use serde::Deserialize;
	///
	/// #[derive(Deserialize)]
	/// struct Cat {
	///     name: String,
	///     age: u32,
	/// }
	///
	/// let entity = Factory::create()
	///     .attr("name", |_| Ok("Bibi"))
	///     .attr("age", |_| Ok(3))
	///     .build()
	///     .unwrap();
	/// let cat: Cat = entity.deserialize().unwrap();
	/// assert_eq!(cat.name, "Bibi");
	/// assert_eq!(cat.age, 3);
	/// ```
	pub fn deserialize<T: DeserializeOwned>(&self) -> FactoryResult<T> {
		Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
	}
}

impl From<Map<String, Value>> for Entity {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl From<Entity> for Value {
	fn from(entity: Entity) -> Self {
		entity.into_value()
	}
}

impl PartialEq<Value> for Entity {
	fn eq(&self, other: &Value) -> bool {
		matches!(other, Value::Object(map) if *map == self.0)
	}
}

impl PartialEq<Entity> for Value {
	fn eq(&self, other: &Entity) -> bool {
		other == self
	}
}

impl FromIterator<(String, Value)> for Entity {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
