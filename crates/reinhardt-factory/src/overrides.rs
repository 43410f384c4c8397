//! Caller-supplied field overrides.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FactoryError, FactoryResult};

/// Fixed values that replace generated fields for one build.
///
/// A key present here suppresses the compute function of every attribute or
/// option declared under that key. Keys that no attribute declares are ignored.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::Overrides;
///
/// let overrides = Overrides::new().set("age", 4).set("name", "Bibi");
/// assert_eq!(overrides.len(), 2);
/// assert!(overrides.contains_key("age"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(Map<String, Value>);

impl Overrides {
	/// Creates an empty override map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an override, returning the updated map.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	/// Inserts an override in place, returning the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns the override for `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the override keys.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// Builds an override map from any serializable value.
	///
	/// The value must serialize to a JSON object.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Overrides;
	/// use serde::Serialize;
	///
	/// #[derive(Serialize)]
	/// struct CatPatch {
	///     age: u32,
	/// }
	///
	/// let overrides = Overrides::from_serialize(&CatPatch { age: 4 }).unwrap();
	/// assert_eq!(overrides.get("age"), Some(&serde_json::json!(4)));
	/// ```
	pub fn from_serialize<T: Serialize>(value: &T) -> FactoryResult<Self> {
		Self::try_from(serde_json::to_value(value)?)
	}
}

impl From<Map<String, Value>> for Overrides {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl TryFrom<Value> for Overrides {
	type Error = FactoryError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			other => Err(FactoryError::InvalidOverrides(format!(
				"expected a JSON object, got {}",
				json_kind(&other)
			))),
		}
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Overrides {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
