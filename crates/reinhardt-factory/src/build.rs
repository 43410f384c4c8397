//! Build arguments and the entity resolution kernel.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::attribute::{AttributeDefinition, advance_all};
use crate::config::FactoryConfig;
use crate::entity::Entity;
use crate::error::{FactoryError, FactoryResult};
use crate::evaluator::Evaluator;
use crate::overrides::Overrides;
use crate::traits::Trait;

/// After-build hook.
///
/// Receives the entity produced by the previous stage and the build's
/// evaluator. Returning `Some` replaces the entity, `None` passes it on unchanged.
pub type AfterCallback =
	Arc<dyn Fn(&Entity, &Evaluator) -> FactoryResult<Option<Entity>> + Send + Sync>;

/// Trait selection and overrides for a build.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::{BuildArgs, Overrides};
///
/// let args = BuildArgs::new()
///     .with_trait("senior")
///     .with_trait("hungry")
///     .set("name", "Bibi");
///
/// assert_eq!(args.traits(), ["senior", "hungry"]);
/// assert!(args.overrides().contains_key("name"));
///
/// // Overrides alone, or a single trait name, convert directly.
/// let _: BuildArgs = Overrides::new().set("age", 4).into();
/// let _: BuildArgs = "senior".into();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildArgs {
	pub(crate) traits: Vec<String>,
	pub(crate) overrides: Overrides,
}

impl BuildArgs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Activates a trait; traits apply in the order they are added.
	pub fn with_trait(mut self, name: impl Into<String>) -> Self {
		self.traits.push(name.into());
		self
	}

	pub fn with_traits<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.traits.extend(names.into_iter().map(Into::into));
		self
	}

	/// Replaces the override map.
	pub fn with_overrides(mut self, overrides: Overrides) -> Self {
		self.overrides = overrides;
		self
	}

	/// Adds a single override.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.overrides.insert(key, value);
		self
	}

	pub fn traits(&self) -> &[String] {
		&self.traits
	}

	pub fn overrides(&self) -> &Overrides {
		&self.overrides
	}
}

impl From<Overrides> for BuildArgs {
	fn from(overrides: Overrides) -> Self {
		Self::new().with_overrides(overrides)
	}
}

impl From<()> for BuildArgs {
	fn from(_: ()) -> Self {
		Self::new()
	}
}

impl From<&str> for BuildArgs {
	fn from(name: &str) -> Self {
		Self::new().with_trait(name)
	}
}

impl From<String> for BuildArgs {
	fn from(name: String) -> Self {
		Self::new().with_trait(name)
	}
}

impl<const N: usize> From<[&str; N]> for BuildArgs {
	fn from(names: [&str; N]) -> Self {
		Self::new().with_traits(names)
	}
}

/// Appends the attributes of each selected trait, in selection order, to the
/// base attributes. Trait sequences are advanced along with the base.
pub(crate) fn effective_attributes(
	base: &[AttributeDefinition],
	traits: &HashMap<String, Trait>,
	selected: &[String],
	builds: u64,
) -> FactoryResult<Vec<AttributeDefinition>> {
	let mut attributes = advance_all(base, builds);
	for name in selected {
		let overlay = traits
			.get(name)
			.ok_or_else(|| FactoryError::UnknownTrait(name.clone()))?;
		attributes.extend(advance_all(overlay.attributes(), builds));
	}
	Ok(attributes)
}

/// Produces one entity from a resolved attribute list.
///
/// Nothing outside the returned value is mutated, so a failing compute function
/// or callback leaves no trace.
pub(crate) fn run(
	attributes: &[AttributeDefinition],
	callbacks: &[AfterCallback],
	overrides: &Overrides,
	config: &FactoryConfig,
) -> FactoryResult<Entity> {
	tracing::debug!(
		attributes = attributes.len(),
		overrides = overrides.len(),
		callbacks = callbacks.len(),
		"building entity"
	);

	let evaluator = Evaluator::assemble(attributes, overrides, config.max_resolution_depth);
	let mut entity = evaluator.entity()?;

	for (position, callback) in callbacks.iter().enumerate() {
		tracing::trace!(callback = position, "running after callback");
		if let Some(modified) = callback(&entity, &evaluator)? {
			entity = modified;
		}
	}

	Ok(entity)
}
