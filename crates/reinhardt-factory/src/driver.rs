//! Repeatable builds.
//!
//! A [`BuildDriver`] captures everything one build needs. Calling
//! [`next`](BuildDriver::next) produces an entity together with the driver for
//! the following build, whose sequence counters have moved one step forward.
//! Drivers are values: keeping an old driver and calling it again reproduces the
//! same build.

use std::sync::Arc;

use crate::attribute::{AttributeDefinition, advance_all};
use crate::build::{AfterCallback, run};
use crate::config::FactoryConfig;
use crate::entity::Entity;
use crate::error::FactoryResult;
use crate::overrides::Overrides;

/// Continuation producing successive entities on demand.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::{BuildArgs, Factory};
/// use serde_json::json;
///
/// let factory = Factory::create().sequence("name", |n, _| Ok(format!("Cat #{}", n + 1)));
///
/// let first = factory.driver(BuildArgs::new()).unwrap().next().unwrap();
/// let second = first.next.next().unwrap();
///
/// assert_eq!(first.entity, json!({ "name": "Cat #1" }));
/// assert_eq!(second.entity, json!({ "name": "Cat #2" }));
/// ```
#[derive(Clone)]
pub struct BuildDriver {
	attributes: Vec<AttributeDefinition>,
	callbacks: Arc<[AfterCallback]>,
	traits: Vec<String>,
	overrides: Overrides,
	config: FactoryConfig,
}

/// An entity together with the driver for the next build.
#[derive(Debug, Clone)]
pub struct Built {
	pub entity: Entity,
	pub next: BuildDriver,
}

impl BuildDriver {
	pub(crate) fn new(
		attributes: Vec<AttributeDefinition>,
		callbacks: Arc<[AfterCallback]>,
		traits: Vec<String>,
		overrides: Overrides,
		config: FactoryConfig,
	) -> Self {
		Self {
			attributes,
			callbacks,
			traits,
			overrides,
			config,
		}
	}

	/// Builds with the overrides this driver was created with.
	pub fn next(&self) -> FactoryResult<Built> {
		self.step(self.overrides.clone())
	}

	/// Builds with `overrides` instead; the returned driver keeps using them.
	pub fn next_with(&self, overrides: Overrides) -> FactoryResult<Built> {
		self.step(overrides)
	}

	/// Builds `n` entities in sequence.
	pub fn take(self, n: usize) -> FactoryResult<Vec<Entity>> {
		let mut entities = Vec::with_capacity(n);
		let mut driver = self;
		for _ in 0..n {
			let built = driver.next()?;
			entities.push(built.entity);
			driver = built.next;
		}
		Ok(entities)
	}

	/// Trait names active for every build of this driver.
	pub fn traits(&self) -> &[String] {
		&self.traits
	}

	pub fn overrides(&self) -> &Overrides {
		&self.overrides
	}

	/// Counter the sequence `key` will receive on the next build.
	pub fn sequence_counter(&self, key: &str) -> Option<i64> {
		self.attributes
			.iter()
			.rev()
			.filter(|definition| definition.key() == key)
			.find_map(AttributeDefinition::counter)
	}

	fn step(&self, overrides: Overrides) -> FactoryResult<Built> {
		let entity = run(&self.attributes, &self.callbacks, &overrides, &self.config)?;
		Ok(Built {
			entity,
			next: Self {
				attributes: advance_all(&self.attributes, 1),
				callbacks: Arc::clone(&self.callbacks),
				traits: self.traits.clone(),
				overrides,
				config: self.config.clone(),
			},
		})
	}
}

impl std::fmt::Debug for BuildDriver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BuildDriver")
			.field("attributes", &self.attributes)
			.field("callbacks", &self.callbacks.len())
			.field("traits", &self.traits)
			.field("overrides", &self.overrides)
			.finish()
	}
}

impl IntoIterator for BuildDriver {
	type Item = FactoryResult<Entity>;
	type IntoIter = Entities;

	fn into_iter(self) -> Entities {
		Entities { driver: Some(self) }
	}
}

/// Endless iterator over successive builds of a [`BuildDriver`].
///
/// Stops after yielding the first error.
#[derive(Debug)]
pub struct Entities {
	driver: Option<BuildDriver>,
}

impl Iterator for Entities {
	type Item = FactoryResult<Entity>;

	fn next(&mut self) -> Option<Self::Item> {
		let driver = self.driver.take()?;
		match driver.next() {
			Ok(built) => {
				self.driver = Some(built.next);
				Some(Ok(built.entity))
			}
			Err(error) => Some(Err(error)),
		}
	}
}

impl std::iter::FusedIterator for Entities {}
