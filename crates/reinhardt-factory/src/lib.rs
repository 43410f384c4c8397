//! Declarative test fixture factories for the Reinhardt framework.
//!
//! A [`Factory`] is an immutable template made of attribute definitions. Each
//! definition is resolved lazily while an entity is built, and compute
//! functions can read any sibling field through the build's [`Evaluator`].
//!
//! - **Attributes**: ordinary fields computed from a closure
//! - **Sequences**: fields fed by a counter that advances on every build
//! - **Options**: transient inputs visible to other attributes and callbacks,
//!   never part of the built entity
//! - **Traits**: named overlays activated per build
//! - **After-callbacks**: post-build hooks that may replace the entity
//!
//! # Quick Start
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! let cat_factory = Factory::create()
//!     .sequence("name", |n, _| Ok(format!("Cat #{}", n + 1)))
//!     .option("birth_year", |_| Ok(2017))
//!     .attr("age", |ev| Ok(2019 - ev.get_as::<i64>("birth_year")?))
//!     .with_trait("senior", |t: Trait| t.option("birth_year", |_| Ok(2004)));
//!
//! assert_eq!(cat_factory.build().unwrap(), json!({ "name": "Cat #1", "age": 2 }));
//! assert_eq!(
//!     cat_factory.build_with("senior").unwrap(),
//!     json!({ "name": "Cat #2", "age": 15 })
//! );
//! assert_eq!(
//!     cat_factory.build_with(Overrides::new().set("birth_year", 2016)).unwrap(),
//!     json!({ "name": "Cat #3", "age": 3 })
//! );
//! ```
//!
//! # Resolution order
//!
//! For one build the effective attribute list is the factory's own attributes
//! followed by the attributes of each selected trait, in selection order. Within
//! that list the last definition of a key wins. An override suppresses the compute
//! function of its key entirely, and each computed field runs at most once per
//! build no matter how many other fields read it.
//!
//! # Repeated builds
//!
//! [`Factory::build`] and [`Factory::build_list`] advance the factory's own
//! sequence counters. [`Factory::driver`] instead returns a [`BuildDriver`]
//! continuation that threads the advanced counters forward explicitly.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod attribute;
pub mod build;
pub mod config;
pub mod driver;
pub mod entity;
pub mod error;
pub mod evaluator;
pub mod factory;
mod field;
pub mod overrides;
pub mod prelude;
pub mod traits;

pub use attribute::{AttributeDefinition, AttributeType};
pub use build::{AfterCallback, BuildArgs};
pub use config::FactoryConfig;
pub use driver::{BuildDriver, Built, Entities};
pub use entity::Entity;
pub use error::{FactoryError, FactoryResult};
pub use evaluator::Evaluator;
pub use factory::Factory;
pub use overrides::Overrides;
pub use traits::{IntoTrait, Trait};
