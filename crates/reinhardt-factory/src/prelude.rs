//! Convenience re-exports for common usage.
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! let factory = Factory::create().attr("name", |_| Ok("Bibi"));
//! assert_eq!(factory.build().unwrap(), json!({ "name": "Bibi" }));
//! ```

pub use crate::attribute::AttributeType;
pub use crate::build::BuildArgs;
pub use crate::config::FactoryConfig;
pub use crate::driver::BuildDriver;
pub use crate::entity::Entity;
pub use crate::error::{FactoryError, FactoryResult};
pub use crate::evaluator::Evaluator;
pub use crate::factory::Factory;
pub use crate::overrides::Overrides;
pub use crate::traits::{IntoTrait, Trait};

pub use serde_json::json;
