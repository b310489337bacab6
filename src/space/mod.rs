//! Parameter-space model for exhaustive search.
//!
//! A [`ParameterSpace`] is a tree of named numeric [`Range`]s. Flattening it
//! gives a grid; [`ParameterSpace::describe`] sizes that grid and refuses
//! grids that are too large to enumerate, and
//! [`ParameterSpace::combinations`] walks it lazily in O(1) extra memory.
//!
//! # Key Types
//!
//! - [`Range`]: `{min, max, step}` with inclusive stepping
//! - [`ParameterSpace`]: ordered, possibly nested, key → range tree
//! - [`SearchSpace`]: `{size, dimensions}` descriptor
//! - [`Config`]: one fully materialized, nested candidate configuration
//! - [`Combinations`]: odometer iterator over every grid point

mod combinations;
mod config;
mod model;
mod range;

pub use combinations::Combinations;
pub use config::{Config, ConfigValue};
pub use model::{
    Leaf, ParameterSpace, SearchSpace, SpaceLimits, SpaceNode, MAX_SAFE_INTEGER,
    MAX_SEARCH_SPACE_SIZE, SIZE_COMPUTATION_BUDGET,
};
pub use range::Range;
