//! Layered optimization: genetic exploration, then brute-force refinement.
//!
//! # Key Types
//!
//! - [`LayeredConfig`]: Both phase configurations, `search_radius`, `step_scale`
//! - [`LayeredOptimizer`]: Runs the phases (or phase 2 alone via `refine`)
//! - [`LayeredObserver`]: Progress and new-best callbacks tagged by [`Phase`]
//! - [`LayeredResult`]: Refined answer plus both phase results
//!
//! # Refinement
//!
//! For every leaf range with genetic best `v`, phase 2 searches
//! `[max(min, v - r), min(max, v + r)]` with step `step * step_scale`,
//! where `r = (max - min) * search_radius`. With `search_radius = 1` and
//! `step_scale = 1` the refinement space equals the original space.

mod config;
mod runner;
mod types;

pub use config::LayeredConfig;
pub use runner::LayeredOptimizer;
pub use types::{LayeredObserver, LayeredResult, Phase};
