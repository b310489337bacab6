//! Domain-agnostic parameter tuning toolkit.
//!
//! Searches numeric configuration spaces for the highest-scoring point:
//!
//! - **Genetic Algorithm (GA)**: Population-based search over array or map
//!   genomes, with pluggable selection, crossover and mutation strategies
//!   and diversity/stagnation driven rate adaptation.
//! - **Brute Force**: Lazy, exactly-once enumeration of a stepped
//!   parameter grid, guarded by size, precision and time caps.
//! - **Layered**: GA exploration of the full space, then brute-force
//!   refinement of a narrowed space around the GA result.
//!
//! # Architecture
//!
//! [`space`] models the search space and the nested configurations it
//! produces; [`strategy`] holds the reusable GA operators; [`ga`],
//! [`brute`] and [`layered`] are the engines. Engines are synchronous:
//! a run owns its state and RNG, so independent runs may execute on
//! separate threads. Runs log through `tracing` and never install a
//! subscriber.

pub mod brute;
pub mod error;
pub mod ga;
pub mod genome;
pub mod layered;
pub mod progress;
pub mod random;
pub mod space;
pub mod strategy;

pub use error::{OptimError, Result};
