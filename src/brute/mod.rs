//! Exhaustive (brute-force) grid search.
//!
//! Visits every grid point of a [`ParameterSpace`](crate::space::ParameterSpace)
//! exactly once and keeps the highest-scoring configuration.
//!
//! # Safety caps
//!
//! The grid is sized before anything is evaluated. A space whose size
//! exceeds 10,000,000 points (or a lower [`BruteForceConfig::max_space_size`]),
//! overflows 53-bit integer precision, or takes longer than
//! [`BruteForceConfig::size_budget`] to size fails with a configuration
//! error and zero evaluations.
//!
//! # Key Types
//!
//! - [`BruteForceConfig`] / [`Termination`]: base config, caps, early stops
//! - [`BruteForceProblem`]: candidate scoring and pre-filter
//! - [`BruteForceObserver`]: evaluation, new-best, error, progress, completion
//! - [`BruteForceRunner`]: Executes the search
//! - [`BruteForceResult`]: Best configuration, [`SearchStats`], [`StopReason`]

mod config;
mod runner;
mod types;

pub use config::{BruteForceConfig, Termination};
pub use runner::{BruteForceResult, BruteForceRunner, SearchStats, StopReason};
pub use types::{BruteForceObserver, BruteForceProblem, NonFiniteScore};
