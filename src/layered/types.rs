//! Phase tags, observer and result of a layered run.

use crate::brute::BruteForceResult;
use crate::ga::GaResult;
use crate::progress::ProgressEvent;
use crate::space::Config;
use std::fmt;

/// Stage of a layered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Global search over the full ranges.
    Genetic,
    /// Exhaustive refinement around the genetic result.
    BruteForce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Genetic => "genetic",
            Phase::BruteForce => "bruteforce",
        })
    }
}

/// Receives the interleaved callbacks of both phases.
///
/// All methods default to no-ops; `()` implements the trait.
pub trait LayeredObserver {
    /// Progress of either phase; every phase ends with a `finished` event.
    fn on_progress(&mut self, _phase: Phase, _event: &ProgressEvent) {}

    /// A phase found a better configuration than it had before.
    fn on_new_best(&mut self, _phase: Phase, _config: &Config, _score: f64) {}
}

impl LayeredObserver for () {}

/// Result of [`LayeredOptimizer::optimize`](super::LayeredOptimizer::optimize).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayeredResult {
    /// Refined configuration; the final answer.
    pub best_config: Config,
    pub best_score: f64,
    /// Best configuration of the genetic phase, the center of refinement.
    pub coarse_config: Config,
    pub coarse_score: f64,
    pub genetic: GaResult,
    pub brute_force: BruteForceResult,
}
