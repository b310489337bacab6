//! Core trait definitions for the GA engine.
//!
//! [`GaProblem`] is the contract between the generic engine and the caller's
//! domain; [`GaObserver`] receives the engine's callbacks.

use super::runner::GaResult;
use crate::genome::Genome;
use crate::progress::ProgressEvent;
use rand::Rng;
use std::time::Duration;

/// Defines a GA optimization problem.
///
/// The engine **maximizes** [`evaluate`](GaProblem::evaluate). NaN scores are
/// treated as negative infinity.
///
/// # Implementing
///
/// ```ignore
/// struct Sphere;
///
/// impl GaProblem for Sphere {
///     fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
///         Genome::map([("x", rng.random_range(-5.0..5.0)), ("y", rng.random_range(-5.0..5.0))])
///     }
///
///     fn evaluate(&self, g: &Genome) -> f64 {
///         let (x, y) = (g.get("x").unwrap_or(0.0), g.get("y").unwrap_or(0.0));
///         -(x * x + y * y)
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// `GaProblem` must be `Send + Sync` because generations may be evaluated on
/// the rayon pool (`parallel` feature).
pub trait GaProblem: Send + Sync {
    /// Creates a random individual. Called `population_size` times at start.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome;

    /// Fitness of a genome; higher is better.
    ///
    /// Must return the same value for equal genomes. The engine does not
    /// cache results.
    fn evaluate(&self, genome: &Genome) -> f64;

    /// Custom recombination, used when no built-in crossover applies.
    ///
    /// The default returns clones of both parents.
    fn crossover<R: Rng>(&self, parent1: &Genome, parent2: &Genome, _rng: &mut R) -> (Genome, Genome) {
        (parent1.clone(), parent2.clone())
    }

    /// Custom mutation, used when no built-in mutation applies.
    ///
    /// The default returns an unchanged clone.
    fn mutate<R: Rng>(&self, genome: &Genome, _rng: &mut R) -> Genome {
        genome.clone()
    }

    /// Spread of the population, driving adaptive rate control.
    ///
    /// `None` (the default) counts as a diversity of `0.0`. See
    /// [`mean_pairwise_distance`](crate::genome::mean_pairwise_distance) for
    /// a ready-made measure.
    fn diversity(&self, _population: &[Genome]) -> Option<f64> {
        None
    }

    /// Early-termination predicate over `(generation, best_fitness)`.
    ///
    /// Checked once per generation after the callbacks have fired.
    fn should_terminate(&self, _generation: usize, _best_fitness: f64) -> bool {
        false
    }
}

/// Per-generation snapshot passed to [`GaObserver::on_generation`].
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport<'a> {
    /// Zero-based generation index.
    pub generation: usize,
    pub population: &'a [Genome],
    /// Fitness of each member of `population`, same order.
    pub fitnesses: &'a [f64],
    /// Best fitness within this generation.
    pub best_fitness: f64,
    /// Best fitness seen in the run so far.
    pub best_ever_fitness: f64,
    /// Mean over the finite fitness values of this generation.
    pub mean_fitness: f64,
    pub diversity: f64,
    /// Mutation rate used to breed this generation's successors.
    pub mutation_rate: f64,
    /// Crossover rate used to breed this generation's successors.
    pub crossover_rate: f64,
    pub elapsed: Duration,
}

/// Receives GA run callbacks.
///
/// All methods default to no-ops; `()` implements the trait for callers
/// that need no callbacks. Within a run, callbacks fire in generation order
/// and never overlap.
pub trait GaObserver {
    /// Once per generation, after evaluation and before breeding.
    fn on_generation(&mut self, _report: &GenerationReport<'_>) {}

    /// Once per strict improvement of the best-ever fitness.
    fn on_new_best(&mut self, _genome: &Genome, _fitness: f64, _generation: usize) {}

    /// Once per generation, plus a final event flagged `finished`.
    fn on_progress(&mut self, _event: &ProgressEvent) {}

    /// Once, with the finished result, just before the run returns.
    fn on_termination(&mut self, _result: &GaResult) {}
}

impl GaObserver for () {}
