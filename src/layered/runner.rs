//! Two-phase GA → brute-force orchestration.

use super::config::LayeredConfig;
use super::types::{LayeredObserver, LayeredResult, Phase};
use crate::brute::{BruteForceObserver, BruteForceProblem, BruteForceResult, BruteForceRunner};
use crate::error::{OptimError, Result};
use crate::ga::{GaObserver, GaProblem, GaRunner};
use crate::genome::{mean_pairwise_distance, Genome};
use crate::progress::ProgressEvent;
use crate::space::{Config, Leaf, ParameterSpace, SearchSpace, SpaceLimits, MAX_SAFE_INTEGER};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Coarse global search followed by local exhaustive refinement.
///
/// Phase 1 runs the genetic engine over the full ranges, with one map-genome
/// key per leaf path. Phase 2 narrows every range around the genetic best
/// (see [`ParameterSpace::narrow`]) and searches the result exhaustively.
/// The refined configuration is the final answer.
///
/// # Usage
///
/// ```ignore
/// let optimizer = LayeredOptimizer::new(space, LayeredConfig::default())?;
/// let result = optimizer.optimize(&problem, &mut ())?;
/// println!("{:?} scored {}", result.best_config, result.best_score);
/// ```
#[derive(Debug, Clone)]
pub struct LayeredOptimizer {
    space: ParameterSpace,
    config: LayeredConfig,
    coarse: SearchSpace,
}

impl LayeredOptimizer {
    /// Validates `config` and `space` before any search runs.
    ///
    /// The full space only has to fit 53-bit integer precision. The size
    /// caps of `config.brute_force` apply to the widest narrowed space any
    /// phase-1 result could produce, so an oversized refinement fails here
    /// rather than after the genetic phase.
    pub fn new(space: ParameterSpace, config: LayeredConfig) -> Result<Self> {
        config.validate()?;
        let coarse = space.describe_with(&SpaceLimits {
            max_size: MAX_SAFE_INTEGER,
            time_budget: config.brute_force.size_budget,
        })?;
        let refinement = space
            .widest_narrowing(config.search_radius, config.step_scale)
            .describe_with(&config.brute_force.limits())?;
        debug!(
            coarse_size = coarse.size,
            refinement_bound = refinement.size,
            "layered search spaces sized"
        );
        Ok(Self {
            space,
            config,
            coarse,
        })
    }

    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    /// Runs both phases.
    pub fn optimize<P, O>(&self, problem: &P, observer: &mut O) -> Result<LayeredResult>
    where
        P: BruteForceProblem + ?Sized,
        O: LayeredObserver + ?Sized,
    {
        info!(
            size = self.coarse.size,
            dimensions = self.coarse.dimensions,
            search_radius = self.config.search_radius,
            step_scale = self.config.step_scale,
            "starting layered optimization"
        );

        let adapter = SpaceProblem::new(&self.space, self.base(), problem);
        let genetic = {
            let mut bridge = GeneticBridge {
                adapter: &adapter,
                inner: &mut *observer,
            };
            GaRunner::run_with_observer(&adapter, &self.config.genetic, &mut bridge)?
        };
        let coarse_config = adapter.to_config(&genetic.best)?;
        let coarse_score = genetic.best_fitness;
        debug!(coarse_score, generations = genetic.generations, "genetic phase finished");

        let brute_force = self.refine(problem, &coarse_config, observer)?;
        info!(
            coarse_score,
            best_score = brute_force.best_score,
            "layered optimization finished"
        );

        Ok(LayeredResult {
            best_config: brute_force.best_config.clone(),
            best_score: brute_force.best_score,
            coarse_config,
            coarse_score,
            genetic,
            brute_force,
        })
    }

    /// Runs phase 2 only, centered on `center`.
    ///
    /// `center` must hold a value for every leaf path of the space.
    pub fn refine<P, O>(&self, problem: &P, center: &Config, observer: &mut O) -> Result<BruteForceResult>
    where
        P: BruteForceProblem + ?Sized,
        O: LayeredObserver + ?Sized,
    {
        let narrowed = self
            .space
            .narrow(center, self.config.search_radius, self.config.step_scale)?;
        let mut bridge = RefineBridge { inner: observer };
        BruteForceRunner::run_with_observer(&narrowed, problem, &self.config.brute_force, &mut bridge)
    }

    fn base(&self) -> Config {
        self.config.brute_force.base_config.clone().unwrap_or_default()
    }
}

/// Exposes a parameter space to the genetic engine.
///
/// Genomes are maps keyed by leaf path. Individuals and mutations draw
/// grid points; crossover swaps whole keys. Values are clamped into their
/// leaf range before evaluation. Failed, rejected and non-finite candidates
/// score negative infinity.
struct SpaceProblem<'a, P: ?Sized> {
    leaves: Vec<Leaf>,
    base: Config,
    problem: &'a P,
}

impl<'a, P: BruteForceProblem + ?Sized> SpaceProblem<'a, P> {
    fn new(space: &ParameterSpace, base: Config, problem: &'a P) -> Self {
        Self {
            leaves: space.leaves(),
            base,
            problem,
        }
    }

    fn draw<R: Rng>(leaf: &Leaf, rng: &mut R) -> f64 {
        let steps = leaf.range.steps().unwrap_or(1).max(1);
        leaf.range.value_at(rng.random_range(0..steps))
    }

    fn to_config(&self, genome: &Genome) -> Result<Config> {
        let values = genome.as_map().ok_or_else(|| OptimError::ShapeMismatch {
            expected: "map genome".into(),
            found: genome.describe(),
        })?;
        let mut config = self.base.clone();
        for leaf in &self.leaves {
            let value = values.get(&leaf.path).ok_or_else(|| OptimError::ShapeMismatch {
                expected: format!("map genome with key `{}`", leaf.path),
                found: genome.describe(),
            })?;
            // Built-in operators may step outside the range.
            let value = value.clamp(leaf.range.min, leaf.range.max);
            config.set_segments(leaf.segments.as_slice(), value);
        }
        Ok(config)
    }
}

impl<P: BruteForceProblem + ?Sized> GaProblem for SpaceProblem<'_, P> {
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
        Genome::Map(
            self.leaves
                .iter()
                .map(|leaf| (leaf.path.clone(), Self::draw(leaf, rng)))
                .collect(),
        )
    }

    fn evaluate(&self, genome: &Genome) -> f64 {
        let Ok(config) = self.to_config(genome) else {
            return f64::NEG_INFINITY;
        };
        if !self.problem.validate(&config) {
            return f64::NEG_INFINITY;
        }
        match self.problem.evaluate(&config) {
            Ok(score) if score.is_finite() => score,
            Ok(score) => {
                debug!(score, "non-finite score in genetic phase");
                f64::NEG_INFINITY
            }
            Err(err) => {
                debug!(error = %err, "evaluation failed in genetic phase");
                f64::NEG_INFINITY
            }
        }
    }

    fn crossover<R: Rng>(&self, parent1: &Genome, parent2: &Genome, rng: &mut R) -> (Genome, Genome) {
        let (Some(a), Some(b)) = (parent1.as_map(), parent2.as_map()) else {
            return (parent1.clone(), parent2.clone());
        };
        let mut c1 = a.clone();
        let mut c2 = b.clone();
        for key in a.keys() {
            if rng.random_bool(0.5) {
                if let (Some(x), Some(y)) = (c1.get_mut(key), c2.get_mut(key)) {
                    std::mem::swap(x, y);
                }
            }
        }
        (Genome::Map(c1), Genome::Map(c2))
    }

    fn mutate<R: Rng>(&self, genome: &Genome, rng: &mut R) -> Genome {
        let Some(values) = genome.as_map() else {
            return genome.clone();
        };
        if self.leaves.is_empty() {
            return genome.clone();
        }
        let leaf = &self.leaves[rng.random_range(0..self.leaves.len())];
        let mut mutated = values.clone();
        mutated.insert(leaf.path.clone(), Self::draw(leaf, rng));
        Genome::Map(mutated)
    }

    /// Mean pairwise distance with each key scaled by its range span.
    fn diversity(&self, population: &[Genome]) -> Option<f64> {
        let spans: BTreeMap<&str, f64> = self
            .leaves
            .iter()
            .map(|leaf| (leaf.path.as_str(), leaf.range.span()))
            .collect();
        let scaled: Vec<Genome> = population
            .iter()
            .map(|genome| match genome.as_map() {
                Some(values) => Genome::Map(
                    values
                        .iter()
                        .map(|(key, &v)| {
                            let span = spans.get(key.as_str()).copied().unwrap_or(0.0);
                            (key.clone(), if span > 0.0 { v / span } else { 0.0 })
                        })
                        .collect(),
                ),
                None => genome.clone(),
            })
            .collect();
        Some(mean_pairwise_distance(&scaled))
    }
}

/// Forwards genetic callbacks tagged [`Phase::Genetic`].
struct GeneticBridge<'a, 'b, P: ?Sized, O: ?Sized> {
    adapter: &'a SpaceProblem<'b, P>,
    inner: &'a mut O,
}

impl<P, O> GaObserver for GeneticBridge<'_, '_, P, O>
where
    P: BruteForceProblem + ?Sized,
    O: LayeredObserver + ?Sized,
{
    fn on_new_best(&mut self, genome: &Genome, fitness: f64, _generation: usize) {
        if let Ok(config) = self.adapter.to_config(genome) {
            self.inner.on_new_best(Phase::Genetic, &config, fitness);
        }
    }

    fn on_progress(&mut self, event: &ProgressEvent) {
        self.inner.on_progress(Phase::Genetic, event);
    }
}

/// Forwards brute-force callbacks tagged [`Phase::BruteForce`].
struct RefineBridge<'a, O: ?Sized> {
    inner: &'a mut O,
}

impl<O: LayeredObserver + ?Sized> BruteForceObserver for RefineBridge<'_, O> {
    fn on_new_best(&mut self, config: &Config, score: f64) {
        self.inner.on_new_best(Phase::BruteForce, config, score);
    }

    fn on_progress(&mut self, event: &ProgressEvent) {
        self.inner.on_progress(Phase::BruteForce, event);
    }
}
