//! GA evolutionary loop execution.
//!
//! [`GaRunner`] drives one run: evaluate → record best → measure diversity
//! → callbacks → adapt rates → check termination → breed, repeated once
//! per generation.

use super::adaptive::RateController;
use super::config::GaConfig;
use super::types::{GaObserver, GaProblem, GenerationReport};
use crate::error::{OptimError, Result};
use crate::genome::{Genome, GenomeShape};
use crate::progress::ProgressEvent;
use crate::random::rng_from_seed;
use crate::strategy::{CrossoverStrategy, MutationContext, MutationStrategy};
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Why a GA run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// [`GaProblem::should_terminate`] returned `true`.
    TargetReached,
    /// All `max_generations` generations ran.
    MaxGenerations,
    /// `time_limit_ms` elapsed.
    TimeLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminationReason::TargetReached => "target fitness reached",
            TerminationReason::MaxGenerations => "max generations reached",
            TerminationReason::TimeLimit => "time limit reached",
        })
    }
}

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// The best genome found during the entire run.
    pub best: Genome,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Number of generations evaluated.
    pub generations: usize,

    /// Best-ever fitness after each generation. Non-decreasing.
    pub history: Vec<f64>,

    /// Diversity of each generation.
    pub diversity_history: Vec<f64>,

    pub termination_reason: TerminationReason,

    /// Population at the time the run stopped.
    pub final_population: Vec<Genome>,

    /// Mutation rate after the last adaptive update.
    pub final_mutation_rate: f64,

    /// Crossover rate after the last adaptive update.
    pub final_crossover_rate: f64,

    /// Total number of fitness evaluations.
    pub evaluations: u64,
}

/// Crossover operator resolved once per run.
#[derive(Debug, Clone)]
enum CrossoverOp {
    Builtin(CrossoverStrategy),
    Custom,
}

/// Mutation operator resolved once per run.
#[derive(Debug, Clone)]
enum MutationOp {
    Builtin(MutationStrategy),
    Custom,
}

/// A configured built-in operator wins over the problem's own operator
/// whenever it accepts the population's genome layout.
#[derive(Debug, Clone)]
struct Operators {
    crossover: CrossoverOp,
    mutation: MutationOp,
}

impl Operators {
    fn resolve(config: &GaConfig, shape: GenomeShape) -> Self {
        let crossover = match config.crossover {
            Some(s) if s.required_shape() == shape => CrossoverOp::Builtin(s),
            _ => CrossoverOp::Custom,
        };
        let mutation = match &config.mutation {
            Some(s) if s.required_shape() == shape => MutationOp::Builtin(s.clone()),
            _ => MutationOp::Custom,
        };
        Self {
            crossover,
            mutation,
        }
    }

    fn crossover<P: GaProblem, R: Rng>(
        &self,
        problem: &P,
        p1: &Genome,
        p2: &Genome,
        rng: &mut R,
    ) -> Result<(Genome, Genome)> {
        match &self.crossover {
            CrossoverOp::Builtin(s) => s.apply(p1, p2, rng),
            CrossoverOp::Custom => Ok(problem.crossover(p1, p2, rng)),
        }
    }

    fn mutate<P: GaProblem, R: Rng>(
        &self,
        problem: &P,
        genome: &Genome,
        context: &MutationContext,
        rng: &mut R,
    ) -> Result<Genome> {
        match &self.mutation {
            MutationOp::Builtin(s) => s.apply(genome, context, rng),
            MutationOp::Custom => Ok(problem.mutate(genome, rng)),
        }
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&problem, &config)?;
/// println!("best {:?} ({})", result.best, result.termination_reason);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA without callbacks.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_observer(problem, config, &mut ())
    }

    /// Runs the GA, reporting to `observer`.
    ///
    /// Fails before any evaluation if the configuration is invalid, and
    /// during the run if a built-in operator meets genomes of mismatched
    /// shape.
    pub fn run_with_observer<P, O>(problem: &P, config: &GaConfig, observer: &mut O) -> Result<GaResult>
    where
        P: GaProblem,
        O: GaObserver + ?Sized,
    {
        config.validate()?;

        let started = Instant::now();
        let mut rng = rng_from_seed(config.seed);
        let time_limit = config.time_limit_ms.map(Duration::from_millis);
        let elite_count = config.elite_count();

        info!(
            population_size = config.population_size,
            max_generations = config.max_generations,
            elite_count,
            "starting genetic run"
        );

        let mut population: Vec<Genome> = (0..config.population_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect();
        let operators = Operators::resolve(config, population[0].shape());
        let mut rates = RateController::new(config);

        let mut best: Option<(Genome, f64)> = None;
        let mut history = Vec::with_capacity(config.max_generations);
        let mut diversity_history = Vec::with_capacity(config.max_generations);
        let mut evaluations = 0u64;
        let mut valid = 0u64;
        let mut generations = 0usize;
        let mut reason = TerminationReason::MaxGenerations;

        for generation in 0..config.max_generations {
            if let Some(limit) = time_limit {
                if generation > 0 && started.elapsed() >= limit {
                    reason = TerminationReason::TimeLimit;
                    break;
                }
            }

            // 1. Evaluate
            let fitnesses = evaluate_population(problem, &population, config.parallel);
            evaluations += fitnesses.len() as u64;
            valid += fitnesses.iter().filter(|f| f.is_finite()).count() as u64;

            // 2. Track best
            let gen_best = best_index(&fitnesses);
            let gen_best_fitness = fitnesses[gen_best];
            let improved = match &best {
                Some((_, f)) => gen_best_fitness > *f,
                None => true,
            };
            if improved {
                let genome = population[gen_best].clone();
                observer.on_new_best(&genome, gen_best_fitness, generation);
                debug!(generation, fitness = gen_best_fitness, "new best individual");
                best = Some((genome, gen_best_fitness));
            }
            let best_fitness = best.as_ref().map_or(gen_best_fitness, |(_, f)| *f);
            history.push(best_fitness);

            // 3. Diversity
            let diversity = problem.diversity(&population).unwrap_or(0.0);
            diversity_history.push(diversity);

            // 4. Callbacks
            let mean_fitness = finite_mean(&fitnesses);
            let report = GenerationReport {
                generation,
                population: &population,
                fitnesses: &fitnesses,
                best_fitness: gen_best_fitness,
                best_ever_fitness: best_fitness,
                mean_fitness,
                diversity,
                mutation_rate: rates.mutation_rate(),
                crossover_rate: rates.crossover_rate(),
                elapsed: started.elapsed(),
            };
            observer.on_generation(&report);
            observer.on_progress(&ProgressEvent::new(
                generation as u64 + 1,
                config.max_generations as u64,
                Some(best_fitness),
                valid,
                evaluations - valid,
                started.elapsed(),
            ));
            debug!(
                generation,
                best_fitness,
                mean_fitness,
                diversity,
                mutation_rate = rates.mutation_rate(),
                crossover_rate = rates.crossover_rate(),
                "generation complete"
            );
            generations = generation + 1;

            // 5. Adapt rates
            rates.update(diversity, &history);

            // 6. Termination
            if problem.should_terminate(generation, best_fitness) {
                reason = TerminationReason::TargetReached;
                break;
            }

            // 7. Breed
            if generation + 1 < config.max_generations {
                population = breed(
                    problem,
                    config,
                    &operators,
                    &rates,
                    &population,
                    &fitnesses,
                    elite_count,
                    &mut rng,
                )?;
            }
        }

        // Generation 0 always runs, so this only trips on an empty population.
        let Some((best, best_fitness)) = best else {
            return Err(OptimError::InvalidConfig("no generation was evaluated".into()));
        };

        let result = GaResult {
            best,
            best_fitness,
            generations,
            history,
            diversity_history,
            termination_reason: reason,
            final_population: population,
            final_mutation_rate: rates.mutation_rate(),
            final_crossover_rate: rates.crossover_rate(),
            evaluations,
        };

        observer.on_progress(
            &ProgressEvent::new(
                generations as u64,
                config.max_generations as u64,
                Some(best_fitness),
                valid,
                evaluations - valid,
                started.elapsed(),
            )
            .into_final(),
        );
        info!(
            generations,
            best_fitness,
            reason = %reason,
            evaluations,
            "genetic run finished"
        );
        observer.on_termination(&result);
        Ok(result)
    }
}

/// Builds the next generation: elites first, then offspring.
#[allow(clippy::too_many_arguments)]
fn breed<P: GaProblem, R: Rng>(
    problem: &P,
    config: &GaConfig,
    operators: &Operators,
    rates: &RateController,
    population: &[Genome],
    fitnesses: &[f64],
    elite_count: usize,
    rng: &mut R,
) -> Result<Vec<Genome>> {
    let size = config.population_size;

    // Stable sort: equal fitness keeps population order.
    let mut ranked: Vec<usize> = (0..population.len()).collect();
    ranked.sort_by(|&a, &b| {
        fitnesses[b]
            .partial_cmp(&fitnesses[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut next: Vec<Genome> = Vec::with_capacity(size + 1);
    next.extend(ranked.iter().take(elite_count).map(|&i| population[i].clone()));

    let (min_fitness, max_fitness) = finite_bounds(fitnesses);

    while next.len() < size {
        let i1 = config.selection.select(fitnesses, rng);
        let i2 = config.selection.select(fitnesses, rng);

        let (c1, c2) = if rng.random::<f64>() < rates.crossover_rate() {
            operators.crossover(problem, &population[i1], &population[i2], rng)?
        } else {
            (population[i1].clone(), population[i2].clone())
        };

        for (child, parent) in [(c1, i1), (c2, i2)] {
            let child = if rng.random::<f64>() < rates.mutation_rate() {
                let context = MutationContext {
                    fitness: fitnesses[parent],
                    max_fitness,
                    min_fitness,
                };
                operators.mutate(problem, &child, &context, rng)?
            } else {
                child
            };
            next.push(child);
        }
    }

    // Offspring come in pairs; drop one random non-elite on overshoot.
    if next.len() > size {
        let idx = rng.random_range(elite_count..next.len());
        next.remove(idx);
    }

    Ok(next)
}

/// Evaluates every genome; NaN becomes negative infinity.
fn evaluate_population<P: GaProblem>(problem: &P, population: &[Genome], parallel: bool) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            return population
                .par_iter()
                .map(|g| sanitize(problem.evaluate(g)))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    population
        .iter()
        .map(|g| sanitize(problem.evaluate(g)))
        .collect()
}

fn sanitize(fitness: f64) -> f64 {
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}

/// Index of the first maximum.
fn best_index(fitnesses: &[f64]) -> usize {
    let mut best = 0;
    for (i, &f) in fitnesses.iter().enumerate().skip(1) {
        if f > fitnesses[best] {
            best = i;
        }
    }
    best
}

fn finite_mean(fitnesses: &[f64]) -> f64 {
    let (sum, count) = fitnesses
        .iter()
        .filter(|f| f.is_finite())
        .fold((0.0, 0usize), |(s, c), &f| (s + f, c + 1));
    if count == 0 {
        f64::NEG_INFINITY
    } else {
        sum / count as f64
    }
}

/// `(min, max)` over finite values; `(0, 0)` if there are none.
fn finite_bounds(fitnesses: &[f64]) -> (f64, f64) {
    let mut finite = fitnesses.iter().copied().filter(|f| f.is_finite()).peekable();
    if finite.peek().is_none() {
        return (0.0, 0.0);
    }
    finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
        (lo.min(f), hi.max(f))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::AdaptiveParams;
    use crate::genome::mean_pairwise_distance;
    use crate::strategy::{AdaptiveMutation, Selection};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    // ---- Sphere on a map genome: maximize -(x^2 + y^2) ----

    struct Sphere;

    impl GaProblem for Sphere {
        fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
            Genome::map([
                ("x", rng.random_range(-5.0..5.0)),
                ("y", rng.random_range(-5.0..5.0)),
            ])
        }

        fn evaluate(&self, g: &Genome) -> f64 {
            let x = g.get("x").unwrap_or(f64::NAN);
            let y = g.get("y").unwrap_or(f64::NAN);
            -(x * x + y * y)
        }

        fn diversity(&self, population: &[Genome]) -> Option<f64> {
            Some(mean_pairwise_distance(population))
        }
    }

    fn sphere_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_max_generations(100)
            .with_crossover(CrossoverStrategy::Arithmetic { alpha: 0.3 })
            .with_mutation(MutationStrategy::Gaussian {
                sigma: 0.3,
                rate: 0.5,
            })
            .with_mutation_rate(0.5)
            .with_seed(42)
    }

    #[test]
    fn test_sphere_convergence() {
        let result = GaRunner::run(&Sphere, &sphere_config()).unwrap();
        assert!(result.best_fitness > -0.5, "got {}", result.best_fitness);
        assert!(result.best.get("x").unwrap().abs() < 0.5);
        assert!(result.best.get("y").unwrap().abs() < 0.5);
        assert_eq!(result.generations, 100);
        assert_eq!(result.termination_reason, TerminationReason::MaxGenerations);
        assert_eq!(result.history.len(), 100);
        assert_eq!(result.diversity_history.len(), 100);
        assert_eq!(result.final_population.len(), 40);
        assert_eq!(result.evaluations, 40 * 100);
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = GaRunner::run(&Sphere, &sphere_config()).unwrap();
        let b = GaRunner::run(&Sphere, &sphere_config()).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_history_is_monotone() {
        for selection in [Selection::Tournament(3), Selection::Roulette, Selection::Rank] {
            let config = sphere_config()
                .with_selection(selection)
                .with_elitism_rate(0.0)
                .with_max_generations(30);
            let result = GaRunner::run(&Sphere, &config).unwrap();
            for w in result.history.windows(2) {
                assert!(w[1] >= w[0], "{selection:?}: {} < {}", w[1], w[0]);
            }
        }
    }

    #[test]
    fn test_termination_predicate() {
        struct Target;
        impl GaProblem for Target {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                Sphere.create_individual(rng)
            }
            fn evaluate(&self, g: &Genome) -> f64 {
                Sphere.evaluate(g)
            }
            fn should_terminate(&self, generation: usize, _best: f64) -> bool {
                generation == 4
            }
        }

        let result = GaRunner::run(&Target, &sphere_config()).unwrap();
        assert_eq!(result.generations, 5);
        assert_eq!(result.termination_reason, TerminationReason::TargetReached);
        assert_eq!(result.termination_reason.to_string(), "target fitness reached");
    }

    #[test]
    fn test_time_limit_runs_at_least_one_generation() {
        struct Slow;
        impl GaProblem for Slow {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                Sphere.create_individual(rng)
            }
            fn evaluate(&self, g: &Genome) -> f64 {
                std::thread::sleep(Duration::from_millis(1));
                Sphere.evaluate(g)
            }
        }

        let config = sphere_config()
            .with_population_size(5)
            .with_max_generations(10_000)
            .with_time_limit_ms(1);
        let result = GaRunner::run(&Slow, &config).unwrap();
        assert!(result.generations >= 1);
        assert!(result.generations < 10_000);
        assert_eq!(result.termination_reason, TerminationReason::TimeLimit);
    }

    // ---- Observer ordering ----

    #[derive(Default)]
    struct Recorder {
        generations: Vec<usize>,
        new_bests: Vec<(usize, f64)>,
        progress: Vec<ProgressEvent>,
        terminated: usize,
    }

    impl GaObserver for Recorder {
        fn on_generation(&mut self, report: &GenerationReport<'_>) {
            assert_eq!(report.population.len(), report.fitnesses.len());
            assert!(report.best_ever_fitness >= report.best_fitness);
            self.generations.push(report.generation);
        }
        fn on_new_best(&mut self, _genome: &Genome, fitness: f64, generation: usize) {
            self.new_bests.push((generation, fitness));
        }
        fn on_progress(&mut self, event: &ProgressEvent) {
            self.progress.push(event.clone());
        }
        fn on_termination(&mut self, result: &GaResult) {
            assert!(result.generations > 0);
            self.terminated += 1;
        }
    }

    #[test]
    fn test_callbacks_fire_in_order() {
        let config = sphere_config().with_max_generations(25);
        let mut rec = Recorder::default();
        let result = GaRunner::run_with_observer(&Sphere, &config, &mut rec).unwrap();

        assert_eq!(rec.generations, (0..25).collect::<Vec<_>>());
        assert_eq!(rec.terminated, 1);
        assert_eq!(rec.progress.len(), 26);
        assert!(rec.progress.last().unwrap().finished);
        assert!(rec.progress[..25].iter().all(|e| !e.finished));

        // One callback per strict improvement, strictly increasing.
        assert_eq!(rec.new_bests[0].0, 0);
        for w in rec.new_bests.windows(2) {
            assert!(w[1].1 > w[0].1);
            assert!(w[1].0 > w[0].0);
        }
        let strict_improvements = 1 + result.history.windows(2).filter(|w| w[1] > w[0]).count();
        assert_eq!(rec.new_bests.len(), strict_improvements);
        assert_eq!(rec.new_bests.last().unwrap().1, result.best_fitness);
    }

    // ---- Adaptive rates ----

    struct ConstantDiversity(f64);

    impl GaProblem for ConstantDiversity {
        fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
            Sphere.create_individual(rng)
        }
        fn evaluate(&self, g: &Genome) -> f64 {
            Sphere.evaluate(g)
        }
        fn diversity(&self, _population: &[Genome]) -> Option<f64> {
            Some(self.0)
        }
    }

    #[test]
    fn test_low_diversity_drives_mutation_to_max() {
        let config = sphere_config()
            .with_max_generations(10)
            .with_mutation_rate(0.1)
            .with_adaptive(
                AdaptiveParams::default()
                    .with_diversity_threshold(0.5)
                    .with_max_mutation_rate(0.9),
            );
        let result = GaRunner::run(&ConstantDiversity(0.2), &config).unwrap();
        assert!((result.final_mutation_rate - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_high_diversity_keeps_initial_mutation() {
        let config = sphere_config()
            .with_max_generations(10)
            .with_mutation_rate(0.1)
            .with_adaptive(AdaptiveParams::default().with_diversity_threshold(0.5));
        let result = GaRunner::run(&ConstantDiversity(3.0), &config).unwrap();
        assert!((result.final_mutation_rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_missing_diversity_counts_as_zero() {
        struct NoDiversity;
        impl GaProblem for NoDiversity {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                Sphere.create_individual(rng)
            }
            fn evaluate(&self, g: &Genome) -> f64 {
                Sphere.evaluate(g)
            }
        }
        let result = GaRunner::run(&NoDiversity, &sphere_config().with_max_generations(3)).unwrap();
        assert_eq!(result.diversity_history, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flat_fitness_lowers_crossover() {
        struct Flat;
        impl GaProblem for Flat {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                Sphere.create_individual(rng)
            }
            fn evaluate(&self, _g: &Genome) -> f64 {
                1.0
            }
        }
        let config = sphere_config()
            .with_max_generations(30)
            .with_crossover_rate(0.9)
            .with_adaptive(AdaptiveParams::default().with_min_crossover_rate(0.2));
        let result = GaRunner::run(&Flat, &config).unwrap();
        assert!((result.final_crossover_rate - 0.2).abs() < 1e-9);
    }

    // ---- Operator resolution ----

    /// Array genomes with custom operators that tag their output.
    struct Tagged;

    impl GaProblem for Tagged {
        fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
            Genome::Array(vec![rng.random_range(0.0..1.0); 3])
        }
        fn evaluate(&self, g: &Genome) -> f64 {
            g.as_slice().map_or(f64::NAN, |v| v.iter().sum())
        }
        fn crossover<R: Rng>(&self, _p1: &Genome, _p2: &Genome, _rng: &mut R) -> (Genome, Genome) {
            (Genome::Array(vec![100.0; 3]), Genome::Array(vec![100.0; 3]))
        }
        fn mutate<R: Rng>(&self, _g: &Genome, _rng: &mut R) -> Genome {
            Genome::Array(vec![-100.0; 3])
        }
    }

    fn tagged_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(10)
            .with_max_generations(2)
            .with_elitism_rate(0.0)
            .with_crossover_rate(1.0)
            .with_mutation_rate(0.0)
            .with_seed(3)
    }

    #[test]
    fn test_custom_operators_used_without_builtin() {
        let result = GaRunner::run(&Tagged, &tagged_config()).unwrap();
        assert!(result
            .final_population
            .iter()
            .all(|g| g.as_slice() == Some(&[100.0, 100.0, 100.0][..])));
    }

    #[test]
    fn test_builtin_overrides_custom_when_shape_matches() {
        let config = tagged_config().with_crossover(CrossoverStrategy::SinglePoint);
        let result = GaRunner::run(&Tagged, &config).unwrap();
        assert!(result
            .final_population
            .iter()
            .all(|g| g.as_slice().unwrap().iter().all(|&v| v < 1.0)));
    }

    #[test]
    fn test_custom_kept_when_builtin_needs_other_shape() {
        let config = tagged_config()
            .with_crossover(CrossoverStrategy::Arithmetic { alpha: 0.5 })
            .with_mutation_rate(1.0)
            .with_mutation(MutationStrategy::Adaptive(AdaptiveMutation::default()));
        let result = GaRunner::run(&Tagged, &config).unwrap();
        assert!(result
            .final_population
            .iter()
            .all(|g| g.as_slice() == Some(&[-100.0, -100.0, -100.0][..])));
    }

    #[test]
    fn test_shape_mismatch_propagates() {
        struct Ragged;
        impl GaProblem for Ragged {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                let n = rng.random_range(1..4);
                Genome::Array(vec![0.0; n])
            }
            fn evaluate(&self, _g: &Genome) -> f64 {
                0.0
            }
        }
        let config = tagged_config()
            .with_population_size(30)
            .with_crossover(CrossoverStrategy::TwoPoint);
        let err = GaRunner::run(&Ragged, &config).unwrap_err();
        assert!(matches!(err, crate::OptimError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_config_fails_before_evaluation() {
        struct Panicky;
        impl GaProblem for Panicky {
            fn create_individual<R: Rng>(&self, _rng: &mut R) -> Genome {
                panic!("must not be called");
            }
            fn evaluate(&self, _g: &Genome) -> f64 {
                panic!("must not be called");
            }
        }
        let config = GaConfig::default().with_population_size(0);
        assert!(GaRunner::run(&Panicky, &config).is_err());
    }

    // ---- Elitism ----

    #[test]
    fn test_elites_survive_unchanged() {
        struct Indexed;
        impl GaProblem for Indexed {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                Genome::Array(vec![rng.random_range(0.0..10.0)])
            }
            fn evaluate(&self, g: &Genome) -> f64 {
                g.as_slice().map_or(f64::NAN, |v| v[0])
            }
            fn mutate<R: Rng>(&self, _g: &Genome, _rng: &mut R) -> Genome {
                Genome::Array(vec![-1.0])
            }
        }
        let config = GaConfig::default()
            .with_population_size(10)
            .with_max_generations(2)
            .with_elitism_rate(0.3)
            .with_mutation_rate(1.0)
            .with_seed(11);
        let mut first = Vec::new();
        struct Capture<'a>(&'a mut Vec<f64>);
        impl GaObserver for Capture<'_> {
            fn on_generation(&mut self, report: &GenerationReport<'_>) {
                if report.generation == 0 {
                    self.0.extend_from_slice(report.fitnesses);
                }
            }
        }
        let result = GaRunner::run_with_observer(&Indexed, &config, &mut Capture(&mut first)).unwrap();

        first.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let survivors: Vec<f64> = result.final_population[..3]
            .iter()
            .map(|g| g.as_slice().unwrap()[0])
            .collect();
        assert_eq!(survivors, first[..3].to_vec());
        assert!(result.final_population[3..]
            .iter()
            .all(|g| g.as_slice() == Some(&[-1.0][..])));
    }

    #[test]
    fn test_odd_population_trims_overshoot() {
        let config = tagged_config().with_population_size(7);
        let result = GaRunner::run(&Tagged, &config).unwrap();
        assert_eq!(result.final_population.len(), 7);
    }

    #[test]
    fn test_overshoot_trim_spares_elites() {
        struct Marked;
        impl GaProblem for Marked {
            fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
                Genome::Array(vec![rng.random_range(0.0..10.0)])
            }
            fn evaluate(&self, g: &Genome) -> f64 {
                g.as_slice().map_or(f64::NAN, |v| v[0])
            }
            fn mutate<R: Rng>(&self, _g: &Genome, _rng: &mut R) -> Genome {
                Genome::Array(vec![-1.0])
            }
        }
        struct FirstGeneration(Vec<f64>);
        impl GaObserver for FirstGeneration {
            fn on_generation(&mut self, report: &GenerationReport<'_>) {
                if report.generation == 0 {
                    self.0.extend_from_slice(report.fitnesses);
                }
            }
        }

        // 7 * 0.3 gives 2 elites; 5 slots are filled in pairs, so 6
        // offspring are bred and one must be dropped.
        for seed in 0..20 {
            let config = GaConfig::default()
                .with_population_size(7)
                .with_max_generations(2)
                .with_elitism_rate(0.3)
                .with_mutation_rate(1.0)
                .with_seed(seed);
            assert_eq!(config.elite_count(), 2);
            let mut first = FirstGeneration(Vec::new());
            let result = GaRunner::run_with_observer(&Marked, &config, &mut first).unwrap();

            first.0.sort_by(|a, b| b.partial_cmp(a).unwrap());
            let population: Vec<f64> = result
                .final_population
                .iter()
                .map(|g| g.as_slice().unwrap()[0])
                .collect();
            assert_eq!(population.len(), 7, "seed {seed}");
            assert_eq!(population[..2], first.0[..2], "seed {seed}");
            assert!(population[2..].iter().all(|&v| v == -1.0), "seed {seed}");
        }
    }

    #[test]
    fn test_helpers() {
        assert_eq!(best_index(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(best_index(&[f64::NEG_INFINITY, -1.0]), 1);
        assert_eq!(finite_mean(&[1.0, f64::NEG_INFINITY, 3.0]), 2.0);
        assert_eq!(finite_bounds(&[f64::NEG_INFINITY, 2.0, -1.0]), (-1.0, 2.0));
        assert_eq!(finite_bounds(&[f64::NEG_INFINITY]), (0.0, 0.0));
        assert_eq!(sanitize(f64::NAN), f64::NEG_INFINITY);
    }

    // ---- Property: elitism keeps best-ever history non-decreasing ----

    struct Wavy {
        freq: f64,
    }

    impl GaProblem for Wavy {
        fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
            let mut m = BTreeMap::new();
            m.insert("x".to_string(), rng.random_range(-3.0..3.0));
            Genome::Map(m)
        }
        fn evaluate(&self, g: &Genome) -> f64 {
            let x = g.get("x").unwrap_or(0.0);
            (self.freq * x).sin() - 0.1 * x * x
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn prop_history_non_decreasing(seed in any::<u64>(), freq in 0.5f64..5.0) {
            let config = GaConfig::default()
                .with_population_size(12)
                .with_max_generations(15)
                .with_mutation(MutationStrategy::Gaussian { sigma: 0.5, rate: 1.0 })
                .with_mutation_rate(0.7)
                .with_seed(seed);
            let result = GaRunner::run(&Wavy { freq }, &config).unwrap();
            for w in result.history.windows(2) {
                prop_assert!(w[1] >= w[0]);
            }
            prop_assert_eq!(*result.history.last().unwrap(), result.best_fitness);
        }
    }
}
