//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop;
//! [`AdaptiveParams`] turns on run-time adjustment of the mutation and
//! crossover rates.

use crate::error::{OptimError, Result};
use crate::strategy::{CrossoverStrategy, MutationStrategy, Selection};

/// Adaptive rate control.
///
/// After every generation:
///
/// - if the population's diversity is below `diversity_threshold`, the
///   mutation rate is pushed up towards `max_mutation_rate`; otherwise it
///   relaxes halfway back to its initial value.
/// - if the best-ever fitness moved by no more than `stagnation_epsilon`
///   over the last `stagnation_window` generations, the crossover rate is
///   lowered towards `min_crossover_rate`; otherwise it relaxes halfway
///   back to its initial value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveParams {
    pub diversity_threshold: f64,
    pub max_mutation_rate: f64,
    pub min_crossover_rate: f64,
    pub stagnation_window: usize,
    pub stagnation_epsilon: f64,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            diversity_threshold: 0.1,
            max_mutation_rate: 0.5,
            min_crossover_rate: 0.5,
            stagnation_window: 5,
            stagnation_epsilon: 1e-6,
        }
    }
}

impl AdaptiveParams {
    /// Sets the diversity below which the mutation rate rises.
    pub fn with_diversity_threshold(mut self, threshold: f64) -> Self {
        self.diversity_threshold = threshold;
        self
    }

    /// Sets the ceiling for the adapted mutation rate.
    pub fn with_max_mutation_rate(mut self, rate: f64) -> Self {
        self.max_mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the floor for the adapted crossover rate.
    pub fn with_min_crossover_rate(mut self, rate: f64) -> Self {
        self.min_crossover_rate = rate.clamp(0.0, 1.0);
        self
    }
}

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_tuner::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tuner::ga::{AdaptiveParams, GaConfig};
/// use u_tuner::strategy::{CrossoverStrategy, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(60)
///     .with_selection(Selection::Rank)
///     .with_crossover(CrossoverStrategy::Arithmetic { alpha: 0.3 })
///     .with_elitism_rate(0.1)
///     .with_adaptive(AdaptiveParams::default())
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in every generation.
    pub population_size: usize,

    /// Maximum number of generations to run.
    pub max_generations: usize,

    /// Probability that an offspring is mutated (initial value when
    /// adaptive control is on).
    pub mutation_rate: f64,

    /// Probability that a parent pair is recombined rather than cloned
    /// (initial value when adaptive control is on).
    pub crossover_rate: f64,

    /// Fraction of the population copied unchanged into the next
    /// generation. The elite count is `floor(population_size * elitism_rate)`.
    pub elitism_rate: f64,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Built-in crossover. Used instead of [`GaProblem::crossover`] when the
    /// genomes have the layout it needs.
    ///
    /// [`GaProblem::crossover`]: super::GaProblem::crossover
    pub crossover: Option<CrossoverStrategy>,

    /// Built-in mutation. Used instead of [`GaProblem::mutate`] when the
    /// genomes have the layout it needs.
    ///
    /// [`GaProblem::mutate`]: super::GaProblem::mutate
    pub mutation: Option<MutationStrategy>,

    /// Adaptive rate control; `None` keeps the rates fixed.
    pub adaptive: Option<AdaptiveParams>,

    /// Optional wall-clock limit in milliseconds, checked at the start of
    /// every generation after the first.
    pub time_limit_ms: Option<u64>,

    /// Evaluate each generation on the rayon pool. Only takes effect with
    /// the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            mutation_rate: 0.1,
            crossover_rate: 0.9,
            elitism_rate: 0.1,
            selection: Selection::default(),
            crossover: None,
            mutation: None,
            adaptive: None,
            time_limit_ms: None,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the mutation rate (clamped to [0, 1]).
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate (clamped to [0, 1]).
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elitism rate (clamped to [0, 1]).
    pub fn with_elitism_rate(mut self, rate: f64) -> Self {
        self.elitism_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the built-in crossover strategy.
    pub fn with_crossover(mut self, strategy: CrossoverStrategy) -> Self {
        self.crossover = Some(strategy);
        self
    }

    /// Sets the built-in mutation strategy.
    pub fn with_mutation(mut self, strategy: MutationStrategy) -> Self {
        self.mutation = Some(strategy);
        self
    }

    /// Enables adaptive rate control.
    pub fn with_adaptive(mut self, params: AdaptiveParams) -> Self {
        self.adaptive = Some(params);
        self
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Enables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites carried over each generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elitism_rate).floor() as usize
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(invalid("population_size must be at least 1"));
        }
        if self.max_generations == 0 {
            return Err(invalid("max_generations must be at least 1"));
        }
        unit("mutation_rate", self.mutation_rate)?;
        unit("crossover_rate", self.crossover_rate)?;
        unit("elitism_rate", self.elitism_rate)?;
        if let Selection::Tournament(0) = self.selection {
            return Err(invalid("tournament size must be at least 1"));
        }
        if self.time_limit_ms == Some(0) {
            return Err(invalid("time_limit_ms must be positive or None"));
        }

        match self.crossover {
            Some(CrossoverStrategy::Uniform { mix_rate }) => unit("uniform mix_rate", mix_rate)?,
            Some(CrossoverStrategy::Arithmetic { alpha }) => unit("arithmetic alpha", alpha)?,
            _ => {}
        }

        match &self.mutation {
            Some(MutationStrategy::Gaussian { sigma, rate }) => {
                unit("gaussian rate", *rate)?;
                if !(sigma.is_finite() && *sigma >= 0.0) {
                    return Err(invalid(format!("gaussian sigma must be >= 0, got {sigma}")));
                }
            }
            Some(MutationStrategy::Uniform { bounds, rate }) => {
                unit("uniform rate", *rate)?;
                if let Some((key, b)) = bounds.iter().find(|(_, b)| !(b.min <= b.max)) {
                    return Err(invalid(format!(
                        "uniform bounds for `{key}` are inverted ({} > {})",
                        b.min, b.max
                    )));
                }
            }
            Some(MutationStrategy::Adaptive(p)) => {
                unit("min_mutation_rate", p.min_mutation_rate)?;
                unit("max_mutation_rate", p.max_mutation_rate)?;
                if p.min_mutation_rate > p.max_mutation_rate
                    || !(p.min_mutation_range >= 0.0 && p.min_mutation_range <= p.max_mutation_range)
                {
                    return Err(invalid(
                        "adaptive mutation needs 0 <= min <= max for both rate and range",
                    ));
                }
            }
            None => {}
        }

        if let Some(a) = &self.adaptive {
            unit("max_mutation_rate", a.max_mutation_rate)?;
            unit("min_crossover_rate", a.min_crossover_rate)?;
            if !a.diversity_threshold.is_finite() {
                return Err(invalid("diversity_threshold must be finite"));
            }
            if a.max_mutation_rate < self.mutation_rate {
                return Err(invalid(format!(
                    "max_mutation_rate ({}) is below mutation_rate ({})",
                    a.max_mutation_rate, self.mutation_rate
                )));
            }
            if a.min_crossover_rate > self.crossover_rate {
                return Err(invalid(format!(
                    "min_crossover_rate ({}) is above crossover_rate ({})",
                    a.min_crossover_rate, self.crossover_rate
                )));
            }
            if a.stagnation_window < 2 {
                return Err(invalid("stagnation_window must be at least 2"));
            }
            if !(a.stagnation_epsilon >= 0.0) {
                return Err(invalid("stagnation_epsilon must be non-negative"));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> OptimError {
    OptimError::InvalidConfig(msg.into())
}

fn unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}
