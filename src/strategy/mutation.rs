//! Mutation operators for map genomes.
//!
//! - [`gaussian`]: additive normal noise per key
//! - [`uniform`]: resample a key inside its bounds
//! - [`adaptive`]: rate and magnitude scaled by relative fitness, so weak
//!   individuals are perturbed harder than strong ones
//!
//! All operators return a new map; the input is never modified.

use crate::error::{OptimError, Result};
use crate::genome::{Genome, GenomeShape};
use crate::random::standard_normal;
use rand::Rng;
use std::collections::BTreeMap;

/// Closed interval used by [`uniform`] mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Interpolation limits for [`adaptive`] mutation.
///
/// The least fit individual of a population mutates each key with
/// probability `max_mutation_rate` by up to `±max_mutation_range`; the
/// fittest uses the `min_*` values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveMutation {
    pub min_mutation_rate: f64,
    pub max_mutation_rate: f64,
    pub min_mutation_range: f64,
    pub max_mutation_range: f64,
}

impl Default for AdaptiveMutation {
    fn default() -> Self {
        Self {
            min_mutation_rate: 0.05,
            max_mutation_rate: 0.5,
            min_mutation_range: 0.01,
            max_mutation_range: 0.5,
        }
    }
}

impl AdaptiveMutation {
    /// `(rate, range)` for an individual at `percentile` (0 = worst, 1 = best).
    pub fn interpolate(&self, percentile: f64) -> (f64, f64) {
        let p = percentile.clamp(0.0, 1.0);
        let rate = self.max_mutation_rate - p * (self.max_mutation_rate - self.min_mutation_rate);
        let range =
            self.max_mutation_range - p * (self.max_mutation_range - self.min_mutation_range);
        (rate, range)
    }
}

/// Where an individual sits within its population's fitness spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationContext {
    pub fitness: f64,
    pub max_fitness: f64,
    pub min_fitness: f64,
}

impl MutationContext {
    /// Relative fitness in `[0, 1]`.
    ///
    /// A flat (or non-finite) spread maps to `0.5`; a non-finite fitness
    /// counts as the worst.
    pub fn percentile(&self) -> f64 {
        if !self.fitness.is_finite() {
            return 0.0;
        }
        let spread = self.max_fitness - self.min_fitness;
        if !(spread > 0.0 && spread.is_finite()) {
            return 0.5;
        }
        ((self.fitness - self.min_fitness) / spread).clamp(0.0, 1.0)
    }
}

/// Named mutation operator. All variants require map genomes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationStrategy {
    Gaussian { sigma: f64, rate: f64 },
    Uniform { bounds: BTreeMap<String, Bounds>, rate: f64 },
    Adaptive(AdaptiveMutation),
}

impl MutationStrategy {
    pub fn required_shape(&self) -> GenomeShape {
        GenomeShape::Map
    }

    /// Produces a mutated copy of `genome`.
    ///
    /// `context` is only consulted by [`MutationStrategy::Adaptive`].
    pub fn apply<R: Rng>(
        &self,
        genome: &Genome,
        context: &MutationContext,
        rng: &mut R,
    ) -> Result<Genome> {
        let map = genome.as_map().ok_or_else(|| OptimError::ShapeMismatch {
            expected: GenomeShape::Map.to_string(),
            found: genome.describe(),
        })?;

        let mutated = match self {
            MutationStrategy::Gaussian { sigma, rate } => gaussian(map, *sigma, *rate, rng),
            MutationStrategy::Uniform { bounds, rate } => uniform(map, bounds, *rate, rng),
            MutationStrategy::Adaptive(params) => adaptive(map, context, params, rng),
        };
        Ok(Genome::Map(mutated))
    }
}

/// Adds `sigma * N(0, 1)` to each key independently with probability `rate`.
pub fn gaussian<R: Rng>(
    genome: &BTreeMap<String, f64>,
    sigma: f64,
    rate: f64,
    rng: &mut R,
) -> BTreeMap<String, f64> {
    genome
        .iter()
        .map(|(key, &value)| {
            let value = if rng.random::<f64>() < rate {
                value + sigma * standard_normal(rng)
            } else {
                value
            };
            (key.clone(), value)
        })
        .collect()
}

/// Replaces each key, with probability `rate`, by a uniform draw inside
/// its bounds. Keys without bounds are left alone.
pub fn uniform<R: Rng>(
    genome: &BTreeMap<String, f64>,
    bounds: &BTreeMap<String, Bounds>,
    rate: f64,
    rng: &mut R,
) -> BTreeMap<String, f64> {
    genome
        .iter()
        .map(|(key, &value)| {
            let value = match bounds.get(key) {
                Some(b) if rng.random::<f64>() < rate => {
                    b.min + (b.max - b.min) * rng.random::<f64>()
                }
                _ => value,
            };
            (key.clone(), value)
        })
        .collect()
}

/// Fitness-scaled mutation.
///
/// The individual's percentile within `context` picks a rate and a range
/// from `params`; each key is then shifted, with that rate, by a uniform
/// amount in `[-range, range]`.
pub fn adaptive<R: Rng>(
    genome: &BTreeMap<String, f64>,
    context: &MutationContext,
    params: &AdaptiveMutation,
    rng: &mut R,
) -> BTreeMap<String, f64> {
    let (rate, range) = params.interpolate(context.percentile());
    genome
        .iter()
        .map(|(key, &value)| {
            let value = if rng.random::<f64>() < rate {
                value + range * (2.0 * rng.random::<f64>() - 1.0)
            } else {
                value
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn base() -> BTreeMap<String, f64> {
        (0..20).map(|i| (format!("k{i:02}"), 1.0)).collect()
    }

    fn changed(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> usize {
        a.values().zip(b.values()).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn test_gaussian_rate_zero_is_identity() {
        let mut rng = create_rng(3);
        let g = base();
        assert_eq!(gaussian(&g, 1.0, 0.0, &mut rng), g);
    }

    #[test]
    fn test_gaussian_rate_one_changes_every_key() {
        let mut rng = create_rng(3);
        let g = base();
        let m = gaussian(&g, 0.5, 1.0, &mut rng);
        assert_eq!(changed(&g, &m), g.len());
        assert!(m.keys().eq(g.keys()));
    }

    #[test]
    fn test_uniform_stays_in_bounds() {
        let mut rng = create_rng(9);
        let g = base();
        let bounds: BTreeMap<String, Bounds> =
            g.keys().map(|k| (k.clone(), Bounds::new(-2.0, -1.0))).collect();
        for _ in 0..50 {
            let m = uniform(&g, &bounds, 1.0, &mut rng);
            assert!(m.values().all(|&v| (-2.0..=-1.0).contains(&v)), "{m:?}");
        }
    }

    #[test]
    fn test_uniform_ignores_unbounded_keys() {
        let mut rng = create_rng(9);
        let g = base();
        let bounds: BTreeMap<String, Bounds> = [("k00".to_string(), Bounds::new(5.0, 6.0))].into();
        let m = uniform(&g, &bounds, 1.0, &mut rng);
        assert_eq!(changed(&g, &m), 1);
        assert!(m["k00"] >= 5.0);
    }

    #[test]
    fn test_percentile_edges() {
        let ctx = |f| MutationContext {
            fitness: f,
            max_fitness: 10.0,
            min_fitness: 0.0,
        };
        assert_eq!(ctx(0.0).percentile(), 0.0);
        assert_eq!(ctx(10.0).percentile(), 1.0);
        assert!((ctx(2.5).percentile() - 0.25).abs() < 1e-12);
        assert_eq!(ctx(f64::NEG_INFINITY).percentile(), 0.0);

        let flat = MutationContext {
            fitness: 3.0,
            max_fitness: 3.0,
            min_fitness: 3.0,
        };
        assert_eq!(flat.percentile(), 0.5);
    }

    #[test]
    fn test_adaptive_interpolation() {
        let params = AdaptiveMutation {
            min_mutation_rate: 0.1,
            max_mutation_rate: 0.9,
            min_mutation_range: 1.0,
            max_mutation_range: 3.0,
        };
        let (rate, range) = params.interpolate(0.0);
        assert!((rate - 0.9).abs() < 1e-12 && (range - 3.0).abs() < 1e-12);
        let (rate, range) = params.interpolate(1.0);
        assert!((rate - 0.1).abs() < 1e-12 && (range - 1.0).abs() < 1e-12);
        let (rate, _) = params.interpolate(0.5);
        assert!((rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_adaptive_weak_individuals_mutate_more() {
        let params = AdaptiveMutation {
            min_mutation_rate: 0.0,
            max_mutation_rate: 1.0,
            min_mutation_range: 0.0,
            max_mutation_range: 1.0,
        };
        let g = base();
        let mut rng = create_rng(11);

        let best = MutationContext {
            fitness: 10.0,
            max_fitness: 10.0,
            min_fitness: 0.0,
        };
        assert_eq!(adaptive(&g, &best, &params, &mut rng), g);

        let worst = MutationContext {
            fitness: 0.0,
            ..best
        };
        let m = adaptive(&g, &worst, &params, &mut rng);
        assert_eq!(changed(&g, &m), g.len());
        assert!(m.values().all(|&v| (0.0..=2.0).contains(&v)));
    }

    #[test]
    fn test_strategy_requires_map_genome() {
        let mut rng = create_rng(1);
        let ctx = MutationContext {
            fitness: 0.0,
            max_fitness: 0.0,
            min_fitness: 0.0,
        };
        let arr = Genome::from(vec![1.0]);
        let err = MutationStrategy::Gaussian {
            sigma: 1.0,
            rate: 1.0,
        }
        .apply(&arr, &ctx, &mut rng)
        .unwrap_err();
        assert!(matches!(err, OptimError::ShapeMismatch { .. }));
    }
}
