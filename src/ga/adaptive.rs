//! Run-time mutation and crossover rate control.

use super::config::{AdaptiveParams, GaConfig};

/// Multiplier applied to the mutation rate while diversity is low.
const MUTATION_GROWTH: f64 = 2.0;

/// Rate the growth starts from when the current rate is (near) zero.
const MUTATION_FLOOR: f64 = 0.01;

/// Multiplier applied to the crossover rate while the search stagnates.
const CROSSOVER_DECAY: f64 = 0.8;

/// Current operator rates of one run.
///
/// Without [`AdaptiveParams`] the rates never move.
#[derive(Debug, Clone)]
pub(crate) struct RateController {
    initial_mutation: f64,
    initial_crossover: f64,
    mutation: f64,
    crossover: f64,
    params: Option<AdaptiveParams>,
}

impl RateController {
    pub(crate) fn new(config: &GaConfig) -> Self {
        Self {
            initial_mutation: config.mutation_rate,
            initial_crossover: config.crossover_rate,
            mutation: config.mutation_rate,
            crossover: config.crossover_rate,
            params: config.adaptive,
        }
    }

    pub(crate) fn mutation_rate(&self) -> f64 {
        self.mutation
    }

    pub(crate) fn crossover_rate(&self) -> f64 {
        self.crossover
    }

    /// Adjusts both rates from this generation's diversity and the
    /// best-ever fitness history (one entry per generation so far).
    pub(crate) fn update(&mut self, diversity: f64, history: &[f64]) {
        let Some(params) = self.params else {
            return;
        };

        self.mutation = if diversity < params.diversity_threshold {
            (self.mutation.max(MUTATION_FLOOR) * MUTATION_GROWTH).min(params.max_mutation_rate)
        } else {
            (self.mutation + self.initial_mutation) / 2.0
        };

        self.crossover = if is_stagnant(history, params.stagnation_window, params.stagnation_epsilon)
        {
            (self.crossover * CROSSOVER_DECAY).max(params.min_crossover_rate)
        } else {
            (self.crossover + self.initial_crossover) / 2.0
        };
    }
}

/// `true` once the last `window` history entries span no more than `epsilon`.
fn is_stagnant(history: &[f64], window: usize, epsilon: f64) -> bool {
    if window == 0 || history.len() < window {
        return false;
    }
    let recent = &history[history.len() - window..];
    let hi = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = recent.iter().copied().fold(f64::INFINITY, f64::min);
    (hi - lo).abs() <= epsilon || hi == lo
}
