//! Parent selection.
//!
//! Selection picks an index into the current population given the
//! per-individual fitness values. All strategies **maximize** fitness.

use rand::Rng;
use std::cmp::Ordering;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_tuner::random::create_rng;
/// use u_tuner::strategy::Selection;
///
/// let fitnesses = [1.0, 9.0, 3.0];
/// let mut rng = create_rng(42);
/// let idx = Selection::Tournament(3).select(&fitnesses, &mut rng);
/// assert!(idx < fitnesses.len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Pick `k` random individuals (with replacement) and keep the fittest.
    ///
    /// Ties go to the first one drawn.
    Tournament(usize),

    /// Fitness-proportionate selection.
    ///
    /// A uniform draw in `[0, total)` is walked down by subtracting each
    /// fitness in turn. When the total fitness is not positive, the last
    /// individual is returned.
    Roulette,

    /// Linear rank selection: the fittest of `n` gets weight `n`, the least
    /// fit gets weight `1`. Insensitive to the scale of the fitness values.
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Select a parent index.
    ///
    /// # Panics
    /// Panics if `fitnesses` is empty.
    pub fn select<R: Rng>(&self, fitnesses: &[f64], rng: &mut R) -> usize {
        assert!(!fitnesses.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament(k) => tournament(fitnesses, *k, rng),
            Selection::Roulette => roulette(fitnesses, rng),
            Selection::Rank => rank(fitnesses, rng),
        }
    }
}

/// Tournament selection over `k` random draws.
pub fn tournament<R: Rng>(fitnesses: &[f64], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = fitnesses.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitnesses[idx] > fitnesses[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette-wheel selection by cumulative subtraction.
///
/// Non-positive (or non-finite) total fitness degenerates to the last
/// index, as does floating-point leftover at the end of the scan.
pub fn roulette<R: Rng>(fitnesses: &[f64], rng: &mut R) -> usize {
    let n = fitnesses.len();
    let total: f64 = fitnesses.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return n - 1;
    }

    let mut remaining = rng.random_range(0.0..total);
    for (i, &f) in fitnesses.iter().enumerate() {
        remaining -= f;
        if remaining <= 0.0 {
            return i;
        }
    }

    n - 1
}

/// Rank selection: roulette over linear ranks `n..1`.
pub fn rank<R: Rng>(fitnesses: &[f64], rng: &mut R) -> usize {
    let n = fitnesses.len();
    if n == 1 {
        return 0;
    }

    // Best first; stable so equal fitness keeps population order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        fitnesses[b]
            .partial_cmp(&fitnesses[a])
            .unwrap_or(Ordering::Equal)
    });

    let total = (n * (n + 1)) as f64 / 2.0;
    let mut remaining = rng.random_range(0.0..total);
    for (position, &idx) in order.iter().enumerate() {
        remaining -= (n - position) as f64;
        if remaining < 0.0 {
            return idx;
        }
    }

    order[n - 1]
}
