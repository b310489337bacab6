//! Lazy grid enumeration.

use super::config::Config;
use super::model::Leaf;
use crate::error::{OptimError, Result};
use std::iter::FusedIterator;

/// Iterator over every grid point of a parameter space.
///
/// Works like an odometer over one index per leaf range: the first
/// declared range turns fastest, and each wheel steps from `min` to `max`
/// inclusive. Memory use is constant in the number of combinations. The
/// iterator is single-pass; build a new one to enumerate again.
///
/// # Examples
///
/// ```
/// use u_tuner::space::{Config, ParameterSpace, Range};
///
/// let space = ParameterSpace::new()
///     .with_range("x", Range::new(0.0, 1.0, 1.0))
///     .with_range("y", Range::new(0.0, 1.0, 1.0));
///
/// let points: Vec<(f64, f64)> = space
///     .combinations(&Config::new())
///     .unwrap()
///     .map(|c| (c.get("x").unwrap(), c.get("y").unwrap()))
///     .collect();
/// assert_eq!(points, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct Combinations {
    leaves: Vec<Leaf>,
    counts: Vec<u64>,
    indices: Vec<u64>,
    base: Config,
    total: u64,
    emitted: u64,
}

impl Combinations {
    pub(crate) fn new(leaves: Vec<Leaf>, base: Config) -> Result<Self> {
        let mut counts = Vec::with_capacity(leaves.len());
        let mut total: u64 = 1;
        for leaf in &leaves {
            let steps = leaf
                .range
                .checked_steps()
                .map_err(|reason| OptimError::InvalidRange {
                    path: leaf.path.clone(),
                    reason,
                })?;
            total = total
                .checked_mul(steps)
                .ok_or_else(|| OptimError::SearchSpaceOverflow {
                    path: leaf.path.clone(),
                })?;
            counts.push(steps);
        }
        if leaves.is_empty() {
            total = 0;
        }

        Ok(Self {
            indices: vec![0; leaves.len()],
            leaves,
            counts,
            base,
            total,
            emitted: 0,
        })
    }

    /// Total number of combinations, including those already yielded.
    pub fn total(&self) -> u64 {
        self.total
    }

    fn advance(&mut self) {
        for (index, &count) in self.indices.iter_mut().zip(&self.counts) {
            *index += 1;
            if *index < count {
                return;
            }
            *index = 0;
        }
    }
}

impl Iterator for Combinations {
    type Item = Config;

    fn next(&mut self) -> Option<Config> {
        if self.emitted >= self.total {
            return None;
        }

        let mut config = self.base.clone();
        for (leaf, &index) in self.leaves.iter().zip(&self.indices) {
            config.set_segments(&leaf.segments, leaf.range.value_at(index));
        }

        self.emitted += 1;
        self.advance();
        Some(config)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.emitted;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Combinations {}
