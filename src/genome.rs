//! Candidate representation.
//!
//! A [`Genome`] is one point in the search space: either a fixed-length
//! vector of reals or a mapping from parameter name to real. Engines never
//! edit a genome in place; operators return new genomes.

use crate::error::{OptimError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// The two genome layouts supported by the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenomeShape {
    /// Ordered sequence of reals.
    Array,
    /// Mapping from string key to real.
    Map,
}

impl fmt::Display for GenomeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomeShape::Array => f.write_str("array genome"),
            GenomeShape::Map => f.write_str("map genome"),
        }
    }
}

/// A candidate solution.
///
/// # Examples
///
/// ```
/// use u_tuner::genome::{Genome, GenomeShape};
///
/// let g = Genome::map([("x", 1.0), ("y", -2.0)]);
/// assert_eq!(g.shape(), GenomeShape::Map);
/// assert_eq!(g.get("y"), Some(-2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Genome {
    Array(Vec<f64>),
    Map(BTreeMap<String, f64>),
}

impl Genome {
    /// Builds a map genome from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Genome::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn shape(&self) -> GenomeShape {
        match self {
            Genome::Array(_) => GenomeShape::Array,
            Genome::Map(_) => GenomeShape::Map,
        }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        match self {
            Genome::Array(v) => v.len(),
            Genome::Map(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            Genome::Array(v) => Some(v),
            Genome::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Genome::Array(_) => None,
            Genome::Map(m) => Some(m),
        }
    }

    /// Value of a map gene. Always `None` for array genomes.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.as_map().and_then(|m| m.get(key).copied())
    }

    /// Short human-readable layout description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Genome::Array(v) => format!("array genome of length {}", v.len()),
            Genome::Map(m) => {
                let keys: Vec<&str> = m.keys().map(String::as_str).collect();
                format!("map genome with keys [{}]", keys.join(", "))
            }
        }
    }

    /// Fails unless `self` and `other` have the same layout, length and keys.
    pub fn ensure_same_shape(&self, other: &Genome) -> Result<()> {
        let same = match (self, other) {
            (Genome::Array(a), Genome::Array(b)) => a.len() == b.len(),
            (Genome::Map(a), Genome::Map(b)) => a.len() == b.len() && a.keys().eq(b.keys()),
            _ => false,
        };
        if same {
            Ok(())
        } else {
            Err(OptimError::ShapeMismatch {
                expected: self.describe(),
                found: other.describe(),
            })
        }
    }

    /// Numeric view of the genes in a stable order (keys sorted for maps).
    fn values(&self) -> Vec<f64> {
        match self {
            Genome::Array(v) => v.clone(),
            Genome::Map(m) => m.values().copied().collect(),
        }
    }
}

impl From<Vec<f64>> for Genome {
    fn from(v: Vec<f64>) -> Self {
        Genome::Array(v)
    }
}

impl From<BTreeMap<String, f64>> for Genome {
    fn from(m: BTreeMap<String, f64>) -> Self {
        Genome::Map(m)
    }
}

/// Mean Euclidean distance over all unordered pairs of the population.
///
/// A ready-made diversity measure for
/// [`GaProblem::diversity`](crate::ga::GaProblem::diversity). Returns `0.0`
/// for populations with fewer than two members. Genomes of mismatched
/// shape are compared over their common prefix.
pub fn mean_pairwise_distance(population: &[Genome]) -> f64 {
    let n = population.len();
    if n < 2 {
        return 0.0;
    }
    let vectors: Vec<Vec<f64>> = population.iter().map(Genome::values).collect();
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let d2: f64 = vectors[i]
                .iter()
                .zip(&vectors[j])
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            total += d2.sqrt();
            pairs += 1;
        }
    }
    total / pairs as f64
}
