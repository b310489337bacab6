//! Recombination operators.
//!
//! Positional operators ([`single_point`], [`two_point`], [`uniform`]) work
//! on array genomes; [`arithmetic`] blends map genomes key by key. Each
//! operator returns two children and fails with
//! [`OptimError::ShapeMismatch`] when the parents do not line up.

use crate::error::{OptimError, Result};
use crate::genome::{Genome, GenomeShape};
use rand::Rng;
use std::collections::BTreeMap;

/// Named crossover operator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossoverStrategy {
    /// Swap the tails after one random cut point.
    SinglePoint,
    /// Swap the segment between two random cut points.
    TwoPoint,
    /// Swap each position independently with probability `mix_rate`.
    Uniform { mix_rate: f64 },
    /// `alpha * p1 + (1 - alpha) * p2` and its complement, per key.
    Arithmetic { alpha: f64 },
}

impl CrossoverStrategy {
    /// Genome layout this operator accepts.
    pub fn required_shape(&self) -> GenomeShape {
        match self {
            CrossoverStrategy::SinglePoint
            | CrossoverStrategy::TwoPoint
            | CrossoverStrategy::Uniform { .. } => GenomeShape::Array,
            CrossoverStrategy::Arithmetic { .. } => GenomeShape::Map,
        }
    }

    /// Recombines two parents into two children.
    pub fn apply<R: Rng>(
        &self,
        parent1: &Genome,
        parent2: &Genome,
        rng: &mut R,
    ) -> Result<(Genome, Genome)> {
        match (self, parent1, parent2) {
            (CrossoverStrategy::SinglePoint, Genome::Array(a), Genome::Array(b)) => {
                single_point(a, b, rng).map(into_genomes)
            }
            (CrossoverStrategy::TwoPoint, Genome::Array(a), Genome::Array(b)) => {
                two_point(a, b, rng).map(into_genomes)
            }
            (CrossoverStrategy::Uniform { mix_rate }, Genome::Array(a), Genome::Array(b)) => {
                uniform(a, b, *mix_rate, rng).map(into_genomes)
            }
            (CrossoverStrategy::Arithmetic { alpha }, Genome::Map(a), Genome::Map(b)) => {
                arithmetic(a, b, *alpha).map(into_genomes)
            }
            (_, Genome::Array(_), Genome::Array(_)) | (_, Genome::Map(_), Genome::Map(_)) => {
                Err(OptimError::ShapeMismatch {
                    expected: self.required_shape().to_string(),
                    found: parent1.describe(),
                })
            }
            _ => Err(OptimError::ShapeMismatch {
                expected: parent1.describe(),
                found: parent2.describe(),
            }),
        }
    }
}

fn into_genomes<T: Into<Genome>>((a, b): (T, T)) -> (Genome, Genome) {
    (a.into(), b.into())
}

fn ensure_same_len(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(OptimError::ShapeMismatch {
            expected: format!("array genome of length {}", a.len()),
            found: format!("array genome of length {}", b.len()),
        })
    }
}

/// Single-point crossover.
///
/// A cut point `c` in `1..n` is drawn; children take `p1[..c] ++ p2[c..]`
/// and `p2[..c] ++ p1[c..]`. Parents shorter than two genes are cloned.
pub fn single_point<R: Rng>(
    parent1: &[f64],
    parent2: &[f64],
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<f64>)> {
    ensure_same_len(parent1, parent2)?;
    let n = parent1.len();
    let mut c1 = parent1.to_vec();
    let mut c2 = parent2.to_vec();
    if n < 2 {
        return Ok((c1, c2));
    }

    let cut = rng.random_range(1..n);
    c1[cut..].copy_from_slice(&parent2[cut..]);
    c2[cut..].copy_from_slice(&parent1[cut..]);
    Ok((c1, c2))
}

/// Two-point crossover: swaps the segment `[start, end)` between parents.
pub fn two_point<R: Rng>(
    parent1: &[f64],
    parent2: &[f64],
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<f64>)> {
    ensure_same_len(parent1, parent2)?;
    let n = parent1.len();
    let mut c1 = parent1.to_vec();
    let mut c2 = parent2.to_vec();
    if n < 2 {
        return Ok((c1, c2));
    }

    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    let (start, end) = if a <= b { (a, b + 1) } else { (b, a + 1) };
    c1[start..end].copy_from_slice(&parent2[start..end]);
    c2[start..end].copy_from_slice(&parent1[start..end]);
    Ok((c1, c2))
}

/// Uniform crossover: each position is swapped with probability `mix_rate`.
pub fn uniform<R: Rng>(
    parent1: &[f64],
    parent2: &[f64],
    mix_rate: f64,
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<f64>)> {
    ensure_same_len(parent1, parent2)?;
    let mut c1 = parent1.to_vec();
    let mut c2 = parent2.to_vec();
    for i in 0..c1.len() {
        if rng.random::<f64>() < mix_rate {
            std::mem::swap(&mut c1[i], &mut c2[i]);
        }
    }
    Ok((c1, c2))
}

/// Arithmetic (blend) crossover for map genomes.
///
/// For every key `k`: `c1[k] = alpha*p1[k] + (1-alpha)*p2[k]` and
/// `c2[k] = (1-alpha)*p1[k] + alpha*p2[k]`. Deterministic.
pub fn arithmetic(
    parent1: &BTreeMap<String, f64>,
    parent2: &BTreeMap<String, f64>,
    alpha: f64,
) -> Result<(BTreeMap<String, f64>, BTreeMap<String, f64>)> {
    if parent1.len() != parent2.len() || !parent1.keys().eq(parent2.keys()) {
        return Err(OptimError::ShapeMismatch {
            expected: Genome::Map(parent1.clone()).describe(),
            found: Genome::Map(parent2.clone()).describe(),
        });
    }

    let mut c1 = BTreeMap::new();
    let mut c2 = BTreeMap::new();
    for ((key, &a), &b) in parent1.iter().zip(parent2.values()) {
        c1.insert(key.clone(), alpha * a + (1.0 - alpha) * b);
        c2.insert(key.clone(), (1.0 - alpha) * a + alpha * b);
    }
    Ok((c1, c2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn p1() -> Vec<f64> {
        vec![0.0; 8]
    }

    fn p2() -> Vec<f64> {
        vec![1.0; 8]
    }

    #[test]
    fn test_single_point_swaps_tail() {
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let (c1, c2) = single_point(&p1(), &p2(), &mut rng).unwrap();
            let cut = c1.iter().position(|&x| x == 1.0).expect("cut inside genome");
            assert!(cut >= 1 && cut < 8);
            assert!(c1[..cut].iter().all(|&x| x == 0.0));
            assert!(c1[cut..].iter().all(|&x| x == 1.0));
            for i in 0..8 {
                assert_eq!(c1[i] + c2[i], 1.0, "children must be complementary");
            }
        }
    }

    #[test]
    fn test_two_point_swaps_contiguous_segment() {
        let mut rng = create_rng(7);
        for _ in 0..100 {
            let (c1, c2) = two_point(&p1(), &p2(), &mut rng).unwrap();
            let swapped: Vec<usize> = (0..8).filter(|&i| c1[i] == 1.0).collect();
            assert!(!swapped.is_empty());
            let (lo, hi) = (swapped[0], swapped[swapped.len() - 1]);
            assert_eq!(swapped.len(), hi - lo + 1, "segment must be contiguous");
            for i in 0..8 {
                assert_eq!(c1[i] + c2[i], 1.0);
            }
        }
    }

    #[test]
    fn test_uniform_extremes() {
        let mut rng = create_rng(1);
        let (c1, c2) = uniform(&p1(), &p2(), 0.0, &mut rng).unwrap();
        assert_eq!((c1, c2), (p1(), p2()));
        let (c1, c2) = uniform(&p1(), &p2(), 1.0, &mut rng).unwrap();
        assert_eq!((c1, c2), (p2(), p1()));
    }

    #[test]
    fn test_short_parents_are_cloned() {
        let mut rng = create_rng(1);
        let (c1, c2) = single_point(&[3.0], &[4.0], &mut rng).unwrap();
        assert_eq!((c1, c2), (vec![3.0], vec![4.0]));
        let (c1, c2) = two_point(&[], &[], &mut rng).unwrap();
        assert!(c1.is_empty() && c2.is_empty());
    }

    #[test]
    fn test_length_mismatch_fails_fast() {
        let mut rng = create_rng(1);
        let err = single_point(&[1.0, 2.0], &[1.0], &mut rng).unwrap_err();
        assert!(err.to_string().contains("length 2"), "got: {err}");
        assert!(uniform(&[1.0], &[1.0, 2.0], 0.5, &mut rng).is_err());
    }

    #[test]
    fn test_arithmetic_blend() {
        let a: BTreeMap<String, f64> = [("x".to_string(), 0.0), ("y".to_string(), 10.0)].into();
        let b: BTreeMap<String, f64> = [("x".to_string(), 4.0), ("y".to_string(), 0.0)].into();
        let (c1, c2) = arithmetic(&a, &b, 0.25).unwrap();
        assert!((c1["x"] - 3.0).abs() < 1e-12);
        assert!((c1["y"] - 2.5).abs() < 1e-12);
        assert!((c2["x"] - 1.0).abs() < 1e-12);
        assert!((c2["y"] - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic_key_mismatch() {
        let a: BTreeMap<String, f64> = [("x".to_string(), 0.0)].into();
        let b: BTreeMap<String, f64> = [("z".to_string(), 0.0)].into();
        assert!(matches!(
            arithmetic(&a, &b, 0.5),
            Err(OptimError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_strategy_rejects_wrong_layout() {
        let mut rng = create_rng(1);
        let arr = Genome::from(vec![1.0, 2.0]);
        let map = Genome::map([("x", 1.0)]);
        assert!(CrossoverStrategy::SinglePoint.apply(&map, &map, &mut rng).is_err());
        assert!(CrossoverStrategy::Arithmetic { alpha: 0.5 }
            .apply(&arr, &arr, &mut rng)
            .is_err());
        assert!(CrossoverStrategy::TwoPoint.apply(&arr, &map, &mut rng).is_err());

        let (c1, _) = CrossoverStrategy::Arithmetic { alpha: 1.0 }
            .apply(&map, &map, &mut rng)
            .unwrap();
        assert_eq!(c1, map);
    }
}
