//! Parameter-space tree, size descriptor and narrowing.

use super::combinations::Combinations;
use super::config::Config;
use super::range::Range;
use crate::error::{OptimError, Result};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Hard cap on the number of grid points a search may enumerate.
pub const MAX_SEARCH_SPACE_SIZE: u64 = 10_000_000;

/// Largest integer exactly representable in an `f64` (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Wall-clock budget for sizing a search space.
pub const SIZE_COMPUTATION_BUDGET: Duration = Duration::from_secs(5);

/// Safety limits applied by [`ParameterSpace::describe_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceLimits {
    /// Maximum number of combinations.
    pub max_size: u64,
    /// Maximum time spent computing the size.
    pub time_budget: Duration,
}

impl Default for SpaceLimits {
    fn default() -> Self {
        Self {
            max_size: MAX_SEARCH_SPACE_SIZE,
            time_budget: SIZE_COMPUTATION_BUDGET,
        }
    }
}

/// Size descriptor of a parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchSpace {
    /// Number of grid points (product of per-range step counts).
    pub size: u64,
    /// Number of leaf ranges.
    pub dimensions: usize,
}

/// A node of the parameter-space tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpaceNode {
    Range(Range),
    Space(ParameterSpace),
}

/// A flattened leaf range and its dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub path: String,
    pub range: Range,
    pub(crate) segments: Vec<String>,
}

/// Ordered tree of named ranges.
///
/// Declaration order is preserved and determines enumeration order: the
/// first declared range varies fastest.
///
/// # Examples
///
/// ```
/// use u_tuner::space::{ParameterSpace, Range};
///
/// let space = ParameterSpace::new()
///     .with_range("x", Range::new(-10.0, 10.0, 0.5))
///     .with_range("y", Range::new(-10.0, 10.0, 0.5));
///
/// let desc = space.describe().unwrap();
/// assert_eq!(desc.size, 41 * 41);
/// assert_eq!(desc.dimensions, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSpace {
    entries: Vec<(String, SpaceNode)>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a leaf range.
    ///
    /// `key` must be non-empty and must not contain `.`, which separates
    /// path segments; [`validate`](Self::validate) rejects it otherwise.
    pub fn with_range(mut self, key: impl Into<String>, range: Range) -> Self {
        self.entries.push((key.into(), SpaceNode::Range(range)));
        self
    }

    /// Appends a nested sub-space under `key`.
    ///
    /// The same key rules as [`with_range`](Self::with_range) apply.
    pub fn with_space(mut self, key: impl Into<String>, space: ParameterSpace) -> Self {
        self.entries.push((key.into(), SpaceNode::Space(space)));
        self
    }

    pub fn entries(&self) -> &[(String, SpaceNode)] {
        &self.entries
    }

    /// Leaf ranges in declaration order (depth first).
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &mut Vec<String>, out: &mut Vec<Leaf>) {
        for (key, node) in &self.entries {
            prefix.push(key.clone());
            match node {
                SpaceNode::Range(range) => out.push(Leaf {
                    path: prefix.join("."),
                    range: *range,
                    segments: prefix.clone(),
                }),
                SpaceNode::Space(space) => space.collect_leaves(prefix, out),
            }
            prefix.pop();
        }
    }

    /// Checks keys and ranges without sizing the grid.
    ///
    /// Keys must be non-empty, unique within their level, and free of `.`
    /// (dots separate path segments). At least one range must exist.
    pub fn validate(&self) -> Result<()> {
        self.validate_level("")?;
        if self.leaves().is_empty() {
            return Err(OptimError::EmptySpace);
        }
        Ok(())
    }

    fn validate_level(&self, prefix: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for (key, node) in &self.entries {
            let path = join_path(prefix, key);
            if key.is_empty() || key.contains('.') {
                return Err(OptimError::InvalidConfig(format!(
                    "parameter key `{path}` must be non-empty and must not contain '.'"
                )));
            }
            if !seen.insert(key.as_str()) {
                return Err(OptimError::DuplicateKey(path));
            }
            match node {
                SpaceNode::Range(range) => {
                    range
                        .checked_steps()
                        .map_err(|reason| OptimError::InvalidRange { path, reason })?;
                }
                SpaceNode::Space(space) => space.validate_level(&path)?,
            }
        }
        Ok(())
    }

    /// Computes the size descriptor under the default limits.
    pub fn describe(&self) -> Result<SearchSpace> {
        self.describe_with(&SpaceLimits::default())
    }

    /// Computes the size descriptor, failing if the grid is too large.
    ///
    /// The running product is checked after every range against the
    /// 53-bit integer domain, against `limits.max_size`, and against
    /// `limits.time_budget`.
    pub fn describe_with(&self, limits: &SpaceLimits) -> Result<SearchSpace> {
        let started = Instant::now();
        self.validate()?;

        let leaves = self.leaves();
        let mut size: u64 = 1;
        for leaf in &leaves {
            let steps = leaf
                .range
                .checked_steps()
                .map_err(|reason| OptimError::InvalidRange {
                    path: leaf.path.clone(),
                    reason,
                })?;
            size = match size.checked_mul(steps) {
                Some(s) if s <= MAX_SAFE_INTEGER => s,
                _ => {
                    return Err(OptimError::SearchSpaceOverflow {
                        path: leaf.path.clone(),
                    })
                }
            };
            if size > limits.max_size {
                return Err(OptimError::SearchSpaceTooLarge {
                    size: projected_size(size, &leaves),
                    limit: limits.max_size,
                });
            }
            let elapsed = started.elapsed();
            if elapsed >= limits.time_budget {
                return Err(OptimError::SizeComputationTimeout { elapsed });
            }
        }

        Ok(SearchSpace {
            size,
            dimensions: leaves.len(),
        })
    }

    /// Lazily enumerates every grid point, each overlaid on `base`.
    ///
    /// Only the tree structure is validated here; call
    /// [`describe`](Self::describe) first to enforce size limits.
    pub fn combinations(&self, base: &Config) -> Result<Combinations> {
        self.validate()?;
        Combinations::new(self.leaves(), base.clone())
    }

    /// Builds a smaller space centered on `center`.
    ///
    /// Every leaf range keeps its path and becomes
    /// `[max(min, v - r), min(max, v + r)]` stepped by `step * step_scale`,
    /// where `v` is the center's value at that path (clamped into the
    /// original range) and `r = (max - min) * search_radius`.
    pub fn narrow(&self, center: &Config, search_radius: f64, step_scale: f64) -> Result<Self> {
        self.narrow_level(center, &mut Vec::new(), search_radius, step_scale)
    }

    /// Worst-case result of [`narrow`](Self::narrow) over every possible
    /// center.
    ///
    /// Each leaf keeps its lower bound and spans
    /// `min(span, 2 * span * search_radius)`, the widest window a center can
    /// produce, at the narrowed step. Sizing this space bounds the size of
    /// any refinement before a center is known.
    pub fn widest_narrowing(&self, search_radius: f64, step_scale: f64) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, node)| {
                let node = match node {
                    SpaceNode::Range(range) => {
                        SpaceNode::Range(widest_range(range, search_radius, step_scale))
                    }
                    SpaceNode::Space(space) => {
                        SpaceNode::Space(space.widest_narrowing(search_radius, step_scale))
                    }
                };
                (key.clone(), node)
            })
            .collect();
        Self { entries }
    }

    fn narrow_level(
        &self,
        center: &Config,
        prefix: &mut Vec<String>,
        search_radius: f64,
        step_scale: f64,
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for (key, node) in &self.entries {
            prefix.push(key.clone());
            let narrowed = match node {
                SpaceNode::Range(range) => {
                    let value = center.get_segments(prefix.as_slice()).ok_or_else(|| {
                        OptimError::InvalidConfig(format!(
                            "center configuration has no value for `{}`",
                            prefix.join(".")
                        ))
                    })?;
                    SpaceNode::Range(narrow_range(range, value, search_radius, step_scale))
                }
                SpaceNode::Space(space) => SpaceNode::Space(space.narrow_level(
                    center,
                    prefix,
                    search_radius,
                    step_scale,
                )?),
            };
            prefix.pop();
            entries.push((key.clone(), narrowed));
        }
        Ok(Self { entries })
    }
}

fn widest_range(range: &Range, search_radius: f64, step_scale: f64) -> Range {
    let width = range.span().min(2.0 * range.span() * search_radius);
    Range {
        min: range.min,
        max: range.min + width,
        step: range.step * step_scale,
    }
}

fn narrow_range(range: &Range, value: f64, search_radius: f64, step_scale: f64) -> Range {
    let value = value.clamp(range.min, range.max);
    let radius = range.span() * search_radius;
    Range {
        min: range.min.max(value - radius),
        max: range.max.min(value + radius),
        step: range.step * step_scale,
    }
}

/// Full product for error reporting, saturating at `u64::MAX`.
fn projected_size(partial: u64, leaves: &[Leaf]) -> u64 {
    let full = leaves
        .iter()
        .filter_map(|leaf| leaf.range.steps())
        .try_fold(1u64, |acc, steps| acc.checked_mul(steps));
    full.unwrap_or(u64::MAX).max(partial)
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
