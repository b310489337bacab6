//! Brute-force search configuration.

use crate::error::{BudgetLimit, OptimError, Result};
use crate::progress::DEFAULT_PROGRESS_INTERVAL;
use crate::space::{Config, SpaceLimits, MAX_SEARCH_SPACE_SIZE, SIZE_COMPUTATION_BUDGET};
use std::time::Duration;

/// Early-stop conditions; any one being met stops the search.
///
/// Reaching `min_score` is a success. Running out of time or evaluations
/// before every candidate was visited is reported as
/// [`OptimError::BudgetExhausted`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Termination {
    /// Stop as soon as a candidate scores at least this much.
    pub min_score: Option<f64>,
    /// Wall-clock budget for the whole run.
    pub max_time: Option<Duration>,
    /// Maximum number of candidates to visit.
    pub max_evaluations: Option<u64>,
}

impl Termination {
    /// The budget that is used up, if any.
    pub(crate) fn exceeded(&self, visited: u64, elapsed: Duration) -> Option<BudgetLimit> {
        if let Some(limit) = self.max_evaluations {
            if visited >= limit {
                return Some(BudgetLimit::Evaluations { limit });
            }
        }
        if let Some(limit) = self.max_time {
            if elapsed >= limit {
                return Some(BudgetLimit::Time { limit });
            }
        }
        None
    }

    /// `true` once `best` reaches `min_score`.
    pub(crate) fn target_reached(&self, best: f64) -> bool {
        self.min_score.is_some_and(|min| best >= min)
    }
}

/// Configuration for [`BruteForceRunner`](super::BruteForceRunner).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_tuner::brute::BruteForceConfig;
///
/// let config = BruteForceConfig::default()
///     .with_min_score(-0.01)
///     .with_max_time(Duration::from_secs(30))
///     .with_max_space_size(100_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BruteForceConfig {
    /// Values every candidate starts from; enumerated ranges overwrite
    /// the paths they cover.
    pub base_config: Option<Config>,

    pub termination: Termination,

    /// Minimum spacing between progress events.
    pub progress_interval: Duration,

    /// Largest grid the run accepts. Can only be lowered below
    /// [`MAX_SEARCH_SPACE_SIZE`].
    pub max_space_size: u64,

    /// Time allowed for sizing the grid.
    pub size_budget: Duration,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            base_config: None,
            termination: Termination::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            max_space_size: MAX_SEARCH_SPACE_SIZE,
            size_budget: SIZE_COMPUTATION_BUDGET,
        }
    }
}

impl BruteForceConfig {
    /// Sets the configuration every candidate is overlaid on.
    pub fn with_base_config(mut self, base: Config) -> Self {
        self.base_config = Some(base);
        self
    }

    /// Sets every termination condition at once.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Stops the search once a score reaches `score`.
    pub fn with_min_score(mut self, score: f64) -> Self {
        self.termination.min_score = Some(score);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.termination.max_time = Some(limit);
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, limit: u64) -> Self {
        self.termination.max_evaluations = Some(limit);
        self
    }

    /// Sets the minimum interval between progress events.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Lowers the grid-size cap. Values above [`MAX_SEARCH_SPACE_SIZE`]
    /// are clamped to it.
    pub fn with_max_space_size(mut self, size: u64) -> Self {
        self.max_space_size = size.min(MAX_SEARCH_SPACE_SIZE);
        self
    }

    /// Sets the time budget for sizing the space.
    pub fn with_size_budget(mut self, budget: Duration) -> Self {
        self.size_budget = budget;
        self
    }

    /// Space-sizing limits derived from this configuration.
    pub fn limits(&self) -> SpaceLimits {
        SpaceLimits {
            max_size: self.max_space_size.min(MAX_SEARCH_SPACE_SIZE),
            time_budget: self.size_budget,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_space_size == 0 || self.max_space_size > MAX_SEARCH_SPACE_SIZE {
            return Err(OptimError::InvalidConfig(format!(
                "max_space_size must be in 1..={MAX_SEARCH_SPACE_SIZE}, got {}",
                self.max_space_size
            )));
        }
        if self.size_budget.is_zero() {
            return Err(OptimError::InvalidConfig(
                "size_budget must be positive".into(),
            ));
        }
        if let Some(min) = self.termination.min_score {
            if min.is_nan() {
                return Err(OptimError::InvalidConfig("min_score must not be NaN".into()));
            }
        }
        if self.termination.max_time == Some(Duration::ZERO) {
            return Err(OptimError::InvalidConfig(
                "max_time must be positive or None".into(),
            ));
        }
        if self.termination.max_evaluations == Some(0) {
            return Err(OptimError::InvalidConfig(
                "max_evaluations must be positive or None".into(),
            ));
        }
        Ok(())
    }
}
