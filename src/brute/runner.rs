//! Exhaustive grid search execution.

use super::config::BruteForceConfig;
use super::types::{BruteForceObserver, BruteForceProblem, NonFiniteScore};
use crate::error::{BoxError, BudgetLimit, OptimError, Result};
use crate::progress::{ProgressEvent, ProgressThrottle};
use crate::space::{Config, ParameterSpace, SearchSpace};
use std::fmt;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// Why a successful brute-force run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// Every candidate was visited.
    Exhausted,
    /// A candidate reached the configured `min_score`.
    MinScoreReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Exhausted => "search space exhausted",
            StopReason::MinScoreReached => "minimum score reached",
        })
    }
}

/// Counters of a brute-force run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Grid size.
    pub total_configs: u64,
    /// Candidates visited (`valid_configs + invalid_configs`).
    pub evaluated_configs: u64,
    pub valid_configs: u64,
    /// Rejected by the pre-filter, failed, or scored non-finite.
    pub invalid_configs: u64,
    pub start_time: SystemTime,
    pub end_time: SystemTime,
}

impl SearchStats {
    /// Wall-clock duration of the run.
    pub fn duration(&self) -> Duration {
        self.end_time
            .duration_since(self.start_time)
            .unwrap_or(Duration::ZERO)
    }
}

/// Result of a brute-force run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BruteForceResult {
    /// The highest-scoring configuration.
    pub best_config: Config,
    pub best_score: f64,
    pub stats: SearchStats,
    pub search_space: SearchSpace,
    pub stop_reason: StopReason,
}

/// Executes an exhaustive search over a [`ParameterSpace`].
///
/// The grid is sized (and rejected if too large) before the first
/// evaluation. Candidates are enumerated lazily, so memory use does not
/// grow with the grid.
///
/// # Usage
///
/// ```ignore
/// let space = ParameterSpace::new()
///     .with_range("x", Range::new(-5.0, 5.0, 0.5))
///     .with_range("y", Range::new(-5.0, 5.0, 0.5));
/// let result = BruteForceRunner::run(&space, &problem, &BruteForceConfig::default())?;
/// assert_eq!(result.search_space.size, 441);
/// ```
pub struct BruteForceRunner;

impl BruteForceRunner {
    /// Runs the search without callbacks.
    pub fn run<P>(space: &ParameterSpace, problem: &P, config: &BruteForceConfig) -> Result<BruteForceResult>
    where
        P: BruteForceProblem + ?Sized,
    {
        Self::run_with_observer(space, problem, config, &mut ())
    }

    /// Runs the search, reporting to `observer`.
    ///
    /// # Errors
    ///
    /// - Configuration errors (invalid config, malformed or oversized
    ///   space) before any candidate is evaluated.
    /// - [`OptimError::BudgetExhausted`] if a time or evaluation budget
    ///   ran out with candidates left.
    /// - [`OptimError::NoValidConfiguration`] if every candidate was
    ///   invalid.
    pub fn run_with_observer<P, O>(
        space: &ParameterSpace,
        problem: &P,
        config: &BruteForceConfig,
        observer: &mut O,
    ) -> Result<BruteForceResult>
    where
        P: BruteForceProblem + ?Sized,
        O: BruteForceObserver + ?Sized,
    {
        config.validate()?;
        let search_space = space.describe_with(&config.limits())?;
        let base = config.base_config.clone().unwrap_or_default();
        let candidates = space.combinations(&base)?;

        info!(
            size = search_space.size,
            dimensions = search_space.dimensions,
            "starting brute-force search"
        );

        let start_time = SystemTime::now();
        let started = Instant::now();
        let mut throttle = ProgressThrottle::new(config.progress_interval);
        let mut best: Option<(Config, f64)> = None;
        let mut visited = 0u64;
        let mut valid = 0u64;
        let mut invalid = 0u64;
        let mut outcome: std::result::Result<StopReason, BudgetLimit> = Ok(StopReason::Exhausted);

        for candidate in candidates {
            if let Some(limit) = config.termination.exceeded(visited, started.elapsed()) {
                outcome = Err(limit);
                break;
            }
            visited += 1;

            match score(problem, &candidate) {
                Ok(Some(value)) => {
                    valid += 1;
                    observer.on_evaluation(&candidate, value);
                    let improved = best.as_ref().map_or(true, |(_, b)| value > *b);
                    if improved {
                        observer.on_new_best(&candidate, value);
                        debug!(score = value, visited, "new best configuration");
                        best = Some((candidate, value));
                    }
                }
                Ok(None) => invalid += 1,
                Err(err) => {
                    invalid += 1;
                    warn!(error = %err, visited, "candidate evaluation failed");
                    observer.on_error(&candidate, err.as_ref());
                }
            }

            if throttle.ready(Instant::now()) {
                let event = ProgressEvent::new(
                    visited,
                    search_space.size,
                    best.as_ref().map(|(_, s)| *s),
                    valid,
                    invalid,
                    started.elapsed(),
                );
                debug!(visited, total = search_space.size, valid, invalid, "brute-force progress");
                observer.on_progress(&event);
            }

            if best
                .as_ref()
                .is_some_and(|(_, s)| config.termination.target_reached(*s))
            {
                outcome = Ok(StopReason::MinScoreReached);
                break;
            }
        }

        let end_time = SystemTime::now();
        let best_score = best.as_ref().map(|(_, s)| *s);
        observer.on_progress(
            &ProgressEvent::new(visited, search_space.size, best_score, valid, invalid, started.elapsed())
                .into_final(),
        );

        let stop_reason = match outcome {
            Ok(reason) => reason,
            Err(limit) => {
                warn!(%limit, visited, ?best_score, "brute-force search stopped by budget");
                return Err(OptimError::BudgetExhausted {
                    limit,
                    evaluated: visited,
                    best_score,
                });
            }
        };

        let Some((best_config, best_score)) = best else {
            warn!(visited, invalid, "no valid configuration found");
            return Err(OptimError::NoValidConfiguration {
                evaluated: visited,
                invalid,
            });
        };

        let result = BruteForceResult {
            best_config,
            best_score,
            stats: SearchStats {
                total_configs: search_space.size,
                evaluated_configs: visited,
                valid_configs: valid,
                invalid_configs: invalid,
                start_time,
                end_time,
            },
            search_space,
            stop_reason,
        };

        info!(
            best_score,
            visited,
            valid,
            invalid,
            reason = %stop_reason,
            "brute-force search finished"
        );
        observer.on_complete(&result);
        Ok(result)
    }
}

/// `Ok(None)` for pre-filter rejects; non-finite scores become errors.
fn score<P>(problem: &P, candidate: &Config) -> std::result::Result<Option<f64>, BoxError>
where
    P: BruteForceProblem + ?Sized,
{
    if !problem.validate(candidate) {
        return Ok(None);
    }
    let value = problem.evaluate(candidate)?;
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err(Box::new(NonFiniteScore(value)))
    }
}
