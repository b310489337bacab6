//! Problem and observer traits for the brute-force engine.

use super::runner::BruteForceResult;
use crate::error::BoxError;
use crate::progress::ProgressEvent;
use crate::space::Config;
use thiserror::Error;

/// Scores candidate configurations for an exhaustive search.
///
/// The engine keeps the configuration with the **highest** score.
///
/// Any `Fn(&Config) -> Result<f64, BoxError>` closure implements this
/// trait with no pre-filter.
///
/// # Failure handling
///
/// An `Err` from [`evaluate`](BruteForceProblem::evaluate), or a NaN or
/// infinite score, marks that single candidate invalid. It is reported
/// through [`BruteForceObserver::on_error`] and the search continues.
pub trait BruteForceProblem: Send + Sync {
    /// Scores one candidate. May block.
    fn evaluate(&self, config: &Config) -> Result<f64, BoxError>;

    /// Pre-filter; candidates returning `false` are counted invalid and
    /// never evaluated.
    fn validate(&self, _config: &Config) -> bool {
        true
    }
}

impl<F> BruteForceProblem for F
where
    F: Fn(&Config) -> Result<f64, BoxError> + Send + Sync,
{
    fn evaluate(&self, config: &Config) -> Result<f64, BoxError> {
        self(config)
    }
}

/// Receives brute-force run callbacks.
///
/// All methods default to no-ops; `()` implements the trait.
pub trait BruteForceObserver {
    /// After each successful evaluation.
    fn on_evaluation(&mut self, _config: &Config, _score: f64) {}

    /// Each time the best score strictly improves.
    fn on_new_best(&mut self, _config: &Config, _score: f64) {}

    /// Once per failed candidate.
    fn on_error(&mut self, _config: &Config, _error: &(dyn std::error::Error + Send + Sync + 'static)) {}

    /// At most once per progress interval, plus a final event.
    fn on_progress(&mut self, _event: &ProgressEvent) {}

    /// Once, with the result of a successful run.
    fn on_complete(&mut self, _result: &BruteForceResult) {}
}

impl BruteForceObserver for () {}

/// A candidate's evaluation produced NaN or an infinity.
#[derive(Debug, Error)]
#[error("evaluation returned a non-finite score ({0})")]
pub struct NonFiniteScore(pub f64);
