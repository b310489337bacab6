//! Error taxonomy shared by every engine.
//!
//! Three families of failure exist:
//!
//! - **Configuration errors**: malformed ranges, oversized search spaces,
//!   invalid engine parameters. Raised before any candidate is evaluated.
//! - **Programming errors**: a strategy applied to genomes of different
//!   shapes.
//! - **Exhaustion errors**: a brute-force run that validated nothing, or
//!   that hit a time/evaluation budget before completing.
//!
//! Per-candidate evaluation failures are *not* [`OptimError`]s. They are
//! caller-defined [`BoxError`]s, routed to the observer and counted as
//! invalid candidates.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error type returned by caller-supplied evaluation functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Budget that stopped a brute-force run early.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BudgetLimit {
    /// Wall-clock budget.
    Time {
        /// Configured maximum run time.
        limit: Duration,
    },
    /// Evaluation-count budget.
    Evaluations {
        /// Configured maximum number of evaluated candidates.
        limit: u64,
    },
}

impl fmt::Display for BudgetLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetLimit::Time { limit } => write!(f, "time limit of {limit:?}"),
            BudgetLimit::Evaluations { limit } => write!(f, "evaluation limit of {limit}"),
        }
    }
}

/// Errors raised by the search engines.
#[derive(Error, Debug)]
pub enum OptimError {
    /// An engine parameter or parameter key is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A range is malformed (non-finite, inverted, or non-positive step).
    #[error("invalid range at `{path}`: {reason}")]
    InvalidRange { path: String, reason: String },

    /// Two entries of one space level share a key.
    #[error("duplicate parameter key `{0}`")]
    DuplicateKey(String),

    /// The space has no leaf ranges.
    #[error("parameter space contains no ranges")]
    EmptySpace,

    /// The grid size exceeds 2^53 - 1.
    #[error("search space size overflows 53-bit integer precision at `{path}`")]
    SearchSpaceOverflow { path: String },

    /// The grid size exceeds the configured cap.
    #[error("search space has {size} combinations, exceeding the limit of {limit}")]
    SearchSpaceTooLarge { size: u64, limit: u64 },

    /// Sizing the grid took longer than its time budget.
    #[error("computing the search space size exceeded its time budget ({elapsed:?})")]
    SizeComputationTimeout { elapsed: Duration },

    /// A built-in operator met genomes of different shapes.
    #[error("genome shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// A brute-force run finished without a single valid candidate.
    #[error("no valid configuration found ({evaluated} evaluated, {invalid} invalid)")]
    NoValidConfiguration { evaluated: u64, invalid: u64 },

    /// A brute-force budget ran out before the grid was exhausted.
    #[error("search stopped by {limit} after {evaluated} evaluations (best score: {best_score:?})")]
    BudgetExhausted {
        limit: BudgetLimit,
        evaluated: u64,
        best_score: Option<f64>,
    },
}

impl OptimError {
    /// Returns `true` for errors raised before any work began.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OptimError::InvalidConfig(_)
                | OptimError::InvalidRange { .. }
                | OptimError::DuplicateKey(_)
                | OptimError::EmptySpace
                | OptimError::SearchSpaceOverflow { .. }
                | OptimError::SearchSpaceTooLarge { .. }
                | OptimError::SizeComputationTimeout { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OptimError>;
