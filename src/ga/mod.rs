//! Genetic algorithm engine.
//!
//! Evolves a population of [`Genome`](crate::genome::Genome)s toward higher
//! fitness. Callers describe their problem by implementing [`GaProblem`];
//! the engine owns selection, elitism, breeding and adaptive rate control.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Population size, rates, strategies, limits
//! - [`AdaptiveParams`]: Diversity/stagnation driven rate adaptation
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Best genome, history, termination reason
//! - [`GaObserver`]: Per-generation, new-best, progress and termination callbacks
//!
//! # Operator resolution
//!
//! A configured built-in crossover or mutation is used whenever it accepts
//! the population's genome layout; otherwise the problem's own
//! [`GaProblem::crossover`] / [`GaProblem::mutate`] are called. Either way,
//! each child is mutated with probability equal to the current mutation rate.
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Srinivas & Patnaik (1994), *Adaptive Probabilities of Crossover and
//!   Mutation in Genetic Algorithms*

mod adaptive;
mod config;
mod runner;
mod types;

pub use config::{AdaptiveParams, GaConfig};
pub use runner::{GaResult, GaRunner, TerminationReason};
pub use types::{GaObserver, GaProblem, GenerationReport};
