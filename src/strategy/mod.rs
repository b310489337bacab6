//! Strategy library: selection, crossover and mutation operators.
//!
//! Every operator is a pure function of its inputs and the supplied RNG.
//! Nothing here holds state, so any number of concurrent runs can share
//! these functions freely.
//!
//! Each family also has a tagged enum ([`Selection`], [`CrossoverStrategy`],
//! [`MutationStrategy`]) used by [`GaConfig`](crate::ga::GaConfig) to name a
//! built-in operator. The engine resolves these once per run against the
//! genome layout it actually sees.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Box & Muller (1958), "A Note on the Generation of Random Normal Deviates"

pub mod crossover;
pub mod mutation;
pub mod selection;

pub use crossover::CrossoverStrategy;
pub use mutation::{AdaptiveMutation, Bounds, MutationContext, MutationStrategy};
pub use selection::Selection;
