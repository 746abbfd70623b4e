//! Sudoku configuration and minimum-clue puzzle generation.
//!
//! The engine is built from three pieces: a board with incremental
//! candidate propagation ([`Board`]), a randomized multi-frontier
//! depth-first solver ([`Solver`]), and a subtractive puzzle generator
//! ([`Generator`]) that can be guided by a [`Sieve`] of unavoidable sets
//! when chasing low clue counts. All randomness flows through an injectable
//! [`SimpleRng`], so a fixed seed reproduces any run.

mod board;
mod digits;
mod error;
mod generator;
pub mod geometry;
mod mask;
mod rng;
mod sieve;
mod solver;

pub use board::Board;
pub use digits::{DigitIter, DigitSet};
pub use error::Error;
pub use generator::{GenerateOptions, GenerationReport, Generator};
pub use mask::{CellIter, CellMask};
pub use rng::SimpleRng;
pub use sieve::{cells_to_keep_from_sieve, Sieve};
pub use solver::{SearchOptions, SearchResult, SolutionsFlag, Solver};
