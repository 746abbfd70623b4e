//! Input validation errors. Runtime conditions the engine can reason about
//! (timeouts, infeasible generation, dead boards, callback termination) are
//! encoded in return values instead and never raised.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("board text must describe 81 cells, got {0}")]
    BadLength(usize),

    #[error("invalid board character {ch:?} at cell {cell}")]
    BadChar { cell: usize, ch: char },

    #[error("digit {digit} at cell {cell} is out of range")]
    BadDigit { cell: usize, digit: u8 },

    #[error("num_clues must be within 17..=81, got {0}")]
    NumCluesOutOfRange(u8),

    #[error("amount must be within 1..=1000, got {0}")]
    AmountOutOfRange(usize),

    #[error("max_attempts must be at least 1")]
    MaxAttemptsOutOfRange,

    #[error("supplied configuration is not a solved grid")]
    ConfigNotSolved,

    #[error("sieve-guided generation requires a sieve")]
    SieveRequired,

    #[error("sieve is keyed to a different configuration")]
    SieveConfigMismatch,

    #[error("top row must be fully filled to normalize")]
    TopRowNotFilled,
}
