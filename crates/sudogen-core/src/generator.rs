//! Configuration and puzzle generation.
//!
//! Configurations come from randomized solving of a board whose three
//! diagonal regions are seeded with random permutations. Puzzles come from
//! a subtractive depth-first search over proper puzzles: each step clears
//! one clue, any board that stops being uniquely solvable is discarded, and
//! after too many dead ends the descent restarts from the configuration.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::error::Error;
use crate::geometry::{cell_index, CELL_COUNT};
use crate::rng::SimpleRng;
use crate::sieve::{cells_to_keep_from_sieve, Sieve};
use crate::solver::{SolutionsFlag, Solver};

/// Dead ends tolerated before the descent restarts from the configuration.
/// The neighbor graph is large and deep paths are often unrecoverable;
/// periodic restarts bound worst-case latency at modest average cost.
const POPS_UNTIL_RESET: u64 = 100;

/// Options for [`Generator::generate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// 81 generates full configurations; 17..=80 generates puzzles.
    pub num_clues: u8,
    /// Number of outputs requested, 1..=1000.
    pub amount: usize,
    /// Global wall-clock budget across all outputs; 0 means unbounded.
    pub time_out_ms: u64,
    /// Solved board to subtract from. When absent in puzzle mode, a fresh
    /// configuration is generated per output. Ignored in configuration mode.
    pub config: Option<Board>,
    /// Relabel digits so the top row of the configuration reads 1..9.
    pub normalize: bool,
    /// Forbid clearing a hitting set of the sieve's unavoidable sets.
    pub use_sieve: bool,
    pub sieve: Option<Sieve>,
    /// Fresh descents attempted per output before reporting infeasibility.
    pub max_attempts: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_clues: 81,
            amount: 1,
            time_out_ms: 0,
            config: None,
            normalize: false,
            use_sieve: false,
            sieve: None,
            max_attempts: 100,
        }
    }
}

/// One generated output and its search accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// The generated board; `None` when the search was infeasible within
    /// its budget.
    pub puzzle: Option<Board>,
    /// Cells the sieve forbade clearing.
    pub cells_kept: Vec<usize>,
    /// Nodes discarded during subtractive search.
    pub pops: u64,
    /// Restarts back to the configuration.
    pub resets: u64,
    pub time_ms: u64,
}

struct SearchNode {
    board: Board,
    visited: bool,
    /// Clearable cells not yet explored, built lazily on first visit.
    pending: Option<Vec<usize>>,
}

/// Puzzle and configuration generator.
pub struct Generator {
    rng: SimpleRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    /// A generator whose whole random stream is fixed by `seed`, so outputs
    /// are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Generate `options.amount` outputs.
    pub fn generate(&mut self, options: &GenerateOptions) -> Result<Vec<GenerationReport>, Error> {
        self.generate_with(options, |_| {})
    }

    /// Like [`Generator::generate`], invoking `callback` for each board as
    /// it is produced.
    pub fn generate_with<F>(
        &mut self,
        options: &GenerateOptions,
        mut callback: F,
    ) -> Result<Vec<GenerationReport>, Error>
    where
        F: FnMut(&Board),
    {
        validate(options)?;
        let started = Instant::now();
        let deadline = (options.time_out_ms > 0)
            .then(|| started + Duration::from_millis(options.time_out_ms));

        let mut reports = Vec::with_capacity(options.amount);
        for _ in 0..options.amount {
            let report = if options.num_clues as usize == CELL_COUNT {
                self.config_report(options, deadline)?
            } else {
                self.puzzle_report(options, deadline)?
            };
            if let Some(board) = &report.puzzle {
                callback(board);
            }
            reports.push(report);
        }
        Ok(reports)
    }

    // ==================== Configuration mode ====================

    fn config_report(
        &mut self,
        options: &GenerateOptions,
        deadline: Option<Instant>,
    ) -> Result<GenerationReport, Error> {
        let started = Instant::now();
        let mut config = self.generate_config(deadline);
        if let Some(board) = &mut config {
            if options.normalize {
                board.normalize()?;
            }
        }
        Ok(GenerationReport {
            puzzle: config,
            cells_kept: Vec::new(),
            pops: 0,
            resets: 0,
            time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Produce a random solved board, or `None` past the deadline.
    fn generate_config(&mut self, deadline: Option<Instant>) -> Option<Board> {
        let solver = Solver::new();
        loop {
            if past(deadline) {
                return None;
            }
            let seed = self.config_seed();
            if let Some(config) = solver.solve(&seed, &mut self.rng) {
                debug!(config = %config, "configuration generated");
                return Some(config);
            }
        }
    }

    /// Seed the three diagonal regions with random permutations. They share
    /// no house, so any seeding is completable.
    fn config_seed(&mut self) -> Board {
        let mut board = Board::empty();
        for band in 0..3 {
            let mut digits: Vec<u8> = (1..=9).collect();
            self.rng.shuffle(&mut digits);
            let mut next = digits.into_iter();
            for r in 0..3 {
                for c in 0..3 {
                    if let Some(d) = next.next() {
                        board.set(cell_index(band * 3 + r, band * 3 + c), d);
                    }
                }
            }
        }
        board
    }

    // ==================== Puzzle mode ====================

    fn puzzle_report(
        &mut self,
        options: &GenerateOptions,
        deadline: Option<Instant>,
    ) -> Result<GenerationReport, Error> {
        let started = Instant::now();
        let sieve = options.use_sieve.then_some(options.sieve.as_ref()).flatten();
        let base_config = options
            .config
            .clone()
            .or_else(|| sieve.map(|s| s.config().clone()));

        let mut puzzle: Option<Board> = None;
        let mut cells_kept: Vec<usize> = Vec::new();
        let mut pops_total = 0u64;
        let mut resets_total = 0u64;

        for attempt in 0..options.max_attempts {
            if past(deadline) {
                break;
            }
            let config = match &base_config {
                Some(config) => config.clone(),
                None => match self.generate_config(deadline) {
                    Some(config) => config,
                    None => break,
                },
            };
            let keep = match sieve {
                Some(sieve) => cells_to_keep_from_sieve(sieve, &mut self.rng),
                None => Vec::new(),
            };

            let (found, pops, resets) =
                self.subtract(&config, options.num_clues, &keep, deadline);
            pops_total += pops;
            resets_total += resets;
            cells_kept = keep;

            match found {
                Some(mut board) => {
                    if options.normalize {
                        normalize_against_config(&mut board, &config);
                    }
                    puzzle = Some(board);
                    break;
                }
                None => {
                    debug!(attempt, pops, resets, "descent failed, retrying");
                }
            }
        }

        Ok(GenerationReport {
            puzzle,
            cells_kept,
            pops: pops_total,
            resets: resets_total,
            time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Depth-first subtraction from `config` down to `num_clues` clues.
    /// Every board on the stack is a proper puzzle; removals that break
    /// uniqueness are pruned, and every [`POPS_UNTIL_RESET`] consecutive
    /// dead ends the stack collapses back to the configuration.
    fn subtract(
        &mut self,
        config: &Board,
        num_clues: u8,
        keep: &[usize],
        deadline: Option<Instant>,
    ) -> (Option<Board>, u64, u64) {
        let solver = Solver::new();
        let target_empty = CELL_COUNT - num_clues as usize;
        let mut stack = vec![SearchNode {
            board: config.clone(),
            visited: false,
            pending: None,
        }];
        let mut pops = 0u64;
        let mut resets = 0u64;
        let mut streak = 0u64;

        loop {
            if past(deadline) {
                return (None, pops, resets);
            }
            let Some(node) = stack.last_mut() else {
                return (None, pops, resets);
            };

            if !node.visited {
                node.visited = true;
                if solver.solutions_flag(&node.board, &mut self.rng) != SolutionsFlag::Unique {
                    stack.pop();
                    pops += 1;
                    streak += 1;
                    if streak >= POPS_UNTIL_RESET {
                        stack.truncate(1);
                        streak = 0;
                        resets += 1;
                        debug!(resets, "restarting descent from configuration");
                    }
                    continue;
                }
            }

            if node.board.num_empty() >= target_empty {
                return (Some(node.board.clone()), pops, resets);
            }

            if node.pending.is_none() {
                let mut cells: Vec<usize> = (0..CELL_COUNT)
                    .filter(|ci| node.board.get(*ci) != 0 && !keep.contains(ci))
                    .collect();
                self.rng.shuffle(&mut cells);
                node.pending = Some(cells);
            }

            match node.pending.as_mut().and_then(|cells| cells.pop()) {
                Some(ci) => {
                    let mut child = node.board.clone();
                    child.set(ci, 0);
                    stack.push(SearchNode {
                        board: child,
                        visited: false,
                        pending: None,
                    });
                }
                None => {
                    stack.pop();
                    pops += 1;
                    streak += 1;
                    if streak >= POPS_UNTIL_RESET {
                        stack.truncate(1);
                        streak = 0;
                        resets += 1;
                        debug!(resets, "restarting descent from configuration");
                    }
                }
            }
        }
    }
}

/// Relabel a puzzle with the permutation that normalizes its configuration,
/// so the puzzle's unique solution has 1..9 across the top row.
fn normalize_against_config(puzzle: &mut Board, config: &Board) {
    let mut config = config.clone();
    for d in 1..=9u8 {
        let found = config.get(d as usize - 1);
        if found != d {
            config.apply_digit_swap(found, d);
            puzzle.apply_digit_swap(found, d);
        }
    }
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

fn validate(options: &GenerateOptions) -> Result<(), Error> {
    if !(17..=81).contains(&options.num_clues) {
        return Err(Error::NumCluesOutOfRange(options.num_clues));
    }
    if !(1..=1000).contains(&options.amount) {
        return Err(Error::AmountOutOfRange(options.amount));
    }
    if options.max_attempts == 0 {
        return Err(Error::MaxAttemptsOutOfRange);
    }
    if (options.num_clues as usize) < CELL_COUNT {
        if let Some(config) = &options.config {
            if !config.is_solved() {
                return Err(Error::ConfigNotSolved);
            }
        }
        if options.use_sieve {
            let Some(sieve) = &options.sieve else {
                return Err(Error::SieveRequired);
            };
            if let Some(config) = &options.config {
                if sieve.config() != config {
                    return Err(Error::SieveConfigMismatch);
                }
            }
        }
    }
    Ok(())
}
