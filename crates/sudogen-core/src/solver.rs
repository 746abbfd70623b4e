//! Depth-first solution search.
//!
//! The search keeps a ring of independent DFS frontiers ("stacks") and
//! expands them round-robin within a single thread. Spreading a node's
//! children across idle frontiers hedges against one branch diving into an
//! expensive dead end while cheaper branches wait. A callback decides after
//! each solution whether to continue, which is how the uniqueness check
//! stops at two.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::rng::SimpleRng;

/// Knobs for [`Solver::search`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Wall-clock budget in milliseconds; 0 means unbounded.
    pub time_out_ms: u64,
    /// Number of logical DFS frontiers interleaved in the loop.
    pub concurrent_branches: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            time_out_ms: 0,
            concurrent_branches: 9,
        }
    }
}

/// 0/1/"2 or more" summary of a board's solution count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionsFlag {
    None,
    Unique,
    Multiple,
}

/// Outcome of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Solutions in discovery order.
    pub solutions: Vec<Board>,
    /// Scheduler ticks executed.
    pub iterations: u64,
    /// Child boards materialized.
    pub branches: u64,
    pub time_elapsed_ms: u64,
    /// True when the space was exhausted (no timeout, no callback stop).
    pub complete: bool,
    pub timed_out: bool,
    pub terminated_by_callback: bool,
}

struct Frame {
    board: Board,
    /// Pending candidate children, built lazily on first expansion.
    children: Option<Vec<Board>>,
}

/// Stateless search facade; all state is per-call.
pub struct Solver;

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate solutions of `board`. After each solution `on_solution`
    /// receives the solved board and the running count; returning `false`
    /// stops the search.
    pub fn search<F>(
        &self,
        board: &Board,
        opts: &SearchOptions,
        rng: &mut SimpleRng,
        mut on_solution: F,
    ) -> SearchResult
    where
        F: FnMut(&Board, usize) -> bool,
    {
        let started = Instant::now();
        let mut result = SearchResult {
            solutions: Vec::new(),
            iterations: 0,
            branches: 0,
            time_elapsed_ms: 0,
            complete: false,
            timed_out: false,
            terminated_by_callback: false,
        };

        let branch_cap = opts.concurrent_branches.max(1);
        let mut root = board.clone();
        root.reset_empty_cells();
        let mut stacks: Vec<Vec<Frame>> = vec![vec![Frame {
            board: root,
            children: None,
        }]];
        let mut turn = 0usize;

        'ticks: while !stacks.is_empty() {
            if opts.time_out_ms > 0 && started.elapsed().as_millis() as u64 >= opts.time_out_ms {
                result.timed_out = true;
                break 'ticks;
            }
            if turn >= stacks.len() {
                turn = 0;
            }
            result.iterations += 1;

            let stack_count = stacks.len();
            let mut spawned: Vec<Board> = Vec::new();
            let stack = &mut stacks[turn];
            if let Some(frame) = stack.last_mut() {
                frame.board.reduce();
                if frame.board.is_solved() {
                    let solved = frame.board.clone();
                    stack.pop();
                    let count = result.solutions.len() + 1;
                    let keep_going = on_solution(&solved, count);
                    result.solutions.push(solved);
                    if !keep_going {
                        result.terminated_by_callback = true;
                        break 'ticks;
                    }
                } else if !frame.board.is_valid() || frame.board.has_dead_cell() {
                    stack.pop();
                } else if frame.children.is_none() {
                    match frame.board.pick_empty_cell(rng) {
                        None => {
                            stack.pop();
                        }
                        Some(ci) => {
                            let mut children: Vec<Board> = frame
                                .board
                                .candidates(ci)
                                .into_iter()
                                .map(|d| {
                                    let mut child = frame.board.clone();
                                    child.set(ci, d);
                                    child
                                })
                                .collect();
                            result.branches += children.len() as u64;
                            rng.shuffle(&mut children);
                            frame.children = Some(children);
                        }
                    }
                } else if let Some(children) = frame.children.as_mut() {
                    match children.pop() {
                        Some(next) => {
                            // Peel further siblings off into fresh frontiers
                            // while the ring has room.
                            while stack_count + spawned.len() < branch_cap {
                                match children.pop() {
                                    Some(sibling) => spawned.push(sibling),
                                    None => break,
                                }
                            }
                            stack.push(Frame {
                                board: next,
                                children: None,
                            });
                        }
                        None => {
                            stack.pop();
                        }
                    }
                }
            }
            for board in spawned {
                stacks.push(vec![Frame {
                    board,
                    children: None,
                }]);
            }
            stacks.retain(|s| !s.is_empty());
            turn += 1;
        }

        result.complete = !result.timed_out && !result.terminated_by_callback;
        result.time_elapsed_ms = started.elapsed().as_millis() as u64;
        result
    }

    /// Materialize one solution, or `None` for an unsolvable board. A single
    /// frontier suffices when the first solution is all that is wanted.
    pub fn solve(&self, board: &Board, rng: &mut SimpleRng) -> Option<Board> {
        let opts = SearchOptions {
            concurrent_branches: 1,
            ..SearchOptions::default()
        };
        let mut result = self.search(board, &opts, rng, |_, _| false);
        result.solutions.pop()
    }

    /// Count solutions, stopping at two. Boards with fewer than 17 clues
    /// cannot have a unique solution, so they short-circuit to
    /// [`SolutionsFlag::Multiple`] without searching.
    pub fn solutions_flag(&self, board: &Board, rng: &mut SimpleRng) -> SolutionsFlag {
        if board.num_empty() > 81 - 17 {
            return SolutionsFlag::Multiple;
        }
        let result = self.search(board, &SearchOptions::default(), rng, |_, count| count < 2);
        match result.solutions.len() {
            0 => SolutionsFlag::None,
            1 => SolutionsFlag::Unique,
            _ => SolutionsFlag::Multiple,
        }
    }

    /// Exhaustively collect distinct solutions.
    pub fn all_solutions(
        &self,
        board: &Board,
        opts: &SearchOptions,
        rng: &mut SimpleRng,
    ) -> SearchResult {
        let mut result = self.search(board, opts, rng, |_, _| true);
        let mut distinct: Vec<Board> = Vec::with_capacity(result.solutions.len());
        for solution in result.solutions.drain(..) {
            if !distinct.contains(&solution) {
                distinct.push(solution);
            }
        }
        result.solutions = distinct;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVED: &str =
        "218574639573896124469123578721459386354681792986237415147962853695318247832745961";

    fn blank_cells(text: &str, cells: &[usize]) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        for &ci in cells {
            chars[ci] = '.';
        }
        chars.into_iter().collect()
    }

    #[test]
    fn test_solved_board_is_unique() {
        let board = Board::from_string(SOLVED).unwrap();
        assert!(board.is_solved());
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(1);
        assert_eq!(solver.solutions_flag(&board, &mut rng), SolutionsFlag::Unique);
    }

    #[test]
    fn test_solve_recovers_blanked_cells() {
        let cells: Vec<usize> = (0..14).collect();
        let board = Board::from_string(&blank_cells(SOLVED, &cells)).unwrap();
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(2);
        assert_eq!(solver.solutions_flag(&board, &mut rng), SolutionsFlag::Unique);
        let solution = solver.solve(&board, &mut rng).unwrap();
        assert_eq!(solution.to_string(), SOLVED);
    }

    #[test]
    fn test_sub_17_clue_shortcut() {
        // 16 clues, 65 empty cells.
        let cells: Vec<usize> = (16..81).collect();
        let board = Board::from_string(&blank_cells(SOLVED, &cells)).unwrap();
        assert_eq!(board.num_empty(), 65);
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(3);
        assert_eq!(solver.solutions_flag(&board, &mut rng), SolutionsFlag::Multiple);
    }

    #[test]
    fn test_contradictory_board_has_no_solutions() {
        // Overwriting cell 0 with 5 duplicates the 5 already in row 0.
        let mut board = Board::from_string(SOLVED).unwrap();
        board.set(0, 5);
        assert!(!board.is_valid());
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(4);
        assert_eq!(solver.solutions_flag(&board, &mut rng), SolutionsFlag::None);
        assert!(solver.solve(&board, &mut rng).is_none());
    }

    #[test]
    fn test_unavoidable_rectangle_has_two_solutions() {
        // The 8/9 rectangle at rows {0,2} x columns {2,8} can be swapped
        // without breaking any house, so exactly two completions exist.
        let board = Board::from_string(&blank_cells(SOLVED, &[2, 8, 20, 26])).unwrap();
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(5);
        assert_eq!(solver.solutions_flag(&board, &mut rng), SolutionsFlag::Multiple);

        let result = solver.all_solutions(&board, &SearchOptions::default(), &mut rng);
        assert!(result.complete);
        assert_eq!(result.solutions.len(), 2);
        assert!(result.solutions.iter().any(|s| s.to_string() == SOLVED));
        for solution in &result.solutions {
            assert!(solution.is_solved());
        }
    }

    #[test]
    fn test_empty_board_solves() {
        let board = Board::empty();
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(6);
        let solution = solver.solve(&board, &mut rng).unwrap();
        assert!(solution.is_solved());
    }

    #[test]
    fn test_search_metrics_populated() {
        let board = Board::from_string(&blank_cells(SOLVED, &[2, 8, 20, 26])).unwrap();
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(7);
        let result = solver.search(&board, &SearchOptions::default(), &mut rng, |_, _| true);
        assert!(result.iterations > 0);
        assert!(result.branches > 0);
        assert!(result.complete);
        assert!(!result.timed_out);
        assert!(!result.terminated_by_callback);
    }

    #[test]
    fn test_callback_termination_flagged() {
        let board = Board::from_string(&blank_cells(SOLVED, &[2, 8, 20, 26])).unwrap();
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(8);
        let result = solver.search(&board, &SearchOptions::default(), &mut rng, |_, _| false);
        assert_eq!(result.solutions.len(), 1);
        assert!(result.terminated_by_callback);
        assert!(!result.complete);
    }

    #[test]
    fn test_uniqueness_survives_fixing_a_solved_value() {
        let cells: Vec<usize> = (0..14).collect();
        let board = Board::from_string(&blank_cells(SOLVED, &cells)).unwrap();
        let solver = Solver::new();
        let mut rng = SimpleRng::with_seed(9);
        assert_eq!(solver.solutions_flag(&board, &mut rng), SolutionsFlag::Unique);

        let solution = solver.solve(&board, &mut rng).unwrap();
        let mut extended = board.clone();
        extended.set(0, solution.get(0));
        assert_eq!(solver.solutions_flag(&extended, &mut rng), SolutionsFlag::Unique);
    }

    #[test]
    fn test_solve_deterministic_under_seed() {
        let board = Board::empty();
        let solver = Solver::new();
        let a = solver.solve(&board, &mut SimpleRng::with_seed(77)).unwrap();
        let b = solver.solve(&board, &mut SimpleRng::with_seed(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_frontier_matches_many() {
        let cells: Vec<usize> = (0..14).collect();
        let board = Board::from_string(&blank_cells(SOLVED, &cells)).unwrap();
        let solver = Solver::new();
        let narrow = SearchOptions {
            concurrent_branches: 1,
            ..SearchOptions::default()
        };
        let mut rng = SimpleRng::with_seed(10);
        let result = solver.all_solutions(&board, &narrow, &mut rng);
        assert_eq!(result.solutions.len(), 1);
        assert_eq!(result.solutions[0].to_string(), SOLVED);
    }
}
