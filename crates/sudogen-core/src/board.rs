//! The 81-cell board: solved digits, per-cell candidate sets, and per-house
//! used-digit state, kept in sync incrementally on every assignment.
//!
//! Boards are value-like. Houses and counters are re-derived structurally
//! from the digit array on construction, and children are produced by
//! cloning; no board ever shares mutable state with another.

use std::collections::VecDeque;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::digits::DigitSet;
use crate::error::Error;
use crate::geometry::{cell_houses, house_cells, CELL_COUNT, HOUSE_COUNT, PEERS};
use crate::mask::CellMask;
use crate::rng::SimpleRng;

#[derive(Clone)]
pub struct Board {
    digits: [u8; CELL_COUNT],
    cand: [DigitSet; CELL_COUNT],
    initial: [u8; CELL_COUNT],
    house_used: [DigitSet; HOUSE_COUNT],
    house_valid: [bool; HOUSE_COUNT],
    num_empty: u8,
    valid: bool,
}

impl Board {
    /// A board with all 81 cells empty.
    pub fn empty() -> Board {
        Board::build([0; CELL_COUNT])
    }

    /// Build from an 81-digit array; 0 means empty.
    pub fn from_digits(digits: [u8; CELL_COUNT]) -> Result<Board, Error> {
        for (cell, &digit) in digits.iter().enumerate() {
            if digit > 9 {
                return Err(Error::BadDigit { cell, digit });
            }
        }
        Ok(Board::build(digits))
    }

    /// Parse the 81-character string form. `1`..`9` are digits; `0`, `.` and
    /// `-` are empty cells. In the shorter legacy form each `-` stands for a
    /// full row of nine empty cells; the expansion must land on exactly 81
    /// characters.
    pub fn from_string(text: &str) -> Result<Board, Error> {
        let raw: Vec<char> = text.chars().filter(|ch| !ch.is_whitespace()).collect();
        let expanded: Vec<char> = if raw.len() == CELL_COUNT {
            raw
        } else {
            raw.iter()
                .flat_map(|&ch| {
                    if ch == '-' {
                        std::iter::repeat('0').take(9)
                    } else {
                        std::iter::repeat(ch).take(1)
                    }
                })
                .collect()
        };
        if expanded.len() != CELL_COUNT {
            return Err(Error::BadLength(expanded.len()));
        }

        let mut digits = [0u8; CELL_COUNT];
        for (cell, &ch) in expanded.iter().enumerate() {
            digits[cell] = match ch {
                '0' | '.' | '-' => 0,
                '1'..='9' => ch as u8 - b'0',
                _ => return Err(Error::BadChar { cell, ch }),
            };
        }
        Ok(Board::build(digits))
    }

    fn build(digits: [u8; CELL_COUNT]) -> Board {
        let mut board = Board {
            digits,
            cand: [DigitSet::ALL; CELL_COUNT],
            initial: digits,
            house_used: [DigitSet::NONE; HOUSE_COUNT],
            house_valid: [true; HOUSE_COUNT],
            num_empty: 0,
            valid: true,
        };
        board.rederive();
        board
    }

    /// Recompute houses, counters, and candidate sets from the digit array.
    pub(crate) fn rederive(&mut self) {
        self.house_used = [DigitSet::NONE; HOUSE_COUNT];
        self.house_valid = [true; HOUSE_COUNT];
        self.num_empty = 0;
        for ci in 0..CELL_COUNT {
            let d = self.digits[ci];
            if d == 0 {
                self.num_empty += 1;
                continue;
            }
            for house in cell_houses(ci) {
                if self.house_used[house].contains(d) {
                    self.house_valid[house] = false;
                }
                self.house_used[house].insert(d);
            }
        }
        self.valid = self.house_valid.iter().all(|&v| v);
        for ci in 0..CELL_COUNT {
            self.cand[ci] = match self.digits[ci] {
                0 => self.live_candidates(ci),
                d => DigitSet::encode(d),
            };
        }
    }

    /// Digits still placeable at a cell under its three houses.
    #[inline]
    fn live_candidates(&self, ci: usize) -> DigitSet {
        let [row, col, region] = cell_houses(ci);
        !(self.house_used[row] | self.house_used[col] | self.house_used[region])
    }

    /// The digit at a cell; 0 when empty.
    #[inline]
    pub fn get(&self, ci: usize) -> u8 {
        self.digits[ci]
    }

    /// Candidate digits for a cell; empty for solved cells.
    pub fn candidates(&self, ci: usize) -> Vec<u8> {
        if self.digits[ci] > 0 {
            Vec::new()
        } else {
            self.cand[ci].digits()
        }
    }

    /// The raw candidate set of a cell. Solved cells hold their digit's
    /// singleton encoding.
    #[inline]
    pub fn candidate_set(&self, ci: usize) -> DigitSet {
        self.cand[ci]
    }

    /// Assign digit `d` (or clear with 0) at cell `ci`, updating the cell's
    /// three houses incrementally. Assigning the current digit is a no-op.
    pub fn set(&mut self, ci: usize, d: u8) {
        debug_assert!(d <= 9);
        let old = self.digits[ci];
        if old == d {
            return;
        }
        self.digits[ci] = d;
        if old == 0 {
            self.num_empty -= 1;
        } else if d == 0 {
            self.num_empty += 1;
        }
        let houses = cell_houses(ci);
        if old > 0 {
            for &house in &houses {
                self.remove_digit(house, old);
            }
        }
        if d > 0 {
            for &house in &houses {
                self.add_digit(house, d);
            }
        }
        self.cand[ci] = if d > 0 {
            DigitSet::encode(d)
        } else {
            self.live_candidates(ci)
        };
    }

    fn add_digit(&mut self, house: usize, d: u8) {
        if self.house_used[house].contains(d) {
            self.house_valid[house] = false;
            self.valid = false;
        } else {
            self.house_used[house].insert(d);
        }
    }

    fn remove_digit(&mut self, house: usize, d: u8) {
        if self.house_valid[house] {
            self.house_used[house].remove(d);
        } else {
            // The used set of an invalid house is unreliable; rebuild it from
            // the cells and re-poll board validity.
            self.recalc_house(house);
            self.valid = self.house_valid.iter().all(|&v| v);
        }
    }

    fn recalc_house(&mut self, house: usize) {
        let mut used = DigitSet::NONE;
        let mut valid = true;
        for ci in house_cells(house) {
            let d = self.digits[ci];
            if d == 0 {
                continue;
            }
            if used.contains(d) {
                valid = false;
            }
            used.insert(d);
        }
        self.house_used[house] = used;
        self.house_valid[house] = valid;
    }

    /// Restore the clue values the board was constructed with.
    pub fn reset(&mut self) {
        self.digits = self.initial;
        self.rederive();
    }

    /// Widen every empty cell back to all nine candidates. House constraints
    /// are not consulted; run [`Board::reduce`] before relying on candidate
    /// invariants again.
    pub fn reset_empty_cells(&mut self) {
        for ci in 0..CELL_COUNT {
            if self.digits[ci] == 0 {
                self.cand[ci] = DigitSet::ALL;
            }
        }
    }

    /// Run naked-single and hidden-single deduction to a fixed point.
    ///
    /// A cell whose candidates vanish is left dead (`digits == 0`,
    /// empty candidate set) without further propagation; the enclosing
    /// search rejects such boards at its next check. Returns whether any
    /// cell was solved.
    pub fn reduce(&mut self) -> bool {
        let before = self.num_empty;
        let mut queue: VecDeque<usize> = (0..CELL_COUNT).collect();
        let mut queued = [true; CELL_COUNT];

        while let Some(ci) = queue.pop_front() {
            queued[ci] = false;
            if self.digits[ci] != 0 {
                continue;
            }
            let narrowed = self.cand[ci] & self.live_candidates(ci);
            if narrowed.is_empty() {
                self.cand[ci] = DigitSet::NONE;
                continue;
            }
            if let Some(d) = narrowed.single_digit() {
                self.set(ci, d);
                self.enqueue_peers(ci, &mut queue, &mut queued);
                continue;
            }
            if let Some(d) = self.hidden_single(ci, narrowed) {
                self.set(ci, d);
                self.enqueue_peers(ci, &mut queue, &mut queued);
                continue;
            }
            if narrowed != self.cand[ci] {
                self.cand[ci] = narrowed;
                self.enqueue_peers(ci, &mut queue, &mut queued);
            }
        }
        self.num_empty < before
    }

    /// A candidate that fits no other cell of one of the cell's houses.
    fn hidden_single(&self, ci: usize, cands: DigitSet) -> Option<u8> {
        for d in cands.iter() {
            for house in cell_houses(ci) {
                let only_here = house_cells(house)
                    .into_iter()
                    .all(|nj| nj == ci || !self.cand[nj].contains(d));
                if only_here {
                    return Some(d);
                }
            }
        }
        None
    }

    fn enqueue_peers(&self, ci: usize, queue: &mut VecDeque<usize>, queued: &mut [bool; CELL_COUNT]) {
        for &peer in &PEERS[ci] {
            let peer = peer as usize;
            if !queued[peer] {
                queued[peer] = true;
                queue.push_back(peer);
            }
        }
    }

    /// An empty cell with the fewest candidates (at least two), chosen
    /// uniformly at random among ties. `None` when no such cell exists.
    pub fn pick_empty_cell(&self, rng: &mut SimpleRng) -> Option<usize> {
        let mut best = u32::MAX;
        let mut ties: Vec<usize> = Vec::new();
        for ci in 0..CELL_COUNT {
            if self.digits[ci] != 0 {
                continue;
            }
            let count = self.cand[ci].count();
            if count <= 1 {
                continue;
            }
            if count < best {
                best = count;
                ties.clear();
            }
            if count == best {
                ties.push(ci);
            }
        }
        rng.choose(&ties).copied()
    }

    /// Whether some empty cell has run out of candidates.
    pub fn has_dead_cell(&self) -> bool {
        (0..CELL_COUNT).any(|ci| self.digits[ci] == 0 && self.cand[ci].is_empty())
    }

    #[inline]
    pub fn num_empty(&self) -> usize {
        self.num_empty as usize
    }

    /// Whether no house holds a duplicate digit.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_empty == 0
    }

    /// Full and duplicate-free.
    #[inline]
    pub fn is_solved(&self) -> bool {
        self.num_empty == 0 && self.valid
    }

    /// Mask of filled cells.
    pub fn mask(&self) -> CellMask {
        let mut mask = CellMask::EMPTY;
        for ci in 0..CELL_COUNT {
            if self.digits[ci] > 0 {
                mask.set(ci);
            }
        }
        mask
    }

    /// Mask of empty cells.
    pub fn empty_mask(&self) -> CellMask {
        !self.mask()
    }

    /// Relabel digits so the top row reads 1..9 in order. Swaps are applied
    /// to the clue values as well, so `reset` stays consistent.
    pub fn normalize(&mut self) -> Result<(), Error> {
        if self.digits[..9].iter().any(|&d| d == 0) {
            return Err(Error::TopRowNotFilled);
        }
        for d in 1..=9u8 {
            let found = self.digits[d as usize - 1];
            if found != d {
                self.apply_digit_swap(found, d);
            }
        }
        Ok(())
    }

    /// Swap every occurrence of two digits, in both the current grid and the
    /// stored clue values.
    pub(crate) fn apply_digit_swap(&mut self, a: u8, b: u8) {
        for ci in 0..CELL_COUNT {
            let d = self.digits[ci];
            if d == a {
                self.digits[ci] = b;
            } else if d == b {
                self.digits[ci] = a;
            }
            let init = self.initial[ci];
            if init == a {
                self.initial[ci] = b;
            } else if init == b {
                self.initial[ci] = a;
            }
        }
        self.rederive();
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.digits == other.digits
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    /// Canonical 81-character form, `.` for empty cells.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &d in &self.digits {
            if d == 0 {
                f.write_str(".")?;
            } else {
                write!(f, "{d}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({self})")
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Board, D::Error> {
        let text = String::deserialize(deserializer)?;
        Board::from_string(&text).map_err(de::Error::custom)
    }
}
