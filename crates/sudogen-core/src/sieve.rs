//! Sieve of unavoidable sets.
//!
//! An unavoidable set is a group of cells such that any proper puzzle must
//! keep a clue inside the group; remove them all and at least two
//! completions remain. A sieve collects such sets as 81-bit masks keyed to
//! one configuration, and the generator turns them into cells that may not
//! be cleared.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::geometry::CELL_COUNT;
use crate::mask::CellMask;
use crate::rng::SimpleRng;

/// Ordered collection of unavoidable-set masks for one configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sieve {
    config: Board,
    items: Vec<CellMask>,
}

impl Sieve {
    /// An empty sieve keyed to `config`.
    pub fn new(config: Board) -> Sieve {
        Sieve {
            config,
            items: Vec::new(),
        }
    }

    /// Build a sieve from prebuilt masks.
    pub fn with_items(config: Board, items: impl IntoIterator<Item = CellMask>) -> Sieve {
        let mut sieve = Sieve::new(config);
        sieve.add_items(items);
        sieve
    }

    /// The configuration the sieve is keyed to.
    pub fn config(&self) -> &Board {
        &self.config
    }

    /// Masks ordered by cell count, smallest first.
    pub fn items(&self) -> &[CellMask] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The smallest unavoidable set, if any.
    pub fn first(&self) -> Option<CellMask> {
        self.items.first().copied()
    }

    /// Insert a mask, keeping the size ordering. Empty and duplicate masks
    /// are ignored.
    pub fn add(&mut self, item: CellMask) {
        if item.is_empty() || self.items.contains(&item) {
            return;
        }
        let key = (item.count(), item.bits());
        let at = self
            .items
            .partition_point(|m| (m.count(), m.bits()) < key);
        self.items.insert(at, item);
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = CellMask>) {
        for item in items {
            self.add(item);
        }
    }

    /// Remove and return every item that shares a cell with `mask`.
    pub fn remove_overlapping(&mut self, mask: CellMask) -> Vec<CellMask> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if item.intersects(mask) {
                removed.push(*item);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Propose keep-cells with a single coverage tally: walk the items from
    /// smallest up and, for any not yet hit, pick one of its most-shared
    /// cells. Cheaper than [`cells_to_keep_from_sieve`] and usually close.
    pub fn generate_mask_cells(&self, rng: &mut SimpleRng) -> Vec<usize> {
        let mut tally = [0u32; CELL_COUNT];
        for item in &self.items {
            for ci in item.cells() {
                tally[ci] += 1;
            }
        }

        let mut keep: Vec<usize> = Vec::new();
        for item in &self.items {
            if keep.iter().any(|&ci| item.get(ci)) {
                continue;
            }
            let cells: Vec<usize> = item.cells().collect();
            let best = cells.iter().map(|&ci| tally[ci]).max().unwrap_or(0);
            let ties: Vec<usize> = cells.into_iter().filter(|&ci| tally[ci] == best).collect();
            if let Some(&pick) = rng.choose(&ties) {
                keep.push(pick);
            }
        }
        keep
    }
}

/// Greedy max-cover selection of keep-cells: repeatedly pick a cell that
/// hits the most remaining items (uniform among ties) until every item is
/// hit. The result intersects every sieve item and is at most as large as
/// the sieve.
pub fn cells_to_keep_from_sieve(sieve: &Sieve, rng: &mut SimpleRng) -> Vec<usize> {
    let mut remaining: Vec<CellMask> = sieve.items().to_vec();
    let mut keep: Vec<usize> = Vec::new();

    while !remaining.is_empty() {
        let mut tally = [0u32; CELL_COUNT];
        for item in &remaining {
            for ci in item.cells() {
                tally[ci] += 1;
            }
        }
        let best = match tally.iter().max() {
            Some(&best) if best > 0 => best,
            _ => break,
        };
        let ties: Vec<usize> = (0..CELL_COUNT).filter(|&ci| tally[ci] == best).collect();
        let pick = match rng.choose(&ties) {
            Some(&pick) => pick,
            None => break,
        };
        keep.push(pick);
        remaining.retain(|item| !item.get(pick));
    }
    keep
}
