//! Static board topology: row/column/region lookups, house cell lists, and
//! per-cell peer tables.
//!
//! House index convention: 0..8 = rows, 9..17 = columns, 18..26 = regions.

pub const CELL_COUNT: usize = 81;
pub const HOUSE_COUNT: usize = 27;

pub const HOUSE_ROW_BASE: usize = 0;
pub const HOUSE_COL_BASE: usize = 9;
pub const HOUSE_REGION_BASE: usize = 18;

/// Row index (0..8) of a cell.
#[inline]
pub fn row_of(ci: usize) -> usize {
    ci / 9
}

/// Column index (0..8) of a cell.
#[inline]
pub fn col_of(ci: usize) -> usize {
    ci % 9
}

/// Region index (0..8) of a cell, row-major over the nine 3x3 boxes.
#[inline]
pub fn region_of(ci: usize) -> usize {
    (ci / 27) * 3 + (ci % 9) / 3
}

/// Convert (row, col) to a linear cell index.
#[inline]
pub fn cell_index(row: usize, col: usize) -> usize {
    row * 9 + col
}

/// The three house indices a cell belongs to: [row, column, region].
#[inline]
pub fn cell_houses(ci: usize) -> [usize; 3] {
    [
        HOUSE_ROW_BASE + row_of(ci),
        HOUSE_COL_BASE + col_of(ci),
        HOUSE_REGION_BASE + region_of(ci),
    ]
}

/// The 9 cell indices belonging to a house.
pub fn house_cells(house: usize) -> [usize; 9] {
    debug_assert!(house < HOUSE_COUNT);
    if house < HOUSE_COL_BASE {
        let row = house;
        std::array::from_fn(|col| cell_index(row, col))
    } else if house < HOUSE_REGION_BASE {
        let col = house - HOUSE_COL_BASE;
        std::array::from_fn(|row| cell_index(row, col))
    } else {
        let region = house - HOUSE_REGION_BASE;
        let top = (region / 3) * 3;
        let left = (region % 3) * 3;
        std::array::from_fn(|i| cell_index(top + i / 3, left + i % 3))
    }
}

/// The 20 peers of each cell: same row, column, and region, excluding the
/// cell itself.
pub static PEERS: [[u8; 20]; 81] = build_peers();

const fn build_peers() -> [[u8; 20]; 81] {
    let mut peers = [[0u8; 20]; 81];
    let mut ci = 0;
    while ci < 81 {
        let row = ci / 9;
        let col = ci % 9;
        let top = (row / 3) * 3;
        let left = (col / 3) * 3;
        let mut n = 0;

        let mut c = 0;
        while c < 9 {
            if c != col {
                peers[ci][n] = (row * 9 + c) as u8;
                n += 1;
            }
            c += 1;
        }
        let mut r = 0;
        while r < 9 {
            if r != row {
                peers[ci][n] = (r * 9 + col) as u8;
                n += 1;
            }
            r += 1;
        }
        let mut dr = 0;
        while dr < 3 {
            let mut dc = 0;
            while dc < 3 {
                let (r, c) = (top + dr, left + dc);
                if r != row && c != col {
                    peers[ci][n] = (r * 9 + c) as u8;
                    n += 1;
                }
                dc += 1;
            }
            dr += 1;
        }
        ci += 1;
    }
    peers
}
