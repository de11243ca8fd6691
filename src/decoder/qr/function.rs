//! Function-module map and codeword traversal for the 21x21 grid.
//!
//! Function modules (finder patterns with separators, timing lines, format
//! fields, dark module) carry no codeword bits. The traversal walks column
//! pairs right to left in a zig-zag, skipping the timing column, which is
//! the order codeword bits are both placed and read.

use crate::models::BinaryBitmap;

/// Module grid edge length for version 1.
pub const GRID: usize = 21;

/// Number of codeword bits in a version 1 symbol (26 codewords).
pub const DATA_BITS: usize = 208;

/// Whether the module at (x, y) is a function module.
///
/// The three finder corners are covered as 9x9 / 8x9 / 9x8 rectangles that
/// also absorb the separators, the format fields and the dark module. The
/// timing row and column are covered by `x == 6 || y == 6`.
pub fn is_function(x: usize, y: usize) -> bool {
    debug_assert!(x < GRID && y < GRID);
    if (x <= 8 && y <= 8) || (x >= GRID - 8 && y <= 8) || (x <= 8 && y >= GRID - 8) {
        return true;
    }
    x == 6 || y == 6
}

/// Data mask predicate for mask ids 0..=7.
pub fn mask_bit(mask_id: u8, x: usize, y: usize) -> bool {
    let x = x as i32;
    let y = y as i32;
    match mask_id {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => ((y / 2) + (x / 3)) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        _ => false,
    }
}

/// Module visit order for codeword placement and extraction.
///
/// Column pairs (x, x-1) from the right edge leftwards, alternating upward
/// and downward sweeps. The timing column x=6 is skipped as a pair, so the
/// pair after x=7 starts at x=5. Function modules are not filtered here;
/// callers skip them via [`is_function`].
pub fn walk_order() -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(GRID * GRID * 2);
    let mut x = GRID as isize - 1;
    let mut upward = true;

    while x >= 0 {
        if x == 6 {
            x -= 1;
            if x < 0 {
                break;
            }
        }
        let xx = x as usize;
        if upward {
            for y in (0..GRID).rev() {
                out.push((xx, y));
                if xx > 0 {
                    out.push((xx - 1, y));
                }
            }
        } else {
            for y in 0..GRID {
                out.push((xx, y));
                if xx > 0 {
                    out.push((xx - 1, y));
                }
            }
        }
        upward = !upward;
        x -= 2;
    }

    out
}

/// Extract the 208 codeword bits from a sampled module grid, removing the
/// data mask along the way.
pub fn extract_codeword_bits(grid: &BinaryBitmap, mask_id: u8) -> Vec<bool> {
    debug_assert_eq!(grid.width(), GRID);
    debug_assert_eq!(grid.height(), GRID);

    let mut bits = Vec::with_capacity(DATA_BITS);
    for (x, y) in walk_order() {
        if is_function(x, y) {
            continue;
        }
        bits.push(grid.get(x, y) ^ mask_bit(mask_id, x, y));
        if bits.len() == DATA_BITS {
            break;
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_module_counts() {
        let mut func = 0usize;
        for y in 0..GRID {
            for x in 0..GRID {
                if is_function(x, y) {
                    func += 1;
                }
            }
        }
        assert_eq!(func, 233);
        assert_eq!(GRID * GRID - func, DATA_BITS);
    }

    #[test]
    fn walk_covers_grid_without_timing_pair_leads() {
        let path = walk_order();
        // Ten column pairs of 21 rows each; the timing column is skipped.
        assert_eq!(path.len(), GRID * (GRID - 1));
        let mut seen = [[false; GRID]; GRID];
        for &(x, y) in &path {
            assert_ne!(x, 6, "timing column must not be visited");
            assert!(!seen[y][x], "({x}, {y}) visited twice");
            seen[y][x] = true;
        }
        for y in 0..GRID {
            for x in 0..GRID {
                assert_eq!(seen[y][x], x != 6, "coverage at ({x}, {y})");
            }
        }
        for (idx, (x, _)) in path.iter().enumerate() {
            if idx % 2 == 0 {
                assert_ne!(*x, 6, "timing column must not lead a pair");
            }
        }
    }

    #[test]
    fn extract_respects_walk_order() {
        // Mark the first 40 data modules in walk order, expect the first 40
        // extracted bits set and the rest clear.
        let mut grid = BinaryBitmap::new(GRID, GRID);
        let mut left = 40usize;
        for (x, y) in walk_order() {
            if is_function(x, y) {
                continue;
            }
            grid.set(x, y, true);
            left -= 1;
            if left == 0 {
                break;
            }
        }

        // Mask id 255 matches nothing, so extraction sees the raw modules.
        let bits = extract_codeword_bits(&grid, 255);
        assert_eq!(bits.len(), DATA_BITS);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(b, i < 40, "bit {i}");
        }
    }
}
