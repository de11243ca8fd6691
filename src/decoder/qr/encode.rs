//! Version 1 symbol synthesis: module grid and rasterization.
//!
//! Used by the capture tools and the test suite to produce known-good
//! symbols for the decode pipeline.

use thiserror::Error;

use super::format::{encode_format_word, EcLevel, FORMAT_PATHS};
use super::function::{is_function, mask_bit, walk_order, GRID};
use super::payload::{block_layout, build_data_codewords, byte_capacity};
use super::reed_solomon::ec_bytes;
use crate::models::{BinaryBitmap, LuminanceGrid};

/// Rejection reasons when synthesizing a symbol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Payload does not fit the byte-mode capacity of the level.
    #[error("payload of {len} bytes exceeds capacity {max} at this level")]
    PayloadTooLong {
        /// Payload length in bytes.
        len: usize,
        /// Byte-mode capacity at the requested level.
        max: usize,
    },
    /// Mask ids are 0..=7.
    #[error("mask id {0} out of range")]
    BadMaskId(u8),
}

/// Build the 21x21 module grid for a byte-mode payload.
pub fn encode_modules(payload: &[u8], ec: EcLevel, mask_id: u8) -> Result<BinaryBitmap, EncodeError> {
    let max = byte_capacity(ec);
    if payload.len() > max {
        return Err(EncodeError::PayloadTooLong { len: payload.len(), max });
    }
    if mask_id > 7 {
        return Err(EncodeError::BadMaskId(mask_id));
    }

    let (data_len, ec_len) = block_layout(ec);
    let data_cw = build_data_codewords(payload, data_len);
    let ec_cw = ec_bytes(&data_cw, ec_len);

    let mut grid = BinaryBitmap::new(GRID, GRID);

    let draw_finder = |ox: usize, oy: usize, grid: &mut BinaryBitmap| {
        for dy in 0..7 {
            for dx in 0..7 {
                let border = dx == 0 || dx == 6 || dy == 0 || dy == 6;
                let core = (2..=4).contains(&dx) && (2..=4).contains(&dy);
                grid.set(ox + dx, oy + dy, border || core);
            }
        }
    };
    draw_finder(0, 0, &mut grid);
    draw_finder(14, 0, &mut grid);
    draw_finder(0, 14, &mut grid);

    // Timing stretches between the separators.
    for i in 8..=12 {
        grid.set(i, 6, i % 2 == 0);
        grid.set(6, i, i % 2 == 0);
    }

    // Both format word copies, MSB first along each track.
    let fmt = encode_format_word(ec, mask_id);
    for i in 0..15 {
        let bit = (fmt >> (14 - i)) & 1 != 0;
        let (x1, y1) = FORMAT_PATHS[0][i];
        let (x2, y2) = FORMAT_PATHS[1][i];
        grid.set(x1, y1, bit);
        grid.set(x2, y2, bit);
    }

    // Dark module.
    grid.set(8, 13, true);

    // Codeword bits in walk order with the data mask applied.
    let mut bits = data_cw
        .iter()
        .chain(ec_cw.iter())
        .flat_map(|&cw| (0..8).rev().map(move |i| (cw >> i) & 1 != 0));
    for (x, y) in walk_order() {
        if is_function(x, y) {
            continue;
        }
        if let Some(bit) = bits.next() {
            grid.set(x, y, bit ^ mask_bit(mask_id, x, y));
        }
    }

    Ok(grid)
}

/// Rasterize a module grid to a luminance image: dark modules are 0,
/// everything else 255, with a `quiet` module border on all sides.
pub fn render_luma(modules: &BinaryBitmap, unit: usize, quiet: usize) -> LuminanceGrid {
    let unit = unit.max(1);
    let total_w = modules.width() + 2 * quiet;
    let total_h = modules.height() + 2 * quiet;
    let w = total_w * unit;
    let h = total_h * unit;

    let mut data = vec![255u8; w * h];
    for my in 0..modules.height() {
        for mx in 0..modules.width() {
            if !modules.get(mx, my) {
                continue;
            }
            for py in 0..unit {
                let row = ((quiet + my) * unit + py) * w;
                let start = row + (quiet + mx) * unit;
                for d in &mut data[start..start + unit] {
                    *d = 0;
                }
            }
        }
    }
    LuminanceGrid::from_raw(w, h, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_fixed_landmarks() {
        let grid = encode_modules(b"HELLO", EcLevel::L, 3).unwrap();
        // Finder cores.
        assert!(grid.get(3, 3));
        assert!(grid.get(17, 3));
        assert!(grid.get(3, 17));
        // Separators.
        assert!(!grid.get(7, 3));
        assert!(!grid.get(13, 3));
        // Timing alternation.
        for i in 8..=12 {
            assert_eq!(grid.get(i, 6), i % 2 == 0);
            assert_eq!(grid.get(6, i), i % 2 == 0);
        }
        // Dark module.
        assert!(grid.get(8, 13));
    }

    #[test]
    fn rejects_oversized_payload() {
        let payload = [b'x'; 18];
        assert_eq!(
            encode_modules(&payload, EcLevel::L, 0),
            Err(EncodeError::PayloadTooLong { len: 18, max: 17 })
        );
        let payload = [b'x'; 8];
        assert_eq!(
            encode_modules(&payload, EcLevel::H, 0),
            Err(EncodeError::PayloadTooLong { len: 8, max: 7 })
        );
    }

    #[test]
    fn rejects_bad_mask() {
        assert_eq!(
            encode_modules(b"A", EcLevel::L, 8),
            Err(EncodeError::BadMaskId(8))
        );
    }

    #[test]
    fn render_places_quiet_zone() {
        let mut modules = BinaryBitmap::new(3, 3);
        modules.set(1, 1, true);
        let img = render_luma(&modules, 2, 1);
        assert_eq!(img.width(), 10);
        assert_eq!(img.height(), 10);
        // Quiet border is light.
        assert_eq!(img.row(0), &[255u8; 10]);
        // Center module is dark.
        assert_eq!(img.row(4)[4], 0);
        assert_eq!(img.row(5)[5], 0);
    }
}
