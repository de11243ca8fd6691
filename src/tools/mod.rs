//! Synthetic frame generation.
//!
//! Renders known-good symbols into full-size luminance frames so the
//! pipeline and session can be exercised without hardware. Used by the
//! bundled binaries, the integration tests and the benchmarks.

use crate::decoder::qr::{encode_modules, render_luma, EcLevel, EncodeError};
use crate::decoder::{render_code128_row, render_ean13_row, CodeSet};
use crate::models::LuminanceGrid;

/// A frame filled with one luminance value.
pub fn flat_frame(width: usize, height: usize, value: u8) -> LuminanceGrid {
    LuminanceGrid::from_raw(width, height, vec![value; width * height])
}

/// A white frame with a QR symbol centered in it.
///
/// The symbol side is `(21 + 8) * unit` pixels including the quiet
/// zone; the canvas must be at least that large in both dimensions.
pub fn qr_frame(
    payload: &[u8],
    ec: EcLevel,
    mask_id: u8,
    unit: usize,
    width: usize,
    height: usize,
) -> Result<LuminanceGrid, EncodeError> {
    let modules = encode_modules(payload, ec, mask_id)?;
    let symbol = render_luma(&modules, unit, 4);
    Ok(paste_centered(&symbol, width, height))
}

/// A white frame with an EAN-13 symbol band centered in it.
pub fn ean13_frame(digits: &[u8; 13], unit: usize, width: usize, height: usize) -> LuminanceGrid {
    embed_row(&render_ean13_row(digits, 9), unit, width, height)
}

/// A white frame with a Code 128 symbol band centered in it, or `None`
/// if the text cannot be encoded in the chosen code set.
pub fn code128_frame(
    text: &str,
    set: CodeSet,
    unit: usize,
    width: usize,
    height: usize,
) -> Option<LuminanceGrid> {
    Some(embed_row(&render_code128_row(text, set, 10)?, unit, width, height))
}

fn paste_centered(symbol: &LuminanceGrid, width: usize, height: usize) -> LuminanceGrid {
    assert!(symbol.width() <= width && symbol.height() <= height);
    let ox = (width - symbol.width()) / 2;
    let oy = (height - symbol.height()) / 2;
    let mut data = vec![255u8; width * height];
    for y in 0..symbol.height() {
        let dst = (oy + y) * width + ox;
        data[dst..dst + symbol.width()].copy_from_slice(symbol.row(y));
    }
    LuminanceGrid::from_raw(width, height, data)
}

fn embed_row(bits: &[bool], unit: usize, width: usize, height: usize) -> LuminanceGrid {
    let row_px = bits.len() * unit;
    assert!(row_px <= width && height >= 2);
    let ox = (width - row_px) / 2;
    let band = (height / 2).max(1);
    let oy = (height - band) / 2;

    let mut data = vec![255u8; width * height];
    for y in oy..oy + band {
        let base = y * width + ox;
        for (i, &dark) in bits.iter().enumerate() {
            if dark {
                let start = base + i * unit;
                data[start..start + unit].fill(0);
            }
        }
    }
    LuminanceGrid::from_raw(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::models::FrameBufferView;
    use crate::pipeline::{process_frame, FrameOutcome};

    #[test]
    fn qr_frame_round_trips_through_the_pipeline() {
        let grid = qr_frame(b"TOOLS", EcLevel::L, 3, 6, 400, 400).unwrap();
        let frame = FrameBufferView::gray(grid.samples(), grid.width(), grid.height());
        assert!(matches!(
            process_frame(&frame, &ScanConfig::default()),
            FrameOutcome::Decoded { .. }
        ));
    }

    #[test]
    fn flat_frame_is_uniform() {
        let grid = flat_frame(32, 8, 77);
        assert_eq!(grid.dynamic_range(), (77, 77));
    }
}
