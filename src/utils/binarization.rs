//! Adaptive thresholding of a luminance grid.
//!
//! The grid is split into fixed blocks and each block picks a local midpoint
//! threshold, which copes with uneven viewfinder lighting far better than a
//! single global cut. Low-contrast blocks bias the threshold toward the dark
//! side so faint texture is not promoted to foreground, and blocks with no
//! contrast at all fall back to the global midpoint so flat regions inside a
//! large dark or light area stay coherent.

use thiserror::Error;

use crate::models::{BinaryBitmap, LuminanceGrid};

/// Local range below which a block trusts only the global threshold.
const MIN_BLOCK_RANGE: u8 = 8;

/// Local range below which the block midpoint is biased darker.
const LOW_BLOCK_RANGE: u8 = 24;

/// Binarizer tuning.
#[derive(Debug, Clone, Copy)]
pub struct BinarizeOptions {
    /// Block edge length in pixels for local thresholding.
    pub block_size: usize,
    /// Minimum global dynamic range for a frame to be worth decoding.
    pub min_dynamic_range: u8,
}

impl Default for BinarizeOptions {
    fn default() -> Self {
        Self { block_size: 8, min_dynamic_range: 24 }
    }
}

/// Soft rejection of a frame that cannot be meaningfully thresholded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinarizeError {
    /// The whole frame spans too little dynamic range.
    #[error("insufficient contrast: dynamic range {range}")]
    InsufficientContrast {
        /// Observed max minus min luminance.
        range: u8,
    },
    /// The grid has a zero dimension.
    #[error("empty luminance grid")]
    EmptyGrid,
}

/// Threshold a luminance grid into a binary bitmap.
///
/// Foreground (`true`) means dark. Frames whose overall dynamic range is
/// below the configured floor are rejected as
/// [`BinarizeError::InsufficientContrast`], which callers treat as "no
/// symbol here", not as a fault.
pub fn binarize(
    grid: &LuminanceGrid,
    opts: &BinarizeOptions,
) -> Result<BinaryBitmap, BinarizeError> {
    let width = grid.width();
    let height = grid.height();
    if width == 0 || height == 0 {
        return Err(BinarizeError::EmptyGrid);
    }
    let block = opts.block_size.max(1);

    let (min, max) = grid.dynamic_range();
    let range = max - min;
    if range < opts.min_dynamic_range {
        return Err(BinarizeError::InsufficientContrast { range });
    }
    let global_threshold = min as u16 + range as u16 / 2;

    let mut bitmap = BinaryBitmap::new(width, height);
    for block_y in (0..height).step_by(block) {
        for block_x in (0..width).step_by(block) {
            let x_end = (block_x + block).min(width);
            let y_end = (block_y + block).min(height);

            let mut local_min = u8::MAX;
            let mut local_max = u8::MIN;
            for y in block_y..y_end {
                for &v in &grid.row(y)[block_x..x_end] {
                    local_min = local_min.min(v);
                    local_max = local_max.max(v);
                }
            }
            let local_range = local_max - local_min;

            let threshold = if local_range < MIN_BLOCK_RANGE {
                global_threshold
            } else if local_range < LOW_BLOCK_RANGE {
                // Faint texture: push the cut toward the dark end so only
                // clearly dark samples become foreground.
                local_min as u16 + local_range as u16 / 4
            } else {
                local_min as u16 + local_range as u16 / 2
            };

            for y in block_y..y_end {
                let row = grid.row(y);
                for x in block_x..x_end {
                    if (row[x] as u16) < threshold {
                        bitmap.set(x, y, true);
                    }
                }
            }
        }
    }

    Ok(bitmap)
}
