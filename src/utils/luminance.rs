//! Luminance extraction from captured frames.
//!
//! Every supported pixel layout is reduced to the same dense 8-bit grid so
//! the rest of the pipeline never has to care about the camera's native
//! format. Rows are converted in parallel with rayon.

use rayon::prelude::*;
use thiserror::Error;

use crate::models::{CropRect, FrameBufferView, LuminanceGrid, PixelFormat};

/// Rejection reasons for a frame whose geometry does not add up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Row stride is smaller than one row of pixels.
    #[error("stride {stride} too small for width {width} ({bytes_per_sample} bytes/sample)")]
    StrideTooSmall {
        /// Declared row stride in bytes.
        stride: usize,
        /// Frame width in pixels.
        width: usize,
        /// Bytes per sample for the frame's format.
        bytes_per_sample: usize,
    },
    /// Crop rectangle extends past the frame edge.
    #[error("crop {crop_width}x{crop_height}+{crop_x}+{crop_y} outside {width}x{height} frame")]
    CropOutOfBounds {
        /// Crop left edge.
        crop_x: usize,
        /// Crop top edge.
        crop_y: usize,
        /// Crop width.
        crop_width: usize,
        /// Crop height.
        crop_height: usize,
        /// Frame width.
        width: usize,
        /// Frame height.
        height: usize,
    },
    /// Pixel buffer is shorter than the declared geometry requires.
    #[error("buffer of {actual} bytes, need at least {required}")]
    BufferTooSmall {
        /// Bytes the declared geometry requires.
        required: usize,
        /// Bytes actually present.
        actual: usize,
    },
}

/// Convert a frame view to a luminance grid, optionally restricted to a crop
/// window.
///
/// YUV layouts read the leading luma plane directly; RGB rows are reduced
/// with integer BT.601-style weights. The returned grid is tightly packed
/// regardless of the source stride.
pub fn luminance_grid(
    frame: &FrameBufferView<'_>,
    crop: Option<CropRect>,
) -> Result<LuminanceGrid, GeometryError> {
    let bps = frame.format.bytes_per_sample();
    if frame.stride < frame.width * bps {
        return Err(GeometryError::StrideTooSmall {
            stride: frame.stride,
            width: frame.width,
            bytes_per_sample: bps,
        });
    }

    let region = match crop {
        Some(c) => {
            if !c.fits(frame.width, frame.height) {
                return Err(GeometryError::CropOutOfBounds {
                    crop_x: c.x,
                    crop_y: c.y,
                    crop_width: c.width,
                    crop_height: c.height,
                    width: frame.width,
                    height: frame.height,
                });
            }
            c
        }
        None => CropRect {
            x: 0,
            y: 0,
            width: frame.width,
            height: frame.height,
        },
    };

    // Only the luma plane is required, so the last row may be short of a
    // full stride as long as its pixels are present.
    let required = if frame.height == 0 {
        0
    } else {
        (frame.height - 1) * frame.stride + frame.width * bps
    };
    if frame.data.len() < required {
        return Err(GeometryError::BufferTooSmall {
            required,
            actual: frame.data.len(),
        });
    }

    // A zero-sized region has nothing to convert; the binarizer rejects
    // the empty grid downstream.
    if region.width == 0 || region.height == 0 {
        return Ok(LuminanceGrid::from_raw(region.width, region.height, Vec::new()));
    }

    let mut out = vec![0u8; region.width * region.height];
    match frame.format {
        PixelFormat::Gray8 | PixelFormat::Nv12 | PixelFormat::Yuv420 => {
            out.par_chunks_mut(region.width)
                .enumerate()
                .for_each(|(dy, dest)| {
                    let src_start = (region.y + dy) * frame.stride + region.x;
                    dest.copy_from_slice(&frame.data[src_start..src_start + region.width]);
                });
        }
        PixelFormat::Rgb24 => {
            out.par_chunks_mut(region.width)
                .enumerate()
                .for_each(|(dy, dest)| {
                    let src_start = (region.y + dy) * frame.stride + region.x * 3;
                    let src = &frame.data[src_start..src_start + region.width * 3];
                    for (d, px) in dest.iter_mut().zip(src.chunks_exact(3)) {
                        let r = px[0] as u32;
                        let g = px[1] as u32;
                        let b = px[2] as u32;
                        *d = ((76 * r + 150 * g + 29 * b) >> 8) as u8;
                    }
                });
        }
    }

    Ok(LuminanceGrid::from_raw(region.width, region.height, out))
}
