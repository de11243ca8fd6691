//! Per-frame processing: luminance, binarization, decode.
//!
//! One normalized path for every frame regardless of pixel format or
//! source. Frames that cannot be processed are skipped with a reason;
//! skipping never ends the session.

use log::debug;

use crate::config::ScanConfig;
use crate::decoder::{self, DecodeFailure, Symbology, SymbologyResult};
use crate::models::FrameBufferView;
use crate::utils::{binarize, luminance_grid, BinarizeError, GeometryError};

/// Why a frame was skipped without a decode attempt finishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoftFailure {
    /// Frame geometry did not add up; the frame is dropped.
    Geometry(GeometryError),
    /// Not enough dynamic range to threshold.
    LowContrast {
        /// Observed max minus min luminance.
        range: u8,
    },
    /// The frame or crop window has no pixels.
    EmptyFrame,
    /// A symbol was located but could not be read.
    Undecodable(DecodeFailure),
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A symbol was decoded.
    Decoded {
        /// Raw payload bytes.
        bytes: Vec<u8>,
        /// Symbology that matched.
        symbology: Symbology,
    },
    /// The frame was clean but held no symbol.
    NotFound,
    /// The frame was skipped; scanning continues.
    Skipped(SoftFailure),
}

/// Run the full pipeline on one frame.
pub fn process_frame(frame: &FrameBufferView<'_>, config: &ScanConfig) -> FrameOutcome {
    let grid = match luminance_grid(frame, config.crop) {
        Ok(grid) => grid,
        Err(err) => {
            debug!("frame skipped: {err}");
            return FrameOutcome::Skipped(SoftFailure::Geometry(err));
        }
    };

    let bitmap = match binarize(&grid, &config.binarize) {
        Ok(bitmap) => bitmap,
        Err(BinarizeError::InsufficientContrast { range }) => {
            debug!("frame skipped: dynamic range {range}");
            return FrameOutcome::Skipped(SoftFailure::LowContrast { range });
        }
        Err(BinarizeError::EmptyGrid) => {
            debug!("frame skipped: empty frame");
            return FrameOutcome::Skipped(SoftFailure::EmptyFrame);
        }
    };

    match decoder::decode(&bitmap, &config.symbologies, &config.decode) {
        SymbologyResult::Decoded { bytes, symbology } => {
            FrameOutcome::Decoded { bytes, symbology }
        }
        SymbologyResult::NotFound => FrameOutcome::NotFound,
        SymbologyResult::DecodeError(f) => FrameOutcome::Skipped(SoftFailure::Undecodable(f)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::qr::{encode_modules, render_luma, EcLevel};
    use crate::models::CropRect;

    #[test]
    fn decodes_a_rendered_symbol() {
        let modules = encode_modules(b"PIPELINE", EcLevel::L, 3).unwrap();
        let luma = render_luma(&modules, 6, 4);
        let frame = FrameBufferView::gray(luma.samples(), luma.width(), luma.height());

        let outcome = process_frame(&frame, &ScanConfig::default());
        assert_eq!(
            outcome,
            FrameOutcome::Decoded { bytes: b"PIPELINE".to_vec(), symbology: Symbology::Qr }
        );
    }

    #[test]
    fn uniform_frame_is_skipped_as_low_contrast() {
        let data = vec![128u8; 64 * 64];
        let frame = FrameBufferView::gray(&data, 64, 64);
        assert_eq!(
            process_frame(&frame, &ScanConfig::default()),
            FrameOutcome::Skipped(SoftFailure::LowContrast { range: 0 })
        );
    }

    #[test]
    fn zero_sized_frame_is_skipped_as_empty() {
        let frame = FrameBufferView::gray(&[], 0, 0);
        assert_eq!(
            process_frame(&frame, &ScanConfig::default()),
            FrameOutcome::Skipped(SoftFailure::EmptyFrame)
        );
    }

    #[test]
    fn zero_width_frame_is_skipped_not_a_panic() {
        let frame = FrameBufferView::gray(&[], 0, 480);
        assert_eq!(
            process_frame(&frame, &ScanConfig::default()),
            FrameOutcome::Skipped(SoftFailure::EmptyFrame)
        );
    }

    #[test]
    fn bad_crop_is_skipped_as_geometry() {
        let data = vec![0u8; 64 * 64];
        let frame = FrameBufferView::gray(&data, 64, 64);
        let config = ScanConfig {
            crop: Some(CropRect { x: 60, y: 60, width: 20, height: 20 }),
            ..ScanConfig::default()
        };
        assert!(matches!(
            process_frame(&frame, &config),
            FrameOutcome::Skipped(SoftFailure::Geometry(_))
        ));
    }

    #[test]
    fn contrasty_but_empty_frame_is_not_found() {
        // Half dark, half light, no symbol.
        let mut data = vec![255u8; 128 * 128];
        for v in &mut data[..128 * 64] {
            *v = 0;
        }
        let frame = FrameBufferView::gray(&data, 128, 128);
        assert_eq!(process_frame(&frame, &ScanConfig::default()), FrameOutcome::NotFound);
    }

    #[test]
    fn crop_can_isolate_the_symbol() {
        let modules = encode_modules(b"CROPPED", EcLevel::L, 3).unwrap();
        let luma = render_luma(&modules, 6, 4);
        let side = luma.width();

        // Embed in a larger canvas with a dark border that would confuse
        // nothing, then crop back to the symbol.
        let canvas_w = side + 80;
        let canvas_h = side + 80;
        let mut data = vec![255u8; canvas_w * canvas_h];
        for y in 0..side {
            let src = luma.row(y);
            let dst = (y + 40) * canvas_w + 40;
            data[dst..dst + side].copy_from_slice(src);
        }
        let frame = FrameBufferView::gray(&data, canvas_w, canvas_h);

        let config = ScanConfig {
            crop: Some(CropRect { x: 40, y: 40, width: side, height: side }),
            ..ScanConfig::default()
        };
        assert_eq!(
            process_frame(&frame, &config),
            FrameOutcome::Decoded { bytes: b"CROPPED".to_vec(), symbology: Symbology::Qr }
        );
    }
}
