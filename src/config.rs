//! Scan session configuration.

use crate::decoder::{DecodeOptions, Symbology};
use crate::models::CropRect;
use crate::utils::BinarizeOptions;

/// Configuration for a capture session and its per-frame pipeline.
///
/// The crop window is configuration, not frame data: it applies uniformly
/// to every frame of the session.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Symbologies to attempt, in priority order.
    pub symbologies: Vec<Symbology>,
    /// Optional region of interest within each frame.
    pub crop: Option<CropRect>,
    /// Binarizer tuning.
    pub binarize: BinarizeOptions,
    /// Decoder tuning.
    pub decode: DecodeOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            symbologies: vec![
                Symbology::Qr,
                Symbology::Ean13,
                Symbology::UpcA,
                Symbology::Code128,
            ],
            crop: None,
            binarize: BinarizeOptions::default(),
            decode: DecodeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tries_everything() {
        let config = ScanConfig::default();
        assert_eq!(config.symbologies.len(), 4);
        assert!(config.crop.is_none());
    }
}
