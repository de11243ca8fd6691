//! Two-dimensional symbol support, version 1 (21x21 modules).
//!
//! The decode chain is: finder pattern localization, perspective grid
//! sampling, format word recovery, unmasked codeword extraction,
//! Reed-Solomon correction and byte-mode parsing. Symbol synthesis for
//! tools and tests lives in [`encode_modules`] and [`render_luma`].

mod finder;
mod format;
mod function;
mod payload;
mod reed_solomon;
mod sample;

mod encode;

pub use encode::{encode_modules, render_luma, EncodeError};
pub use finder::{find_finder_patterns, PointF};
pub use format::EcLevel;

use log::debug;

use super::DecodeFailure;
use crate::models::BinaryBitmap;

/// Attempt to decode one symbol from a binarized frame.
///
/// `Ok(None)` means no symbol was located. An error means a symbol was
/// located but could not be read.
pub fn decode_bitmap(
    bitmap: &BinaryBitmap,
    scan_lines: usize,
) -> Result<Option<Vec<u8>>, DecodeFailure> {
    let finders = finder::find_finder_patterns(bitmap, scan_lines);
    if finders.len() < 3 {
        return Ok(None);
    }

    let Some(grid) = sample::sample_grid(bitmap, &finders) else {
        return Ok(None);
    };

    let (ec, mask_id) = read_format(&grid).ok_or(DecodeFailure::FormatUnreadable)?;
    debug!("qr: format ec={ec:?} mask={mask_id}");

    let bits = function::extract_codeword_bits(&grid, mask_id);
    let mut codewords = payload::pack_bits(&bits);

    let (data_len, ec_len) = payload::block_layout(ec);
    let corrected = reed_solomon::correct_block(&mut codewords, data_len, ec_len)
        .ok_or(DecodeFailure::EccUncorrectable)?;
    if corrected > 0 {
        debug!("qr: corrected {corrected} codewords");
    }

    payload::parse_byte_mode(&codewords[..data_len])
        .map(Some)
        .ok_or(DecodeFailure::PayloadMalformed)
}

/// Read the format word from either copy, preferring the closer match.
fn read_format(grid: &BinaryBitmap) -> Option<(EcLevel, u8)> {
    let mut best: Option<(EcLevel, u8, u32)> = None;
    for path in &format::FORMAT_PATHS {
        let mut word = 0u16;
        for &(x, y) in path {
            word = (word << 1) | grid.get(x, y) as u16;
        }
        if let Some((ec, mask, dist)) = format::decode_format_word(word) {
            if best.is_none_or(|(_, _, bd)| dist < bd) {
                best = Some((ec, mask, dist));
            }
        }
    }
    best.map(|(ec, mask, _)| (ec, mask))
}
