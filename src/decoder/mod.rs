//! Barcode decoding over a binarized frame.
//!
//! [`decode`] is the single entry point: it tries the requested
//! symbologies in order and reports at most one result per frame. The
//! 2-D chain lives in [`qr`]; the 1-D decoders work on horizontal scan
//! lines of the bitmap.

mod code128;
mod ean13;
mod scanline;

pub mod qr;

pub use code128::{render_row as render_code128_row, CodeSet};
pub use ean13::{check_digit as ean13_check_digit, render_row as render_ean13_row};

use thiserror::Error;

use crate::models::BinaryBitmap;

/// Symbol families the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    /// 2-D matrix symbol, version 1.
    Qr,
    /// 13-digit retail code.
    Ean13,
    /// 12-digit retail code; EAN-13 with an implicit leading zero.
    UpcA,
    /// Variable-length alphanumeric 1-D code.
    Code128,
}

/// Why a located symbol could not be read.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Neither format word copy was readable.
    #[error("format information unreadable")]
    FormatUnreadable,
    /// More codeword errors than the EC level can repair.
    #[error("error correction capacity exceeded")]
    EccUncorrectable,
    /// Corrected codewords do not parse as a known segment.
    #[error("payload structure malformed")]
    PayloadMalformed,
}

/// Outcome of one decode attempt over one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbologyResult {
    /// A symbol was read successfully.
    Decoded {
        /// Raw payload bytes; text symbologies yield ASCII.
        bytes: Vec<u8>,
        /// The symbology that produced the payload.
        symbology: Symbology,
    },
    /// No symbol was located in the frame.
    NotFound,
    /// A symbol was located but could not be read.
    DecodeError(DecodeFailure),
}

/// Tuning knobs for a decode attempt.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Scan lines used for 2-D finder search and 1-D row sweeps.
    pub scan_lines: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { scan_lines: 24 }
    }
}

/// Try the requested symbologies against one binarized frame.
///
/// Symbologies are attempted in the caller's order; the first hit wins.
/// Decoding the same bitmap twice yields the same result.
pub fn decode(
    bitmap: &BinaryBitmap,
    symbologies: &[Symbology],
    opts: &DecodeOptions,
) -> SymbologyResult {
    let mut failure: Option<DecodeFailure> = None;

    for &sym in symbologies {
        match sym {
            Symbology::Qr => match qr::decode_bitmap(bitmap, opts.scan_lines) {
                Ok(Some(bytes)) => {
                    return SymbologyResult::Decoded { bytes, symbology: Symbology::Qr };
                }
                Ok(None) => {}
                Err(f) => {
                    failure.get_or_insert(f);
                }
            },
            Symbology::Ean13 | Symbology::UpcA => {
                if let Some(result) = scan_retail_rows(bitmap, sym, symbologies, opts) {
                    return result;
                }
            }
            Symbology::Code128 => {
                for y in scan_row_indices(bitmap.height(), opts.scan_lines) {
                    if let Some(text) = code128::decode_row(&bitmap.row_bits(y)) {
                        return SymbologyResult::Decoded {
                            bytes: text.into_bytes(),
                            symbology: Symbology::Code128,
                        };
                    }
                }
            }
        }
    }

    match failure {
        Some(f) => SymbologyResult::DecodeError(f),
        None => SymbologyResult::NotFound,
    }
}

/// Evenly spread scan row indices over the bitmap height.
fn scan_row_indices(height: usize, scan_lines: usize) -> Vec<usize> {
    if height == 0 {
        return Vec::new();
    }
    let n = scan_lines.clamp(1, height);
    if n == 1 {
        return vec![height / 2];
    }
    let mut rows: Vec<usize> = (0..n).map(|i| i * (height - 1) / (n - 1)).collect();
    rows.dedup();
    rows
}

/// EAN-13 and UPC-A share one detector; classification depends on the
/// leading digit and on which symbologies the caller asked for.
fn scan_retail_rows(
    bitmap: &BinaryBitmap,
    requested: Symbology,
    all: &[Symbology],
    opts: &DecodeOptions,
) -> Option<SymbologyResult> {
    // Avoid scanning twice when both retail symbologies are requested:
    // only the first of the two does the work.
    let first_retail = all
        .iter()
        .find(|s| matches!(s, Symbology::Ean13 | Symbology::UpcA))
        .copied();
    if first_retail != Some(requested) {
        return None;
    }

    let wants_ean = all.contains(&Symbology::Ean13);
    let wants_upc = all.contains(&Symbology::UpcA);

    for y in scan_row_indices(bitmap.height(), opts.scan_lines) {
        let Some(digits) = ean13::decode_row(&bitmap.row_bits(y)) else {
            continue;
        };
        if digits[0] == 0 && wants_upc {
            let bytes = digits[1..].iter().map(|d| b'0' + d).collect();
            return Some(SymbologyResult::Decoded { bytes, symbology: Symbology::UpcA });
        }
        if wants_ean {
            let bytes = digits.iter().map(|d| b'0' + d).collect();
            return Some(SymbologyResult::Decoded { bytes, symbology: Symbology::Ean13 });
        }
        // Only UPC-A was requested but the symbol has a nonzero lead.
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{binarize, BinarizeOptions};

    fn bitmap_from_row(bits: &[bool], height: usize) -> BinaryBitmap {
        let mut bm = BinaryBitmap::new(bits.len(), height);
        for y in 0..height {
            for (x, &b) in bits.iter().enumerate() {
                bm.set(x, y, b);
            }
        }
        bm
    }

    fn widen(bits: &[bool], unit: usize) -> Vec<bool> {
        bits.iter().flat_map(|&b| std::iter::repeat_n(b, unit)).collect()
    }

    #[test]
    fn routes_qr() {
        let modules = qr::encode_modules(b"ROUTE", qr::EcLevel::L, 3).unwrap();
        let luma = qr::render_luma(&modules, 6, 4);
        let bitmap = binarize(&luma, &BinarizeOptions::default()).unwrap();
        let result = decode(&bitmap, &[Symbology::Qr], &DecodeOptions::default());
        assert_eq!(
            result,
            SymbologyResult::Decoded { bytes: b"ROUTE".to_vec(), symbology: Symbology::Qr }
        );
    }

    #[test]
    fn classifies_upc_before_ean() {
        let mut digits = [0u8; 13];
        for (i, b) in "003600029145".bytes().enumerate() {
            digits[i] = b - b'0';
        }
        digits[12] = ean13::check_digit(&digits[..12]);

        let row = widen(&ean13::render_row(&digits, 9), 3);
        let bitmap = bitmap_from_row(&row, 20);

        let both = decode(
            &bitmap,
            &[Symbology::Ean13, Symbology::UpcA],
            &DecodeOptions::default(),
        );
        assert_eq!(
            both,
            SymbologyResult::Decoded {
                bytes: b"036000291452".to_vec(),
                symbology: Symbology::UpcA
            }
        );

        let ean_only = decode(&bitmap, &[Symbology::Ean13], &DecodeOptions::default());
        assert_eq!(
            ean_only,
            SymbologyResult::Decoded {
                bytes: b"0036000291452".to_vec(),
                symbology: Symbology::Ean13
            }
        );
    }

    #[test]
    fn upca_only_ignores_nonzero_lead() {
        let mut digits = [0u8; 13];
        for (i, b) in "400638133393".bytes().enumerate() {
            digits[i] = b - b'0';
        }
        digits[12] = ean13::check_digit(&digits[..12]);
        let row = widen(&ean13::render_row(&digits, 9), 3);
        let bitmap = bitmap_from_row(&row, 10);

        let result = decode(&bitmap, &[Symbology::UpcA], &DecodeOptions::default());
        assert_eq!(result, SymbologyResult::NotFound);
    }

    #[test]
    fn routes_code128() {
        let row = widen(&render_code128_row("AB-12", CodeSet::B, 10).unwrap(), 2);
        let bitmap = bitmap_from_row(&row, 16);
        let result = decode(&bitmap, &[Symbology::Code128], &DecodeOptions::default());
        assert_eq!(
            result,
            SymbologyResult::Decoded { bytes: b"AB-12".to_vec(), symbology: Symbology::Code128 }
        );
    }

    #[test]
    fn empty_frame_is_not_found() {
        let bitmap = BinaryBitmap::new(200, 200);
        let result = decode(
            &bitmap,
            &[Symbology::Qr, Symbology::Ean13, Symbology::Code128],
            &DecodeOptions::default(),
        );
        assert_eq!(result, SymbologyResult::NotFound);
    }

    #[test]
    fn decode_is_idempotent() {
        let modules = qr::encode_modules(b"TWICE", qr::EcLevel::M, 1).unwrap();
        let luma = qr::render_luma(&modules, 6, 4);
        let bitmap = binarize(&luma, &BinarizeOptions::default()).unwrap();
        let opts = DecodeOptions::default();
        let syms = [Symbology::Qr, Symbology::Code128];
        assert_eq!(decode(&bitmap, &syms, &opts), decode(&bitmap, &syms, &opts));
    }
}
