//! Format information word: BCH(15,5) protected error level and mask id.

/// Error correction level of a version 1 symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcLevel {
    /// ~7% recovery, 19 data codewords.
    L,
    /// ~15% recovery, 16 data codewords.
    M,
    /// ~25% recovery, 13 data codewords.
    Q,
    /// ~30% recovery, 9 data codewords.
    H,
}

impl EcLevel {
    fn to_bits2(self) -> u16 {
        match self {
            EcLevel::L => 0b01,
            EcLevel::M => 0b00,
            EcLevel::Q => 0b11,
            EcLevel::H => 0b10,
        }
    }
}

const BCH15_5_GEN: u16 = 0x537;
const FORMAT_MASK: u16 = 0x5412;

fn bch_remainder(mut v: u16) -> u16 {
    for shift in (10..=14).rev() {
        if (v >> shift) & 1 == 1 {
            v ^= BCH15_5_GEN << (shift - 10);
        }
    }
    v & 0x03FF
}

/// Encode the masked 15-bit format word for an error level and mask id.
pub fn encode_format_word(ec: EcLevel, mask_id: u8) -> u16 {
    let payload = ((ec.to_bits2() << 3) | (mask_id as u16 & 0x7)) << 10;
    (payload | bch_remainder(payload)) ^ FORMAT_MASK
}

/// Decode a 15-bit format word by nearest valid candidate.
///
/// Tries all 32 valid words (4 levels x 8 masks) and accepts the closest
/// one within Hamming distance 3.
pub fn decode_format_word(word: u16) -> Option<(EcLevel, u8, u32)> {
    const LEVELS: [EcLevel; 4] = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];

    let mut best: Option<(EcLevel, u8, u32)> = None;
    for &ec in &LEVELS {
        for mask in 0u8..8 {
            let d = (encode_format_word(ec, mask) ^ word).count_ones();
            if best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((ec, mask, d));
            }
        }
    }

    best.filter(|&(_, _, d)| d <= 3)
}

/// Module coordinates of the two format word copies, MSB first.
///
/// Track 0 wraps the top-left finder: along row y=8 left to right, then
/// down column x=8, stepping over the timing line at x=6 and y=6. Track 1
/// splits between the bottom-left finder (column x=8, rows 20 down to 14)
/// and the top-right finder (row y=8, columns 13 to 20). The renderer
/// writes both tracks and the reader may use either.
pub const FORMAT_PATHS: [[(usize, usize); 15]; 2] = [
    [
        (0, 8), (1, 8), (2, 8), (3, 8), (4, 8), (5, 8),
        (7, 8), (8, 8),
        (8, 7), (8, 5), (8, 4), (8, 3), (8, 2), (8, 1), (8, 0),
    ],
    [
        (8, 20), (8, 19), (8, 18), (8, 17), (8, 16), (8, 15), (8, 14),
        (13, 8), (14, 8), (15, 8), (16, 8), (17, 8), (18, 8), (19, 8), (20, 8),
    ],
];
