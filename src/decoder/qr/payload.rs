//! Codeword packing and byte-mode segment handling for version 1.

use super::format::EcLevel;

/// Version 1 block layout: (data codewords, EC codewords) per level.
pub fn block_layout(ec: EcLevel) -> (usize, usize) {
    match ec {
        EcLevel::L => (19, 7),
        EcLevel::M => (16, 10),
        EcLevel::Q => (13, 13),
        EcLevel::H => (9, 17),
    }
}

/// Maximum byte-mode payload length at a level: mode nibble plus an 8-bit
/// length header cost 12 bits, so two codewords are lost to framing.
pub fn byte_capacity(ec: EcLevel) -> usize {
    block_layout(ec).0 - 2
}

/// Pack MSB-first bits into bytes, zero-padding the tail.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len().div_ceil(8));
    let mut cur: u8 = 0;
    let mut filled = 0;
    for &b in bits {
        cur = (cur << 1) | b as u8;
        filled += 1;
        if filled == 8 {
            out.push(cur);
            cur = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        out.push(cur << (8 - filled));
    }
    out
}

struct BitReader<'a> {
    cw: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(cw: &'a [u8]) -> Self {
        Self { cw, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<u32> {
        if self.pos + n > self.cw.len() * 8 {
            return None;
        }
        let mut v = 0u32;
        for _ in 0..n {
            let bit = (self.cw[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            v = (v << 1) | bit as u32;
            self.pos += 1;
        }
        Some(v)
    }
}

/// Parse a byte-mode segment from corrected data codewords.
///
/// Expects the 4-bit mode indicator 0100, an 8-bit length and the payload
/// bytes. Returns the raw payload without any charset interpretation.
pub fn parse_byte_mode(data_cw: &[u8]) -> Option<Vec<u8>> {
    let mut r = BitReader::new(data_cw);
    let mode = r.take(4)?;
    if mode != 0b0100 {
        return None;
    }
    let len = r.take(8)? as usize;
    if len + 2 > data_cw.len() {
        return None;
    }
    let mut bytes = Vec::with_capacity(len);
    for _ in 0..len {
        bytes.push(r.take(8)? as u8);
    }
    Some(bytes)
}

/// Build the `data_len` data codewords of a byte-mode segment: mode nibble,
/// length, payload, terminator and alternating pad codewords.
pub fn build_data_codewords(payload: &[u8], data_len: usize) -> Vec<u8> {
    debug_assert!(payload.len() + 2 <= data_len);

    let mut bits: Vec<bool> = Vec::with_capacity(data_len * 8);
    for i in (0..4).rev() {
        bits.push((0b0100 >> i) & 1 != 0);
    }
    for i in (0..8).rev() {
        bits.push((payload.len() >> i) & 1 != 0);
    }
    for &b in payload {
        for i in (0..8).rev() {
            bits.push((b >> i) & 1 != 0);
        }
    }

    let capacity_bits = data_len * 8;
    let terminator = capacity_bits.saturating_sub(bits.len()).min(4);
    for _ in 0..terminator {
        bits.push(false);
    }
    while bits.len() % 8 != 0 {
        bits.push(false);
    }

    let mut out = pack_bits(&bits);
    let mut k = 0usize;
    while out.len() < data_len {
        out.push([0xEC, 0x11][k % 2]);
        k += 1;
    }
    out
}
