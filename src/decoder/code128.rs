//! Code 128 scan line decoder and row synthesis.
//!
//! The decoder anchors on the stop pattern (seven runs summing to 13
//! modules) and walks backwards in six-run symbols until it meets one of
//! the three start codes. Anchoring at the stop end removes the ambiguity
//! of where the first symbol begins in a noisy run sequence. Code sets
//! A, B and C are supported, including SHIFT and FNC1.

use crate::decoder::scanline::runs;

/// Symbol patterns 0..=105, six run widths each, summing to 11 modules.
const PATTERNS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214",
    "211232",
];

/// Stop pattern, seven runs summing to 13 modules.
const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

/// Code 128 character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    /// Upper case, control characters.
    A,
    /// Full printable ASCII.
    B,
    /// Digit pairs.
    C,
}

impl CodeSet {
    fn start_code(self) -> usize {
        match self {
            CodeSet::A => 103,
            CodeSet::B => 104,
            CodeSet::C => 105,
        }
    }
}

/// Decode one row, returning the payload text on success.
pub fn decode_row(bits: &[bool]) -> Option<String> {
    let rl = runs(bits);
    // Start, one data symbol, checksum and stop need 25 runs minimum.
    if rl.len() < 25 {
        return None;
    }
    let starts_dark = bits[0];
    let dark_at = |idx: usize| -> bool {
        if starts_dark { idx % 2 == 0 } else { idx % 2 == 1 }
    };

    let patterns = pattern_table();

    // Try every plausible stop anchor; data windows occasionally imitate
    // the stop signature, so a failed walk-back is not fatal.
    for i in 6..=rl.len() - 7 {
        if !dark_at(i) {
            continue;
        }
        if pat_dist(&normalize_window::<7>(&rl[i..i + 7], 13), &STOP) > 1 {
            continue;
        }
        if let Some(text) = decode_from_stop(&rl, i, &patterns) {
            return Some(text);
        }
    }
    None
}

/// Walk backwards from a stop anchor in six-run symbols until a start
/// code appears, then verify the checksum and translate.
fn decode_from_stop(rl: &[usize], stop_i: usize, patterns: &[[u8; 6]; 106]) -> Option<String> {
    let mut idx = stop_i;
    let mut values_rev: Vec<u8> = Vec::new();
    let mut start_set = None;
    while idx >= 6 {
        let win = normalize_window::<6>(&rl[idx - 6..idx], 11);
        let (val, dist) = best_symbol(&win, patterns);
        if dist > 1 {
            return None;
        }
        match val {
            103 => {
                start_set = Some(CodeSet::A);
                break;
            }
            104 => {
                start_set = Some(CodeSet::B);
                break;
            }
            105 => {
                start_set = Some(CodeSet::C);
                break;
            }
            v => values_rev.push(v as u8),
        }
        idx -= 6;
    }
    let start_set = start_set?;
    if values_rev.is_empty() {
        return None;
    }

    values_rev.reverse();
    let values = values_rev;

    // Checksum is the last symbol, mod 103 over start code and payload.
    let n = values.len() - 1;
    let mut sum = start_set.start_code() as u32;
    for (i, &v) in values[..n].iter().enumerate() {
        sum = sum.wrapping_add(v as u32 * (i as u32 + 1));
    }
    if sum % 103 != values[n] as u32 {
        return None;
    }

    values_to_text(&values[..n], start_set)
}

fn values_to_text(vals: &[u8], mut set: CodeSet) -> Option<String> {
    let mut out = String::new();
    let mut shifted = false;

    for &v in vals {
        let v = v as u32;
        let effective = if shifted {
            match set {
                CodeSet::A => CodeSet::B,
                CodeSet::B => CodeSet::A,
                CodeSet::C => CodeSet::C,
            }
        } else {
            set
        };
        shifted = false;

        match effective {
            CodeSet::A => match v {
                0..=63 => out.push((v as u8 + 32) as char),
                64..=95 => out.push((v as u8 - 64) as char),
                96 | 97 => {} // FNC3 / FNC2
                98 => shifted = true,
                99 => set = CodeSet::C,
                100 => set = CodeSet::B,
                101 => {}
                102 => out.push(29u8 as char), // FNC1 -> GS
                _ => return None,
            },
            CodeSet::B => match v {
                0..=95 => out.push((v as u8 + 32) as char),
                96 | 97 => {}
                98 => shifted = true,
                99 => set = CodeSet::C,
                100 => {}
                101 => set = CodeSet::A,
                102 => out.push(29u8 as char),
                _ => return None,
            },
            CodeSet::C => match v {
                0..=99 => {
                    out.push(char::from(b'0' + (v / 10) as u8));
                    out.push(char::from(b'0' + (v % 10) as u8));
                }
                100 => set = CodeSet::B,
                101 => set = CodeSet::A,
                102 => out.push(29u8 as char),
                _ => return None,
            },
        }
    }
    Some(out)
}

fn pattern_table() -> [[u8; 6]; 106] {
    let mut out = [[0u8; 6]; 106];
    for (i, s) in PATTERNS.iter().enumerate() {
        let b = s.as_bytes();
        for k in 0..6 {
            out[i][k] = b[k] - b'0';
        }
    }
    out
}

/// Scale a run window to the target module sum, nudging the result until
/// the widths add up exactly.
fn normalize_window<const N: usize>(slice: &[usize], target: i32) -> [u8; N] {
    debug_assert_eq!(slice.len(), N);
    let sum: usize = slice.iter().sum();
    let scale = sum as f32 / target as f32;
    let mut out = [0u8; N];
    for (k, &w) in slice.iter().enumerate() {
        out[k] = ((w as f32 / scale).round() as i32).clamp(1, 4) as u8;
    }

    let mut total: i32 = out.iter().map(|&x| x as i32).sum();
    while total != target {
        if total > target {
            let Some((i, _)) = out.iter().enumerate().rev().max_by_key(|&(_, &x)| x) else {
                break;
            };
            if out[i] <= 1 {
                break;
            }
            out[i] -= 1;
            total -= 1;
        } else {
            let Some((i, _)) = out.iter().enumerate().min_by_key(|&(_, &x)| x) else {
                break;
            };
            if out[i] >= 4 {
                break;
            }
            out[i] += 1;
            total += 1;
        }
    }
    out
}

fn pat_dist(p: &[u8], q: &[u8]) -> u32 {
    p.iter()
        .zip(q)
        .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
        .sum()
}

fn best_symbol(pat: &[u8; 6], patterns: &[[u8; 6]; 106]) -> (usize, u32) {
    let mut best = (0usize, u32::MAX);
    for (i, q) in patterns.iter().enumerate() {
        let d = pat_dist(pat, q);
        if d < best.1 {
            best = (i, d);
            if d == 0 {
                break;
            }
        }
    }
    best
}

/// Encode `text` into symbol values for a code set, without checksum.
fn encode_values(text: &str, set: CodeSet) -> Option<Vec<usize>> {
    let mut codes = vec![set.start_code()];
    match set {
        CodeSet::A => {
            for ch in text.chars() {
                let b = ch as u32;
                match b {
                    32..=95 => codes.push((b - 32) as usize),
                    0..=31 => codes.push((b + 64) as usize),
                    _ => return None,
                }
            }
        }
        CodeSet::B => {
            for ch in text.chars() {
                let b = ch as u32;
                if !(32..=127).contains(&b) {
                    return None;
                }
                codes.push((b - 32) as usize);
            }
        }
        CodeSet::C => {
            let bytes = text.as_bytes();
            if bytes.len() % 2 != 0 || !bytes.iter().all(u8::is_ascii_digit) {
                return None;
            }
            for pair in bytes.chunks_exact(2) {
                codes.push((pair[0] - b'0') as usize * 10 + (pair[1] - b'0') as usize);
            }
        }
    }
    Some(codes)
}

/// Render text to a module-resolution row of bits (dark=true) with quiet
/// zones, or `None` if the text does not fit the code set.
pub fn render_row(text: &str, set: CodeSet, quiet: usize) -> Option<Vec<bool>> {
    let codes = encode_values(text, set)?;

    let mut sum = codes[0] as u32;
    for (i, &v) in codes.iter().enumerate().skip(1) {
        sum += v as u32 * i as u32;
    }
    let check = (sum % 103) as usize;

    let patterns = pattern_table();
    let mut out = Vec::new();
    out.extend(std::iter::repeat_n(false, quiet.max(1)));
    let mut dark = true;
    for &code in codes.iter().chain(std::iter::once(&check)) {
        for &w in &patterns[code] {
            out.extend(std::iter::repeat_n(dark, w as usize));
            dark = !dark;
        }
    }
    for &w in &STOP {
        out.extend(std::iter::repeat_n(dark, w as usize));
        dark = !dark;
    }
    out.extend(std::iter::repeat_n(false, quiet.max(1)));
    Some(out)
}
