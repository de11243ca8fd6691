//! EAN-13 / UPC-A scan line decoder.
//!
//! One binarized row is turned into run lengths, the runs are normalized
//! to module widths, and the guard / digit structure is matched against
//! the A/B/C width tables. UPC-A is EAN-13 with a leading zero; the
//! caller decides how to report it.

use crate::decoder::scanline::{normalize_modules, runs};

/// Left "A" digit patterns, four runs summing to 7 modules.
const A_PATTERNS: [(u8, u8, u8, u8); 10] = [
    (3, 2, 1, 1),
    (2, 2, 2, 1),
    (2, 1, 2, 2),
    (1, 4, 1, 1),
    (1, 1, 3, 2),
    (1, 2, 3, 1),
    (1, 1, 1, 4),
    (1, 3, 1, 2),
    (1, 2, 1, 3),
    (3, 1, 1, 2),
];

/// Left "B" patterns, the run-wise mirror of A.
const B_PATTERNS: [(u8, u8, u8, u8); 10] = [
    (1, 1, 2, 3),
    (1, 2, 2, 2),
    (2, 2, 1, 2),
    (1, 1, 4, 1),
    (2, 3, 1, 1),
    (1, 3, 2, 1),
    (4, 1, 1, 1),
    (2, 1, 3, 1),
    (3, 1, 2, 1),
    (2, 1, 1, 3),
];

/// Right-side patterns share the A widths.
const C_PATTERNS: [(u8, u8, u8, u8); 10] = A_PATTERNS;

/// A/B parity of the six left digits determines the first digit.
/// true = B.
const FIRST_DIGIT_MASKS: [[bool; 6]; 10] = [
    [false, false, false, false, false, false],
    [false, false, true, false, true, true],
    [false, false, true, true, false, true],
    [false, false, true, true, true, false],
    [false, true, false, false, true, true],
    [false, true, true, false, false, true],
    [false, true, true, true, false, false],
    [false, true, false, true, false, true],
    [false, true, false, true, true, false],
    [false, true, true, false, true, false],
];

/// Decode one row into thirteen digits, or `None` if no symbol is found.
pub fn decode_row(bits: &[bool]) -> Option<[u8; 13]> {
    let rl = runs(bits);
    // 59 bars and spaces plus surrounding quiet runs.
    if rl.len() < 59 {
        return None;
    }
    let modules = normalize_modules(&rl);
    let starts_dark = bits[0];
    let dark_at = |idx: usize| -> bool {
        if starts_dark { idx % 2 == 0 } else { idx % 2 == 1 }
    };

    let start = find_start_guard(&modules, &dark_at)?;
    let mut idx = start + 3;

    let mut left_digits = [0u8; 6];
    let mut left_is_b = [false; 6];
    for d in 0..6 {
        if idx + 3 >= modules.len() {
            return None;
        }
        let pat = (modules[idx], modules[idx + 1], modules[idx + 2], modules[idx + 3]);
        let (digit_a, dist_a) = best_match(pat, &A_PATTERNS);
        let (digit_b, dist_b) = best_match(pat, &B_PATTERNS);
        if dist_a.min(dist_b) > MAX_DIGIT_DIST {
            return None;
        }
        if dist_a <= dist_b {
            left_digits[d] = digit_a;
        } else {
            left_digits[d] = digit_b;
            left_is_b[d] = true;
        }
        idx += 4;
    }

    // Center guard: five single-module runs starting light.
    if idx + 4 >= modules.len() || modules[idx..idx + 5].iter().any(|&m| m != 1) {
        return None;
    }
    idx += 5;

    let mut right_digits = [0u8; 6];
    for d in 0..6 {
        if idx + 3 >= modules.len() {
            return None;
        }
        let pat = (modules[idx], modules[idx + 1], modules[idx + 2], modules[idx + 3]);
        let (digit, dist) = best_match(pat, &C_PATTERNS);
        if dist > MAX_DIGIT_DIST {
            return None;
        }
        right_digits[d] = digit;
        idx += 4;
    }

    // End guard.
    if idx + 2 >= modules.len()
        || modules[idx] != 1
        || modules[idx + 1] != 1
        || modules[idx + 2] != 1
        || !dark_at(idx)
    {
        return None;
    }

    let first = deduce_first_digit(&left_is_b)?;
    let mut digits = [0u8; 13];
    digits[0] = first;
    digits[1..7].copy_from_slice(&left_digits);
    digits[7..13].copy_from_slice(&right_digits);

    if !checksum_ok(&digits) {
        return None;
    }
    Some(digits)
}

/// Worst total width error still accepted as a digit match. Anything
/// farther is treated as not-a-symbol rather than the nearest digit.
const MAX_DIGIT_DIST: u32 = 1;

/// Dark 1-1-1 run triple preceded by a quiet stretch.
fn find_start_guard(m: &[u8], dark_at: &impl Fn(usize) -> bool) -> Option<usize> {
    for i in 1..m.len().saturating_sub(2) {
        if !dark_at(i) {
            continue;
        }
        if m[i] == 1 && m[i + 1] == 1 && m[i + 2] == 1 && m[i - 1] >= 3 {
            return Some(i);
        }
    }
    None
}

fn best_match(pat: (u8, u8, u8, u8), dict: &[(u8, u8, u8, u8); 10]) -> (u8, u32) {
    let mut best = (0u8, u32::MAX);
    for (i, &q) in dict.iter().enumerate() {
        let d = pat_dist(pat, q);
        if d < best.1 {
            best = (i as u8, d);
        }
    }
    best
}

fn pat_dist(p: (u8, u8, u8, u8), q: (u8, u8, u8, u8)) -> u32 {
    (p.0 as i32 - q.0 as i32).unsigned_abs()
        + (p.1 as i32 - q.1 as i32).unsigned_abs()
        + (p.2 as i32 - q.2 as i32).unsigned_abs()
        + (p.3 as i32 - q.3 as i32).unsigned_abs()
}

fn deduce_first_digit(is_b: &[bool; 6]) -> Option<u8> {
    FIRST_DIGIT_MASKS
        .iter()
        .position(|mask| mask == is_b)
        .map(|d| d as u8)
}

fn checksum_ok(d: &[u8; 13]) -> bool {
    let mut sum = 0u32;
    for (i, &digit) in d.iter().take(12).enumerate() {
        let w = if i % 2 == 0 { 1 } else { 3 };
        sum += digit as u32 * w;
    }
    (10 - sum % 10) % 10 == d[12] as u32
}

/// Compute the EAN-13 check digit for the first twelve digits.
pub fn check_digit(d12: &[u8]) -> u8 {
    let mut sum = 0u32;
    for (i, &digit) in d12.iter().take(12).enumerate() {
        let w = if i % 2 == 0 { 1 } else { 3 };
        sum += digit as u32 * w;
    }
    ((10 - sum % 10) % 10) as u8
}

/// Render thirteen digits to a module-resolution row of bits (dark=true),
/// with `quiet` light modules on both ends. The check digit is taken as
/// given; callers wanting a valid symbol compute it via [`check_digit`].
pub fn render_row(digits: &[u8; 13], quiet: usize) -> Vec<bool> {
    let mask = FIRST_DIGIT_MASKS[digits[0] as usize];

    let mut modules: Vec<(u8, bool)> = Vec::new(); // (width, dark)
    modules.push((quiet.max(1) as u8, false));
    modules.extend([(1, true), (1, false), (1, true)]);

    for i in 0..6 {
        let d = digits[1 + i] as usize;
        let (a, b, c, w) = if mask[i] { B_PATTERNS[d] } else { A_PATTERNS[d] };
        // Left digits start with a space.
        modules.extend([(a, false), (b, true), (c, false), (w, true)]);
    }

    modules.extend([(1, false), (1, true), (1, false), (1, true), (1, false)]);

    for i in 0..6 {
        let (a, b, c, w) = C_PATTERNS[digits[7 + i] as usize];
        // Right digits start with a bar.
        modules.extend([(a, true), (b, false), (c, true), (w, false)]);
    }

    modules.extend([(1, true), (1, false), (1, true)]);
    modules.push((quiet.max(1) as u8, false));

    let mut out = Vec::new();
    for (w, dark) in modules {
        out.extend(std::iter::repeat_n(dark, w as usize));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_of(s: &str) -> [u8; 13] {
        let mut d = [0u8; 13];
        for (i, b) in s.bytes().enumerate() {
            d[i] = b - b'0';
        }
        d
    }

    fn widen(bits: &[bool], unit: usize) -> Vec<bool> {
        bits.iter().flat_map(|&b| std::iter::repeat_n(b, unit)).collect()
    }

    #[test]
    fn roundtrips_known_ean() {
        let digits = digits_of("4006381333931");
        let row = widen(&render_row(&digits, 9), 3);
        assert_eq!(decode_row(&row), Some(digits));
    }

    #[test]
    fn roundtrips_upc_shape() {
        // UPC-A 036000291452 as EAN-13 with leading zero.
        let digits = digits_of("0036000291452");
        let row = widen(&render_row(&digits, 9), 2);
        assert_eq!(decode_row(&row), Some(digits));
    }

    #[test]
    fn bad_check_digit_is_rejected() {
        let mut digits = digits_of("4006381333931");
        digits[12] = (digits[12] + 1) % 10;
        let row = widen(&render_row(&digits, 9), 3);
        assert_eq!(decode_row(&row), None);
    }

    #[test]
    fn noise_row_is_rejected() {
        let row: Vec<bool> = (0..300).map(|i| i % 2 == 0).collect();
        assert_eq!(decode_row(&row), None);
    }

    #[test]
    fn stripes_with_quiet_margins_are_rejected() {
        // Guard-shaped leading runs, but every digit window is a uniform
        // stripe far from any width pattern.
        let mut row = vec![false; 12];
        row.extend((0..80).map(|i| i % 2 == 0));
        row.extend(std::iter::repeat_n(false, 12));
        assert_eq!(decode_row(&widen(&row, 3)), None);
    }

    #[test]
    fn check_digit_matches_reference() {
        assert_eq!(check_digit(&digits_of("4006381333931")[..12]), 1);
        assert_eq!(check_digit(&digits_of("0036000291452")[..12]), 2);
    }
}
