//! Run-length helpers shared by the 1-D scan line decoders.

/// Run lengths of a boolean row, first run first. The caller tracks the
/// color of run 0 separately.
pub fn runs(bits: &[bool]) -> Vec<usize> {
    if bits.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cur = bits[0];
    let mut len = 1usize;
    for &b in &bits[1..] {
        if b == cur {
            len += 1;
        } else {
            out.push(len);
            cur = b;
            len = 1;
        }
    }
    out.push(len);
    out
}

/// Normalize run lengths to nominal module widths in 1..=4.
///
/// The base module width is estimated from the lower quartile of the run
/// widths, which is robust against wide quiet-zone runs.
pub fn normalize_modules(rl: &[usize]) -> Vec<u8> {
    if rl.is_empty() {
        return Vec::new();
    }
    let mut sorted = rl.to_vec();
    sorted.sort_unstable();
    let base = sorted[sorted.len() / 4].max(1);
    rl.iter()
        .map(|&w| ((w + base / 2) / base).clamp(1, 4) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_of_mixed_row() {
        let bits = [false, false, true, true, true, false];
        assert_eq!(runs(&bits), vec![2, 3, 1]);
    }

    #[test]
    fn module_widths_scale_with_base() {
        let rl = vec![9, 3, 3, 6, 3, 12, 9];
        assert_eq!(normalize_modules(&rl), vec![3, 1, 1, 2, 1, 4, 3]);
    }

    #[test]
    fn wide_runs_clamp_to_four() {
        let rl = vec![30, 3, 3, 3];
        assert_eq!(normalize_modules(&rl), vec![4, 1, 1, 1]);
    }
}
