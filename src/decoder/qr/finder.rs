//! Finder pattern localization on the binarized frame.
//!
//! Horizontal scan lines look for the 1:1:3:1:1 dark/light run signature;
//! each horizontal hit is cross-checked along its column and along the
//! main diagonal, which rejects stripes and blobs that only look right in
//! one direction and refines the vertical center. Surviving candidates are
//! clustered, and the pattern centers are the cluster triple whose layout
//! matches the two-equal-sides corner geometry of a real symbol.

use log::debug;

use crate::models::BinaryBitmap;

/// A point in fractional pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointF {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl PointF {
    /// Squared euclidean distance.
    #[inline]
    pub fn dist2(self, other: PointF) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Run lengths of a boolean sequence, first run first.
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

fn is_finder_ratio(win: &[usize; 5]) -> bool {
    let sum: usize = win.iter().sum();
    if sum == 0 {
        return false;
    }
    let module = sum as f32 / 7.0;
    let expected = [1.0, 1.0, 3.0, 1.0, 1.0];
    let mut err = 0.0f32;
    for i in 0..5 {
        err += ((win[i] as f32) - expected[i] * module).abs() / module;
    }
    err <= 1.6
}

/// Scan a run sequence for finder windows. `dark_first` tells the color of
/// run index 0. Yields (center_offset, window_sum) pairs.
fn finder_windows(rl: &[usize], dark_first: bool) -> Vec<(f32, usize)> {
    let mut out = Vec::new();
    if rl.len() < 5 {
        return out;
    }

    let mut prefix = Vec::with_capacity(rl.len() + 1);
    prefix.push(0usize);
    for &w in rl {
        prefix.push(prefix[prefix.len() - 1] + w);
    }

    let dark_at = |idx: usize| -> bool {
        if dark_first { idx % 2 == 0 } else { idx % 2 == 1 }
    };

    for r0 in 0..=rl.len() - 5 {
        if !dark_at(r0) {
            continue;
        }
        let win = [rl[r0], rl[r0 + 1], rl[r0 + 2], rl[r0 + 3], rl[r0 + 4]];
        if is_finder_ratio(&win) {
            let center = (prefix[r0] + win[0] + win[1]) as f32 + win[2] as f32 / 2.0;
            out.push((center, win.iter().sum()));
        }
    }
    out
}

/// Cross-check a horizontal hit by scanning the column through it. Returns
/// the refined vertical center and the vertical window sum if the column
/// shows the same signature around `y`.
fn cross_check_column(bitmap: &BinaryBitmap, x: usize, y: usize) -> Option<(f32, usize)> {
    let col = bitmap.col_bits(x);
    let rl = runs(&col);
    let dark_first = col.first().copied().unwrap_or(false);

    // Locate the run containing y.
    let mut acc = 0usize;
    let mut run_idx = None;
    for (i, &w) in rl.iter().enumerate() {
        if y < acc + w {
            run_idx = Some(i);
            break;
        }
        acc += w;
    }
    let center_run = run_idx?;
    if center_run < 2 || center_run + 2 >= rl.len() {
        return None;
    }

    let dark_at = |idx: usize| -> bool {
        if dark_first { idx % 2 == 0 } else { idx % 2 == 1 }
    };
    let r0 = center_run - 2;
    if !dark_at(r0) {
        return None;
    }
    let win = [rl[r0], rl[r0 + 1], rl[r0 + 2], rl[r0 + 3], rl[r0 + 4]];
    if !is_finder_ratio(&win) {
        return None;
    }

    let start: usize = rl[..r0].iter().sum();
    let center = (start + win[0] + win[1]) as f32 + win[2] as f32 / 2.0;
    Some((center, win.iter().sum()))
}

/// Confirm the 1:1:3:1:1 signature along the main diagonal through a
/// candidate center. The outer dark runs may end at the image border.
fn cross_check_diagonal(bitmap: &BinaryBitmap, cx: usize, cy: usize) -> bool {
    let w = bitmap.width() as isize;
    let h = bitmap.height() as isize;
    let at = |step: isize| -> Option<bool> {
        let x = cx as isize + step;
        let y = cy as isize + step;
        if x < 0 || y < 0 || x >= w || y >= h {
            return None;
        }
        Some(bitmap.get(x as usize, y as usize))
    };

    let mut counts = [0usize; 5];

    // Up-left half: dark core, light ring, dark border.
    let mut i = 0isize;
    for state in [2usize, 1, 0] {
        let want_dark = state != 1;
        while at(-i) == Some(want_dark) {
            counts[state] += 1;
            i += 1;
        }
        if counts[state] == 0 {
            return false;
        }
    }

    // Down-right half: the core run continues, then light ring and border.
    let mut i = 1isize;
    for state in [2usize, 3, 4] {
        let want_dark = state != 3;
        while at(i) == Some(want_dark) {
            counts[state] += 1;
            i += 1;
        }
        if state != 2 && counts[state] == 0 {
            return false;
        }
    }

    is_finder_ratio(&counts)
}

/// Order three centers as [bottom-left, top-left, top-right].
///
/// The two most distant points form the diagonal, leaving the top-left
/// corner; the cross product sign disambiguates the remaining two.
pub fn order_finders(p: [PointF; 3]) -> [PointF; 3] {
    let d01 = p[0].dist2(p[1]);
    let d12 = p[1].dist2(p[2]);
    let d02 = p[0].dist2(p[2]);

    let (tl, a, b) = if d01 > d12 && d01 > d02 {
        (p[2], p[0], p[1])
    } else if d12 > d01 && d12 > d02 {
        (p[0], p[1], p[2])
    } else {
        (p[1], p[0], p[2])
    };

    let cross = (a.x - tl.x) * (b.y - tl.y) - (a.y - tl.y) * (b.x - tl.x);
    if cross > 0.0 {
        [b, tl, a]
    } else {
        [a, tl, b]
    }
}

/// Find up to three finder pattern centers, ordered [BL, TL, TR].
///
/// Returns an empty vector when fewer than three patterns are visible.
pub fn find_finder_patterns(bitmap: &BinaryBitmap, scan_lines: usize) -> Vec<PointF> {
    let width = bitmap.width();
    let height = bitmap.height();
    if width < 21 || height < 21 {
        return Vec::new();
    }

    let mut cands: Vec<PointF> = Vec::new();
    let rows = scan_lines.max(2).min(height);
    for i in 0..rows {
        let y = i * (height - 1) / (rows - 1);
        let row = bitmap.row_bits(y);
        let dark_first = row[0];
        for (x_center, h_sum) in finder_windows(&runs(&row), dark_first) {
            let x_px = (x_center.round() as usize).min(width - 1);
            let Some((y_center, v_sum)) = cross_check_column(bitmap, x_px, y) else {
                continue;
            };
            // A real pattern spans about the same extent both ways.
            let (lo, hi) = (h_sum.min(v_sum) as f32, h_sum.max(v_sum) as f32);
            if hi > lo * 1.6 {
                continue;
            }
            let y_px = (y_center.round() as usize).min(height - 1);
            if !cross_check_diagonal(bitmap, x_px, y_px) {
                continue;
            }
            cands.push(PointF { x: x_center, y: y_center });
        }
    }

    debug!("finder: {} cross-checked candidates", cands.len());

    // Weighted clustering within ~5% of the short frame edge.
    let dist_thr = (width.min(height) as f32) * 0.05;
    let dist2_thr = dist_thr * dist_thr;
    let mut clusters: Vec<(PointF, usize)> = Vec::new();
    for p in cands {
        let mut assigned = false;
        for (c, cnt) in &mut clusters {
            if p.dist2(*c) <= dist2_thr {
                let k = *cnt as f32 + 1.0;
                c.x = (c.x * (*cnt as f32) + p.x) / k;
                c.y = (c.y * (*cnt as f32) + p.y) / k;
                *cnt += 1;
                assigned = true;
                break;
            }
        }
        if !assigned {
            clusters.push((p, 1));
        }
    }

    clusters.sort_by_key(|(_, cnt)| std::cmp::Reverse(*cnt));
    debug!(
        "finder: {} clusters, top counts {:?}",
        clusters.len(),
        clusters.iter().take(3).map(|(_, c)| *c).collect::<Vec<_>>()
    );

    if clusters.len() < 3 {
        return Vec::new();
    }
    match pick_corner_triple(&clusters) {
        Some(triple) => triple.to_vec(),
        None => Vec::new(),
    }
}

/// Choose the cluster triple laid out like the three symbol corners: two
/// near-equal sides meeting at the top-left at roughly a right angle.
/// Among plausible triples the one with the most supporting candidates
/// wins; skew breaks ties.
fn pick_corner_triple(clusters: &[(PointF, usize)]) -> Option<[PointF; 3]> {
    let n = clusters.len().min(6);
    let mut best: Option<([PointF; 3], usize, f32)> = None;
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                let ordered = order_finders([clusters[i].0, clusters[j].0, clusters[k].0]);
                let [bl, tl, tr] = ordered;
                let side_a = tl.dist2(bl);
                let side_b = tl.dist2(tr);
                let (lo, hi) = if side_a < side_b { (side_a, side_b) } else { (side_b, side_a) };
                if hi <= 0.0 || lo < hi * 0.64 {
                    continue;
                }
                let expected = side_a + side_b;
                let skew = (bl.dist2(tr) - expected).abs() / expected;
                if skew > 0.35 {
                    continue;
                }
                let votes = clusters[i].1 + clusters[j].1 + clusters[k].1;
                let better = match best {
                    None => true,
                    Some((_, bv, bs)) => votes > bv || (votes == bv && skew < bs),
                };
                if better {
                    best = Some((ordered, votes, skew));
                }
            }
        }
    }
    best.map(|(triple, _, _)| triple)
}
