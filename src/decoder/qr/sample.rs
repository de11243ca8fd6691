//! Module grid sampling from three finder centers.
//!
//! Module vectors are derived from the finder centers (14 modules apart),
//! the four outer symbol corners follow from them, and a projective map
//! from the unit square onto that quadrilateral locates every module.
//! Each module is decided by majority vote over a 3x3 supersample, and a
//! small offset sweep calibrates the map against the timing patterns.

use log::debug;

use super::finder::{order_finders, PointF};
use super::function::GRID;
use crate::models::BinaryBitmap;

#[derive(Clone, Copy)]
struct ProjMap {
    x0: f32, x1: f32, x2: f32, x3: f32,
    y0: f32, y1: f32, y2: f32, y3: f32,
    g: f32, h: f32,
}

/// Projective map from the unit square onto the quad (p00, p10, p01, p11).
fn build_projective(p00: PointF, p10: PointF, p01: PointF, p11: PointF) -> ProjMap {
    let (x0, y0) = (p00.x, p00.y);
    let (x1, y1) = (p10.x - p00.x, p10.y - p00.y);
    let (x2, y2) = (p01.x - p00.x, p01.y - p00.y);
    let (x3, y3) = (
        p11.x - p10.x - p01.x + p00.x,
        p11.y - p10.y - p01.y + p00.y,
    );

    let denom = x1 * y2 - y1 * x2;
    let (g, h) = if denom.abs() < 1e-6 {
        (0.0, 0.0)
    } else {
        (
            (x3 * y2 - y3 * x2) / denom,
            (x1 * y3 - y1 * x3) / denom,
        )
    };
    ProjMap { x0, x1, x2, x3, y0, y1, y2, y3, g, h }
}

#[inline]
fn map_uv(pm: &ProjMap, u: f32, v: f32) -> PointF {
    let den = 1.0 + pm.g * u + pm.h * v;
    PointF {
        x: (pm.x0 + pm.x1 * u + pm.x2 * v + pm.x3 * u * v) / den,
        y: (pm.y0 + pm.y1 * u + pm.y2 * v + pm.y3 * u * v) / den,
    }
}

#[inline]
fn bit_at(bitmap: &BinaryBitmap, x: f32, y: f32) -> bool {
    let xi = x.round().clamp(0.0, (bitmap.width() - 1) as f32) as usize;
    let yi = y.round().clamp(0.0, (bitmap.height() - 1) as f32) as usize;
    bitmap.get(xi, yi)
}

/// Alternation score of the central timing stretches (x or y in 8..=12).
fn timing_score(get_bit: impl Fn(usize, usize) -> bool) -> f32 {
    let row: Vec<bool> = (8..=12).map(|x| get_bit(x, 6)).collect();
    let col: Vec<bool> = (8..=12).map(|y| get_bit(6, y)).collect();

    let alternations = |bits: &[bool]| -> usize {
        bits.windows(2).filter(|w| w[0] != w[1]).count()
    };
    let denom = (row.len() - 1) as f32;
    (alternations(&row) as f32 / denom + alternations(&col) as f32 / denom) * 0.5
}

/// Sample the 21x21 module grid given ordered or unordered finder centers.
pub fn sample_grid(bitmap: &BinaryBitmap, finders: &[PointF]) -> Option<BinaryBitmap> {
    if finders.len() < 3 {
        return None;
    }
    let [bl, tl, tr] = order_finders([finders[0], finders[1], finders[2]]);

    // Finder centers sit 14 modules apart.
    let ux = PointF { x: (tr.x - tl.x) / 14.0, y: (tr.y - tl.y) / 14.0 };
    let uy = PointF { x: (bl.x - tl.x) / 14.0, y: (bl.y - tl.y) / 14.0 };

    // Outer symbol corners: finder centers sit 3.5 modules inside.
    let corner = |sx: f32, sy: f32| PointF {
        x: tl.x + sx * ux.x + sy * uy.x,
        y: tl.y + sx * ux.y + sy * uy.y,
    };
    let c00 = corner(-3.5, -3.5);
    let c10 = corner(17.5, -3.5);
    let c01 = corner(-3.5, 17.5);
    let c11 = corner(17.5, 17.5);
    let pm = build_projective(c00, c10, c01, c11);

    debug!(
        "sample: corners ({:.1},{:.1}) ({:.1},{:.1}) ({:.1},{:.1}) ({:.1},{:.1})",
        c00.x, c00.y, c10.x, c10.y, c01.x, c01.y, c11.x, c11.y
    );

    // Supersample at +-0.18 module around the center.
    const SS: f32 = 0.18 / GRID as f32;
    const SS_OFFS: [f32; 3] = [-SS, 0.0, SS];
    // Calibration offsets, roughly +-0.25 module in normalized units.
    const OFFS: [f32; 5] = [-0.012, -0.006, 0.0, 0.006, 0.012];

    let get_bit_with = |du: f32, dv: f32, xx: usize, yy: usize| -> bool {
        let u0 = ((xx as f32 + 0.5) / GRID as f32 + du).clamp(-0.02, 1.02);
        let v0 = ((yy as f32 + 0.5) / GRID as f32 + dv).clamp(-0.02, 1.02);
        let mut dark = 0u32;
        for dv_ in SS_OFFS {
            for du_ in SS_OFFS {
                let p = map_uv(&pm, u0 + du_, v0 + dv_);
                if bit_at(bitmap, p.x, p.y) {
                    dark += 1;
                }
            }
        }
        dark >= 5
    };

    let mut best = (f32::NEG_INFINITY, 0.0f32, 0.0f32);
    for &du in &OFFS {
        for &dv in &OFFS {
            let score = timing_score(|x, y| get_bit_with(du, dv, x, y));
            if score > best.0 {
                best = (score, du, dv);
            }
        }
    }
    let (score, du, dv) = best;
    debug!("sample: du={du:.3} dv={dv:.3} timing_score={score:.3}");

    let mut grid = BinaryBitmap::new(GRID, GRID);
    for y in 0..GRID {
        for x in 0..GRID {
            grid.set(x, y, get_bit_with(du, dv, x, y));
        }
    }
    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render a module grid to pixels with a quiet zone, then sample it
    /// back from the synthetic finder centers.
    #[test]
    fn roundtrips_an_axis_aligned_grid() {
        let unit = 5usize;
        let quiet = 4usize;
        let mut modules = BinaryBitmap::new(GRID, GRID);
        // Checker-ish content plus proper finder squares so ordering works.
        for y in 0..GRID {
            for x in 0..GRID {
                modules.set(x, y, (x * 7 + y * 3) % 4 == 0);
            }
        }
        let draw_finder = |m: &mut BinaryBitmap, ox: usize, oy: usize| {
            for dy in 0..7 {
                for dx in 0..7 {
                    let border = dx == 0 || dx == 6 || dy == 0 || dy == 6;
                    let core = (2..=4).contains(&dx) && (2..=4).contains(&dy);
                    m.set(ox + dx, oy + dy, border || core);
                }
            }
        };
        draw_finder(&mut modules, 0, 0);
        draw_finder(&mut modules, 14, 0);
        draw_finder(&mut modules, 0, 14);
        // Timing lines so calibration has something to score.
        for i in 8..=12 {
            modules.set(i, 6, i % 2 == 0);
            modules.set(6, i, i % 2 == 0);
        }

        let total = GRID + 2 * quiet;
        let mut bitmap = BinaryBitmap::new(total * unit, total * unit);
        for my in 0..GRID {
            for mx in 0..GRID {
                if modules.get(mx, my) {
                    for py in 0..unit {
                        for px in 0..unit {
                            bitmap.set((quiet + mx) * unit + px, (quiet + my) * unit + py, true);
                        }
                    }
                }
            }
        }

        let center = |m: f32| (quiet as f32 + m) * unit as f32;
        let finders = vec![
            PointF { x: center(3.5), y: center(17.5) },
            PointF { x: center(3.5), y: center(3.5) },
            PointF { x: center(17.5), y: center(3.5) },
        ];

        let grid = sample_grid(&bitmap, &finders).expect("grid");
        for y in 0..GRID {
            for x in 0..GRID {
                assert_eq!(grid.get(x, y), modules.get(x, y), "module ({x},{y})");
            }
        }
    }

    #[test]
    fn needs_three_finders() {
        let bitmap = BinaryBitmap::new(64, 64);
        let one = vec![PointF { x: 10.0, y: 10.0 }];
        assert!(sample_grid(&bitmap, &one).is_none());
    }
}
