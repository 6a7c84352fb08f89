//! Synthetic silhouettes for demos, benches and tests.

use std::f64::consts::PI;

use grain_core::types::{Point, Polygon};

/// Regular `n`-gon approximating a disc.
pub fn disc(cx: f64, cy: f64, radius: f64, n: usize) -> Polygon {
    ellipse(cx, cy, radius, radius, 0.0, n)
}

/// Polygon approximating an ellipse with semi-axes `a`, `b` rotated by `angle` radians.
pub fn ellipse(cx: f64, cy: f64, a: f64, b: f64, angle: f64, n: usize) -> Polygon {
    let (sin, cos) = angle.sin_cos();
    Polygon::new(
        (0..n)
            .map(|k| {
                let t = 2.0 * PI * k as f64 / n as f64;
                let (x, y) = (a * t.cos(), b * t.sin());
                Point::new(cx + x * cos - y * sin, cy + x * sin + y * cos)
            })
            .collect(),
    )
}

/// Two overlapping discs of equal radius joined along a vertical neck.
///
/// The lobes are centred `half_gap` either side of `(cx, cy)`; with
/// `half_gap < radius` the outline pinches at two vertices on the line
/// `x = cx`. The contour starts at the upper pinch, runs round the right
/// lobe to the lower pinch (indices `0..=per_lobe`) and returns round the
/// left lobe.
pub fn dumbbell(cx: f64, cy: f64, radius: f64, half_gap: f64, per_lobe: usize) -> Polygon {
    let alpha = (half_gap / radius).clamp(-1.0, 1.0).acos();
    let sweep = 2.0 * (PI - alpha);
    let mut points = Vec::with_capacity(2 * per_lobe);
    for k in 0..=per_lobe {
        let t = (PI - alpha) - sweep * k as f64 / per_lobe as f64;
        points.push(Point::new(
            cx + half_gap + radius * t.cos(),
            cy + radius * t.sin(),
        ));
    }
    for k in 1..per_lobe {
        let t = -alpha - sweep * k as f64 / per_lobe as f64;
        points.push(Point::new(
            cx - half_gap + radius * t.cos(),
            cy + radius * t.sin(),
        ));
    }
    Polygon::new(points)
}

/// A row of `lobes` overlapping discs, neighbours `2 * half_gap` apart.
///
/// Every arc is sampled with `per_arc` segments. The outline starts at the
/// lower pinch of the rightmost lobe and runs counter-clockwise.
pub fn lobe_chain(
    cx: f64,
    cy: f64,
    radius: f64,
    half_gap: f64,
    lobes: usize,
    per_arc: usize,
) -> Polygon {
    if lobes < 2 {
        return disc(cx, cy, radius, per_arc.max(3));
    }
    let alpha = (half_gap / radius).clamp(-1.0, 1.0).acos();
    let centre = |k: usize| cx + (2.0 * k as f64 - (lobes - 1) as f64) * half_gap;
    let per_arc = per_arc.max(1);

    // (lobe, start angle, end angle), traversed counter-clockwise.
    let mut arcs = vec![(lobes - 1, PI + alpha, 3.0 * PI - alpha)];
    for k in (1..lobes - 1).rev() {
        arcs.push((k, alpha, PI - alpha));
    }
    arcs.push((0, alpha, 2.0 * PI - alpha));
    for k in 1..lobes - 1 {
        arcs.push((k, PI + alpha, 2.0 * PI - alpha));
    }

    let (first_lobe, first_angle, _) = arcs[0];
    let mut points = vec![Point::new(
        centre(first_lobe) + radius * first_angle.cos(),
        cy + radius * first_angle.sin(),
    )];
    for (lobe, start, end) in arcs {
        for step in 1..=per_arc {
            let t = start + (end - start) * step as f64 / per_arc as f64;
            points.push(Point::new(centre(lobe) + radius * t.cos(), cy + radius * t.sin()));
        }
    }
    // The last arc ends where the first began.
    points.pop();
    Polygon::new(points)
}
