use serde::{Deserialize, Serialize};

use grain_core::types::Point;

use crate::hull::convex_hull;

/// Rotated rectangle enclosing a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    /// Rectangle centre.
    pub center: Point,
    /// Extent along `angle`.
    pub width: f64,
    /// Extent perpendicular to `angle`.
    pub height: f64,
    /// Orientation of the width side, in degrees.
    pub angle: f64,
}

impl RotatedRect {
    /// Returns `(long, short)` side lengths.
    pub fn long_short(&self) -> (f64, f64) {
        if self.width >= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        }
    }
}

/// Minimum-area enclosing rectangle by rotating calipers over hull edges.
///
/// Returns `None` for an empty point set. Collinear input yields a
/// rectangle of zero height.
pub fn min_area_rect(points: &[Point]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => return None,
        1 => {
            return Some(RotatedRect {
                center: hull[0],
                width: 0.0,
                height: 0.0,
                angle: 0.0,
            })
        }
        _ => {}
    }

    let mut best: Option<(f64, RotatedRect)> = None;
    for idx in 0..hull.len() {
        let a = hull[idx];
        let b = hull[(idx + 1) % hull.len()];
        let len = a.distance(&b);
        if len <= f64::EPSILON {
            continue;
        }
        let (ux, uy) = ((b.x - a.x) / len, (b.y - a.y) / len);
        let (mut min_u, mut max_u, mut min_v, mut max_v) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in &hull {
            let (dx, dy) = (p.x - a.x, p.y - a.y);
            let u = dx * ux + dy * uy;
            let v = -dx * uy + dy * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        let width = max_u - min_u;
        let height = max_v - min_v;
        let area = width * height;
        if best.as_ref().map_or(true, |(best_area, _)| area < *best_area) {
            let cu = (min_u + max_u) / 2.0;
            let cv = (min_v + max_v) / 2.0;
            let center = Point::new(a.x + cu * ux - cv * uy, a.y + cu * uy + cv * ux);
            best = Some((
                area,
                RotatedRect {
                    center,
                    width,
                    height,
                    angle: uy.atan2(ux).to_degrees(),
                },
            ));
        }
    }
    best.map(|(_, rect)| rect)
}
