use serde::{Deserialize, Serialize};

use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::Point;

use crate::hull::convex_hull_indices;

const MIN_DEPTH: f64 = 1e-9;

/// Inward deviation of the boundary between two consecutive hull vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvexityDefect {
    /// Contour index of the hull vertex where the concavity starts.
    pub start: usize,
    /// Contour index of the hull vertex where the concavity ends.
    pub end: usize,
    /// Contour index of the boundary point farthest from the hull edge.
    pub far: usize,
    /// Perpendicular distance of `far` from the hull edge, in pixels.
    pub depth: f64,
}

impl ConvexityDefect {
    /// Angle at the far point between the rays to the flanking points, in degrees.
    pub fn angle(&self, points: &[Point]) -> f64 {
        interior_angle(&points[self.start], &points[self.far], &points[self.end])
    }

    /// Pixel distance between the two flanking hull points.
    pub fn span(&self, points: &[Point]) -> f64 {
        points[self.start].distance(&points[self.end])
    }
}

/// Angle `start–vertex–end` in degrees, 180 when a ray has zero length.
pub fn interior_angle(start: &Point, vertex: &Point, end: &Point) -> f64 {
    let (ax, ay) = (start.x - vertex.x, start.y - vertex.y);
    let (bx, by) = (end.x - vertex.x, end.y - vertex.y);
    let norms = ax.hypot(ay) * bx.hypot(by);
    if norms <= f64::EPSILON {
        return 180.0;
    }
    ((ax * bx + ay * by) / norms).clamp(-1.0, 1.0).acos().to_degrees()
}

fn distance_to_line(p: &Point, a: &Point, b: &Point) -> f64 {
    let len = a.distance(b);
    if len <= f64::EPSILON {
        return p.distance(a);
    }
    ((b.x - a.x) * (a.y - p.y) - (a.x - p.x) * (b.y - a.y)).abs() / len
}

/// Concavities of a closed contour relative to its convex hull.
///
/// Fails with [`GrainError::Split`] when the contour does not visit its hull
/// vertices in a single rotational direction (self-intersecting or
/// otherwise scrambled point order).
pub fn convexity_defects(points: &[Point]) -> Result<Vec<ConvexityDefect>, GrainError> {
    let hull = convex_hull_indices(points);
    let m = hull.len();
    if m < 3 {
        return Ok(Vec::new());
    }

    let mut position = vec![usize::MAX; points.len()];
    for (pos, &idx) in hull.iter().enumerate() {
        position[idx] = pos;
    }
    let mut ordered = hull.clone();
    ordered.sort_unstable();

    let first_step = (position[ordered[1]] + m - position[ordered[0]]) % m;
    let consistent = (first_step == 1 || first_step == m - 1)
        && (0..m).all(|k| {
            let next = ordered[(k + 1) % m];
            (position[next] + m - position[ordered[k]]) % m == first_step
        });
    if !consistent {
        return Err(GrainError::Split(
            ErrorInfo::new("hull_order", "contour does not traverse its hull monotonically")
                .with_context("points", points.len())
                .with_context("hull_points", m),
        ));
    }

    let n = points.len();
    let mut defects = Vec::new();
    for k in 0..m {
        let start = ordered[k];
        let end = ordered[(k + 1) % m];
        let span = if end > start { end - start } else { end + n - start };
        let mut best: Option<(usize, f64)> = None;
        for offset in 1..span {
            let idx = (start + offset) % n;
            let depth = distance_to_line(&points[idx], &points[start], &points[end]);
            if best.map_or(true, |(_, d)| depth > d) {
                best = Some((idx, depth));
            }
        }
        if let Some((far, depth)) = best {
            if depth > MIN_DEPTH {
                defects.push(ConvexityDefect {
                    start,
                    end,
                    far,
                    depth,
                });
            }
        }
    }
    Ok(defects)
}
