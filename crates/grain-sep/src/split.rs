use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::{Point, Polygon};
use grain_geom::area;

/// Children may exceed the parent's area by this factor before the cut is refused.
const MAX_AREA_GROWTH: f64 = 1.2;

/// Closest pair of distinct candidate indices, ordered `(low, high)`.
pub fn closest_pair(points: &[Point], candidates: &[usize]) -> Option<(usize, usize)> {
    let mut best: Option<(f64, usize, usize)> = None;
    for (a, &i) in candidates.iter().enumerate() {
        for &j in &candidates[a + 1..] {
            if i == j {
                continue;
            }
            let dist = points[i].distance(&points[j]);
            if best.map_or(true, |(d, _, _)| dist < d) {
                best = Some((dist, i.min(j), i.max(j)));
            }
        }
    }
    best.map(|(_, i, j)| (i, j))
}

/// Cuts a closed contour along the chord between `i1` and `i2`.
///
/// Both children keep the two cut vertices: the first runs `i1..=i2`, the
/// second runs `i2..` and wraps round to `..=i1`. Repeating `i1` in the
/// second child closes it along the cut chord itself rather than along the
/// edge from `i1 - 1` to `i2`.
pub fn divide(polygon: &Polygon, i1: usize, i2: usize) -> Result<(Polygon, Polygon), GrainError> {
    let points = polygon.points();
    let (i1, i2) = (i1.min(i2), i1.max(i2));
    if i2 >= points.len() || i1 == i2 {
        return Err(GrainError::Split(
            ErrorInfo::new("cut_indices", "cut indices must be distinct contour positions")
                .with_context("i1", i1)
                .with_context("i2", i2)
                .with_context("points", points.len()),
        ));
    }
    let first: Vec<Point> = points[i1..=i2].to_vec();
    let second: Vec<Point> = points[i2..]
        .iter()
        .chain(points[..=i1].iter())
        .copied()
        .collect();

    let parent = area(points);
    let a1 = area(&first);
    let a2 = area(&second);
    if first.len() < 3 || second.len() < 3 || a1 <= 0.0 || a2 <= 0.0 {
        return Err(GrainError::Split(
            ErrorInfo::new("empty_child", "cut produced a child without area")
                .with_context("first_points", first.len())
                .with_context("second_points", second.len()),
        ));
    }
    if a1 + a2 > parent * MAX_AREA_GROWTH {
        return Err(GrainError::Split(
            ErrorInfo::new("child_area_growth", "children cover more area than the parent")
                .with_context("parent", parent)
                .with_context("children", a1 + a2),
        ));
    }
    Ok((Polygon::new(first), Polygon::new(second)))
}
