use std::cmp::Ordering;

use grain_core::types::Point;

fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull as indices into `points`, counter-clockwise, collinear points dropped.
///
/// Andrew's monotone chain. Duplicate points contribute a single index.
pub fn convex_hull_indices(points: &[Point]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .partial_cmp(&points[b].x)
            .unwrap_or(Ordering::Equal)
            .then(
                points[a]
                    .y
                    .partial_cmp(&points[b].y)
                    .unwrap_or(Ordering::Equal),
            )
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);
    if order.len() < 3 {
        return order;
    }

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);
    for &idx in &order {
        while hull.len() >= 2
            && cross(
                &points[hull[hull.len() - 2]],
                &points[hull[hull.len() - 1]],
                &points[idx],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(idx);
    }
    let lower_len = hull.len() + 1;
    for &idx in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(
                &points[hull[hull.len() - 2]],
                &points[hull[hull.len() - 1]],
                &points[idx],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(idx);
    }
    hull.pop();
    hull
}

/// Hull vertices as points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    convex_hull_indices(points)
        .into_iter()
        .map(|idx| points[idx])
        .collect()
}

/// Area of the convex hull.
pub fn hull_area(points: &[Point]) -> f64 {
    crate::polygon::area(&convex_hull(points))
}
