use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::{Point, Polygon};

/// Half a pixel: the outward shift applied before area measurement.
pub const HALF_PIXEL: f64 = 0.5;

/// Signed shoelace area of the closed point sequence.
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (idx, p) in points.iter().enumerate() {
        let q = &points[(idx + 1) % points.len()];
        twice += p.x * q.y - q.x * p.y;
    }
    twice / 2.0
}

/// Unsigned area of the closed point sequence.
pub fn area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Length of the closed boundary.
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(idx, p)| p.distance(&points[(idx + 1) % points.len()]))
        .sum()
}

/// Area-weighted centroid, falling back to the vertex mean for zero-area input.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let a = signed_area(points);
    if a.abs() > f64::EPSILON {
        let (mut cx, mut cy) = (0.0, 0.0);
        for (idx, p) in points.iter().enumerate() {
            let q = &points[(idx + 1) % points.len()];
            let cross = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }
        return Some(Point::new(cx / (6.0 * a), cy / (6.0 * a)));
    }
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| p.x).sum();
    let sy: f64 = points.iter().map(|p| p.y).sum();
    Some(Point::new(sx / n, sy / n))
}

/// Moves every vertex `offset` further from the centroid along its ray.
pub fn expand(points: &[Point], offset: f64) -> Vec<Point> {
    let Some(center) = centroid(points) else {
        return Vec::new();
    };
    points
        .iter()
        .map(|p| {
            let dist = p.distance(&center);
            if dist <= f64::EPSILON {
                *p
            } else {
                let scale = (dist + offset) / dist;
                Point::new(
                    center.x + (p.x - center.x) * scale,
                    center.y + (p.y - center.y) * scale,
                )
            }
        })
        .collect()
}

/// Area after shifting the boundary outward by half a pixel.
///
/// Traced pixel boundaries run through pixel centres, so the raw polygon
/// misses roughly half a pixel of silhouette all the way round.
pub fn expanded_area(polygon: &Polygon) -> Result<f64, GrainError> {
    ensure_polygon(polygon)?;
    let expanded = expand(polygon.points(), HALF_PIXEL);
    let value = area(&expanded);
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(GrainError::DegenerateGeometry(
            ErrorInfo::new("zero_area", "polygon encloses no area")
                .with_context("points", polygon.len()),
        ))
    }
}

pub(crate) fn ensure_polygon(polygon: &Polygon) -> Result<(), GrainError> {
    if polygon.len() < 3 {
        return Err(GrainError::DegenerateGeometry(
            ErrorInfo::new("too_few_points", "a polygon needs at least three points")
                .with_context("points", polygon.len()),
        ));
    }
    if polygon
        .points()
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(GrainError::degenerate(
            "non_finite_point",
            "polygon contains a non-finite coordinate",
        ));
    }
    Ok(())
}

/// Returns true when the bounding box touches the border of a `width × height` image.
pub fn touches_border(polygon: &Polygon, width: f64, height: f64) -> bool {
    match polygon.bounds() {
        Some((min_x, min_y, max_x, max_y)) => {
            min_x <= 0.0 || min_y <= 0.0 || max_x >= width - 1.0 || max_y >= height - 1.0
        }
        None => false,
    }
}
