use nalgebra::{Matrix2, SymmetricEigen};

use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::Point;

/// Full axis lengths `(major, minor)` of the ellipse sharing the polygon's second moments.
///
/// A solid ellipse with semi-axes `a ≥ b` has central second moments `a²/4`
/// and `b²/4`, so each full axis is `4·sqrt(eigenvalue)`.
pub fn moment_ellipse_axes(points: &[Point]) -> Result<(f64, f64), GrainError> {
    let n = points.len();
    let (mut a2, mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for idx in 0..n {
        let p = &points[idx];
        let q = &points[(idx + 1) % n];
        let c = p.x * q.y - q.x * p.y;
        a2 += c;
        sx += (p.x + q.x) * c;
        sy += (p.y + q.y) * c;
        sxx += (p.x * p.x + p.x * q.x + q.x * q.x) * c;
        syy += (p.y * p.y + p.y * q.y + q.y * q.y) * c;
        sxy += (p.x * q.y + 2.0 * p.x * p.y + 2.0 * q.x * q.y + q.x * p.y) * c;
    }
    let area = a2 / 2.0;
    if area.abs() <= f64::EPSILON {
        return Err(GrainError::DegenerateGeometry(
            ErrorInfo::new("ellipse_zero_area", "cannot fit an ellipse to a zero-area polygon")
                .with_context("points", n),
        ));
    }
    let cx = sx / (6.0 * area);
    let cy = sy / (6.0 * area);
    let mxx = sxx / (12.0 * area) - cx * cx;
    let myy = syy / (12.0 * area) - cy * cy;
    let mxy = sxy / (24.0 * area) - cx * cy;

    let eigen = SymmetricEigen::new(Matrix2::new(mxx, mxy, mxy, myy));
    let mut values = [eigen.eigenvalues[0].max(0.0), eigen.eigenvalues[1].max(0.0)];
    values.sort_by(|a, b| b.total_cmp(a));
    Ok((4.0 * values[0].sqrt(), 4.0 * values[1].sqrt()))
}
