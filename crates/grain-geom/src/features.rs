use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use grain_core::config::AxisMethod;
use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::{ParticleMeasurement, Polygon};

use crate::ellipse::moment_ellipse_axes;
use crate::hull::hull_area;
use crate::polygon::{area, ensure_polygon, expanded_area, perimeter};
use crate::rect::min_area_rect;

/// Minimum vertex count for rectangle and ellipse fitting.
pub const MIN_FIT_POINTS: usize = 5;

/// Circularity `4π·area / perimeter²`.
pub fn shape_factor(area: f64, perimeter: f64) -> Result<f64, GrainError> {
    if perimeter <= 0.0 || !perimeter.is_finite() {
        return Err(GrainError::DegenerateGeometry(
            ErrorInfo::new("zero_perimeter", "shape factor needs a positive perimeter")
                .with_context("perimeter", perimeter),
        ));
    }
    Ok(4.0 * PI * area / (perimeter * perimeter))
}

/// Ratio of polygon area to convex-hull area.
pub fn solidity(area: f64, hull_area: f64) -> Result<f64, GrainError> {
    if hull_area <= 0.0 || !hull_area.is_finite() {
        return Err(GrainError::DegenerateGeometry(
            ErrorInfo::new("zero_hull_area", "solidity needs a positive hull area")
                .with_context("hull_area", hull_area),
        ));
    }
    Ok(area / hull_area)
}

/// Pixel-space shape description used by the separator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    /// Raw polygon area in pixels².
    pub area: f64,
    /// Closed boundary length in pixels.
    pub perimeter: f64,
    /// Convex hull area in pixels².
    pub hull_area: f64,
    /// Circularity in (0, 1].
    pub shape_factor: f64,
    /// Convexity in (0, 1].
    pub solidity: f64,
}

/// Computes shape factor and solidity of a polygon.
pub fn describe(polygon: &Polygon) -> Result<ShapeDescriptor, GrainError> {
    ensure_polygon(polygon)?;
    let points = polygon.points();
    let area = area(points);
    let perimeter = perimeter(points);
    let hull_area = hull_area(points);
    Ok(ShapeDescriptor {
        area,
        perimeter,
        hull_area,
        shape_factor: shape_factor(area, perimeter)?,
        solidity: solidity(area, hull_area)?,
    })
}

/// Long and short axis of a polygon in pixels.
pub fn pixel_axes(polygon: &Polygon, method: AxisMethod) -> Result<(f64, f64), GrainError> {
    ensure_polygon(polygon)?;
    if polygon.len() < MIN_FIT_POINTS {
        return Err(GrainError::DegenerateGeometry(
            ErrorInfo::new("too_few_points", "axis fitting needs at least five points")
                .with_context("points", polygon.len()),
        ));
    }
    match method {
        AxisMethod::MinAreaRect => min_area_rect(polygon.points())
            .map(|rect| rect.long_short())
            .ok_or_else(|| GrainError::degenerate("empty_polygon", "no points to enclose")),
        AxisMethod::MomentEllipse => moment_ellipse_axes(polygon.points()),
    }
}

/// Converts polygons into physical particle measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureExtractor {
    scale: f64,
    method: AxisMethod,
}

impl FeatureExtractor {
    /// Creates an extractor for a pixel scale in millimetres per pixel.
    pub fn new(scale: f64, method: AxisMethod) -> Self {
        Self { scale, method }
    }

    /// Millimetres per pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Long and short axis in millimetres.
    pub fn axes(&self, polygon: &Polygon) -> Result<(f64, f64), GrainError> {
        let (long, short) = pixel_axes(polygon, self.method)?;
        Ok((long * self.scale, short * self.scale))
    }

    /// Full measurement of one accepted particle.
    pub fn measure(&self, polygon: &Polygon) -> Result<ParticleMeasurement, GrainError> {
        let (long, short) = self.axes(polygon)?;
        let area = expanded_area(polygon)? * self.scale * self.scale;
        if !(short > 0.0 && short.is_finite() && long.is_finite() && area > 0.0) {
            return Err(GrainError::DegenerateGeometry(
                ErrorInfo::new("degenerate_measurement", "particle has a zero or non-finite extent")
                    .with_context("short_axis", short)
                    .with_context("long_axis", long)
                    .with_context("area", area),
            ));
        }
        Ok(ParticleMeasurement::from_axes(short, long, area))
    }
}
