//! Value types flowing between the extraction, fitting and grading stages.

use serde::{Deserialize, Serialize};

/// Number of size classes in a grading curve.
pub const CLASS_COUNT: usize = 6;

/// One value per size class, ordered from finest to coarsest.
pub type ClassVector = [f64; CLASS_COUNT];

/// Practical "infinite" upper bound of the coarsest class.
pub const RANGE_SENTINEL: f64 = 1e12;

/// Point on a contour, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Closed ordered sequence of boundary points produced by segmentation.
///
/// The closing edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Wraps a point sequence.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Builds a polygon from raw coordinate pairs.
    pub fn from_xy(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Borrowed view of the vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        let mut bounds = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            bounds.0 = bounds.0.min(p.x);
            bounds.1 = bounds.1.min(p.y);
            bounds.2 = bounds.2.max(p.x);
            bounds.3 = bounds.3.max(p.y);
        }
        Some(bounds)
    }
}

/// Acquisition mode of a camera view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionMode {
    /// Low magnification, large field of view.
    Wide,
    /// High magnification, small field of view.
    Narrow,
}

impl AcquisitionMode {
    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionMode::Wide => "wide",
            AcquisitionMode::Narrow => "narrow",
        }
    }
}

/// Physical measurement of one accepted particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleMeasurement {
    /// Short axis length in physical units.
    pub short_axis: f64,
    /// Long axis length in physical units.
    pub long_axis: f64,
    /// Silhouette area in physical units squared.
    pub area: f64,
    /// Volume proxy, `short_axis * area`.
    pub volume: f64,
}

impl ParticleMeasurement {
    /// Builds a measurement from two axis lengths in either order.
    pub fn from_axes(a: f64, b: f64, area: f64) -> Self {
        let (short_axis, long_axis) = if a <= b { (a, b) } else { (b, a) };
        Self {
            short_axis,
            long_axis,
            area,
            volume: short_axis * area,
        }
    }
}

/// Membership interval of one size class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingRange {
    /// Exclusive lower bound.
    pub lower: f64,
    /// Inclusive upper bound.
    pub upper: f64,
}

impl GradingRange {
    /// Creates a range.
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Returns true when `size` lies in `(lower, upper]`.
    pub fn contains(&self, size: f64) -> bool {
        size > self.lower && size <= self.upper
    }
}

/// Fitted size distribution of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Mean short-axis length.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Number of measurements retained by the fit.
    pub count: usize,
}

impl Distribution {
    /// Placeholder for a class without data.
    pub const fn empty() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            count: 0,
        }
    }

    /// Returns true when the distribution carries no data.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Nominal description of a sieve size class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeClass {
    /// Position in the ordered class list.
    pub index: usize,
    /// Nominal lower sieve opening in millimetres.
    pub nominal_lower: f64,
    /// Nominal upper sieve opening in millimetres.
    pub nominal_upper: f64,
}

impl SizeClass {
    /// Label such as `0.075-0.15`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.nominal_lower, self.nominal_upper)
    }
}

/// Standard sieve openings bounding the six classes, in millimetres.
pub const SIEVE_OPENINGS: [f64; CLASS_COUNT + 1] = [0.075, 0.15, 0.3, 0.6, 1.18, 2.36, 4.75];

/// The six standard sand size classes.
pub fn standard_classes() -> Vec<SizeClass> {
    (0..CLASS_COUNT)
        .map(|index| SizeClass {
            index,
            nominal_lower: SIEVE_OPENINGS[index],
            nominal_upper: SIEVE_OPENINGS[index + 1],
        })
        .collect()
}
