#![deny(missing_docs)]
#![doc = "Polygon geometry primitives and the particle feature extractor."]

/// Convexity defects of a contour against its hull.
pub mod defects;
/// Second-moment ellipse fitting.
pub mod ellipse;
/// Shape descriptors and physical measurements.
pub mod features;
/// Convex hull construction.
pub mod hull;
/// Area, perimeter and centroid of closed point sequences.
pub mod polygon;
/// Minimum-area enclosing rectangle.
pub mod rect;
pub mod shapes;

pub use defects::{convexity_defects, interior_angle, ConvexityDefect};
pub use ellipse::moment_ellipse_axes;
pub use features::{
    describe, pixel_axes, shape_factor, solidity, FeatureExtractor, ShapeDescriptor,
    MIN_FIT_POINTS,
};
pub use hull::{convex_hull, convex_hull_indices, hull_area};
pub use polygon::{area, centroid, expand, expanded_area, perimeter, signed_area, touches_border};
pub use rect::{min_area_rect, RotatedRect};
