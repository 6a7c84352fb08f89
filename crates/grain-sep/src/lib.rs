#![deny(missing_docs)]
#![doc = "Contour separator: decides whether a silhouette is one particle or several and cuts composites apart."]

/// Recursive classifier and partitioner.
pub mod separator;
/// Cut selection and contour division.
pub mod split;
/// Size-adaptive acceptance thresholds.
pub mod thresholds;

pub use separator::{
    AcceptedParticle, RejectReason, SeparationOutcome, Separator, SeparatorSettings, Verdict,
};
pub use split::{closest_pair, divide};
pub use thresholds::AdaptiveThresholds;
