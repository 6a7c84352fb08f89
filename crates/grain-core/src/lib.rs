#![deny(missing_docs)]
#![doc = "Shared types, configuration and error taxonomy for the grainsize workspace."]

/// Grading configuration and rig geometry.
pub mod config;
/// Error taxonomy and failure tallies.
pub mod errors;
/// Stable hashing helpers.
pub mod hash;
/// Report provenance.
pub mod provenance;
/// Deterministic random number generation.
pub mod rng;
/// Canonical serialization helpers.
pub mod serde;
/// Core value types.
pub mod types;

pub use config::{
    load_config, AxisMethod, BatchScheme, BoundaryMode, FieldLinkConstants, FieldOfView,
    GradingConfig, RigGeometry, RootFindOptions,
};
pub use errors::{ErrorInfo, FailureKind, FailureTally, GrainError};
pub use hash::{round_to, stable_hash_string};
pub use provenance::RunProvenance;
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{
    standard_classes, AcquisitionMode, ClassVector, Distribution, GradingRange,
    ParticleMeasurement, Point, Polygon, SizeClass, CLASS_COUNT, RANGE_SENTINEL, SIEVE_OPENINGS,
};
