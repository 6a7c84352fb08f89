use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use grain_core::config::{AxisMethod, GradingConfig};
use grain_core::errors::{FailureKind, FailureTally, GrainError};
use grain_core::types::{AcquisitionMode, ParticleMeasurement, Polygon};
use grain_geom::{convexity_defects, describe, FeatureExtractor, MIN_FIT_POINTS};

use crate::split::{closest_pair, divide};
use crate::thresholds::AdaptiveThresholds;

/// Parameters of one separator, resolved for a single acquisition mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparatorSettings {
    /// Millimetres per pixel.
    pub scale: f64,
    /// Concavities at or above this angle (degrees) are ignored.
    pub angle_threshold: f64,
    /// Smallest resolvable particle in millimetres.
    pub min_detectable_size: f64,
    /// Largest accepted long/short ratio.
    pub max_aspect_ratio: f64,
    /// Split composites instead of rejecting them.
    pub split_overlapping: bool,
    /// Depth at which splitting stops.
    pub max_depth: usize,
    /// Axis measurement method.
    pub axis_method: AxisMethod,
}

impl SeparatorSettings {
    /// Resolves the settings for `mode` from a grading configuration.
    pub fn from_config(config: &GradingConfig, mode: AcquisitionMode) -> Result<Self, GrainError> {
        Ok(Self {
            scale: config.scale_for(mode)?,
            angle_threshold: config.angle_threshold_for(mode)?,
            min_detectable_size: config.min_detectable_size,
            max_aspect_ratio: config.max_aspect_ratio,
            split_overlapping: config.split_overlapping,
            max_depth: config.max_split_depth,
            axis_method: config.axis_method,
        })
    }
}

/// Why a polygon was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// Fewer than five vertices.
    TooFewPoints,
    /// Zero short axis or elongation above the limit.
    AspectRatio,
    /// Long axis below the minimum detectable size.
    BelowMinimumSize,
    /// Composite found while splitting is disabled.
    Touching,
    /// Geometry could not be measured.
    Degenerate,
}

/// Outcome of evaluating one polygon once.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Single particle.
    Accept(ParticleMeasurement),
    /// Discarded.
    Reject(RejectReason),
    /// Composite cut into two children that must be evaluated in turn.
    Split(Polygon, Polygon),
}

/// Particle accepted by the separator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedParticle {
    /// Silhouette of the particle.
    pub polygon: Polygon,
    /// Physical measurement.
    pub measurement: ParticleMeasurement,
    /// Number of cuts between the input polygon and this particle.
    pub depth: usize,
}

/// Everything the separator produced for a set of input polygons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeparationOutcome {
    /// Accepted particles.
    pub accepted: Vec<AcceptedParticle>,
    /// Rejected polygons keyed by reason.
    pub rejections: BTreeMap<RejectReason, u64>,
    /// Number of cuts performed.
    pub splits: u64,
    /// Isolated failures met along the way.
    pub failures: FailureTally,
}

impl SeparationOutcome {
    /// Appends another outcome to this one.
    pub fn merge(&mut self, other: SeparationOutcome) {
        self.accepted.extend(other.accepted);
        for (reason, count) in other.rejections {
            *self.rejections.entry(reason).or_insert(0) += count;
        }
        self.splits += other.splits;
        self.failures.merge(&other.failures);
    }

    /// Total number of rejected polygons.
    pub fn rejected(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Measurements of all accepted particles.
    pub fn measurements(&self) -> Vec<ParticleMeasurement> {
        self.accepted.iter().map(|p| p.measurement).collect()
    }

    fn reject(&mut self, reason: RejectReason) {
        *self.rejections.entry(reason).or_insert(0) += 1;
    }
}

/// Tells single particles from touching clusters and cuts the latter apart.
#[derive(Debug, Clone)]
pub struct Separator {
    settings: SeparatorSettings,
    extractor: FeatureExtractor,
}

impl Separator {
    /// Creates a separator.
    pub fn new(settings: SeparatorSettings) -> Self {
        Self {
            extractor: FeatureExtractor::new(settings.scale, settings.axis_method),
            settings,
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &SeparatorSettings {
        &self.settings
    }

    /// Separates every polygon in `polygons`.
    pub fn separate_all<'a, I>(&self, polygons: I) -> SeparationOutcome
    where
        I: IntoIterator<Item = &'a Polygon>,
    {
        let mut outcome = SeparationOutcome::default();
        for polygon in polygons {
            self.separate_into(polygon, &mut outcome);
        }
        outcome
    }

    /// Separates a single polygon.
    pub fn separate(&self, polygon: &Polygon) -> SeparationOutcome {
        let mut outcome = SeparationOutcome::default();
        self.separate_into(polygon, &mut outcome);
        outcome
    }

    fn separate_into(&self, polygon: &Polygon, outcome: &mut SeparationOutcome) {
        // Worklist instead of call recursion; children are pushed second-first
        // so the first child is evaluated next.
        let mut pending: Vec<(Polygon, usize)> = vec![(polygon.clone(), 0)];
        while let Some((current, depth)) = pending.pop() {
            match self.evaluate(&current, depth, &mut outcome.failures) {
                Verdict::Accept(measurement) => outcome.accepted.push(AcceptedParticle {
                    polygon: current,
                    measurement,
                    depth,
                }),
                Verdict::Reject(reason) => {
                    debug!(?reason, points = current.len(), depth, "polygon rejected");
                    outcome.reject(reason);
                }
                Verdict::Split(first, second) => {
                    debug!(
                        depth,
                        first = first.len(),
                        second = second.len(),
                        "polygon split"
                    );
                    outcome.splits += 1;
                    pending.push((second, depth + 1));
                    pending.push((first, depth + 1));
                }
            }
        }
    }

    /// Evaluates `polygon` once, recording isolated failures in `failures`.
    pub fn evaluate(&self, polygon: &Polygon, depth: usize, failures: &mut FailureTally) -> Verdict {
        let s = &self.settings;
        if polygon.len() < MIN_FIT_POINTS {
            return Verdict::Reject(RejectReason::TooFewPoints);
        }
        let (long, short) = match self.extractor.axes(polygon) {
            Ok(axes) => axes,
            Err(err) => return self.degenerate(err, failures),
        };
        if short <= 0.0 || long / short > s.max_aspect_ratio {
            return Verdict::Reject(RejectReason::AspectRatio);
        }
        if long < s.min_detectable_size {
            return Verdict::Reject(RejectReason::BelowMinimumSize);
        }

        let thresholds = AdaptiveThresholds::for_size(short);
        let shape = match describe(polygon) {
            Ok(shape) => shape,
            Err(err) => return self.degenerate(err, failures),
        };
        if thresholds.admits(shape.shape_factor, shape.solidity) {
            return self.accept(polygon, failures);
        }

        let defects = match convexity_defects(polygon.points()) {
            Ok(defects) => defects,
            Err(err) => {
                warn!(error = %err, points = polygon.len(), "concavity analysis failed, keeping polygon whole");
                failures.record_error(&err);
                return self.accept(polygon, failures);
            }
        };

        let points = polygon.points();
        let candidates: Vec<usize> = defects
            .iter()
            .filter(|defect| defect.depth * s.scale >= s.min_detectable_size / 2.0)
            .filter(|defect| defect.span(points) * s.scale >= s.min_detectable_size)
            .filter(|defect| defect.angle(points) < s.angle_threshold)
            .map(|defect| defect.far)
            .collect();

        if !candidates.is_empty() && !s.split_overlapping {
            return Verdict::Reject(RejectReason::Touching);
        }
        if candidates.len() < 2 {
            return self.accept(polygon, failures);
        }
        if depth >= s.max_depth {
            warn!(depth, "split depth limit reached, accepting polygon unsplit");
            failures.record(FailureKind::DepthLimit);
            return self.accept(polygon, failures);
        }

        let Some((i1, i2)) = closest_pair(points, &candidates) else {
            return self.accept(polygon, failures);
        };
        match divide(polygon, i1, i2) {
            Ok((first, second)) => Verdict::Split(first, second),
            Err(err) => {
                warn!(error = %err, i1, i2, "cut refused, keeping polygon whole");
                failures.record_error(&err);
                self.accept(polygon, failures)
            }
        }
    }

    fn accept(&self, polygon: &Polygon, failures: &mut FailureTally) -> Verdict {
        match self.extractor.measure(polygon) {
            Ok(measurement) => Verdict::Accept(measurement),
            Err(err) => self.degenerate(err, failures),
        }
    }

    fn degenerate(&self, err: GrainError, failures: &mut FailureTally) -> Verdict {
        debug!(error = %err, "degenerate polygon dropped");
        failures.record_error(&err);
        Verdict::Reject(RejectReason::Degenerate)
    }
}
