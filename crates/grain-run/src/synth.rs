//! Deterministic synthetic samples for demos, benches and tests.
//!
//! Each image is generated from its own RNG substream, so an image looks
//! the same whichever worker segments it and in whatever order.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::rng::RngHandle;
use grain_core::types::{AcquisitionMode, ClassVector, Polygon, CLASS_COUNT, SIEVE_OPENINGS};
use grain_geom::shapes::{dumbbell, ellipse};

use crate::provider::{SegmentationProvider, SegmentedImage};

/// Parameters of a synthetic acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    /// Master seed.
    #[serde(default)]
    pub seed: u64,
    /// Images per sample.
    #[serde(default = "SyntheticSpec::default_images")]
    pub images: usize,
    /// Particles drawn per image.
    #[serde(default = "SyntheticSpec::default_particles")]
    pub particles_per_image: usize,
    /// Probability that a particle is drawn as a touching pair.
    #[serde(default = "SyntheticSpec::default_touching")]
    pub touching_fraction: f64,
    /// Largest long/short ratio of single particles.
    #[serde(default = "SyntheticSpec::default_elongation")]
    pub max_elongation: f64,
    /// Acquisition view.
    #[serde(default = "SyntheticSpec::default_mode")]
    pub mode: AcquisitionMode,
    /// Millimetres per pixel used to draw the silhouettes.
    #[serde(default = "SyntheticSpec::default_scale")]
    pub scale: f64,
    /// Vertices per outline (per lobe for touching pairs).
    #[serde(default = "SyntheticSpec::default_vertices")]
    pub vertices: usize,
}

impl SyntheticSpec {
    fn default_images() -> usize {
        6
    }

    fn default_particles() -> usize {
        40
    }

    fn default_touching() -> f64 {
        0.1
    }

    fn default_elongation() -> f64 {
        1.5
    }

    fn default_mode() -> AcquisitionMode {
        AcquisitionMode::Narrow
    }

    fn default_scale() -> f64 {
        0.00351
    }

    fn default_vertices() -> usize {
        96
    }
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            seed: 0,
            images: Self::default_images(),
            particles_per_image: Self::default_particles(),
            touching_fraction: Self::default_touching(),
            max_elongation: Self::default_elongation(),
            mode: Self::default_mode(),
            scale: Self::default_scale(),
            vertices: Self::default_vertices(),
        }
    }
}

/// Label with all mass in one class, used for single-class calibration samples.
pub fn single_class_label(class: usize) -> ClassVector {
    let mut label = [0.0; CLASS_COUNT];
    if let Some(slot) = label.get_mut(class) {
        *slot = 1.0;
    }
    label
}

/// Provider drawing particles whose volume shares follow a label.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticProvider {
    spec: SyntheticSpec,
    weights: ClassVector,
    stream: u64,
}

impl SyntheticProvider {
    /// Creates the provider for one sample; `stream` separates samples of one seed.
    pub fn new(spec: SyntheticSpec, label: &ClassVector, stream: u64) -> Self {
        // Weight = label / typical volume, so expected volume shares follow the label.
        let mut weights = [0.0; CLASS_COUNT];
        for (class, weight) in weights.iter_mut().enumerate() {
            let size = 0.5 * (SIEVE_OPENINGS[class] + SIEVE_OPENINGS[class + 1]);
            *weight = label[class].max(0.0) / size.powi(3);
        }
        Self {
            spec,
            weights,
            stream,
        }
    }

    /// Generation parameters.
    pub fn spec(&self) -> &SyntheticSpec {
        &self.spec
    }

    fn draw_class(&self, rng: &mut RngHandle) -> Option<usize> {
        let total: f64 = self.weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = rng.gen::<f64>() * total;
        for (class, weight) in self.weights.iter().enumerate() {
            if target < *weight {
                return Some(class);
            }
            target -= weight;
        }
        self.weights.iter().rposition(|w| *w > 0.0)
    }
}

impl SegmentationProvider for SyntheticProvider {
    fn image_count(&self) -> usize {
        self.spec.images
    }

    fn segment(&self, index: usize) -> Result<SegmentedImage, GrainError> {
        let spec = &self.spec;
        let invalid_scale = spec.scale.is_nan() || spec.scale <= 0.0;
        if invalid_scale || spec.vertices < 8 || spec.max_elongation < 1.0 {
            return Err(GrainError::Config(
                ErrorInfo::new("synthetic_spec", "invalid synthetic acquisition parameters")
                    .with_context("scale", spec.scale)
                    .with_context("vertices", spec.vertices),
            ));
        }
        let substream = (self.stream << 20) ^ index as u64;
        let mut rng = RngHandle::substream(spec.seed, substream);

        let mut polygons = Vec::with_capacity(spec.particles_per_image);
        let mut cursor = 0.0f64;
        let mut tallest = 0.0f64;
        let mut shapes = Vec::with_capacity(spec.particles_per_image);
        for _ in 0..spec.particles_per_image {
            let Some(class) = self.draw_class(&mut rng) else {
                break;
            };
            let (lower, upper) = (SIEVE_OPENINGS[class], SIEVE_OPENINGS[class + 1]);
            let short_mm = lower + (upper - lower) * rng.gen_range(0.1..0.9);
            let radius = 0.5 * short_mm / spec.scale;
            let touching = rng.gen::<f64>() < spec.touching_fraction;
            let elongation = if spec.max_elongation > 1.0 {
                rng.gen_range(1.0..spec.max_elongation)
            } else {
                1.0
            };
            let angle = rng.gen_range(0.0..PI);
            let (extent_x, extent_y) = if touching {
                (4.0 * radius, 2.0 * radius)
            } else {
                (2.0 * radius * elongation, 2.0 * radius * elongation)
            };
            let margin = 10.0 + 0.1 * extent_x;
            let cx = cursor + margin + 0.5 * extent_x;
            cursor = cx + 0.5 * extent_x;
            tallest = tallest.max(extent_y + 2.0 * margin);
            shapes.push((cx, radius, elongation, angle, touching, extent_y, margin));
        }

        let height = tallest.max(1.0);
        for (cx, radius, elongation, angle, touching, extent_y, margin) in shapes {
            let cy = margin + 0.5 * extent_y;
            let polygon: Polygon = if touching {
                dumbbell(cx, cy, radius, 0.975 * radius, spec.vertices)
            } else {
                ellipse(cx, cy, radius * elongation, radius, angle, spec.vertices)
            };
            polygons.push(polygon);
        }

        Ok(SegmentedImage {
            id: format!("synthetic-{}-{index:04}", self.stream),
            width: cursor + 10.0,
            height,
            mode: spec.mode,
            polygons,
        })
    }
}
