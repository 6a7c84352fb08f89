use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::serde::from_json_slice;
use grain_core::types::{AcquisitionMode, Polygon};

/// Candidate polygons segmented from one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedImage {
    /// Image identifier, usually the file stem.
    pub id: String,
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
    /// View the image was acquired with.
    pub mode: AcquisitionMode,
    /// Closed candidate silhouettes.
    pub polygons: Vec<Polygon>,
}

/// Source of segmented images for one sample.
///
/// Background subtraction, thresholding and morphological cleanup happen
/// behind this trait; the grading pipeline only sees polygons.
pub trait SegmentationProvider: Sync {
    /// Number of images in acquisition order.
    fn image_count(&self) -> usize;

    /// Segments the `index`-th image.
    fn segment(&self, index: usize) -> Result<SegmentedImage, GrainError>;
}

/// Provider over polygons segmented ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecomputedProvider {
    images: Vec<SegmentedImage>,
}

impl PrecomputedProvider {
    /// Wraps already segmented images.
    pub fn new(images: Vec<SegmentedImage>) -> Self {
        Self { images }
    }

    /// Reads a JSON array of segmented images.
    pub fn from_json_path(path: &Path) -> Result<Self, GrainError> {
        let bytes = fs::read(path).map_err(|err| {
            GrainError::Serde(
                ErrorInfo::new("segments_read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Ok(Self::new(from_json_slice(&bytes)?))
    }

    /// Images held by the provider.
    pub fn images(&self) -> &[SegmentedImage] {
        &self.images
    }
}

impl SegmentationProvider for PrecomputedProvider {
    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn segment(&self, index: usize) -> Result<SegmentedImage, GrainError> {
        self.images.get(index).cloned().ok_or_else(|| {
            GrainError::Config(
                ErrorInfo::new("image_index", "image index out of range")
                    .with_context("index", index)
                    .with_context("images", self.images.len()),
            )
        })
    }
}
