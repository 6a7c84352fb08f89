use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use grain_core::types::{ClassVector, GradingRange, ParticleMeasurement, CLASS_COUNT};

use crate::binning::classes_for;

/// Per-class volume and count totals of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassTotals {
    /// Summed particle volume per class.
    pub volume: ClassVector,
    /// Particle count per class.
    pub count: [u64; CLASS_COUNT],
}

impl ClassTotals {
    /// Adds one particle to `class`; out-of-range classes are ignored.
    pub fn add(&mut self, class: usize, volume: f64) {
        if let (Some(v), Some(c)) = (self.volume.get_mut(class), self.count.get_mut(class)) {
            *v += volume;
            *c += 1;
        }
    }

    /// Sum of all class volumes.
    pub fn total_volume(&self) -> f64 {
        self.volume.iter().sum()
    }

    /// Sum of all class counts.
    pub fn total_count(&self) -> u64 {
        self.count.iter().sum()
    }
}

/// Totals keyed by `(sample, batch)` with classes stored inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeAccumulator {
    cells: BTreeMap<(usize, usize), ClassTotals>,
}

impl GradeAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bins one particle by short axis and adds it to every matching class.
    pub fn add_particle(
        &mut self,
        sample: usize,
        batch: usize,
        particle: &ParticleMeasurement,
        ranges: &[GradingRange],
    ) {
        let cell = self.cells.entry((sample, batch)).or_default();
        for class in classes_for(particle.short_axis, ranges) {
            cell.add(class, particle.volume);
        }
    }

    /// Makes sure the cell exists even when no particle lands in it.
    pub fn touch(&mut self, sample: usize, batch: usize) {
        self.cells.entry((sample, batch)).or_default();
    }

    /// Totals of one cell; zero when nothing was recorded.
    pub fn totals(&self, sample: usize, batch: usize) -> ClassTotals {
        self.cells.get(&(sample, batch)).copied().unwrap_or_default()
    }

    /// Volume of one class in one cell, `None` for an out-of-range class.
    pub fn volume(&self, sample: usize, batch: usize, class: usize) -> Option<f64> {
        if class >= CLASS_COUNT {
            return None;
        }
        Some(self.totals(sample, batch).volume[class])
    }

    /// Count of one class in one cell, `None` for an out-of-range class.
    pub fn count(&self, sample: usize, batch: usize, class: usize) -> Option<u64> {
        if class >= CLASS_COUNT {
            return None;
        }
        Some(self.totals(sample, batch).count[class])
    }

    /// Batch indices recorded for `sample`, ascending.
    pub fn batches(&self, sample: usize) -> Vec<usize> {
        self.cells
            .range((sample, 0)..(sample + 1, 0))
            .map(|((_, batch), _)| *batch)
            .collect()
    }
}
