use serde::{Deserialize, Serialize};
use tracing::info;

use grain_core::types::{ParticleMeasurement, CLASS_COUNT};

/// Per-class acceptance window applied to calibration particles before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementWindow {
    /// Particles with a shorter short axis are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_short: Option<f64>,
    /// Particles with a longer long axis are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_long: Option<f64>,
}

impl MeasurementWindow {
    /// Returns true when `particle` lies inside the window.
    pub fn admits(&self, particle: &ParticleMeasurement) -> bool {
        self.min_short.map_or(true, |min| particle.short_axis >= min)
            && self.max_long.map_or(true, |max| particle.long_axis <= max)
    }
}

/// Short-axis samples per class, ready for fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSet {
    /// One list of short-axis lengths per class.
    pub classes: Vec<Vec<f64>>,
    /// Particles dropped by the measurement windows.
    pub windowed_out: u64,
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self {
            classes: vec![Vec::new(); CLASS_COUNT],
            windowed_out: 0,
        }
    }
}

impl CalibrationSet {
    /// Adds particles known to belong to `class`, keeping those inside `window`.
    ///
    /// Out-of-range classes are ignored.
    pub fn extend<'a, I>(&mut self, class: usize, window: &MeasurementWindow, particles: I)
    where
        I: IntoIterator<Item = &'a ParticleMeasurement>,
    {
        let Some(samples) = self.classes.get_mut(class) else {
            return;
        };
        let before = samples.len();
        let mut seen = 0usize;
        for particle in particles {
            seen += 1;
            if window.admits(particle) {
                samples.push(particle.short_axis);
            }
        }
        let kept = samples.len() - before;
        self.windowed_out += (seen - kept) as u64;
        info!(class, kept, dropped = seen - kept, "calibration particles collected");
    }

    /// Sample count per class.
    pub fn counts(&self) -> Vec<usize> {
        self.classes.iter().map(Vec::len).collect()
    }
}
