use serde::{Deserialize, Serialize};

use grain_core::types::ClassVector;

/// Fineness modulus of a six-class grading given as fractions.
///
/// Cumulative retained percentages are taken from the coarsest sieve
/// downward, with an implicit empty class above the top sieve, and the
/// standard `(ΣA − 5·A_top) / (100 − A_top)` index applied to the five
/// sieves 2.36 mm to 0.15 mm.
pub fn fineness_modulus(proportions: &ClassVector) -> f64 {
    let mut retained = [0.0f64; 7];
    for (slot, value) in retained[1..].iter_mut().zip(proportions.iter().rev()) {
        *slot = value * 100.0;
    }
    let top = retained[0];
    let cumulative: f64 = (2..=6).map(|k| retained[..k].iter().sum::<f64>()).sum();
    let denominator = 100.0 - top;
    if denominator == 0.0 {
        return 0.0;
    }
    (cumulative - 5.0 * top) / denominator
}

/// Measured and reference fineness modulus of one sample batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinenessPair {
    /// From measured volume proportions.
    pub measured: f64,
    /// From the reference label.
    pub label: f64,
}

impl FinenessPair {
    /// Computes both moduli.
    pub fn new(measured: &ClassVector, label: &ClassVector) -> Self {
        Self {
            measured: fineness_modulus(measured),
            label: fineness_modulus(label),
        }
    }

    /// `measured − label`.
    pub fn error(&self) -> f64 {
        self.measured - self.label
    }
}
