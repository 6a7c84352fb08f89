use grain_core::types::ClassVector;

/// `label[c] − measured[c]` for every class.
pub fn differences(label: &ClassVector, measured: &ClassVector) -> ClassVector {
    let mut diff = *label;
    for (d, m) in diff.iter_mut().zip(measured) {
        *d -= m;
    }
    diff
}

/// Sum of absolute differences.
pub fn summary_error(differences: &ClassVector) -> f64 {
    differences.iter().map(|d| d.abs()).sum()
}
