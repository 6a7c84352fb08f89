use grain_core::types::{ClassVector, CLASS_COUNT};

/// Share of each class in the total; all zeros when the total is zero.
pub fn proportions(values: &ClassVector) -> ClassVector {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return [0.0; CLASS_COUNT];
    }
    values.map(|v| v / total)
}

/// Count shares.
pub fn count_proportions(counts: &[u64; CLASS_COUNT]) -> ClassVector {
    proportions(&counts.map(|c| c as f64))
}

/// Cumulative share from the finest class upward (percent passing, as a fraction).
pub fn passing_rates(values: &ClassVector) -> ClassVector {
    let total: f64 = values.iter().sum();
    let mut rates = [0.0; CLASS_COUNT];
    if total <= 0.0 || !total.is_finite() {
        return rates;
    }
    let mut running = 0.0;
    for (rate, value) in rates.iter_mut().zip(values) {
        running += value;
        *rate = running / total;
    }
    rates
}

/// Label with disabled classes removed and the rest rescaled to sum to one.
pub fn mask_label(label: &ClassVector, enabled: &[bool; CLASS_COUNT]) -> ClassVector {
    let mut masked = *label;
    for (value, on) in masked.iter_mut().zip(enabled) {
        if !on {
            *value = 0.0;
        }
    }
    proportions(&masked)
}
