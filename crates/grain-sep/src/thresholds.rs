use serde::{Deserialize, Serialize};

/// Particles above this estimated size (mm) get the relaxed floors.
pub const LARGE_PARTICLE_MM: f64 = 2.0;

/// Size-dependent acceptance thresholds for single particles.
///
/// Large particles are rarely smooth, so both thresholds fall linearly with
/// the estimated size before hitting a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    /// Shape factor must exceed this value.
    pub shape_factor: f64,
    /// Solidity must exceed this value.
    pub solidity: f64,
}

impl AdaptiveThresholds {
    /// Thresholds for a particle of estimated size `size_mm`.
    pub fn for_size(size_mm: f64) -> Self {
        let mut shape_factor = (0.8 - 0.05 * size_mm).max(0.6);
        let mut solidity = (0.95 - 0.05 * size_mm).max(0.85);
        if size_mm > LARGE_PARTICLE_MM {
            shape_factor = (shape_factor - 0.05).max(0.55);
            solidity = (solidity - 0.05).max(0.8);
        }
        Self {
            shape_factor,
            solidity,
        }
    }

    /// Returns true when both measures strictly exceed their thresholds.
    pub fn admits(&self, shape_factor: f64, solidity: f64) -> bool {
        shape_factor > self.shape_factor && solidity > self.solidity
    }
}
