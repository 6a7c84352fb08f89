//! Provenance attached to every run report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a report came from and which inputs produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Hash of the measurement inputs (calibration and samples).
    pub input_hash: String,
    /// Hash of the grading configuration.
    pub config_hash: String,
    /// Seed used when inputs were synthesised, zero otherwise.
    pub seed: u64,
    /// RFC 3339 timestamp of report creation.
    pub created_at: String,
    /// Version map of the crates involved.
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Creates provenance stamped with this crate's version.
    pub fn new(input_hash: String, config_hash: String, seed: u64, created_at: String) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            "grain-core".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            input_hash,
            config_hash,
            seed,
            created_at,
            tool_versions,
        }
    }

    /// Adds a tool version entry.
    pub fn with_tool(mut self, name: &str, version: &str) -> Self {
        self.tool_versions
            .insert(name.to_string(), version.to_string());
        self
    }
}
