use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use grain_core::config::{load_config, GradingConfig};
use grain_core::serde::to_canonical_json_bytes;
use serde::Serialize;

pub mod demo;
pub mod fit;
pub mod run;
pub mod separate;

/// Configuration from `path`, or the defaults.
pub fn config_or_default(path: Option<&PathBuf>) -> Result<GradingConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(GradingConfig::default()),
    }
}

/// Writes canonical JSON to `out`, or to stdout when no path is given.
pub fn emit_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let bytes = to_canonical_json_bytes(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)?;
        }
        None => println!("{}", String::from_utf8(bytes)?),
    }
    Ok(())
}
