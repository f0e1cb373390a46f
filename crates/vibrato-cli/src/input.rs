//! Loading analyzed cycles and experiment plans from JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use vibrato_spec::{AnalyzedCycle, ExperimentPlan};

/// An analyzed cycle together with the hash of the file it came from.
#[derive(Debug)]
pub struct LoadedCycle {
    /// The parsed cycle.
    pub cycle: AnalyzedCycle,
    /// BLAKE3 hash of the source file content (hex string).
    pub source_hash: String,
}

/// Loads an analyzed cycle from a JSON file.
pub fn load_cycle(path: &Path) -> Result<LoadedCycle> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cycle file: {}", path.display()))?;
    let cycle = AnalyzedCycle::from_json(&content)
        .with_context(|| format!("Failed to parse cycle file: {}", path.display()))?;
    log::debug!(
        "loaded cycle '{}': {} frames x {} bins",
        cycle.filename,
        cycle.envelope.num_frames(),
        cycle.envelope.num_bins()
    );

    Ok(LoadedCycle {
        cycle,
        source_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
    })
}

/// Loads an experiment plan, or the default plan when no path is given.
pub fn load_plan(path: Option<&Path>) -> Result<ExperimentPlan> {
    let Some(path) = path else {
        return Ok(ExperimentPlan::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    ExperimentPlan::from_json(&content)
        .with_context(|| format!("Failed to parse plan file: {}", path.display()))
}
