//! Synthetic analyzed cycles and on-disk experiment inputs.

use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vibrato_spec::{AnalyzedCycle, ExperimentPlan, PitchTrace, SpectralEnvelope};

/// A cycle whose every bin swings sinusoidally around 1.0 by `swing`, with
/// bin `k` offset in phase by `k / num_bins` of a cycle.
pub fn vibrato_cycle(sample_rate: u32, num_frames: usize, num_bins: usize, swing: f64) -> AnalyzedCycle {
    let frames = (0..num_frames)
        .map(|i| {
            (0..num_bins)
                .map(|k| {
                    let phase = i as f64 / num_frames as f64 + k as f64 / num_bins as f64;
                    1.0 + swing * (TAU * phase).cos()
                })
                .collect()
        })
        .collect();
    let pitch_trace = (0..num_frames)
        .map(|i| 220.0 * (1.0 + 0.01 * (TAU * i as f64 / num_frames as f64).sin()))
        .collect();

    AnalyzedCycle {
        filename: "synthetic_vibrato.wav".to_string(),
        envelope: SpectralEnvelope::from_frames(sample_rate, frames)
            .expect("synthetic frames are rectangular"),
        pitch_trace: PitchTrace(pitch_trace),
        sample_rate,
    }
}

/// A cycle with every bin fixed at `value` and no pitch trace.
pub fn flat_cycle(sample_rate: u32, num_frames: usize, num_bins: usize, value: f64) -> AnalyzedCycle {
    AnalyzedCycle {
        filename: "flat.wav".to_string(),
        envelope: SpectralEnvelope::constant(sample_rate, num_frames, num_bins, value)
            .expect("valid flat envelope"),
        pitch_trace: PitchTrace::default(),
        sample_rate,
    }
}

/// A temporary directory holding a cycle file and a plan file.
pub struct ExperimentFixture {
    pub root: TempDir,
    pub cycle_path: PathBuf,
    pub plan_path: PathBuf,
}

impl ExperimentFixture {
    /// Writes `cycle` and `plan` as JSON into a fresh temporary directory.
    pub fn new(cycle: &AnalyzedCycle, plan: &ExperimentPlan) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let cycle_path = root.path().join("cycle.json");
        let plan_path = root.path().join("plan.json");
        fs::write(
            &cycle_path,
            cycle.to_json_pretty().expect("Failed to serialize cycle"),
        )
        .expect("Failed to write cycle file");
        fs::write(
            &plan_path,
            serde_json::to_string_pretty(plan).expect("Failed to serialize plan"),
        )
        .expect("Failed to write plan file");

        Self {
            root,
            cycle_path,
            plan_path,
        }
    }

    /// Output directory inside the fixture.
    pub fn out_root(&self) -> PathBuf {
        self.root.path().join("stimuli")
    }

    /// Root path of the fixture.
    pub fn path(&self) -> &Path {
        self.root.path()
    }
}
