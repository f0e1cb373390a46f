//! Experiment plan configuration.
//!
//! A plan describes how many stimuli to render for each subject, block, and
//! repeat, and the shared synthesis settings every condition starts from. Plans
//! are JSON documents; every field has a default matching the reference
//! experiment, so `{}` is a valid plan.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, MorphSettings};
use crate::envelope::{midi_to_hz, AnalyzedCycle};
use crate::error::{ErrorCode, SpecError, ValidationError};
use crate::request::{GeneratorConfig, SynthesisParams};

/// Shared stimulus settings, resolved against an analyzed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusSettings {
    /// Fundamental as a MIDI note; ignored when `f0` is set.
    pub midi_pitch: f64,
    /// Fundamental in Hz.
    pub f0: Option<f64>,
    /// FM depth in semitones; derived from the cycle's pitch trace when unset.
    pub fm_depth: Option<f64>,
    /// Number of harmonic partials.
    pub num_partials: usize,
    /// Stimulus length in seconds.
    pub length: f64,
    /// Modulation rate in Hz.
    pub mod_rate: f64,
    /// Modulation hold in seconds.
    pub mod_hold: f64,
    /// Modulation fade-in in seconds.
    pub mod_fade: f64,
    /// Audio fade-in/out in seconds.
    pub audio_fade: f64,
}

impl Default for StimulusSettings {
    fn default() -> Self {
        Self {
            midi_pitch: 48.0,
            f0: None,
            fm_depth: Some(0.1314),
            num_partials: 70,
            length: 2.5,
            mod_rate: 5.0,
            mod_hold: 0.0,
            mod_fade: 0.0,
            audio_fade: 0.25,
        }
    }
}

impl StimulusSettings {
    /// Resolves the fundamental frequency in Hz.
    pub fn fundamental(&self) -> f64 {
        self.f0.unwrap_or_else(|| midi_to_hz(self.midi_pitch))
    }

    /// Builds base synthesis parameters for a cycle.
    pub fn resolve(&self, cycle: &AnalyzedCycle) -> Result<SynthesisParams, ValidationError> {
        let fm_depth = match self.fm_depth {
            Some(depth) => depth,
            None => cycle.pitch_trace.fm_depth_semitones()?,
        };
        Ok(SynthesisParams {
            f0: self.fundamental(),
            fm_depth,
            num_partials: self.num_partials,
            length: self.length,
            mod_rate: self.mod_rate,
            mod_hold: self.mod_hold,
            mod_fade: self.mod_fade,
            audio_fade: self.audio_fade,
            ..SynthesisParams::default()
        })
    }
}

/// Full experiment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPlan {
    /// Base seed for all stimulus streams.
    pub seed: u32,
    /// Number of subjects.
    pub subjects: u32,
    /// Blocks per subject.
    pub blocks: u32,
    /// Repeats of every condition per block.
    pub repeats_per_block: u32,
    /// Conditions rendered in every repeat.
    pub conditions: Vec<Condition>,
    /// Generator settings.
    pub generator: GeneratorConfig,
    /// Shared stimulus settings.
    pub stimulus: StimulusSettings,
    /// Morph settings.
    pub morph: MorphSettings,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self {
            seed: 0,
            subjects: 1,
            blocks: 1,
            repeats_per_block: 1,
            conditions: Condition::all().to_vec(),
            generator: GeneratorConfig::default(),
            stimulus: StimulusSettings::default(),
            morph: MorphSettings::default(),
        }
    }
}

impl ExperimentPlan {
    /// Parses a plan from JSON.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of stimuli the plan renders.
    pub fn total_stimuli(&self) -> u64 {
        self.subjects as u64
            * self.blocks as u64
            * self.repeats_per_block as u64
            * self.conditions.len() as u64
    }
}

pub(crate) fn plan_error(message: impl Into<String>, path: &str) -> ValidationError {
    ValidationError::with_path(ErrorCode::InvalidPlan, message, path)
}
