//! Synthesis request and generator configuration types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::envelope::SpectralEnvelope;
use crate::error::{ErrorCode, ValidationError};

/// Conventional audio sample rate for rendered stimuli.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Conventional analysis frame rate (frames per second of the pitch/envelope analysis).
pub const DEFAULT_PITCH_RATE: u32 = 200;

/// Synthesis mode of the additive engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthMode {
    /// Per-partial AM from the envelope plus shared-rate FM.
    #[default]
    #[serde(alias = "default")]
    Standard,
    /// Pure amplitude modulation: one global tremolo envelope.
    Pam,
    /// Random amplitude-modulation frequency per partial.
    Raf,
}

impl SynthMode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthMode::Standard => "standard",
            SynthMode::Pam => "pam",
            SynthMode::Raf => "raf",
        }
    }
}

impl fmt::Display for SynthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "default" => Ok(SynthMode::Standard),
            "pam" => Ok(SynthMode::Pam),
            "raf" => Ok(SynthMode::Raf),
            other => Err(ValidationError::new(
                ErrorCode::UnknownSynthMode,
                format!("unknown synthesis mode '{}' (expected standard, pam, or raf)", other),
            )),
        }
    }
}

/// Which frame of the analyzed cycle supplies the resting spectrum for the
/// modulation fade-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestingPoint {
    /// Frame `num_frames / 4`: mid-throw of the vibrato, neither extremum.
    #[default]
    QuarterCycle,
    /// Frame `num_frames / 2`.
    MidCycle,
}

impl RestingPoint {
    /// Frame index of the resting spectrum in a cycle of `num_frames` frames.
    pub fn frame_index(&self, num_frames: usize) -> usize {
        match self {
            RestingPoint::QuarterCycle => num_frames / 4,
            RestingPoint::MidCycle => num_frames / 2,
        }
    }
}

/// Generator-wide settings shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Analysis frame rate in Hz; modulation rates are bounded by its Nyquist.
    pub pitch_rate: u32,
    /// Lower bound of the random modulation rate in RAF mode (Hz).
    pub random_rate_lower: f64,
    /// Upper bound of the random modulation rate in RAF mode (Hz).
    pub random_rate_upper: f64,
    /// Frame supplying the resting spectrum.
    pub resting_point: RestingPoint,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            pitch_rate: DEFAULT_PITCH_RATE,
            random_rate_lower: 4.0,
            random_rate_upper: 12.0,
            resting_point: RestingPoint::QuarterCycle,
        }
    }
}

impl GeneratorConfig {
    /// Audio Nyquist frequency.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Highest admissible modulation rate.
    pub fn max_mod_rate(&self) -> f64 {
        self.pitch_rate as f64 / 2.0
    }

    /// Number of output samples for a duration in seconds.
    pub fn num_samples(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64).round() as usize
    }
}

/// Scalar synthesis parameters, independent of any envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    /// Fundamental frequency in Hz.
    pub f0: f64,
    /// Depth of pitch modulation in semitones.
    pub fm_depth: f64,
    /// Number of harmonic partials.
    pub num_partials: usize,
    /// Stimulus length in seconds.
    pub length: f64,
    /// Rate of spectral and frequency modulation in Hz.
    pub mod_rate: f64,
    /// Time before modulation starts, in seconds.
    pub mod_hold: f64,
    /// Time to ramp modulation depth from 0 to 1, in seconds.
    pub mod_fade: f64,
    /// Synthesis mode.
    pub synth_mode: SynthMode,
    /// Linear fade-in/out of the final audio, in seconds.
    pub audio_fade: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            f0: 130.812_782_650_299_3,
            fm_depth: 0.0,
            num_partials: 70,
            length: 2.5,
            mod_rate: 5.0,
            mod_hold: 0.0,
            mod_fade: 0.0,
            synth_mode: SynthMode::Standard,
            audio_fade: 0.0,
        }
    }
}

impl SynthesisParams {
    /// Binds these parameters to an envelope, producing a request.
    pub fn with_envelope<'a>(&self, envelope: &'a SpectralEnvelope) -> SynthesisRequest<'a> {
        SynthesisRequest {
            envelope,
            params: self.clone(),
        }
    }

    /// Frequency of partial `k` (zero-based).
    pub fn partial_frequency(&self, k: usize) -> f64 {
        (k + 1) as f64 * self.f0
    }

    /// Frequency of the highest partial.
    pub fn highest_partial(&self) -> f64 {
        self.num_partials as f64 * self.f0
    }

    /// Linear FM coefficient: `2^(fm_depth / 12) - 1`.
    pub fn fm_coefficient(&self) -> f64 {
        2.0_f64.powf(self.fm_depth / 12.0) - 1.0
    }
}

/// An immutable synthesis request: scalar parameters plus a borrowed envelope.
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    /// Envelope to read partial amplitudes from.
    pub envelope: &'a SpectralEnvelope,
    /// Scalar parameters.
    pub params: SynthesisParams,
}
