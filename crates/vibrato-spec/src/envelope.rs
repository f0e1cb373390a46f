//! Spectral envelope, pitch trace, and analyzed cycle types.
//!
//! A [`SpectralEnvelope`] holds one analyzed vibrato cycle as a row-major
//! (frame x bin) grid of linear-amplitude magnitudes. The frame axis is circular:
//! frame 0 follows the last frame. The bin axis spans `[0, Nyquist]` of the
//! analysis sample rate.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, SpecError, ValidationError};

/// Small value guarding ratio and logarithm computations.
pub const EPS: f64 = 1e-8;

/// Converts a MIDI note number to Hz, where A440 = MIDI 69.
pub fn midi_to_hz(midi: f64) -> f64 {
    440.0 * 2.0_f64.powf((midi - 69.0) / 12.0)
}

/// Converts a frequency in Hz to a (fractional) MIDI note number.
pub fn hz_to_midi(hz: f64) -> f64 {
    (12.0 * ((hz + EPS) / 440.0).log2() + 69.0).max(0.0)
}

/// A (frame x bin) grid of non-negative spectral magnitudes spanning one vibrato cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnvelopeRepr", into = "EnvelopeRepr")]
pub struct SpectralEnvelope {
    sample_rate: u32,
    num_frames: usize,
    num_bins: usize,
    values: Vec<f64>,
}

/// Serialized form: analysis sample rate plus a list of frame rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnvelopeRepr {
    sample_rate: u32,
    frames: Vec<Vec<f64>>,
}

impl TryFrom<EnvelopeRepr> for SpectralEnvelope {
    type Error = ValidationError;

    fn try_from(repr: EnvelopeRepr) -> Result<Self, Self::Error> {
        SpectralEnvelope::from_frames(repr.sample_rate, repr.frames)
    }
}

impl From<SpectralEnvelope> for EnvelopeRepr {
    fn from(env: SpectralEnvelope) -> Self {
        EnvelopeRepr {
            sample_rate: env.sample_rate,
            frames: env.frames().map(<[f64]>::to_vec).collect(),
        }
    }
}

impl SpectralEnvelope {
    /// Builds an envelope from frame rows.
    ///
    /// Fails if there are no frames, no bins, the rows are ragged, or any value is
    /// negative or non-finite.
    pub fn from_frames(sample_rate: u32, frames: Vec<Vec<f64>>) -> Result<Self, ValidationError> {
        let num_frames = frames.len();
        let num_bins = frames.first().map(Vec::len).unwrap_or(0);
        if num_frames == 0 || num_bins == 0 {
            return Err(ValidationError::new(
                ErrorCode::MalformedEnvelope,
                format!(
                    "envelope must have at least one frame and one bin, got {}x{}",
                    num_frames, num_bins
                ),
            ));
        }

        let mut values = Vec::with_capacity(num_frames * num_bins);
        for (i, row) in frames.into_iter().enumerate() {
            if row.len() != num_bins {
                return Err(ValidationError::with_path(
                    ErrorCode::MalformedEnvelope,
                    format!("frame has {} bins, expected {}", row.len(), num_bins),
                    format!("envelope.frames[{}]", i),
                ));
            }
            values.extend(row);
        }

        Self::from_values(sample_rate, num_frames, num_bins, values)
    }

    /// Builds an envelope from a row-major value buffer.
    pub fn from_values(
        sample_rate: u32,
        num_frames: usize,
        num_bins: usize,
        values: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        if sample_rate == 0 {
            return Err(ValidationError::new(
                ErrorCode::InvalidSampleRate,
                "analysis sample rate must be positive",
            ));
        }
        if num_frames == 0 || num_bins == 0 || values.len() != num_frames * num_bins {
            return Err(ValidationError::new(
                ErrorCode::MalformedEnvelope,
                format!(
                    "{} values cannot form a {}x{} envelope",
                    values.len(),
                    num_frames,
                    num_bins
                ),
            ));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(ValidationError::with_path(
                ErrorCode::InvalidEnvelopeValue,
                format!("magnitude must be finite and non-negative, got {}", values[pos]),
                format!("envelope[{}][{}]", pos / num_bins, pos % num_bins),
            ));
        }
        Ok(Self {
            sample_rate,
            num_frames,
            num_bins,
            values,
        })
    }

    /// Builds an envelope from a power spectrum by taking the square root of every value.
    pub fn from_power(sample_rate: u32, frames: Vec<Vec<f64>>) -> Result<Self, ValidationError> {
        let env = Self::from_frames(sample_rate, frames)?;
        Ok(env.map(f64::sqrt))
    }

    /// Builds an envelope with every magnitude set to `value`.
    pub fn constant(
        sample_rate: u32,
        num_frames: usize,
        num_bins: usize,
        value: f64,
    ) -> Result<Self, ValidationError> {
        Self::from_values(
            sample_rate,
            num_frames,
            num_bins,
            vec![value; num_frames * num_bins],
        )
    }

    fn map(mut self, f: impl Fn(f64) -> f64) -> Self {
        for v in &mut self.values {
            *v = f(*v);
        }
        self
    }

    /// Analysis sample rate defining the frequency axis.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Nyquist frequency of the analysis sample rate.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Number of analysis frames (one vibrato cycle).
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of frequency bins.
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Magnitude at (frame, bin).
    pub fn get(&self, frame: usize, bin: usize) -> f64 {
        self.values[frame * self.num_bins + bin]
    }

    /// One frame row.
    pub fn frame(&self, frame: usize) -> &[f64] {
        let start = frame * self.num_bins;
        &self.values[start..start + self.num_bins]
    }

    /// Iterates over frame rows.
    pub fn frames(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.num_bins)
    }

    /// Copies one bin's trajectory over all frames.
    pub fn column(&self, bin: usize) -> Vec<f64> {
        (0..self.num_frames).map(|f| self.get(f, bin)).collect()
    }

    /// Overwrites one bin's trajectory.
    ///
    /// Values must be non-negative.
    pub fn set_column(&mut self, bin: usize, column: &[f64]) {
        debug_assert_eq!(column.len(), self.num_frames);
        for (frame, &v) in column.iter().enumerate() {
            self.values[frame * self.num_bins + bin] = v;
        }
    }

    /// Time-averaged magnitude of every bin.
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.num_bins];
        for row in self.frames() {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        let n = self.num_frames as f64;
        for m in &mut means {
            *m /= n;
        }
        means
    }

    /// Replaces every frame with `row`.
    pub fn fill_frames(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.num_bins);
        for chunk in self.values.chunks_exact_mut(self.num_bins) {
            chunk.copy_from_slice(row);
        }
    }

    /// Fractional bin index of a frequency: `frequency / nyquist * num_bins`.
    pub fn bin_index(&self, frequency: f64) -> f64 {
        frequency / self.nyquist() * self.num_bins as f64
    }

    /// Centre frequency of bin `k`.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 / self.num_bins as f64 * self.nyquist()
    }

    /// Highest frequency whose bin lookup stays inside the matrix.
    pub fn max_frequency(&self) -> f64 {
        self.bin_frequency(self.num_bins - 1)
    }
}

/// Per-frame fundamental frequency estimates in Hz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchTrace(pub Vec<f64>);

impl PitchTrace {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the trace has no frames.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// FM depth in semitones: half the peak-to-peak pitch excursion.
    pub fn fm_depth_semitones(&self) -> Result<f64, ValidationError> {
        if self.0.is_empty() || self.0.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(ValidationError::with_path(
                ErrorCode::InvalidPitchTrace,
                "pitch trace must be non-empty with positive frequencies",
                "pitch_trace",
            ));
        }
        let max = self.0.iter().copied().fold(f64::MIN, f64::max);
        let min = self.0.iter().copied().fold(f64::MAX, f64::min);
        Ok(12.0 * (max / min).log2() / 2.0)
    }
}

/// One analyzed source recording: a single vibrato cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CycleRepr", into = "CycleRepr")]
pub struct AnalyzedCycle {
    /// Source file name.
    pub filename: String,
    /// Linear-amplitude envelope of the cycle.
    pub envelope: SpectralEnvelope,
    /// Pitch trace on the envelope's frame axis.
    pub pitch_trace: PitchTrace,
    /// Analysis sample rate in Hz.
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CycleRepr {
    filename: String,
    sample_rate: u32,
    envelope: Vec<Vec<f64>>,
    #[serde(default)]
    pitch_trace: PitchTrace,
    /// Whether `envelope` holds power rather than linear amplitude.
    #[serde(default)]
    power: bool,
}

impl TryFrom<CycleRepr> for AnalyzedCycle {
    type Error = ValidationError;

    fn try_from(repr: CycleRepr) -> Result<Self, Self::Error> {
        let envelope = if repr.power {
            SpectralEnvelope::from_power(repr.sample_rate, repr.envelope)?
        } else {
            SpectralEnvelope::from_frames(repr.sample_rate, repr.envelope)?
        };
        if !repr.pitch_trace.is_empty() && repr.pitch_trace.len() != envelope.num_frames() {
            return Err(ValidationError::with_path(
                ErrorCode::InvalidPitchTrace,
                format!(
                    "pitch trace has {} frames, envelope has {}",
                    repr.pitch_trace.len(),
                    envelope.num_frames()
                ),
                "pitch_trace",
            ));
        }
        Ok(AnalyzedCycle {
            filename: repr.filename,
            envelope,
            pitch_trace: repr.pitch_trace,
            sample_rate: repr.sample_rate,
        })
    }
}

impl From<AnalyzedCycle> for CycleRepr {
    fn from(cycle: AnalyzedCycle) -> Self {
        CycleRepr {
            filename: cycle.filename,
            sample_rate: cycle.sample_rate,
            envelope: cycle.envelope.frames().map(<[f64]>::to_vec).collect(),
            pitch_trace: cycle.pitch_trace,
            power: false,
        }
    }
}

impl AnalyzedCycle {
    /// Parses an analyzed cycle from JSON.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the cycle to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
