//! Audio-rate partial envelopes.
//!
//! The analyzed envelope is first reduced to one per-frame trajectory per
//! harmonic partial. Each trajectory is then looped and resampled to audio rate
//! on demand and cross-faded from a resting spectrum under the depth trajectory.

use rand::Rng;
use vibrato_spec::{GeneratorConfig, SpectralEnvelope, SynthMode, SynthesisParams};

use crate::resample::{cycle_and_resample, frequency_amplitude, frequency_trajectory, random_rate};

/// Modulation depth over time: 0 for `mod_hold` seconds, a linear ramp over
/// `mod_fade` seconds, then 1.
pub fn depth_trajectory(params: &SynthesisParams, config: &GeneratorConfig) -> Vec<f64> {
    let sr = config.sample_rate as f64;
    let num_samples = config.num_samples(params.length);
    let hold = (params.mod_hold * sr) as usize;
    let fade = (params.mod_fade * sr) as usize;

    (0..num_samples)
        .map(|i| {
            if i < hold {
                0.0
            } else if i < hold + fade {
                (i - hold) as f64 / fade as f64
            } else {
                1.0
            }
        })
        .collect()
}

/// Per-partial magnitudes of the resting frame.
pub fn resting_spectrum(
    envelope: &SpectralEnvelope,
    params: &SynthesisParams,
    config: &GeneratorConfig,
) -> Vec<f64> {
    let frame = config.resting_point.frame_index(envelope.num_frames());
    (0..params.num_partials)
        .map(|k| frequency_amplitude(envelope, frame, params.partial_frequency(k)))
        .collect()
}

/// Cross-fades a modulated trajectory with a resting value in place:
/// `out = depth * trajectory + (1 - depth) * resting`.
pub fn apply_spectral_fade(trajectory: &mut [f64], depth: &[f64], resting: f64) {
    for (value, d) in trajectory.iter_mut().zip(depth) {
        *value = d * *value + (1.0 - d) * resting;
    }
}

/// Partial envelopes of one request, rendered lazily one partial at a time.
#[derive(Debug, Clone)]
pub struct PartialEnvelopes {
    cycles: Vec<Vec<f64>>,
    rates: Vec<f64>,
    resting: Vec<f64>,
    depth: Vec<f64>,
    length: f64,
    config: GeneratorConfig,
}

impl PartialEnvelopes {
    /// Reduces the envelope to per-partial cycles and fixes each partial's
    /// modulation rate.
    ///
    /// In RAF mode one rate per partial is drawn from `rng`, in partial order;
    /// other modes use `mod_rate` for every partial and draw nothing.
    pub fn new<R: Rng + ?Sized>(
        envelope: &SpectralEnvelope,
        params: &SynthesisParams,
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Self {
        let cycles: Vec<Vec<f64>> = (0..params.num_partials)
            .map(|k| frequency_trajectory(envelope, params.partial_frequency(k)))
            .collect();

        let rates: Vec<f64> = match params.synth_mode {
            SynthMode::Raf => (0..params.num_partials)
                .map(|_| random_rate(rng, config.random_rate_lower, config.random_rate_upper))
                .collect(),
            SynthMode::Standard | SynthMode::Pam => vec![params.mod_rate; params.num_partials],
        };
        if params.synth_mode == SynthMode::Raf {
            log::trace!("raf rates: {:?}", rates);
        }

        Self {
            cycles,
            rates,
            resting: resting_spectrum(envelope, params, config),
            depth: depth_trajectory(params, config),
            length: params.length,
            config: config.clone(),
        }
    }

    /// Number of partials.
    pub fn num_partials(&self) -> usize {
        self.cycles.len()
    }

    /// Number of audio samples per partial.
    pub fn num_samples(&self) -> usize {
        self.depth.len()
    }

    /// Amplitude-modulation rate of each partial in Hz.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Resting magnitude of each partial.
    pub fn resting(&self) -> &[f64] {
        &self.resting
    }

    /// Modulation depth trajectory.
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Audio-rate amplitude envelope of partial `k`, spectral fade applied.
    pub fn partial(&self, k: usize) -> Vec<f64> {
        let mut trajectory =
            cycle_and_resample(&self.cycles[k], self.rates[k], self.length, &self.config);
        apply_spectral_fade(&mut trajectory, &self.depth, self.resting[k]);
        trajectory
    }
}
