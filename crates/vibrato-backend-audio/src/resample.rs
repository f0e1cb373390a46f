//! Envelope resampling and looping.
//!
//! An analyzed cycle lives on the analysis frame grid. To drive a partial at
//! audio rate, its per-frame trajectory is tiled to cover the stimulus, closed by
//! repeating the first frame, read as samples at `num_frames * rate` Hz, and
//! linearly resampled to the audio rate.

use rand::Rng;
use vibrato_spec::{GeneratorConfig, SpectralEnvelope};

/// Appends the first frame to the end, closing the loop for interpolation.
pub fn close_loop(cycle: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(cycle.len() + 1);
    out.extend_from_slice(cycle);
    if let Some(&first) = cycle.first() {
        out.push(first);
    }
    out
}

/// Repeats `cycle` `num_cycles` times and closes the loop.
pub fn tile_cycle(cycle: &[f64], num_cycles: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(cycle.len() * num_cycles + 1);
    for _ in 0..num_cycles {
        out.extend_from_slice(cycle);
    }
    if let Some(&first) = cycle.first() {
        out.push(first);
    }
    out
}

/// Linearly resamples a sequence sampled at `frame_rate` Hz to `sample_rate` Hz.
///
/// Produces `round((n - 1) * sample_rate / frame_rate)` samples, the span between
/// the first and last input frame.
pub fn resample_linear(frames: &[f64], frame_rate: f64, sample_rate: f64) -> Vec<f64> {
    let n = frames.len();
    if n < 2 {
        return Vec::new();
    }

    let num_out = ((n - 1) as f64 * sample_rate / frame_rate).round() as usize;
    let step = frame_rate / sample_rate;
    let last = n - 1;

    (0..num_out)
        .map(|j| {
            let pos = j as f64 * step;
            let lo = (pos.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            let frac = pos - lo as f64;
            frames[lo] * (1.0 - frac) + frames[hi] * frac
        })
        .collect()
}

/// Converts one cycle into an audio-rate trajectory of exactly
/// `config.num_samples(length)` samples, repeating at `rate` Hz.
pub fn cycle_and_resample(
    cycle: &[f64],
    rate: f64,
    length: f64,
    config: &GeneratorConfig,
) -> Vec<f64> {
    let num_samples = config.num_samples(length);
    let num_cycles = ((length * rate).ceil() as usize).max(1);
    let frame_rate = cycle.len() as f64 * rate;

    let tiled = tile_cycle(cycle, num_cycles);
    let mut out = resample_linear(&tiled, frame_rate, config.sample_rate as f64);

    if out.len() < num_samples {
        // Rounding can leave the tiled span a sample short; hold the last value.
        let last = out.last().copied().or_else(|| cycle.first().copied()).unwrap_or(0.0);
        out.resize(num_samples, last);
    }
    out.truncate(num_samples);
    out
}

/// Reads the magnitude at a fractional bin index from one frame row.
///
/// Integral indices read the bin directly; fractional indices interpolate
/// linearly between the floor and ceil bins.
pub fn amplitude_at_bin(row: &[f64], bin: f64) -> f64 {
    let last = row.len().saturating_sub(1);
    let floor = (bin.floor().max(0.0) as usize).min(last);
    let fraction = bin - bin.floor();
    if fraction == 0.0 {
        return row[floor];
    }
    let ceil = (floor + 1).min(last);
    (1.0 - fraction) * row[floor] + fraction * row[ceil]
}

/// Per-frame magnitude trajectory at `frequency`.
pub fn frequency_trajectory(envelope: &SpectralEnvelope, frequency: f64) -> Vec<f64> {
    let bin = envelope.bin_index(frequency);
    envelope
        .frames()
        .map(|row| amplitude_at_bin(row, bin))
        .collect()
}

/// Magnitude at `frequency` in a single frame row of `envelope`.
pub fn frequency_amplitude(envelope: &SpectralEnvelope, frame: usize, frequency: f64) -> f64 {
    amplitude_at_bin(envelope.frame(frame), envelope.bin_index(frequency))
}

/// Draws a modulation rate in `[lower, upper]`, biased toward `lower`:
/// `(upper - lower + 1)^u + lower - 1` with `u ~ U(0, 1)`.
pub fn random_rate<R: Rng + ?Sized>(rng: &mut R, lower: f64, upper: f64) -> f64 {
    let u: f64 = rng.gen();
    (upper - lower + 1.0).powf(u) + lower - 1.0
}
