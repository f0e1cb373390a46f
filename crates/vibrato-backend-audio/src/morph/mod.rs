//! Envelope morphing.
//!
//! An [`EnvelopeMorpher`] owns a copy of an analyzed envelope and rewrites it in
//! place. Calls compose: each one starts from the result of the previous call.
//! Every random choice is recorded in a [`MorphLog`] so a stimulus can be traced
//! back to the shifts and gains that produced it.

mod record;


use std::f64::consts::PI;

use rand::Rng;
use vibrato_spec::{MorphStep, SpectralEnvelope, EPS};

use crate::error::{AudioError, AudioResult};

pub use record::{GainEntry, MorphLog, MorphRecord, ShiftEntry};

/// Produces altered copies of a spectral envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeMorpher {
    envelope: SpectralEnvelope,
    f0: Option<f64>,
    log: MorphLog,
}

impl EnvelopeMorpher {
    /// Creates a morpher over a copy of `envelope`.
    ///
    /// When `f0` is given, bins sitting just above a harmonic of `f0` are shifted
    /// together with the bin below them during [`shuffle_phase`](Self::shuffle_phase).
    pub fn new(envelope: &SpectralEnvelope, f0: Option<f64>) -> AudioResult<Self> {
        if let Some(f0) = f0 {
            if !f0.is_finite() || f0 <= 0.0 || f0 > envelope.nyquist() {
                return Err(AudioError::invalid_param(
                    "f0",
                    format!("must be in (0, {}] Hz, got {}", envelope.nyquist(), f0),
                ));
            }
        }
        Ok(Self {
            envelope: envelope.clone(),
            f0,
            log: MorphLog::new(),
        })
    }

    /// Current envelope.
    pub fn envelope(&self) -> &SpectralEnvelope {
        &self.envelope
    }

    /// Random decisions made so far.
    pub fn log(&self) -> &MorphLog {
        &self.log
    }

    /// Consumes the morpher, returning the envelope and its log.
    pub fn into_parts(self) -> (SpectralEnvelope, MorphLog) {
        (self.envelope, self.log)
    }

    /// Applies one morph step.
    pub fn apply<R: Rng + ?Sized>(&mut self, step: MorphStep, rng: &mut R) -> AudioResult<()> {
        match step {
            MorphStep::TimeAverage => {
                self.time_average();
                Ok(())
            }
            MorphStep::ShufflePhase { num_shifts } => self.shuffle_phase(num_shifts, rng),
            MorphStep::Rap { max_random_gain } => self.rap(max_random_gain, rng),
        }
    }

    /// Replaces every frame with the time-averaged spectrum.
    pub fn time_average(&mut self) {
        let means = self.envelope.column_means();
        self.envelope.fill_frames(&means);
        log::debug!(
            "time_average: flattened {} frames",
            self.envelope.num_frames()
        );
    }

    /// Rotates each bin's trajectory by a random multiple of `1 / num_shifts`
    /// cycles, interpolating fractional frame offsets.
    pub fn shuffle_phase<R: Rng + ?Sized>(
        &mut self,
        num_shifts: usize,
        rng: &mut R,
    ) -> AudioResult<()> {
        if num_shifts == 0 {
            return Err(AudioError::invalid_param("num_shifts", "must be positive"));
        }

        let paired = match self.f0 {
            Some(f0) => bins_above_partials(&self.envelope, f0),
            None => Vec::new(),
        };

        let mut entries = Vec::with_capacity(self.envelope.num_bins());
        let mut last_shift: Option<f64> = None;

        for bin in 0..self.envelope.num_bins() {
            let shift = match last_shift {
                Some(previous) if paired.binary_search(&bin).is_ok() => previous,
                _ => rng.gen_range(0..num_shifts) as f64 / num_shifts as f64,
            };

            let rolled = roll(&self.envelope.column(bin), shift);
            self.envelope.set_column(bin, &rolled);

            entries.push(ShiftEntry { bin, shift });
            last_shift = Some(shift);
        }

        log::debug!(
            "shuffle_phase: {} bins over {} shifts ({} paired)",
            entries.len(),
            num_shifts,
            paired.len()
        );
        self.log.push(MorphRecord::ShufflePhase {
            num_shifts,
            entries,
        });
        Ok(())
    }

    /// Rebuilds every bin as a single-cycle cosine modulator centred on the bin's
    /// time-averaged magnitude.
    ///
    /// With `Some(max)` the depth in dB is drawn uniformly from `[0, max]`; with
    /// `None` it is measured from the bin's own trajectory.
    pub fn rap<R: Rng + ?Sized>(
        &mut self,
        max_random_gain: Option<f64>,
        rng: &mut R,
    ) -> AudioResult<()> {
        if let Some(max) = max_random_gain {
            if !max.is_finite() || max < 0.0 {
                return Err(AudioError::invalid_param(
                    "max_random_gain",
                    format!("must be finite and non-negative, got {}", max),
                ));
            }
        }

        let num_frames = self.envelope.num_frames();
        let means = self.envelope.column_means();
        let cycle: Vec<f64> = (0..num_frames)
            .map(|i| (2.0 * PI * i as f64 / num_frames as f64).cos())
            .collect();

        let mut entries = Vec::with_capacity(self.envelope.num_bins());
        let mut near_silent = 0usize;

        for (bin, &mean) in means.iter().enumerate() {
            let gain_db = match max_random_gain {
                Some(max) => rng.gen::<f64>() * max,
                None => {
                    let column = self.envelope.column(bin);
                    if column.iter().copied().fold(f64::INFINITY, f64::min) < EPS {
                        near_silent += 1;
                    }
                    modulation_depth_db(&column)
                }
            };

            let coefficient = db_to_linear_coefficient(gain_db);
            let modulator: Vec<f64> = cycle
                .iter()
                .map(|c| (c * coefficient + 1.0) * mean)
                .collect();
            self.envelope.set_column(bin, &modulator);

            entries.push(GainEntry { bin, gain_db });
        }

        if near_silent > 0 {
            log::warn!(
                "rap: {} bins touch zero; measured depths are bounded only by epsilon",
                near_silent
            );
        }
        log::debug!("rap: rebuilt {} bins", entries.len());

        self.log.push(MorphRecord::Rap {
            max_random_gain,
            entries,
        });
        Ok(())
    }
}

/// Bins just above every harmonic of `f0` whose bin index is fractional.
///
/// Returned sorted and deduplicated.
pub fn bins_above_partials(envelope: &SpectralEnvelope, f0: f64) -> Vec<usize> {
    let max_partial = (envelope.nyquist() / f0).floor() as usize;
    let mut bins: Vec<usize> = (1..=max_partial)
        .filter_map(|p| {
            let bin = envelope.bin_index(f0 * p as f64);
            (bin.fract() != 0.0).then(|| bin.ceil() as usize)
        })
        .collect();
    bins.sort_unstable();
    bins.dedup();
    bins
}

/// Circularly rotates `column` forward by `shift` cycles (`0 <= shift < 1`).
///
/// Fractional frame offsets blend the floor- and ceil-rotated copies.
pub fn roll(column: &[f64], shift: f64) -> Vec<f64> {
    let n = column.len();
    if n == 0 {
        return Vec::new();
    }

    let offset = n as f64 * shift;
    let fraction = offset.fract();
    let floor = offset.floor() as usize;

    if fraction == 0.0 {
        return roll_frames(column, floor);
    }
    let lo = roll_frames(column, floor);
    let hi = roll_frames(column, floor + 1);
    lo.iter()
        .zip(&hi)
        .map(|(a, b)| (1.0 - fraction) * a + fraction * b)
        .collect()
}

/// `out[i] = column[(i - offset) mod n]`.
fn roll_frames(column: &[f64], offset: usize) -> Vec<f64> {
    let n = column.len();
    let offset = offset % n;
    (0..n).map(|i| column[(i + n - offset) % n]).collect()
}

/// Converts a peak-to-trough depth in dB to a cosine modulator coefficient.
///
/// A modulator `1 + c cos(x)` with `c = (10^(dB/20) - 1) / (10^(dB/20) + 1)` has a
/// max/min ratio of `10^(dB/20)`.
pub fn db_to_linear_coefficient(decibels: f64) -> f64 {
    let ratio = 10.0_f64.powf(decibels / 20.0);
    (ratio - 1.0) / (ratio + 1.0)
}

/// Peak-to-trough depth of a trajectory in dB, guarded against zero minima.
pub fn modulation_depth_db(column: &[f64]) -> f64 {
    let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = column.iter().copied().fold(f64::INFINITY, f64::min);
    20.0 * ((max + EPS) / (min + EPS)).log10()
}
