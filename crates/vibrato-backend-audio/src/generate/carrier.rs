//! Partial carriers and the two mixing strategies.

use std::f64::consts::PI;

use rand::Rng;

use super::envelope::PartialEnvelopes;

/// Frequency modulation shared by every partial of a stimulus.
#[derive(Debug, Clone, Copy)]
pub struct Vibrato<'a> {
    /// Linear FM coefficient, `2^(fm_depth / 12) - 1`.
    pub coefficient: f64,
    /// Modulation rate in Hz.
    pub rate: f64,
    /// Depth trajectory scaling the coefficient over time.
    pub depth: &'a [f64],
}

/// Draws a random initial phase in `[0, 2π)`.
pub fn initial_phase<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() * 2.0 * PI
}

/// Renders `cos(phase(n))` for a carrier whose instantaneous frequency is
/// `frequency * (1 + c * depth(n) * cos(2π rate n / sr))`.
///
/// The phase is the running sum of per-sample increments, so the first sample
/// already includes one increment.
pub fn carrier(
    frequency: f64,
    vibrato: Option<Vibrato<'_>>,
    num_samples: usize,
    sample_rate: f64,
    phase: f64,
) -> Vec<f64> {
    let step = 2.0 * PI / sample_rate;
    let mut accumulated = phase;

    (0..num_samples)
        .map(|n| {
            let deviation = match vibrato {
                Some(v) => {
                    let t = n as f64 / sample_rate;
                    v.coefficient * v.depth[n] * (2.0 * PI * v.rate * t).cos()
                }
                None => 0.0,
            };
            accumulated += step * frequency * (1.0 + deviation);
            accumulated.cos()
        })
        .collect()
}

/// Sums `amp_k(n) * carrier_k(n)` over every partial.
///
/// Draws one initial phase per partial, in partial order.
pub fn standard_mix<R: Rng + ?Sized>(
    envelopes: &PartialEnvelopes,
    frequencies: &[f64],
    vibrato: Option<Vibrato<'_>>,
    sample_rate: f64,
    rng: &mut R,
) -> Vec<f64> {
    let num_samples = envelopes.num_samples();
    let mut out = vec![0.0; num_samples];

    for (k, &frequency) in frequencies.iter().enumerate() {
        let amplitude = envelopes.partial(k);
        let wave = carrier(frequency, vibrato, num_samples, sample_rate, initial_phase(rng));
        for ((o, a), c) in out.iter_mut().zip(&amplitude).zip(&wave) {
            *o += a * c;
        }
    }

    out
}

/// Global tremolo and per-partial gains for pure amplitude modulation.
#[derive(Debug, Clone)]
pub struct PamComponents {
    /// Sum of every partial's envelope.
    pub master: Vec<f64>,
    /// Time-averaged envelope of each partial.
    pub gains: Vec<f64>,
}

impl PamComponents {
    /// Collapses per-partial envelopes into one master envelope and static gains.
    pub fn from_envelopes(envelopes: &PartialEnvelopes) -> Self {
        let num_samples = envelopes.num_samples();
        let mut master = vec![0.0; num_samples];
        let mut gains = Vec::with_capacity(envelopes.num_partials());

        for k in 0..envelopes.num_partials() {
            let amplitude = envelopes.partial(k);
            let sum: f64 = amplitude.iter().sum();
            gains.push(if num_samples > 0 {
                sum / num_samples as f64
            } else {
                0.0
            });
            for (m, a) in master.iter_mut().zip(&amplitude) {
                *m += a;
            }
        }

        Self { master, gains }
    }
}

/// Sums `gain_k * master(n) * carrier_k(n)` with FM-free carriers.
///
/// Draws one initial phase per partial, in partial order.
pub fn pam_mix<R: Rng + ?Sized>(
    components: &PamComponents,
    frequencies: &[f64],
    sample_rate: f64,
    rng: &mut R,
) -> Vec<f64> {
    let num_samples = components.master.len();
    let mut out = vec![0.0; num_samples];

    for (&frequency, &gain) in frequencies.iter().zip(&components.gains) {
        let wave = carrier(frequency, None, num_samples, sample_rate, initial_phase(rng));
        for ((o, m), c) in out.iter_mut().zip(&components.master).zip(&wave) {
            *o += gain * m * c;
        }
    }

    out
}
