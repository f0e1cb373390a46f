//! Output conditioning: DC removal, peak normalization, and fades.

use crate::error::{AudioError, AudioResult};

/// Which end of the signal a fade applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    /// Ramp up from silence at the start.
    In,
    /// Ramp down to silence at the end.
    Out,
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Subtracts the mean.
pub fn remove_dc(samples: &mut [f64]) {
    let m = mean(samples);
    for s in samples.iter_mut() {
        *s -= m;
    }
}

/// Scales the signal to a peak magnitude of 1.
///
/// Fails on an identically zero signal.
pub fn normalize_peak(samples: &mut [f64]) -> AudioResult<()> {
    let peak = samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f64, |a, b| a.max(b));

    if peak == 0.0 || !peak.is_finite() {
        return Err(AudioError::SilentSignal {
            num_samples: samples.len(),
        });
    }

    let gain = 1.0 / peak;
    for s in samples.iter_mut() {
        *s *= gain;
    }
    Ok(())
}

/// Applies a linear fade of `num_samples` around the signal mean.
///
/// The ramp runs `0, 1/n, .., (n-1)/n`; a fade-out uses it reversed.
pub fn apply_fade(samples: &mut [f64], num_samples: usize, fade: Fade) {
    let n = num_samples.min(samples.len());
    if n == 0 {
        return;
    }

    let m = mean(samples);
    let len = samples.len();
    let region = match fade {
        Fade::In => &mut samples[..n],
        Fade::Out => &mut samples[len - n..],
    };
    for (i, s) in region.iter_mut().enumerate() {
        let gain = match fade {
            Fade::In => i as f64 / n as f64,
            Fade::Out => (n - 1 - i) as f64 / n as f64,
        };
        *s = (*s - m) * gain + m;
    }
}

/// Removes DC, normalizes to unit peak, and fades both ends by `fade_seconds`.
pub fn postprocess(samples: &mut [f64], fade_seconds: f64, sample_rate: u32) -> AudioResult<()> {
    remove_dc(samples);
    normalize_peak(samples)?;
    let fade_samples = (fade_seconds * sample_rate as f64) as usize;
    apply_fade(samples, fade_samples, Fade::In);
    apply_fade(samples, fade_samples, Fade::Out);
    Ok(())
}
