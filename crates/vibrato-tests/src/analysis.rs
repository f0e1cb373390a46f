//! Signal analysis functions for stimulus testing.

use std::f64::consts::PI;

use vibrato_backend_audio::wav::extract_pcm_data;

/// Peak absolute value.
pub fn peak_amplitude(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0_f64, |peak, s| peak.max(s.abs()))
}

/// Arithmetic mean.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Root mean square.
pub fn calculate_rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

/// Magnitude of a single DFT bin at `frequency`, normalized so a unit
/// sinusoid spanning the whole buffer measures 0.5.
///
/// Uses the Goertzel recurrence.
pub fn tone_magnitude(samples: &[f64], frequency: f64, sample_rate: u32) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let w = 2.0 * PI * frequency / sample_rate as f64;
    let coeff = 2.0 * w.cos();
    let (mut s1, mut s2) = (0.0_f64, 0.0_f64);
    for &x in samples {
        let s0 = x + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    let power = s1 * s1 + s2 * s2 - coeff * s1 * s2;
    power.max(0.0).sqrt() / samples.len() as f64
}

/// Decodes the 16-bit mono PCM payload of a WAV buffer to `[-1, 1)`.
pub fn parse_wav_samples(wav_data: &[u8]) -> Option<Vec<f64>> {
    let pcm = extract_pcm_data(wav_data)?;
    Some(
        pcm.chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f64 / 32768.0)
            .collect(),
    )
}
