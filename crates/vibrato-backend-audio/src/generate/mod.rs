//! Main entry point for stimulus synthesis.
//!
//! [`synthesize`] validates a request, derives audio-rate partial envelopes from
//! the analyzed cycle, mixes one carrier per harmonic partial, and conditions the
//! result to a unit-peak signal.

mod carrier;
mod envelope;
mod post;

#[cfg(test)]
mod tests;

use rand::Rng;
use vibrato_spec::{validate_request, GeneratorConfig, SynthMode, SynthesisRequest};

use crate::error::{AudioError, AudioResult};

pub use carrier::{carrier, initial_phase, pam_mix, standard_mix, PamComponents, Vibrato};
pub use envelope::{apply_spectral_fade, depth_trajectory, resting_spectrum, PartialEnvelopes};
pub use post::{apply_fade, normalize_peak, postprocess, remove_dc, Fade};

/// Renders one stimulus.
///
/// # Arguments
/// * `request` - Envelope and synthesis parameters
/// * `config` - Generator-wide settings
/// * `rng` - Source of every random draw (RAF rates, then carrier phases)
///
/// # Returns
/// `config.num_samples(length)` samples with a peak magnitude of 1 (before the
/// audio fade), or a validation error listing every violated precondition.
pub fn synthesize<R: Rng + ?Sized>(
    request: &SynthesisRequest<'_>,
    config: &GeneratorConfig,
    rng: &mut R,
) -> AudioResult<Vec<f64>> {
    let validation = validate_request(request, config);
    if !validation.is_ok() {
        return Err(AudioError::Validation(validation.errors));
    }

    let params = &request.params;
    let sample_rate = config.sample_rate as f64;
    let envelopes = PartialEnvelopes::new(request.envelope, params, config, rng);
    let frequencies: Vec<f64> = (0..params.num_partials)
        .map(|k| params.partial_frequency(k))
        .collect();

    log::debug!(
        "synthesize: mode={} f0={} partials={} samples={}",
        params.synth_mode,
        params.f0,
        params.num_partials,
        envelopes.num_samples()
    );

    let mut samples = match params.synth_mode {
        SynthMode::Standard | SynthMode::Raf => {
            let vibrato = Vibrato {
                coefficient: params.fm_coefficient(),
                rate: params.mod_rate,
                depth: envelopes.depth(),
            };
            standard_mix(&envelopes, &frequencies, Some(vibrato), sample_rate, rng)
        }
        SynthMode::Pam => {
            let components = PamComponents::from_envelopes(&envelopes);
            pam_mix(&components, &frequencies, sample_rate, rng)
        }
    };

    postprocess(&mut samples, params.audio_fade, config.sample_rate)?;
    Ok(samples)
}
