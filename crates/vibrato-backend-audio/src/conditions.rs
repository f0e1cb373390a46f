//! Condition rendering.
//!
//! Turns one analyzed envelope and a base parameter set into the stimulus of a
//! named [`Condition`]: the condition's morph steps run first, then its request
//! overrides, then synthesis. Both stages draw from the same generator.

use rand::Rng;
use vibrato_spec::{
    validate_request, Condition, GeneratorConfig, MorphSettings, SpectralEnvelope,
    SynthesisParams,
};

use crate::error::{AudioError, AudioResult};
use crate::generate::synthesize;
use crate::morph::{EnvelopeMorpher, MorphLog};

/// One rendered stimulus and the decisions that produced it.
#[derive(Debug, Clone)]
pub struct RenderedStimulus {
    /// Condition rendered.
    pub condition: Condition,
    /// Parameters after the condition's overrides.
    pub params: SynthesisParams,
    /// Normalized audio samples.
    pub samples: Vec<f64>,
    /// Morph decisions, empty for conditions without morphs.
    pub log: MorphLog,
}

/// Applies a condition's morph steps to a copy of `envelope`.
///
/// The morpher pairs bins around harmonics of `f0`.
pub fn morph_for_condition<R: Rng + ?Sized>(
    envelope: &SpectralEnvelope,
    condition: Condition,
    f0: f64,
    settings: &MorphSettings,
    rng: &mut R,
) -> AudioResult<(SpectralEnvelope, MorphLog)> {
    let mut morpher = EnvelopeMorpher::new(envelope, Some(f0))?;
    for step in condition.morph_steps(settings) {
        morpher.apply(step, rng)?;
    }
    Ok(morpher.into_parts())
}

/// Renders one condition.
///
/// The overridden request is validated before any morphing so an invalid plan
/// consumes no random draws.
pub fn render_condition<R: Rng + ?Sized>(
    envelope: &SpectralEnvelope,
    condition: Condition,
    base: &SynthesisParams,
    settings: &MorphSettings,
    config: &GeneratorConfig,
    rng: &mut R,
) -> AudioResult<RenderedStimulus> {
    let params = condition.apply(base);
    let validation = validate_request(&params.with_envelope(envelope), config);
    if !validation.is_ok() {
        return Err(AudioError::Validation(validation.errors));
    }

    let (morphed, log) = morph_for_condition(envelope, condition, params.f0, settings, rng)?;
    log::debug!("{}: {} morphs applied", condition, log.len());

    let samples = synthesize(&params.with_envelope(&morphed), config, rng)?;

    Ok(RenderedStimulus {
        condition,
        params,
        samples,
        log,
    })
}

/// Renders both members of a standard/RAF pair from one morphed envelope.
///
/// `condition` may name either member. The morph runs once, then the standard
/// member and the RAF member are synthesized in that order from the same
/// generator. Returns `(standard, raf)`; both carry the shared morph log.
pub fn render_condition_pair<R: Rng + ?Sized>(
    envelope: &SpectralEnvelope,
    condition: Condition,
    base: &SynthesisParams,
    settings: &MorphSettings,
    config: &GeneratorConfig,
    rng: &mut R,
) -> AudioResult<(RenderedStimulus, RenderedStimulus)> {
    let counterpart = condition.raf_counterpart().ok_or_else(|| {
        AudioError::invalid_param(
            "condition",
            format!("{} has no RAF counterpart", condition),
        )
    })?;
    let (standard, raf) = if condition.is_raf() {
        (counterpart, condition)
    } else {
        (condition, counterpart)
    };

    let standard_params = standard.apply(base);
    let raf_params = raf.apply(base);
    let mut validation = validate_request(&standard_params.with_envelope(envelope), config);
    validation.merge(validate_request(&raf_params.with_envelope(envelope), config));
    if !validation.is_ok() {
        return Err(AudioError::Validation(validation.errors));
    }

    let (morphed, log) =
        morph_for_condition(envelope, standard, standard_params.f0, settings, rng)?;
    log::debug!("{} / {}: {} morphs applied", standard, raf, log.len());

    let standard_samples = synthesize(&standard_params.with_envelope(&morphed), config, rng)?;
    let raf_samples = synthesize(&raf_params.with_envelope(&morphed), config, rng)?;

    Ok((
        RenderedStimulus {
            condition: standard,
            params: standard_params,
            samples: standard_samples,
            log: log.clone(),
        },
        RenderedStimulus {
            condition: raf,
            params: raf_params,
            samples: raf_samples,
            log,
        },
    ))
}
