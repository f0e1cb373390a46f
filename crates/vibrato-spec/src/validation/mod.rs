//! Request, config, and plan validation.
//!
//! All checks run before any buffer is allocated. Each function collects every
//! violation into a [`ValidationResult`].

pub mod common;

#[cfg(test)]
mod tests;

use crate::condition::Condition;
use crate::envelope::{AnalyzedCycle, EPS};
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::plan::{plan_error, ExperimentPlan};
use crate::request::{GeneratorConfig, SynthMode, SynthesisRequest};

pub use common::{validate_non_negative, validate_positive, validate_range};

fn push(result: &mut ValidationResult, check: Result<(), ValidationError>) {
    if let Err(e) = check {
        result.add_error(e);
    }
}

/// Validates generator-wide settings.
pub fn validate_config(config: &GeneratorConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.sample_rate == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidSampleRate,
            "sample rate must be positive",
            "generator.sample_rate",
        ));
    }
    if config.pitch_rate == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidSampleRate,
            "pitch rate must be positive",
            "generator.pitch_rate",
        ));
    }

    let lower = config.random_rate_lower;
    let upper = config.random_rate_upper;
    if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 || lower > upper {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidRateLimits,
            format!(
                "random rate limits must satisfy 0 < lower <= upper, got [{}, {}]",
                lower, upper
            ),
            "generator.random_rate_lower",
        ));
    } else if config.pitch_rate > 0 && upper > config.max_mod_rate() {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidRateLimits,
            format!(
                "random rate upper limit {} Hz exceeds the modulation limit of {} Hz",
                upper,
                config.max_mod_rate()
            ),
            "generator.random_rate_upper",
        ));
    }

    result
}

/// Validates a synthesis request against a generator configuration.
///
/// # Example
/// ```
/// use vibrato_spec::{GeneratorConfig, SpectralEnvelope, SynthesisParams};
/// use vibrato_spec::validation::validate_request;
///
/// let envelope = SpectralEnvelope::constant(44100, 10, 2, 1.0).unwrap();
/// let params = SynthesisParams { f0: 0.0, ..SynthesisParams::default() };
/// let result = validate_request(&params.with_envelope(&envelope), &GeneratorConfig::default());
/// assert!(!result.is_ok());
/// ```
pub fn validate_request(request: &SynthesisRequest<'_>, config: &GeneratorConfig) -> ValidationResult {
    let mut result = validate_config(config);
    if !result.is_ok() {
        return result;
    }

    let p = &request.params;
    let env = request.envelope;

    push(
        &mut result,
        validate_positive(ErrorCode::InvalidFundamental, "f0", p.f0),
    );
    push(
        &mut result,
        validate_non_negative(ErrorCode::InvalidFmDepth, "fm_depth", p.fm_depth),
    );

    if p.num_partials == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidPartialCount,
            "at least one partial is required",
            "num_partials",
        ));
    } else if p.f0.is_finite() && p.f0 > 0.0 {
        let highest = p.highest_partial();
        if highest > config.nyquist() {
            result.add_error(ValidationError::with_path(
                ErrorCode::PartialsAboveNyquist,
                format!(
                    "{} partials of {} Hz reach {} Hz, above the audio Nyquist of {} Hz",
                    p.num_partials,
                    p.f0,
                    highest,
                    config.nyquist()
                ),
                "num_partials",
            ));
        }
        if highest > env.max_frequency() {
            result.add_error(ValidationError::with_path(
                ErrorCode::EnvelopeRangeExceeded,
                format!(
                    "highest partial {} Hz lies beyond the top envelope bin at {} Hz",
                    highest,
                    env.max_frequency()
                ),
                "num_partials",
            ));
        }
    }

    let length_ok = validate_positive(ErrorCode::InvalidLength, "length", p.length);
    let length_valid = length_ok.is_ok();
    push(&mut result, length_ok);

    if !p.mod_rate.is_finite() || p.mod_rate <= 0.0 || p.mod_rate > config.max_mod_rate() {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidModRate,
            format!(
                "must be in (0, {}] Hz, got {}",
                config.max_mod_rate(),
                p.mod_rate
            ),
            "mod_rate",
        ));
    }

    push(
        &mut result,
        validate_non_negative(ErrorCode::InvalidModTiming, "mod_hold", p.mod_hold),
    );
    push(
        &mut result,
        validate_non_negative(ErrorCode::InvalidModTiming, "mod_fade", p.mod_fade),
    );
    push(
        &mut result,
        validate_non_negative(ErrorCode::InvalidAudioFade, "audio_fade", p.audio_fade),
    );

    if length_valid {
        if p.mod_hold + p.mod_fade > p.length + EPS {
            result.add_error(ValidationError::with_path(
                ErrorCode::InvalidModTiming,
                format!(
                    "mod_hold + mod_fade ({} s) exceeds length ({} s)",
                    p.mod_hold + p.mod_fade,
                    p.length
                ),
                "mod_fade",
            ));
        }
        if p.audio_fade > p.length + EPS {
            result.add_error(ValidationError::with_path(
                ErrorCode::InvalidAudioFade,
                format!("audio_fade ({} s) exceeds length ({} s)", p.audio_fade, p.length),
                "audio_fade",
            ));
        }

        // The slowest rate gives the longest resampled frame.
        let rate = match p.synth_mode {
            SynthMode::Raf => config.random_rate_lower,
            SynthMode::Standard | SynthMode::Pam => p.mod_rate,
        };
        let frame_duration = 1.0 / (env.num_frames() as f64 * rate);
        if rate > 0.0 && (p.length < frame_duration || config.num_samples(p.length) == 0) {
            result.add_error(ValidationError::with_path(
                ErrorCode::LengthBelowFrame,
                format!(
                    "length {} s is shorter than one resampled frame ({} s)",
                    p.length, frame_duration
                ),
                "length",
            ));
        }
    }

    result
}

/// Validates the structure of an experiment plan.
pub fn validate_plan(plan: &ExperimentPlan) -> ValidationResult {
    let mut result = validate_config(&plan.generator);

    if plan.subjects == 0 {
        result.add_error(plan_error("at least one subject is required", "subjects"));
    }
    if plan.blocks == 0 {
        result.add_error(plan_error("at least one block is required", "blocks"));
    }
    if plan.repeats_per_block == 0 {
        result.add_error(plan_error(
            "at least one repeat is required",
            "repeats_per_block",
        ));
    }
    if plan.conditions.is_empty() {
        result.add_error(plan_error("at least one condition is required", "conditions"));
    }
    if plan.morph.num_shifts == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidMorphSettings,
            "num_shifts must be positive",
            "morph.num_shifts",
        ));
    }
    push(
        &mut result,
        validate_non_negative(
            ErrorCode::InvalidMorphSettings,
            "morph.max_random_gain",
            plan.morph.max_random_gain,
        ),
    );
    if let Some(f0) = plan.stimulus.f0 {
        push(
            &mut result,
            validate_positive(ErrorCode::InvalidFundamental, "stimulus.f0", f0),
        );
    }

    result
}

/// Validates a plan against a concrete analyzed cycle, checking the request of
/// every condition it renders.
pub fn validate_plan_for_cycle(plan: &ExperimentPlan, cycle: &AnalyzedCycle) -> ValidationResult {
    let mut result = validate_plan(plan);
    if !result.is_ok() {
        return result;
    }

    let base = match plan.stimulus.resolve(cycle) {
        Ok(base) => base,
        Err(e) => {
            result.add_error(e);
            return result;
        }
    };

    let mut conditions: Vec<Condition> = plan.conditions.clone();
    conditions.dedup();
    for condition in conditions {
        let params = condition.apply(&base);
        let request = params.with_envelope(&cycle.envelope);
        for mut e in validate_request(&request, &plan.generator).errors {
            e.path = Some(format!(
                "{}.{}",
                condition.file_stem(),
                e.path.unwrap_or_default()
            ));
            if !result.errors.contains(&e) {
                result.add_error(e);
            }
        }
    }

    result
}
