use super::*;
use crate::envelope::{PitchTrace, SpectralEnvelope};
use crate::plan::StimulusSettings;
use crate::request::SynthesisParams;

fn envelope() -> SpectralEnvelope {
    SpectralEnvelope::constant(44100, 40, 1024, 1.0).unwrap()
}

fn check(params: SynthesisParams, env: &SpectralEnvelope) -> ValidationResult {
    validate_request(&params.with_envelope(env), &GeneratorConfig::default())
}

fn codes(result: &ValidationResult) -> Vec<ErrorCode> {
    result.errors.iter().map(|e| e.code).collect()
}

// ========================================================================
// Request tests
// ========================================================================

#[test]
fn test_default_request_is_valid() {
    let result = check(SynthesisParams::default(), &envelope());
    assert!(result.is_ok(), "{:?}", result.errors);
}

#[test]
fn test_zero_fundamental() {
    let params = SynthesisParams {
        f0: 0.0,
        ..SynthesisParams::default()
    };
    let result = check(params, &envelope());
    assert_eq!(codes(&result), vec![ErrorCode::InvalidFundamental]);
}

#[test]
fn test_negative_fm_depth() {
    let params = SynthesisParams {
        fm_depth: -0.1,
        ..SynthesisParams::default()
    };
    assert!(check(params, &envelope()).has_code(ErrorCode::InvalidFmDepth));
}

#[test]
fn test_zero_partials() {
    let params = SynthesisParams {
        num_partials: 0,
        ..SynthesisParams::default()
    };
    assert_eq!(
        codes(&check(params, &envelope())),
        vec![ErrorCode::InvalidPartialCount]
    );
}

#[test]
fn test_partials_above_nyquist() {
    let params = SynthesisParams {
        f0: 1000.0,
        num_partials: 30,
        ..SynthesisParams::default()
    };
    let result = check(params, &envelope());
    assert!(result.has_code(ErrorCode::PartialsAboveNyquist));
    assert!(result.has_code(ErrorCode::EnvelopeRangeExceeded));
}

#[test]
fn test_envelope_range_exceeded_below_audio_nyquist() {
    // Analysis at 8 kHz with two bins tops out at 2 kHz.
    let env = SpectralEnvelope::constant(8000, 40, 2, 1.0).unwrap();
    let params = SynthesisParams {
        f0: 1000.0,
        num_partials: 3,
        ..SynthesisParams::default()
    };
    assert_eq!(
        codes(&check(params, &env)),
        vec![ErrorCode::EnvelopeRangeExceeded]
    );
}

#[test]
fn test_highest_partial_on_top_bin_is_valid() {
    let env = SpectralEnvelope::constant(8000, 40, 2, 1.0).unwrap();
    let params = SynthesisParams {
        f0: 1000.0,
        num_partials: 2,
        ..SynthesisParams::default()
    };
    assert!(check(params, &env).is_ok());
}

#[test]
fn test_invalid_length() {
    let params = SynthesisParams {
        length: 0.0,
        ..SynthesisParams::default()
    };
    let result = check(params, &envelope());
    assert_eq!(codes(&result), vec![ErrorCode::InvalidLength]);
}

#[test]
fn test_mod_rate_bounds() {
    for rate in [0.0, -1.0, 100.5, f64::NAN] {
        let params = SynthesisParams {
            mod_rate: rate,
            ..SynthesisParams::default()
        };
        assert!(
            check(params, &envelope()).has_code(ErrorCode::InvalidModRate),
            "rate {} accepted",
            rate
        );
    }

    let params = SynthesisParams {
        mod_rate: 100.0,
        ..SynthesisParams::default()
    };
    assert!(check(params, &envelope()).is_ok());
}

#[test]
fn test_mod_timing_exceeds_length() {
    let params = SynthesisParams {
        length: 2.5,
        mod_hold: 2.0,
        mod_fade: 1.0,
        ..SynthesisParams::default()
    };
    let result = check(params, &envelope());
    assert_eq!(codes(&result), vec![ErrorCode::InvalidModTiming]);
    assert_eq!(result.errors[0].path.as_deref(), Some("mod_fade"));
}

#[test]
fn test_hold_equal_to_length_is_valid() {
    let params = SynthesisParams {
        length: 2.5,
        mod_hold: 2.5,
        ..SynthesisParams::default()
    };
    assert!(check(params, &envelope()).is_ok());
}

#[test]
fn test_audio_fade_bounds() {
    let params = SynthesisParams {
        audio_fade: 3.0,
        ..SynthesisParams::default()
    };
    assert_eq!(
        codes(&check(params, &envelope())),
        vec![ErrorCode::InvalidAudioFade]
    );

    let params = SynthesisParams {
        audio_fade: -0.1,
        ..SynthesisParams::default()
    };
    assert!(check(params, &envelope()).has_code(ErrorCode::InvalidAudioFade));
}

#[test]
fn test_length_below_frame() {
    // Four frames at 5 Hz: one frame lasts 50 ms.
    let env = SpectralEnvelope::constant(44100, 4, 1024, 1.0).unwrap();
    let params = SynthesisParams {
        length: 0.01,
        ..SynthesisParams::default()
    };
    assert_eq!(
        codes(&check(params, &env)),
        vec![ErrorCode::LengthBelowFrame]
    );
}

#[test]
fn test_length_below_frame_uses_slowest_random_rate() {
    // 60 ms covers a 5 Hz frame but not a 4 Hz one.
    let env = SpectralEnvelope::constant(44100, 4, 1024, 1.0).unwrap();
    let standard = SynthesisParams {
        length: 0.06,
        ..SynthesisParams::default()
    };
    assert!(check(standard.clone(), &env).is_ok());

    let raf = SynthesisParams {
        synth_mode: SynthMode::Raf,
        ..standard
    };
    assert!(check(raf, &env).has_code(ErrorCode::LengthBelowFrame));
}

#[test]
fn test_collects_every_error() {
    let params = SynthesisParams {
        f0: -1.0,
        fm_depth: -1.0,
        length: -1.0,
        mod_rate: 0.0,
        ..SynthesisParams::default()
    };
    let result = check(params, &envelope());
    assert_eq!(
        codes(&result),
        vec![
            ErrorCode::InvalidFundamental,
            ErrorCode::InvalidFmDepth,
            ErrorCode::InvalidLength,
            ErrorCode::InvalidModRate,
        ]
    );
}

#[test]
fn test_into_result() {
    let params = SynthesisParams {
        f0: 0.0,
        ..SynthesisParams::default()
    };
    let err = check(params, &envelope()).into_result().unwrap_err();
    assert!(err.to_string().contains("E020"));
}

// ========================================================================
// Config tests
// ========================================================================

#[test]
fn test_config_rate_limits() {
    let config = GeneratorConfig {
        random_rate_lower: 12.0,
        random_rate_upper: 4.0,
        ..GeneratorConfig::default()
    };
    assert_eq!(
        codes(&validate_config(&config)),
        vec![ErrorCode::InvalidRateLimits]
    );

    let config = GeneratorConfig {
        random_rate_lower: 0.0,
        ..GeneratorConfig::default()
    };
    assert!(validate_config(&config).has_code(ErrorCode::InvalidRateLimits));

    let config = GeneratorConfig {
        random_rate_lower: 6.0,
        random_rate_upper: 6.0,
        ..GeneratorConfig::default()
    };
    assert!(validate_config(&config).is_ok());

    // The pitch rate of 200 Hz caps modulation at 100 Hz.
    let config = GeneratorConfig {
        random_rate_upper: 1000.0,
        ..GeneratorConfig::default()
    };
    let result = validate_config(&config);
    assert_eq!(codes(&result), vec![ErrorCode::InvalidRateLimits]);
    assert_eq!(
        result.errors[0].path.as_deref(),
        Some("generator.random_rate_upper")
    );

    let config = GeneratorConfig {
        random_rate_upper: config.max_mod_rate(),
        ..GeneratorConfig::default()
    };
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_invalid_config_short_circuits_request() {
    let config = GeneratorConfig {
        sample_rate: 0,
        ..GeneratorConfig::default()
    };
    let params = SynthesisParams {
        f0: 0.0,
        ..SynthesisParams::default()
    };
    let env = envelope();
    let result = validate_request(&params.with_envelope(&env), &config);
    assert_eq!(codes(&result), vec![ErrorCode::InvalidSampleRate]);
}

// ========================================================================
// Plan tests
// ========================================================================

fn cycle() -> AnalyzedCycle {
    AnalyzedCycle {
        filename: "cycle.wav".to_string(),
        envelope: SpectralEnvelope::constant(44100, 40, 8, 1.0).unwrap(),
        pitch_trace: PitchTrace::default(),
        sample_rate: 44100,
    }
}

#[test]
fn test_default_plan_is_valid() {
    assert!(validate_plan(&ExperimentPlan::default()).is_ok());
    assert!(validate_plan_for_cycle(&ExperimentPlan::default(), &cycle()).is_ok());
}

#[test]
fn test_plan_dimensions() {
    let plan = ExperimentPlan {
        subjects: 0,
        repeats_per_block: 0,
        conditions: vec![],
        ..ExperimentPlan::default()
    };
    let result = validate_plan(&plan);
    assert_eq!(
        codes(&result),
        vec![ErrorCode::InvalidPlan, ErrorCode::InvalidPlan, ErrorCode::InvalidPlan]
    );
}

#[test]
fn test_plan_morph_settings() {
    let mut plan = ExperimentPlan::default();
    plan.morph.num_shifts = 0;
    plan.morph.max_random_gain = -3.0;
    let result = validate_plan(&plan);
    assert_eq!(
        codes(&result),
        vec![
            ErrorCode::InvalidMorphSettings,
            ErrorCode::InvalidMorphSettings
        ]
    );
}

#[test]
fn test_plan_for_cycle_prefixes_condition() {
    let plan = ExperimentPlan {
        conditions: vec![Condition::Basic, Condition::Pam],
        stimulus: StimulusSettings {
            num_partials: 200,
            ..StimulusSettings::default()
        },
        ..ExperimentPlan::default()
    };
    let result = validate_plan_for_cycle(&plan, &cycle());
    let paths: Vec<&str> = result
        .errors
        .iter()
        .filter_map(|e| e.path.as_deref())
        .collect();
    assert!(paths.contains(&"BASIC.num_partials"));
    assert!(paths.contains(&"PAM.num_partials"));
}

#[test]
fn test_plan_for_cycle_requires_pitch_trace_for_derived_depth() {
    let plan = ExperimentPlan {
        stimulus: StimulusSettings {
            fm_depth: None,
            ..StimulusSettings::default()
        },
        ..ExperimentPlan::default()
    };
    let result = validate_plan_for_cycle(&plan, &cycle());
    assert_eq!(codes(&result), vec![ErrorCode::InvalidPitchTrace]);
}
