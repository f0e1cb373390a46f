use std::f64::consts::PI;

use rand::rngs::mock::StepRng;
use vibrato_spec::{ErrorCode, RestingPoint, SpectralEnvelope, SynthesisParams};

use super::*;
use crate::rng::create_rng;

fn constant_request_params() -> SynthesisParams {
    SynthesisParams {
        f0: 110.0,
        fm_depth: 0.0,
        num_partials: 2,
        length: 1.0,
        mod_rate: 5.0,
        mod_hold: 0.0,
        mod_fade: 0.0,
        synth_mode: SynthMode::Standard,
        audio_fade: 0.0,
    }
}

/// 4 bins at 44.1 kHz: bin k sits at k * 5512.5 Hz.
fn two_partial_envelope() -> SpectralEnvelope {
    SpectralEnvelope::from_frames(
        44100,
        vec![
            vec![0.0, 1.0, 0.5, 0.0],
            vec![0.0, 3.0, 1.5, 0.0],
        ],
    )
    .unwrap()
}

fn peak(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).fold(0.0, f64::max)
}

// ========================================================================
// End-to-end
// ========================================================================

#[test]
fn test_constant_envelope_renders_harmonic_cosines() {
    let env = SpectralEnvelope::constant(44100, 10, 2, 1.0).unwrap();
    let params = constant_request_params();
    let config = GeneratorConfig::default();

    let out = synthesize(&params.with_envelope(&env), &config, &mut StepRng::new(0, 0)).unwrap();

    let sr = 44100.0;
    let mut expected: Vec<f64> = (0..44100)
        .map(|n| {
            let t = (n + 1) as f64 / sr;
            (2.0 * PI * 110.0 * t).cos() + (2.0 * PI * 220.0 * t).cos()
        })
        .collect();
    remove_dc(&mut expected);
    normalize_peak(&mut expected).unwrap();

    assert_eq!(out.len(), expected.len());
    for (i, (a, b)) in out.iter().zip(&expected).enumerate() {
        assert!((a - b).abs() < 1e-6, "sample {}: {} vs {}", i, a, b);
    }
}

#[test]
fn test_output_length_and_peak() {
    let env = two_partial_envelope();
    let config = GeneratorConfig::default();
    for mode in [SynthMode::Standard, SynthMode::Pam, SynthMode::Raf] {
        let params = SynthesisParams {
            f0: 5512.5,
            length: 0.7,
            fm_depth: 0.2,
            synth_mode: mode,
            ..constant_request_params()
        };
        let out = synthesize(&params.with_envelope(&env), &config, &mut create_rng(9)).unwrap();
        assert_eq!(out.len(), config.num_samples(0.7));
        assert!((peak(&out) - 1.0).abs() < 1e-12, "mode {}", mode);
    }
}

#[test]
fn test_same_seed_same_output() {
    let env = two_partial_envelope();
    let params = SynthesisParams {
        f0: 5512.5,
        synth_mode: SynthMode::Raf,
        audio_fade: 0.1,
        ..constant_request_params()
    };
    let config = GeneratorConfig::default();
    let request = params.with_envelope(&env);

    let a = synthesize(&request, &config, &mut create_rng(77)).unwrap();
    let b = synthesize(&request, &config, &mut create_rng(77)).unwrap();
    let c = synthesize(&request, &config, &mut create_rng(78)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_invalid_request_renders_nothing() {
    let env = SpectralEnvelope::constant(44100, 10, 2, 1.0).unwrap();
    let params = SynthesisParams {
        f0: 0.0,
        ..constant_request_params()
    };
    let err = synthesize(
        &params.with_envelope(&env),
        &GeneratorConfig::default(),
        &mut create_rng(1),
    )
    .unwrap_err();
    assert_eq!(err.validation_errors()[0].code, ErrorCode::InvalidFundamental);
}

#[test]
fn test_raf_rate_above_modulation_limit_is_rejected() {
    let env = two_partial_envelope();
    let params = SynthesisParams {
        f0: 5512.5,
        num_partials: 1,
        synth_mode: SynthMode::Raf,
        ..constant_request_params()
    };

    for upper in [1000.0, 1e18] {
        let config = GeneratorConfig {
            random_rate_upper: upper,
            ..GeneratorConfig::default()
        };
        let err = synthesize(
            &params.with_envelope(&env),
            &config,
            &mut StepRng::new(u64::MAX, 0),
        )
        .unwrap_err();
        assert_eq!(err.validation_errors()[0].code, ErrorCode::InvalidRateLimits);
    }
}

#[test]
fn test_silent_envelope_is_an_error() {
    let env = SpectralEnvelope::constant(44100, 10, 2, 0.0).unwrap();
    let err = synthesize(
        &constant_request_params().with_envelope(&env),
        &GeneratorConfig::default(),
        &mut create_rng(1),
    )
    .unwrap_err();
    assert!(matches!(err, AudioError::SilentSignal { num_samples: 44100 }));
}

// ========================================================================
// Envelope processing
// ========================================================================

#[test]
fn test_depth_trajectory() {
    let config = GeneratorConfig {
        sample_rate: 1000,
        ..GeneratorConfig::default()
    };
    let params = SynthesisParams {
        length: 0.5,
        mod_hold: 0.1,
        mod_fade: 0.2,
        ..SynthesisParams::default()
    };
    let depth = depth_trajectory(&params, &config);

    assert_eq!(depth.len(), 500);
    assert!(depth[..100].iter().all(|d| *d == 0.0));
    assert_eq!(depth[200], 0.5);
    assert!(depth[300..].iter().all(|d| *d == 1.0));
    assert!(depth.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_depth_trajectory_without_hold_or_fade() {
    let params = SynthesisParams {
        length: 0.01,
        ..SynthesisParams::default()
    };
    let depth = depth_trajectory(&params, &GeneratorConfig::default());
    assert_eq!(depth.len(), 441);
    assert!(depth.iter().all(|d| *d == 1.0));
}

#[test]
fn test_resting_spectrum_frame() {
    // Frame f holds the value f in every bin.
    let frames: Vec<Vec<f64>> = (0..10).map(|f| vec![f as f64; 4]).collect();
    let env = SpectralEnvelope::from_frames(44100, frames).unwrap();
    let params = SynthesisParams {
        f0: 5512.5,
        num_partials: 2,
        ..SynthesisParams::default()
    };

    let quarter = resting_spectrum(&env, &params, &GeneratorConfig::default());
    assert_eq!(quarter, vec![2.0, 2.0]);

    let config = GeneratorConfig {
        resting_point: RestingPoint::MidCycle,
        ..GeneratorConfig::default()
    };
    assert_eq!(resting_spectrum(&env, &params, &config), vec![5.0, 5.0]);
}

#[test]
fn test_spectral_fade() {
    let mut trajectory = vec![4.0, 4.0, 4.0];
    apply_spectral_fade(&mut trajectory, &[0.0, 0.5, 1.0], 2.0);
    assert_eq!(trajectory, vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_held_modulation_uses_resting_spectrum() {
    let env = two_partial_envelope();
    let params = SynthesisParams {
        f0: 5512.5,
        length: 0.5,
        mod_hold: 0.5,
        ..constant_request_params()
    };
    let envelopes =
        PartialEnvelopes::new(&env, &params, &GeneratorConfig::default(), &mut create_rng(1));
    // Two frames: the resting frame is frame 0.
    assert!(envelopes.partial(0).iter().all(|a| *a == 1.0));
    assert!(envelopes.partial(1).iter().all(|a| *a == 0.5));
}

#[test]
fn test_raf_envelopes_vary_with_seed() {
    let env = two_partial_envelope();
    let params = SynthesisParams {
        f0: 5512.5,
        num_partials: 1,
        synth_mode: SynthMode::Raf,
        ..constant_request_params()
    };
    let config = GeneratorConfig::default();

    let a = PartialEnvelopes::new(&env, &params, &config, &mut create_rng(1));
    let b = PartialEnvelopes::new(&env, &params, &config, &mut create_rng(2));
    assert_ne!(a.rates(), b.rates());
    assert_ne!(a.partial(0), b.partial(0));
    for rate in a.rates().iter().chain(b.rates()) {
        assert!((4.0..=12.0).contains(rate));
    }
}

#[test]
fn test_standard_envelopes_ignore_rng() {
    let env = two_partial_envelope();
    let params = SynthesisParams {
        f0: 5512.5,
        ..constant_request_params()
    };
    let config = GeneratorConfig::default();

    let a = PartialEnvelopes::new(&env, &params, &config, &mut create_rng(1));
    let b = PartialEnvelopes::new(&env, &params, &config, &mut create_rng(2));
    assert_eq!(a.rates(), &[5.0, 5.0]);
    assert_eq!(a.partial(0), b.partial(0));
    assert_eq!(a.partial(1), b.partial(1));
}

// ========================================================================
// Mixing
// ========================================================================

#[test]
fn test_carrier_phase_accumulates_from_first_sample() {
    // A quarter of the sample rate advances a quarter turn per sample.
    let wave = carrier(1000.0, None, 4, 4000.0, 0.0);
    let expected = [0.0, -1.0, 0.0, 1.0];
    for (a, b) in wave.iter().zip(&expected) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn test_carrier_zero_depth_disables_fm() {
    let depth = vec![0.0; 256];
    let vibrato = Vibrato {
        coefficient: 0.5,
        rate: 5.0,
        depth: &depth,
    };
    assert_eq!(
        carrier(440.0, Some(vibrato), 256, 44100.0, 1.0),
        carrier(440.0, None, 256, 44100.0, 1.0)
    );
}

#[test]
fn test_carrier_fm_changes_waveform() {
    let depth = vec![1.0; 4410];
    let vibrato = Vibrato {
        coefficient: 0.05,
        rate: 5.0,
        depth: &depth,
    };
    assert_ne!(
        carrier(440.0, Some(vibrato), 4410, 44100.0, 0.0),
        carrier(440.0, None, 4410, 44100.0, 0.0)
    );
}

#[test]
fn test_pam_gain_ratio_follows_average_magnitudes() {
    let env = two_partial_envelope();
    let params = SynthesisParams {
        f0: 5512.5,
        synth_mode: SynthMode::Pam,
        ..constant_request_params()
    };
    let envelopes =
        PartialEnvelopes::new(&env, &params, &GeneratorConfig::default(), &mut create_rng(1));
    let components = PamComponents::from_envelopes(&envelopes);

    assert!((components.gains[0] / components.gains[1] - 2.0).abs() < 1e-9);
    assert!((components.gains[0] - 2.0).abs() < 1e-9);

    let summed: Vec<f64> = (0..envelopes.num_samples())
        .map(|n| envelopes.partial(0)[n] + envelopes.partial(1)[n])
        .take(16)
        .collect();
    assert_eq!(&components.master[..16], summed.as_slice());
}

#[test]
fn test_pam_mix_scales_carriers_by_gain_and_master() {
    let components = PamComponents {
        master: vec![1.0, 2.0, 3.0, 4.0],
        gains: vec![2.0, 1.0],
    };
    let out = pam_mix(&components, &[1000.0, 2000.0], 4000.0, &mut StepRng::new(0, 0));

    let first = carrier(1000.0, None, 4, 4000.0, 0.0);
    let second = carrier(2000.0, None, 4, 4000.0, 0.0);
    for n in 0..4 {
        let expected = components.master[n] * (2.0 * first[n] + second[n]);
        assert!((out[n] - expected).abs() < 1e-12);
    }
}

// ========================================================================
// Post-processing
// ========================================================================

#[test]
fn test_normalize_peak() {
    let mut samples = vec![0.5, -2.0, 1.0];
    normalize_peak(&mut samples).unwrap();
    assert_eq!(samples, vec![0.25, -1.0, 0.5]);

    let mut silent = vec![0.0; 8];
    assert!(normalize_peak(&mut silent).is_err());
}

#[test]
fn test_remove_dc() {
    let mut samples = vec![1.0, 2.0, 3.0];
    remove_dc(&mut samples);
    assert_eq!(samples, vec![-1.0, 0.0, 1.0]);
}

#[test]
fn test_fades_preserve_mean() {
    let mut fade_in = vec![2.0, 0.0, 2.0, 0.0];
    apply_fade(&mut fade_in, 2, Fade::In);
    assert_eq!(fade_in, vec![1.0, 0.5, 2.0, 0.0]);

    let mut fade_out = vec![2.0, 0.0, 2.0, 0.0];
    apply_fade(&mut fade_out, 2, Fade::Out);
    assert_eq!(fade_out, vec![2.0, 0.0, 1.5, 1.0]);
}

#[test]
fn test_fade_longer_than_signal_is_clamped() {
    let mut samples = vec![1.0, -1.0];
    apply_fade(&mut samples, 10, Fade::In);
    assert_eq!(samples, vec![0.0, -0.5]);
}

#[test]
fn test_postprocess_fades_ends() {
    let mut samples: Vec<f64> = (0..1000).map(|n| ((n as f64) * 0.3).sin() + 0.2).collect();
    postprocess(&mut samples, 0.01, 10_000).unwrap();
    // The fade-in starts at the (zero) mean left by DC removal.
    assert!(samples[0].abs() < 1e-12);
    assert!(peak(&samples) <= 1.0 + 1e-12);
}
