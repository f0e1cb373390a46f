//! Vibrato Stimulus Spec Library
//!
//! This crate provides the data model shared by the vibrato stimulus generator:
//! analyzed spectral envelopes, synthesis requests, experimental conditions, and
//! experiment plans, together with their validation rules.
//!
//! # Overview
//!
//! - **Analyzed cycle**: one vibrato period of a source recording, delivered by an
//!   external analysis step as a (frame x bin) magnitude matrix plus a pitch trace.
//! - **Synthesis request**: an immutable parameter bundle borrowed by the audio
//!   backend for a single stimulus.
//! - **Condition**: a closed set of named experimental variants, each a fixed
//!   combination of envelope morphs and request overrides.
//!
//! # Example
//!
//! ```
//! use vibrato_spec::{GeneratorConfig, SpectralEnvelope, SynthesisParams};
//! use vibrato_spec::validation::validate_request;
//!
//! let envelope = SpectralEnvelope::constant(44100, 10, 2, 1.0).unwrap();
//! let params = SynthesisParams {
//!     f0: 110.0,
//!     num_partials: 2,
//!     length: 1.0,
//!     ..SynthesisParams::default()
//! };
//!
//! let request = params.with_envelope(&envelope);
//! let result = validate_request(&request, &GeneratorConfig::default());
//! assert!(result.is_ok());
//! ```
//!
//! # Modules
//!
//! - [`condition`]: Experimental condition catalogue
//! - [`envelope`]: Spectral envelope, pitch trace, and analyzed cycle types
//! - [`error`]: Error codes and validation result types
//! - [`hash`]: Seed derivation for independent stimulus streams
//! - [`plan`]: Experiment plan configuration
//! - [`request`]: Synthesis request and generator configuration
//! - [`validation`]: Request, config, and plan validation

pub mod condition;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod plan;
pub mod request;
pub mod validation;

// Re-export commonly used types at the crate root
pub use condition::{Condition, MorphSettings, MorphStep};
pub use envelope::{hz_to_midi, midi_to_hz, AnalyzedCycle, PitchTrace, SpectralEnvelope, EPS};
pub use error::{BackendError, ErrorCode, SpecError, ValidationError, ValidationResult};
pub use hash::{derive_condition_seed, derive_stimulus_seed};
pub use plan::{ExperimentPlan, StimulusSettings};
pub use request::{
    GeneratorConfig, RestingPoint, SynthMode, SynthesisParams, SynthesisRequest,
    DEFAULT_PITCH_RATE, DEFAULT_SAMPLE_RATE,
};
pub use validation::{validate_config, validate_plan, validate_plan_for_cycle, validate_request};
