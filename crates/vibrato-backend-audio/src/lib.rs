//! Vibrato Stimulus Audio Backend
//!
//! This crate renders vibrato-perception stimuli from analyzed spectral
//! envelopes:
//!
//! - [`morph`] - Envelope morphing (time average, phase shuffle, single-cycle
//!   cosine rebuild) with a log of every random decision
//! - [`resample`] - Looping and linear resampling of analysis-rate cycles
//! - [`generate`] - Additive synthesis in STANDARD, PAM, and RAF modes
//! - [`conditions`] - Named experimental conditions
//! - [`wav`] - Deterministic 16-bit WAV output
//!
//! # Determinism
//!
//! Every random draw goes through a caller-supplied [`rand::Rng`]. Given the same
//! envelope, parameters, and generator state, the output is bit-identical. The
//! [`rng`] module builds PCG32 generators from BLAKE3-derived seeds.
//!
//! # Example
//!
//! ```
//! use vibrato_backend_audio::{rng::create_rng, synthesize};
//! use vibrato_spec::{GeneratorConfig, SpectralEnvelope, SynthesisParams};
//!
//! let envelope = SpectralEnvelope::constant(44100, 10, 2, 1.0).unwrap();
//! let params = SynthesisParams {
//!     f0: 110.0,
//!     num_partials: 2,
//!     length: 0.5,
//!     ..SynthesisParams::default()
//! };
//!
//! let config = GeneratorConfig::default();
//! let samples = synthesize(&params.with_envelope(&envelope), &config, &mut create_rng(42)).unwrap();
//! assert_eq!(samples.len(), 22050);
//! ```

pub mod conditions;
pub mod error;
pub mod generate;
pub mod morph;
pub mod resample;
pub mod rng;
pub mod wav;

// Re-export main types at crate root
pub use conditions::{render_condition, render_condition_pair, RenderedStimulus};
pub use error::{AudioError, AudioResult};
pub use generate::synthesize;
pub use morph::{EnvelopeMorpher, MorphLog};
pub use wav::WavResult;
