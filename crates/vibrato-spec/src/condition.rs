//! Experimental condition catalogue.
//!
//! Every condition is a fixed combination of envelope morph steps and overrides
//! applied to a base set of [`SynthesisParams`]:
//!
//! | condition | morphs | mode | FM |
//! |---|---|---|---|
//! | `BASIC` | none | standard | yes |
//! | `FROZEN` | none | standard | no |
//! | `SHUFFLE` | shuffle phase | standard | no |
//! | `SIMPLE` | rap (measured depth), shuffle phase | standard | no |
//! | `RAG` | rap (random depth), shuffle phase | standard | no |
//! | `*_RAF` | as above | raf | no |
//! | `PAM` | none | pam | no |
//! | `CONTROL` | none | pam, modulation held for the full length | no |
//! | `FM_ONLY` | time average | standard | yes |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ValidationError};
use crate::request::{SynthMode, SynthesisParams};

/// Named experimental condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    /// Full AM and FM: positive control.
    Basic,
    /// Complex AM of the analyzed cycle, no FM.
    Frozen,
    /// Per-bin AM trajectories shifted by random fractions of the cycle.
    Shuffle,
    /// `Shuffle` with a random AM rate per partial.
    ShuffleRaf,
    /// Single-cycle cosine modulators with measured per-bin depth.
    Simple,
    /// `Simple` with a random AM rate per partial.
    SimpleRaf,
    /// Single-cycle cosine modulators with random per-bin depth.
    Rag,
    /// `Rag` with a random AM rate per partial.
    RagRaf,
    /// One global tremolo over a static spectrum.
    Pam,
    /// No AM and no FM.
    Control,
    /// FM over the time-averaged spectrum.
    #[serde(alias = "FM-ONLY")]
    FmOnly,
}

/// Parameters shared by the morph steps of every condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphSettings {
    /// Number of equally spaced cycle shifts for phase shuffling.
    pub num_shifts: usize,
    /// Upper bound of the random modulation depth (dB) in `RAG` conditions.
    pub max_random_gain: f64,
}

impl Default for MorphSettings {
    fn default() -> Self {
        Self {
            num_shifts: 4,
            max_random_gain: 10.0,
        }
    }
}

/// One envelope transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MorphStep {
    /// Flatten every frame to the time-averaged spectrum.
    TimeAverage,
    /// Rotate each bin's trajectory by a random multiple of `1 / num_shifts` cycles.
    ShufflePhase {
        /// Number of admissible shifts.
        num_shifts: usize,
    },
    /// Rebuild each bin as a single-cycle cosine modulator.
    Rap {
        /// Random depth bound in dB; `None` measures depth from the envelope.
        max_random_gain: Option<f64>,
    },
}

impl Condition {
    /// All conditions in rendering order.
    pub fn all() -> &'static [Condition] {
        &[
            Condition::Basic,
            Condition::Frozen,
            Condition::Shuffle,
            Condition::ShuffleRaf,
            Condition::Simple,
            Condition::SimpleRaf,
            Condition::Rag,
            Condition::RagRaf,
            Condition::Pam,
            Condition::Control,
            Condition::FmOnly,
        ]
    }

    /// Name used for output files, e.g. `SHUFFLE_RAF`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Condition::Basic => "BASIC",
            Condition::Frozen => "FROZEN",
            Condition::Shuffle => "SHUFFLE",
            Condition::ShuffleRaf => "SHUFFLE_RAF",
            Condition::Simple => "SIMPLE",
            Condition::SimpleRaf => "SIMPLE_RAF",
            Condition::Rag => "RAG",
            Condition::RagRaf => "RAG_RAF",
            Condition::Pam => "PAM",
            Condition::Control => "CONTROL",
            Condition::FmOnly => "FM_ONLY",
        }
    }

    /// Morph steps applied to the analyzed envelope, in order.
    pub fn morph_steps(&self, settings: &MorphSettings) -> Vec<MorphStep> {
        let shuffle = MorphStep::ShufflePhase {
            num_shifts: settings.num_shifts,
        };
        match self {
            Condition::Basic | Condition::Frozen | Condition::Pam | Condition::Control => vec![],
            Condition::Shuffle | Condition::ShuffleRaf => vec![shuffle],
            Condition::Simple | Condition::SimpleRaf => vec![
                MorphStep::Rap {
                    max_random_gain: None,
                },
                shuffle,
            ],
            Condition::Rag | Condition::RagRaf => vec![
                MorphStep::Rap {
                    max_random_gain: Some(settings.max_random_gain),
                },
                shuffle,
            ],
            Condition::FmOnly => vec![MorphStep::TimeAverage],
        }
    }

    /// Synthesis mode used by this condition.
    pub fn synth_mode(&self) -> SynthMode {
        match self {
            Condition::ShuffleRaf | Condition::SimpleRaf | Condition::RagRaf => SynthMode::Raf,
            Condition::Pam | Condition::Control => SynthMode::Pam,
            _ => SynthMode::Standard,
        }
    }

    /// Whether this is the random-AM-rate member of a pair.
    pub fn is_raf(&self) -> bool {
        self.synth_mode() == SynthMode::Raf
    }

    /// The other member of a standard/RAF pair.
    ///
    /// Both members share the same morph steps and differ only in synthesis
    /// mode, so they can be rendered from one morphed envelope.
    pub fn raf_counterpart(&self) -> Option<Condition> {
        match self {
            Condition::Shuffle => Some(Condition::ShuffleRaf),
            Condition::ShuffleRaf => Some(Condition::Shuffle),
            Condition::Simple => Some(Condition::SimpleRaf),
            Condition::SimpleRaf => Some(Condition::Simple),
            Condition::Rag => Some(Condition::RagRaf),
            Condition::RagRaf => Some(Condition::Rag),
            _ => None,
        }
    }

    /// Whether the condition keeps frequency modulation.
    pub fn has_fm(&self) -> bool {
        matches!(self, Condition::Basic | Condition::FmOnly)
    }

    /// Applies this condition's overrides to a base parameter set.
    pub fn apply(&self, base: &SynthesisParams) -> SynthesisParams {
        let mut params = base.clone();
        params.synth_mode = self.synth_mode();
        if !self.has_fm() {
            params.fm_depth = 0.0;
        }
        if *self == Condition::Control {
            params.mod_hold = params.length;
            params.mod_fade = 0.0;
        }
        params
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Condition::all()
            .iter()
            .copied()
            .find(|c| c.file_stem() == normalized)
            .ok_or_else(|| {
                ValidationError::new(
                    ErrorCode::UnknownCondition,
                    format!("unknown condition '{}'", s),
                )
            })
    }
}
