//! Append-only record of the random decisions made while morphing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cycle shift chosen for one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftEntry {
    /// Bin index.
    pub bin: usize,
    /// Shift as a fraction of one cycle, in `[0, 1)`.
    pub shift: f64,
}

/// Modulation depth chosen or measured for one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainEntry {
    /// Bin index.
    pub bin: usize,
    /// Peak-to-trough modulation depth in dB.
    pub gain_db: f64,
}

/// One logged morph call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "morph", rename_all = "snake_case")]
pub enum MorphRecord {
    /// A `shuffle_phase` call.
    ShufflePhase {
        /// Number of admissible shifts.
        num_shifts: usize,
        /// One entry per bin.
        entries: Vec<ShiftEntry>,
    },
    /// A `rap` call.
    Rap {
        /// Random depth bound; `None` when depth was measured.
        max_random_gain: Option<f64>,
        /// One entry per bin.
        entries: Vec<GainEntry>,
    },
}

impl MorphRecord {
    /// Number of per-bin entries.
    pub fn len(&self) -> usize {
        match self {
            MorphRecord::ShufflePhase { entries, .. } => entries.len(),
            MorphRecord::Rap { entries, .. } => entries.len(),
        }
    }

    /// Returns true if the record holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered list of morph records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MorphLog {
    records: Vec<MorphRecord>,
}

impl MorphLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: MorphRecord) {
        self.records.push(record);
    }

    /// Logged records, oldest first.
    pub fn records(&self) -> &[MorphRecord] {
        &self.records
    }

    /// Number of logged morphs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes the log to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ShiftEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin {}: shift {}", self.bin, self.shift)
    }
}

impl fmt::Display for GainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin {}: gain {:.4} dB", self.bin, self.gain_db)
    }
}

impl fmt::Display for MorphLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Summary\n-------\n\nTotal morphs:\t{}\n", self.records.len())?;
        for record in &self.records {
            match record {
                MorphRecord::ShufflePhase {
                    num_shifts,
                    entries,
                } => {
                    write!(f, "\nshuffle_phase ({} shifts)", num_shifts)?;
                    for entry in entries {
                        write!(f, "\n{}", entry)?;
                    }
                }
                MorphRecord::Rap {
                    max_random_gain,
                    entries,
                } => {
                    match max_random_gain {
                        Some(g) => write!(f, "\nrap (random depth up to {} dB)", g)?,
                        None => write!(f, "\nrap (measured depth)")?,
                    }
                    for entry in entries {
                        write!(f, "\n{}", entry)?;
                    }
                }
            }
        }
        Ok(())
    }
}
