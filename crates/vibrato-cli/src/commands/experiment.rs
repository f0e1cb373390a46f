//! Experiment command implementation
//!
//! Renders every condition of a plan for every subject, block, and repeat:
//!
//! ```text
//! <out-root>/
//!   manifest.json
//!   subject_0/
//!     stimlog_subject_0.txt
//!     block_0/
//!       BASIC_0.wav
//!       SHUFFLE_RAF_0.wav
//!       ...
//! ```

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vibrato_backend_audio::rng::create_stimulus_rng;
use vibrato_backend_audio::{
    render_condition, render_condition_pair, AudioResult, RenderedStimulus, WavResult,
};
use vibrato_spec::{
    validate_plan_for_cycle, AnalyzedCycle, Condition, ExperimentPlan, SynthesisParams,
};

use super::reporting::print_validation_errors;
use crate::input::{load_cycle, load_plan};

/// Manifest file name written at the output root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One rendered file of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the output root.
    pub path: String,
    /// Condition rendered.
    pub condition: Condition,
    /// Subject index.
    pub subject: u32,
    /// Block index within the subject.
    pub block: u32,
    /// Repeat index within the block.
    pub repeat: u32,
    /// BLAKE3 hash of the PCM payload.
    pub pcm_hash: String,
}

/// Record of a rendered experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentManifest {
    /// Source file name of the analyzed cycle.
    pub source: String,
    /// BLAKE3 hash of the cycle file, when rendered from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// The plan that was rendered.
    pub plan: ExperimentPlan,
    /// Every rendered file, in render order.
    pub entries: Vec<ManifestEntry>,
}

/// Path of a stimulus relative to the output root.
pub fn stimulus_path(subject: u32, block: u32, condition: Condition, repeat: u32) -> PathBuf {
    PathBuf::from(format!("subject_{}", subject))
        .join(format!("block_{}", block))
        .join(format!("{}_{}.wav", condition.file_stem(), repeat))
}

/// Path of a subject's stimulus log relative to the output root.
pub fn stimlog_path(subject: u32) -> PathBuf {
    PathBuf::from(format!("subject_{}", subject)).join(format!("stimlog_subject_{}.txt", subject))
}

/// Renders one condition of a plan.
///
/// When the plan also renders the condition's RAF counterpart, both members are
/// rendered from one morph on the standard member's stream and the counterpart
/// is returned second.
fn render_for_plan(
    cycle: &AnalyzedCycle,
    base: &SynthesisParams,
    plan: &ExperimentPlan,
    condition: Condition,
    (subject, block, repeat): (u32, u32, u32),
) -> AudioResult<(RenderedStimulus, Option<RenderedStimulus>)> {
    let counterpart = condition
        .raf_counterpart()
        .filter(|c| plan.conditions.contains(c));

    match counterpart {
        Some(counterpart) => {
            let standard = if condition.is_raf() { counterpart } else { condition };
            let mut rng = create_stimulus_rng(plan.seed, subject, block, repeat, standard);
            let (standard, raf) = render_condition_pair(
                &cycle.envelope,
                condition,
                base,
                &plan.morph,
                &plan.generator,
                &mut rng,
            )?;
            if condition.is_raf() {
                Ok((raf, Some(standard)))
            } else {
                Ok((standard, Some(raf)))
            }
        }
        None => {
            let mut rng = create_stimulus_rng(plan.seed, subject, block, repeat, condition);
            let stimulus = render_condition(
                &cycle.envelope,
                condition,
                base,
                &plan.morph,
                &plan.generator,
                &mut rng,
            )?;
            Ok((stimulus, None))
        }
    }
}

/// Appends one morph log entry. A pair shares a single entry headed by both names.
fn push_log_entry(
    stimlog: &mut String,
    stimulus: &RenderedStimulus,
    counterpart: Option<&RenderedStimulus>,
    repeat: u32,
) {
    stimlog.push_str(&format!("\n{}_{}", stimulus.condition.file_stem(), repeat));
    if let Some(other) = counterpart {
        stimlog.push_str(&format!(" + {}_{}", other.condition.file_stem(), repeat));
    }
    stimlog.push_str(&format!("\n{}", stimulus.log));
}

/// Renders a validated plan into `out_root`.
///
/// The plan must already have passed [`validate_plan_for_cycle`]; rendering
/// errors are returned as-is.
pub fn render_experiment(
    cycle: &AnalyzedCycle,
    plan: &ExperimentPlan,
    out_root: &Path,
) -> Result<ExperimentManifest> {
    let base = plan.stimulus.resolve(cycle)?;
    let mut entries = Vec::with_capacity(plan.total_stimuli() as usize);

    for subject in 0..plan.subjects {
        let mut stimlog = format!("Subject: {}\n{}\n", subject, "-".repeat(10));

        for block in 0..plan.blocks {
            stimlog.push_str(&format!("\n{0}\nBlock {1}\n{0}\n", "=".repeat(7), block));

            for repeat in 0..plan.repeats_per_block {
                // RAF counterparts rendered ahead of their turn.
                let mut pending: Vec<RenderedStimulus> = Vec::new();

                for &condition in &plan.conditions {
                    let stimulus = match pending.iter().position(|s| s.condition == condition) {
                        Some(i) => pending.swap_remove(i),
                        None => {
                            let (stimulus, counterpart) = render_for_plan(
                                cycle,
                                &base,
                                plan,
                                condition,
                                (subject, block, repeat),
                            )
                            .with_context(|| {
                                format!(
                                    "Failed to render {} (subject {}, block {}, repeat {})",
                                    condition, subject, block, repeat
                                )
                            })?;
                            if !stimulus.log.is_empty() {
                                let counterpart = counterpart.as_ref();
                                push_log_entry(&mut stimlog, &stimulus, counterpart, repeat);
                            }
                            pending.extend(counterpart);
                            stimulus
                        }
                    };

                    let relative = stimulus_path(subject, block, condition, repeat);
                    let wav = WavResult::from_mono(&stimulus.samples, plan.generator.sample_rate);
                    let path = out_root.join(&relative);
                    wav.write_to(&path)
                        .with_context(|| format!("Failed to write WAV file: {}", path.display()))?;
                    log::debug!("wrote {} ({})", relative.display(), &wav.pcm_hash[..16]);

                    entries.push(ManifestEntry {
                        path: relative.to_string_lossy().replace('\\', "/"),
                        condition,
                        subject,
                        block,
                        repeat,
                        pcm_hash: wav.pcm_hash,
                    });
                }
            }
        }

        let log_path = out_root.join(stimlog_path(subject));
        fs::write(&log_path, stimlog)
            .with_context(|| format!("Failed to write stimulus log: {}", log_path.display()))?;
        log::info!("subject {} complete", subject);
    }

    Ok(ExperimentManifest {
        source: cycle.filename.clone(),
        source_hash: None,
        plan: plan.clone(),
        entries,
    })
}

/// Run the experiment command
///
/// # Arguments
/// * `cycle_path` - Path to the analyzed cycle JSON file
/// * `plan_path` - Path to the experiment plan JSON file
/// * `out_root` - Output directory
///
/// # Returns
/// Exit code: 0 on success, 1 if the plan is invalid for the cycle
pub fn run(cycle_path: &Path, plan_path: &Path, out_root: &Path) -> Result<ExitCode> {
    let loaded = load_cycle(cycle_path)?;
    let plan = load_plan(Some(plan_path))?;

    println!(
        "{} {} stimuli from {} into {}",
        "Experiment:".cyan().bold(),
        plan.total_stimuli(),
        cycle_path.display(),
        out_root.display()
    );

    let validation = validate_plan_for_cycle(&plan, &loaded.cycle);
    if !validation.is_ok() {
        println!(
            "\n{} {} error(s)",
            "Invalid:".red().bold(),
            validation.errors.len()
        );
        print_validation_errors(&validation.errors);
        return Ok(ExitCode::from(1));
    }

    fs::create_dir_all(out_root)
        .with_context(|| format!("Failed to create output directory: {}", out_root.display()))?;

    let mut manifest = render_experiment(&loaded.cycle, &plan, out_root)?;
    manifest.source_hash = Some(loaded.source_hash);

    let manifest_path = out_root.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;

    println!(
        "{} {} files for {} subject(s)",
        "Done:".green().bold(),
        manifest.entries.len(),
        plan.subjects
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vibrato_spec::{SpectralEnvelope, StimulusSettings};

    fn cycle() -> AnalyzedCycle {
        let frames = (0..20)
            .map(|i| {
                let t = i as f64 / 20.0;
                vec![1.0, 1.0 + 0.5 * (std::f64::consts::TAU * t).sin(), 0.5, 0.25]
            })
            .collect();
        AnalyzedCycle {
            filename: "test.wav".to_string(),
            envelope: SpectralEnvelope::from_frames(8000, frames).unwrap(),
            pitch_trace: Default::default(),
            sample_rate: 8000,
        }
    }

    fn plan() -> ExperimentPlan {
        ExperimentPlan {
            subjects: 2,
            conditions: vec![Condition::Basic, Condition::Rag],
            stimulus: StimulusSettings {
                f0: Some(500.0),
                num_partials: 3,
                length: 0.2,
                audio_fade: 0.01,
                ..StimulusSettings::default()
            },
            ..ExperimentPlan::default()
        }
    }

    #[test]
    fn test_stimulus_path() {
        assert_eq!(
            stimulus_path(1, 2, Condition::ShuffleRaf, 3),
            Path::new("subject_1/block_2/SHUFFLE_RAF_3.wav")
        );
        assert_eq!(
            stimlog_path(4),
            Path::new("subject_4/stimlog_subject_4.txt")
        );
    }

    #[test]
    fn test_render_experiment_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = plan();
        assert!(validate_plan_for_cycle(&plan, &cycle()).is_ok());

        let manifest = render_experiment(&cycle(), &plan, tmp.path()).unwrap();
        assert_eq!(manifest.entries.len(), 4);
        assert_eq!(manifest.entries[0].path, "subject_0/block_0/BASIC_0.wav");
        assert_eq!(manifest.entries[3].path, "subject_1/block_0/RAG_0.wav");

        for entry in &manifest.entries {
            assert!(tmp.path().join(&entry.path).is_file(), "{}", entry.path);
        }

        let stimlog = fs::read_to_string(tmp.path().join(stimlog_path(1))).unwrap();
        assert!(stimlog.starts_with("Subject: 1\n----------\n"));
        assert!(stimlog.contains("\n=======\nBlock 0\n=======\n"));
        assert!(stimlog.contains("RAG_0\nSummary"));
        assert!(!stimlog.contains("BASIC_0"));
    }

    #[test]
    fn test_subjects_get_independent_streams() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let first = render_experiment(&cycle(), &plan(), a.path()).unwrap();
        let second = render_experiment(&cycle(), &plan(), b.path()).unwrap();
        assert_eq!(first, second);

        // Same condition, different subject.
        assert_ne!(first.entries[0].pcm_hash, first.entries[2].pcm_hash);
        assert_ne!(first.entries[1].pcm_hash, first.entries[3].pcm_hash);
    }

    #[test]
    fn test_raf_pairs_share_one_morph() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = ExperimentPlan {
            subjects: 1,
            conditions: vec![Condition::ShuffleRaf, Condition::Basic, Condition::Shuffle],
            ..plan()
        };
        assert!(validate_plan_for_cycle(&plan, &cycle()).is_ok());

        let manifest = render_experiment(&cycle(), &plan, tmp.path()).unwrap();
        let stems: Vec<&str> = manifest
            .entries
            .iter()
            .map(|e| e.condition.file_stem())
            .collect();
        assert_eq!(stems, vec!["SHUFFLE_RAF", "BASIC", "SHUFFLE"]);

        let stimlog = fs::read_to_string(tmp.path().join(stimlog_path(0))).unwrap();
        assert!(stimlog.contains("\nSHUFFLE_RAF_0 + SHUFFLE_0\nSummary"));
        assert_eq!(stimlog.matches("Summary").count(), 1);

        // The standard member draws from its own stimulus stream first.
        let base = plan.stimulus.resolve(&cycle()).unwrap();
        let (standard, raf) = render_condition_pair(
            &cycle().envelope,
            Condition::Shuffle,
            &base,
            &plan.morph,
            &plan.generator,
            &mut create_stimulus_rng(plan.seed, 0, 0, 0, Condition::Shuffle),
        )
        .unwrap();
        let hash = |samples: &[f64]| {
            WavResult::from_mono(samples, plan.generator.sample_rate).pcm_hash
        };
        assert_eq!(manifest.entries[0].pcm_hash, hash(&raf.samples));
        assert_eq!(manifest.entries[2].pcm_hash, hash(&standard.samples));
    }

    #[test]
    fn test_unpaired_condition_renders_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = ExperimentPlan {
            subjects: 1,
            conditions: vec![Condition::RagRaf],
            ..plan()
        };
        let manifest = render_experiment(&cycle(), &plan, tmp.path()).unwrap();

        let base = plan.stimulus.resolve(&cycle()).unwrap();
        let single = render_condition(
            &cycle().envelope,
            Condition::RagRaf,
            &base,
            &plan.morph,
            &plan.generator,
            &mut create_stimulus_rng(plan.seed, 0, 0, 0, Condition::RagRaf),
        )
        .unwrap();
        let wav = WavResult::from_mono(&single.samples, plan.generator.sample_rate);
        assert_eq!(manifest.entries[0].pcm_hash, wav.pcm_hash);

        let stimlog = fs::read_to_string(tmp.path().join(stimlog_path(0))).unwrap();
        assert!(stimlog.contains("\nRAG_RAF_0\nSummary"));
        assert!(!stimlog.contains(" + "));
    }

    #[test]
    fn test_run_rejects_invalid_plan() {
        let tmp = tempfile::tempdir().unwrap();
        let cycle_path = tmp.path().join("cycle.json");
        fs::write(&cycle_path, cycle().to_json_pretty().unwrap()).unwrap();
        let plan_path = tmp.path().join("plan.json");
        fs::write(&plan_path, r#"{"conditions": []}"#).unwrap();
        let out = tmp.path().join("out");

        assert_eq!(run(&cycle_path, &plan_path, &out).unwrap(), ExitCode::from(1));
        assert!(!out.exists());
    }

    #[test]
    fn test_run_writes_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let cycle_path = tmp.path().join("cycle.json");
        fs::write(&cycle_path, cycle().to_json_pretty().unwrap()).unwrap();
        let plan_path = tmp.path().join("plan.json");
        fs::write(&plan_path, serde_json::to_string(&plan()).unwrap()).unwrap();
        let out = tmp.path().join("out");

        assert_eq!(run(&cycle_path, &plan_path, &out).unwrap(), ExitCode::SUCCESS);

        let manifest: ExperimentManifest =
            serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest.source, "test.wav");
        assert_eq!(manifest.source_hash.map(|h| h.len()), Some(64));
        assert_eq!(manifest.plan, plan());
    }
}
