//! Inspect command implementation
//!
//! Summarizes an analyzed cycle: dimensions, pitch trace, and the per-partial
//! resting magnitudes and modulation depths the generator would use.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use vibrato_backend_audio::generate::resting_spectrum;
use vibrato_backend_audio::morph::modulation_depth_db;
use vibrato_backend_audio::resample::frequency_trajectory;
use vibrato_spec::{hz_to_midi, AnalyzedCycle, ExperimentPlan, SynthesisParams};

use crate::input::{load_cycle, load_plan};

/// Per-partial summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSummary {
    /// Harmonic number; the partial sits at `index * f0`.
    pub index: usize,
    /// Partial frequency in Hz.
    pub frequency: f64,
    /// Magnitude in the resting spectrum.
    pub resting: f64,
    /// Peak-to-trough modulation depth of the partial's bin in dB.
    pub depth_db: f64,
}

/// Summarizes the first `limit` partials of `params` on the cycle's envelope.
pub fn summarize_partials(
    cycle: &AnalyzedCycle,
    params: &SynthesisParams,
    plan: &ExperimentPlan,
    limit: usize,
) -> Vec<PartialSummary> {
    let envelope = &cycle.envelope;
    let resting = resting_spectrum(envelope, params, &plan.generator);

    resting
        .iter()
        .take(limit)
        .enumerate()
        .filter(|(k, _)| params.partial_frequency(*k) <= envelope.max_frequency())
        .map(|(k, &resting)| {
            let frequency = params.partial_frequency(k);
            PartialSummary {
                index: k + 1,
                frequency,
                resting,
                depth_db: modulation_depth_db(&frequency_trajectory(envelope, frequency)),
            }
        })
        .collect()
}

/// Run the inspect command
///
/// # Arguments
/// * `cycle_path` - Path to the analyzed cycle JSON file
/// * `plan_path` - Optional plan supplying f0 and partial count
/// * `partials` - Number of partials to list
pub fn run(cycle_path: &Path, plan_path: Option<&Path>, partials: usize) -> Result<ExitCode> {
    let loaded = load_cycle(cycle_path)?;
    let plan = load_plan(plan_path)?;
    let cycle = &loaded.cycle;
    let envelope = &cycle.envelope;

    println!("{} {}", "Inspecting:".cyan().bold(), cycle_path.display());
    println!("  {:<14} {}", "source:", cycle.filename);
    println!("  {:<14} {}", "hash:", &loaded.source_hash[..16]);
    println!("  {:<14} {} Hz", "sample rate:", cycle.sample_rate);
    println!("  {:<14} {}", "frames:", envelope.num_frames());
    println!(
        "  {:<14} {} ({:.2} Hz each, top {:.1} Hz)",
        "bins:",
        envelope.num_bins(),
        envelope.bin_frequency(1),
        envelope.max_frequency()
    );

    if cycle.pitch_trace.is_empty() {
        println!("  {:<14} {}", "pitch trace:", "none".dimmed());
    } else {
        let trace = &cycle.pitch_trace.0;
        let min = trace.iter().copied().fold(f64::INFINITY, f64::min);
        let max = trace.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "  {:<14} {:.2}..{:.2} Hz (MIDI {:.2}..{:.2})",
            "pitch trace:",
            min,
            max,
            hz_to_midi(min),
            hz_to_midi(max)
        );
        match cycle.pitch_trace.fm_depth_semitones() {
            Ok(depth) => println!("  {:<14} {:.4} st", "fm depth:", depth),
            Err(e) => println!("  {:<14} {}", "fm depth:", e.message.yellow()),
        }
    }

    let resting_frame = plan.generator.resting_point.frame_index(envelope.num_frames());
    println!(
        "  {:<14} frame {} ({:?})",
        "resting:",
        resting_frame,
        plan.generator.resting_point
    );

    // Derived depth is irrelevant to the per-partial summary.
    let settings = vibrato_spec::StimulusSettings {
        fm_depth: Some(0.0),
        ..plan.stimulus.clone()
    };
    let params = settings.resolve(cycle)?;
    let rows = summarize_partials(cycle, &params, &plan, partials);

    println!(
        "\n{} f0 {:.2} Hz, {} of {} partials",
        "Partials:".cyan().bold(),
        params.f0,
        rows.len(),
        params.num_partials
    );
    println!("  {:>4} {:>10} {:>12} {:>10}", "k", "Hz", "resting", "depth dB");
    for row in &rows {
        println!(
            "  {:>4} {:>10.2} {:>12.6} {:>10.2}",
            row.index, row.frequency, row.resting, row.depth_db
        );
    }

    Ok(ExitCode::SUCCESS)
}
