//! Render command implementation
//!
//! Renders a single condition to a WAV file.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use vibrato_backend_audio::error::AudioError;
use vibrato_backend_audio::rng::create_condition_rng;
use vibrato_backend_audio::{render_condition, WavResult};
use vibrato_spec::{validate_plan, Condition};

use super::reporting::print_validation_errors;
use crate::input::{load_cycle, load_plan};

/// Arguments of the render command.
#[derive(Debug, Clone)]
pub struct RenderArgs<'a> {
    /// Analyzed cycle JSON file.
    pub cycle: &'a Path,
    /// Condition name, e.g. `SHUFFLE_RAF`.
    pub condition: &'a str,
    /// Output WAV path.
    pub out: &'a Path,
    /// Seed override; the plan's seed is used otherwise.
    pub seed: Option<u32>,
    /// Optional experiment plan supplying stimulus settings.
    pub plan: Option<&'a Path>,
    /// Optional path for the morph log as JSON.
    pub log_json: Option<&'a Path>,
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 on success, 1 if the request is invalid
pub fn run(args: &RenderArgs<'_>) -> Result<ExitCode> {
    let condition: Condition = args.condition.parse()?;
    let loaded = load_cycle(args.cycle)?;
    let plan = load_plan(args.plan)?;
    let seed = args.seed.unwrap_or(plan.seed);

    println!(
        "{} {} from {} (seed {})",
        "Rendering:".cyan().bold(),
        condition,
        args.cycle.display(),
        seed
    );

    let plan_check = validate_plan(&plan);
    if !plan_check.is_ok() {
        println!("\n{}", "Invalid plan:".red().bold());
        print_validation_errors(&plan_check.errors);
        return Ok(ExitCode::from(1));
    }

    let base = match plan.stimulus.resolve(&loaded.cycle) {
        Ok(base) => base,
        Err(e) => {
            println!("\n{}", "Invalid request:".red().bold());
            print_validation_errors(std::slice::from_ref(&e));
            return Ok(ExitCode::from(1));
        }
    };

    let mut rng = create_condition_rng(seed, condition);
    let stimulus = match render_condition(
        &loaded.cycle.envelope,
        condition,
        &base,
        &plan.morph,
        &plan.generator,
        &mut rng,
    ) {
        Ok(stimulus) => stimulus,
        Err(AudioError::Validation(errors)) => {
            println!("\n{}", "Invalid request:".red().bold());
            print_validation_errors(&errors);
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).context("Synthesis failed"),
    };

    let wav = WavResult::from_mono(&stimulus.samples, plan.generator.sample_rate);
    wav.write_to(args.out)
        .with_context(|| format!("Failed to write WAV file: {}", args.out.display()))?;

    println!(
        "{} {} ({:.2} s, {} samples)",
        "Wrote:".green().bold(),
        args.out.display(),
        wav.duration_seconds(),
        wav.num_samples
    );
    println!("{} {}", "PCM hash:".dimmed(), wav.pcm_hash);

    if !stimulus.log.is_empty() {
        log::info!("{} morph decision(s) recorded", stimulus.log.len());
        print!("\n{}", stimulus.log);
    }

    if let Some(path) = args.log_json {
        let json = stimulus
            .log
            .to_json_pretty()
            .context("Failed to serialize morph log")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write morph log: {}", path.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}
