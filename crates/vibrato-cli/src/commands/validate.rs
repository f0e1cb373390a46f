//! Validate command implementation

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use vibrato_spec::validate_plan_for_cycle;

use super::reporting::print_validation_errors;
use crate::input::{load_cycle, load_plan};

/// Run the validate command
///
/// # Arguments
/// * `cycle_path` - Path to the analyzed cycle JSON file
/// * `plan_path` - Optional experiment plan; the default plan is checked otherwise
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(cycle_path: &Path, plan_path: Option<&Path>) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), cycle_path.display());

    let loaded = load_cycle(cycle_path)?;
    let plan = load_plan(plan_path)?;
    let cycle = &loaded.cycle;

    println!(
        "{} {} ({} frames x {} bins @ {} Hz)",
        "Cycle:".dimmed(),
        cycle.filename,
        cycle.envelope.num_frames(),
        cycle.envelope.num_bins(),
        cycle.sample_rate
    );
    let plan_name = plan_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "default".to_string());
    println!(
        "{} {} ({} conditions, {} stimuli)",
        "Plan:".dimmed(),
        plan_name,
        plan.conditions.len(),
        plan.total_stimuli()
    );

    let result = validate_plan_for_cycle(&plan, cycle);
    if result.is_ok() {
        println!("\n{}", "Valid".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} {} error(s)",
            "Invalid:".red().bold(),
            result.errors.len()
        );
        print_validation_errors(&result.errors);
        Ok(ExitCode::from(1))
    }
}
