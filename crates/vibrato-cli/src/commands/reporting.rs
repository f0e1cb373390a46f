use colored::Colorize;
use vibrato_spec::ValidationError;

/// Prints validation errors, one per line.
pub(crate) fn print_validation_errors(errors: &[ValidationError]) {
    for error in errors {
        let location = error
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "x".red(),
            error.code.code().red(),
            location.dimmed(),
            error.message
        );
    }
}
