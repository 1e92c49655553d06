use owo_colors::OwoColorize;

use sitegraft_core::{FetchStats, ReloadOutcome, TreeReport};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Sitegraft".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Mirror a site, graft a keyword in, serve it with nginx\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print an indented label/value pair under the current step
pub fn print_detail(label: &str, value: impl std::fmt::Display) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.to_string().bright_white());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

pub fn print_fetch_stats(stats: &FetchStats) {
    print_detail("Pages", stats.pages);
    print_detail("Assets", stats.assets);
    if stats.skipped > 0 {
        print_detail("Skipped", stats.skipped.yellow());
    }
}

pub fn print_mutation_report(report: &TreeReport) {
    print_detail("Files", report.files.len());
    print_detail("Text insertions", report.text_insertions);
    print_detail("Alt updates", report.alt_updates);
}

pub fn print_reload_outcome(outcome: &ReloadOutcome) {
    match outcome {
        ReloadOutcome::Reloaded => print_success("nginx validated and reloaded"),
        ReloadOutcome::Skipped => print_info("Reload skipped"),
        ReloadOutcome::Failed { warning } => print_warning(&format!("nginx reload failed: {}", warning)),
    }
}
