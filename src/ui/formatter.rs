//! Pure formatting functions for operator output.
//!
//! Status lines go to stdout, errors to stderr. Styling comes from
//! `console`, which drops colors when the output is not a terminal.

use console::style;

use crate::domain::BranchSet;
use crate::workflow::Workflow;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Line describing which workflow handles a branch pair
pub fn format_selection(workflow: Workflow, branches: &BranchSet) -> String {
    format!(
        "{} workflow selected for '{}' → '{}'",
        workflow.name(),
        branches.current,
        branches.target
    )
}

/// Display the workflow chosen for this event.
pub fn display_selection(workflow: Workflow, branches: &BranchSet) {
    println!("\n{}", style(format_selection(workflow, branches)).bold());
}

/// Display the outcome of a completed run.
///
/// # Arguments
/// * `workflow` - The workflow that ran
/// * `commit` - Commit identifier the workflow produced
pub fn display_result(workflow: Workflow, commit: &str) {
    println!(
        "\n{} {} workflow finished at commit {}\n",
        style("✓").green(),
        workflow.name(),
        style(commit).cyan()
    );
}
