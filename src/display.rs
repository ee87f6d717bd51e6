use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while waiting on the model. Call `finish_and_clear`
/// before printing anything else.
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈")
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Horizontal rule used to frame commands and their output
pub fn display_rule() {
    println!("{}", "-".repeat(40).dimmed());
}

/// Display error messages with consistent formatting
pub fn display_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Display warning messages with consistent formatting
pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message.yellow());
}

/// Display info messages with consistent formatting
pub fn display_info(message: &str) {
    println!("{} {}", "💡".cyan(), message.dimmed());
}

pub fn display_success(message: &str) {
    println!("{} {}", "✅".green(), message);
}

/// Verbose diagnostics, printed only when --verbose is enabled
pub fn display_verbose(verbose: bool, message: &str) {
    if verbose {
        eprintln!("{} {}", "[verbose]".dimmed(), message.dimmed());
    }
}

/// A command about to be presented to the confirmation gate
pub fn display_pending_command(command: &str, needs_feedback: bool) {
    println!();
    display_rule();
    let label = if needs_feedback {
        "Command to execute (with feedback):"
    } else {
        "Command to execute:"
    };
    println!("{}\n{}", label.bold(), command.green());
    display_rule();
}

/// Captured output of an executed command
pub fn display_command_output(output: &str) {
    println!();
    display_rule();
    println!("{}", "Command output:".bold());
    display_rule();
    println!("{}", output);
}

/// The model's follow-up after seeing a command's output
pub fn display_feedback_response(response: &str) {
    println!();
    display_rule();
    println!("{}", "Model's response to command output:".bold());
    display_rule();
    println!("{}", response);
}

/// Interactive-mode welcome banner
pub fn display_welcome(verbose: bool, save_path: Option<&str>) {
    let bar = "=".repeat(60);
    println!("\n{}", bar);
    println!("       CMDCLEVER - AI-Powered Command Line Assistant");
    println!("{}", bar);
    println!("• Type your request in natural language");
    println!("• Commands are returned in ```execute``` blocks");
    println!("• ```execute #feedback``` blocks send their output back to the AI");
    println!("• You will be asked to confirm before any command runs");
    println!("• Type 'exit' or 'quit' to leave");
    if let Ok(dir) = std::env::current_dir() {
        println!("• Working directory: {}", dir.display());
    }
    if verbose {
        println!("• Verbose mode: ENABLED");
    }
    if let Some(path) = save_path {
        println!("• Conversation will be saved to: {}", path);
    }
    println!("{}\n", bar);
}
