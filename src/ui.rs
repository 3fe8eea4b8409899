// UI module for consistent terminal output with progress bars and styling
//
// Spinners and progress bars draw on stderr so that a download written to
// stdout is never interleaved with them.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner style similar to uv/pnpm
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Check if stderr is a TTY (for interactive output)
fn is_tty() -> bool {
    Term::stderr().is_term()
}

/// Hide a bar entirely when nobody is watching
fn hide_unless_tty(pb: ProgressBar) -> ProgressBar {
    if !is_tty() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb
}

/// Plain template used once a bar turns into a status line
fn message_only() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Create a styled spinner for async operations
pub fn spinner(message: &str) -> ProgressBar {
    let pb = hide_unless_tty(ProgressBar::new_spinner());

    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(spinner_style.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(message.to_string());

    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }

    pb
}

/// Create a progress bar for downloads with size
pub fn download_bar(total_size: u64) -> ProgressBar {
    let pb = hide_unless_tty(ProgressBar::new(total_size));
    if let Ok(bar_style) = ProgressStyle::with_template(
        "{spinner:.cyan} {msg} [{bar:25.cyan/dim}] {bytes}/{total_bytes} ({bytes_per_sec})",
    ) {
        pb.set_style(
            bar_style
                .tick_chars(SPINNER_CHARS)
                .progress_chars("━━╺"),
        );
    }
    pb
}

/// Create an indeterminate progress bar (when size is unknown)
pub fn download_bar_indeterminate() -> ProgressBar {
    let pb = hide_unless_tty(ProgressBar::new_spinner());
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {bytes} ({bytes_per_sec})") {
        pb.set_style(spinner_style.tick_chars(SPINNER_CHARS));
    }
    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }
    pb
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Print a header/section message
pub fn header(message: &str) {
    println!("{}", style(message).bold());
}

/// Print a line of command output
pub fn line(message: &str) {
    println!("{}", message);
}

/// Finish a spinner with success
pub fn finish_spinner_success(pb: &ProgressBar, message: &str) {
    let msg = format!("{} {}", style("✓").green(), message);
    if is_tty() {
        pb.set_style(message_only());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
        eprintln!("{}", msg);
    }
}

/// Finish a spinner with error
pub fn finish_spinner_error(pb: &ProgressBar, message: &str) {
    let msg = format!("{} {}", style("✗").red(), message);
    if is_tty() {
        pb.set_style(message_only());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
        eprintln!("{}", msg);
    }
}

/// Clear a progress bar without leaving a message
pub fn clear_bar(pb: &ProgressBar) {
    pb.finish_and_clear();
}
