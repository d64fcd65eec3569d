//! Terminal output: colored status lines, request spinners and the
//! presentation table.
//!
//! Colors respect NO_COLOR, CLICOLOR and CLICOLOR_FORCE automatically.

use std::time::Duration;

use chrono::DateTime;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::Presentation;

/// Print warning (yellow "warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print success status indented (for status blocks)
pub fn success_detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (dimmed, for follow-up hints)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg.to_string().dimmed());
}

/// Spinner shown while a request is in flight. Callers clear it with
/// `finish_and_clear` before printing the result.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(msg.to_string());
    pb
}

/// Render the presentation table. No table crate: fixed-width columns,
/// long cells truncated with an ellipsis.
pub fn print_presentations(items: &[Presentation]) {
    println!();
    header(&format!("Your presentations ({})", items.len()));
    // Cells are padded before coloring: ANSI escapes would otherwise
    // count toward the column width.
    let head = format!(
        "{:<12} {:<37} {:>6} {:>6}  {:<16}",
        "ID", "TITLE", "SLIDES", "WORDS", "UPDATED"
    );
    println!("{}", head.bold());
    for p in items {
        println!(
            "{:<12} {:<37} {:>6} {:>6}  {:<16}",
            short_id(&p.id),
            truncate(&p.title, 36),
            count_cell(p.slide_count),
            count_cell(p.word_count),
            p.updated_at
                .as_deref()
                .map(format_updated)
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!();
}

fn count_cell(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

/// First 10 characters of a backend id plus an ellipsis.
pub fn short_id(id: &str) -> String {
    truncate(id, 10)
}

/// Char-safe truncation with a trailing ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}…")
}

/// Reformat a backend RFC 3339 timestamp as `YYYY-MM-DD HH:MM`, keeping
/// the raw string when it does not parse.
pub fn format_updated(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("My talk", 36), "My talk");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("présentation", 4), "prés…");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn short_id_clips_object_ids() {
        assert_eq!(short_id("66f1c0ffee11223344556677"), "66f1c0ffee…");
        assert_eq!(short_id("short"), "short");
    }

    #[test]
    fn format_updated_handles_backend_timestamps() {
        assert_eq!(
            format_updated("2024-06-01T10:30:00.000Z"),
            "2024-06-01 10:30"
        );
        assert_eq!(format_updated("yesterday"), "yesterday");
    }
}
