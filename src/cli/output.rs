//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a video search result.
    pub fn video_result(title: &str, year: i32, description: &str, thumbnail_url: &str) {
        println!(
            "\n{} {} ({})",
            style(">>").green(),
            style(title).bold(),
            style(year).cyan()
        );
        println!("   {}", content_preview(description, 300));
        if !thumbnail_url.is_empty() {
            println!("   {}", style(thumbnail_url).dim());
        }
    }

    /// Print a catalog row.
    pub fn catalog_row(title: &str, year: i32, description: &str) {
        println!(
            "  {} {} ({}) - {}",
            style("*").cyan(),
            style(title).bold(),
            year,
            content_preview(description, 80)
        );
    }

    /// Print a generated summary in a bordered block.
    pub fn summary_block(summary: &str) {
        println!("\n{}", style("Top results summary").bold().underlined());
        for line in summary.lines() {
            println!("  {}", style(line).italic());
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview_short() {
        assert_eq!(content_preview("short text", 80), "short text");
    }

    #[test]
    fn test_content_preview_truncates() {
        let long = "x".repeat(100);
        let preview = content_preview(&long, 80);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 83);
    }
}
