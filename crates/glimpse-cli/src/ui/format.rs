//! Formatting utilities for durations and command summaries.

use console::Term;
use glimpse_schema::SchemaRegistry;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use glimpse_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn rule() -> String {
    let width = Term::stderr().size().1 as usize;
    "─".repeat(width.clamp(20, 80))
}

/// Print what a schema file describes.
pub fn print_schema_summary(path: &Path, registry: &SchemaRegistry) {
    eprintln!("\n{}", "Schema Summary".bold().underline());
    eprintln!("{}", rule());
    eprintln!("  {} {}", "▸".blue(), path.display().bright_white().bold());
    eprintln!(
        "  {} classes, {} properties, {} enums",
        registry.class_count().green(),
        registry.property_count().green(),
        registry.enum_count().green()
    );
    eprintln!("{}", rule());
}

/// Print the outcome of a snapshot run.
pub fn print_snapshot_summary(objects: usize, with_content: usize, elapsed: Duration) {
    let content = if with_content == 0 {
        String::new()
    } else {
        format!(", {with_content} with embedded content")
    };
    eprintln!(
        "  {} {} objects{} in {}",
        "Total:".bold(),
        objects.green(),
        content,
        format_duration(elapsed).green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "60.00s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 0s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61m 1s");
    }

    #[test]
    fn summaries_do_not_panic() {
        let registry = SchemaRegistry::builder().build().unwrap();
        print_schema_summary(Path::new("schema.toml"), &registry);
        print_snapshot_summary(3, 1, Duration::from_millis(12));
        print_snapshot_summary(0, 0, Duration::ZERO);
    }
}
