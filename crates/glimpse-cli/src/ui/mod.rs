//! Terminal output for status lines and summaries.
//!
//! Everything here writes to stderr. Snapshot documents own stdout.
//!
//! # Examples
//!
//! ```no_run
//! use glimpse_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Schema is valid");
//! ui::error("Failed to read fixture");
//! ```

mod format;
mod messages;

pub use format::{format_duration, print_schema_summary, print_snapshot_summary};
pub use messages::{debug, error, info, success, warning};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Initialize color support based on environment.
///
/// `--no-color` and `NO_COLOR` win over `FORCE_COLOR`, then the terminal
/// decides. CI logs keep colors off unless forced.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color
        && crate::logger::should_use_colors()
        && (!is_ci() || std::env::var_os("FORCE_COLOR").is_some());
    console::set_colors_enabled_stderr(enabled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn ci_is_detected_from_any_marker() {
        unsafe { std::env::set_var("GITLAB_CI", "true") };
        assert!(is_ci());
        unsafe { std::env::remove_var("GITLAB_CI") };
    }

    #[test]
    #[serial]
    fn no_color_disables_stderr_colors() {
        unsafe { std::env::set_var("NO_COLOR", "1") };
        init_colors(false);
        assert!(!console::colors_enabled_stderr());
        unsafe { std::env::remove_var("NO_COLOR") };
    }

    #[test]
    #[serial]
    fn flag_disables_colors_even_when_forced() {
        unsafe { std::env::set_var("FORCE_COLOR", "1") };
        init_colors(true);
        assert!(!console::colors_enabled_stderr());
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }
}
