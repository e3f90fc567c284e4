//! Logging infrastructure for the glimpse CLI.
//!
//! Log lines go to stderr so snapshot documents on stdout stay clean.
//!
//! # Example
//!
//! ```rust,no_run
//! use glimpse_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Serializing graph");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "glimpse_cli=debug,glimpse_graph=debug,glimpse_bridge=debug,glimpse_schema=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "glimpse_cli=info,glimpse_graph=info,glimpse_bridge=warn,glimpse_schema=warn";

/// Initialize the tracing subscriber.
///
/// The filter is chosen in this order:
/// 1. `--verbose`: debug for glimpse crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for glimpse crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them; otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn verbose_filter_targets_every_crate() {
        let filter = filter_for(true, false).to_string().to_lowercase();
        for target in ["glimpse_cli", "glimpse_graph", "glimpse_bridge", "glimpse_schema"] {
            assert!(filter.contains(&format!("{target}=debug")), "{filter}");
        }
    }

    #[test]
    fn quiet_filter_is_errors_only() {
        assert_eq!(filter_for(false, true).to_string().to_lowercase(), "error");
    }

    #[test]
    #[serial]
    fn no_color_wins_over_force_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
