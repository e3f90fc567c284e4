//! Glimpse CLI - object-graph snapshots from the command line.
//!
//! Parses arguments, initializes logging and colors, and dispatches to the
//! selected command.

use clap::Parser;
use glimpse_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Check(check_args) => commands::check_execute(check_args),
        cli::Command::Snapshot(snapshot_args) => commands::snapshot_execute(snapshot_args),
        #[cfg(feature = "chrome")]
        cli::Command::Content(content_args) => commands::content_execute(content_args),
    };

    // Convert CLI errors to miette diagnostics
    result.map_err(error::cli_error_to_miette)
}
