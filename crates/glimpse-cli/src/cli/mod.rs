//! Command-line interface definition for glimpse.
//!
//! # Command Structure
//!
//! - `glimpse check` - Validate a snapshot schema
//! - `glimpse snapshot` - Serialize a fixture object graph
//! - `glimpse content` - Extract a live page's content tree (feature `chrome`)

mod commands;
#[cfg(test)]
mod tests;

use clap::Parser;

pub use commands::{CheckArgs, Command, SnapshotArgs};

#[cfg(feature = "chrome")]
pub use commands::ContentArgs;

/// Glimpse - object-graph snapshots for codeless tracking
#[derive(Parser, Debug)]
#[command(
    name = "glimpse",
    version,
    about = "Snapshot live object graphs into identifier-keyed documents",
    long_about = "Glimpse walks an object graph breadth-first through the properties a schema\n\
                  declares and prints a flat, cycle-safe snapshot document. Embedded web\n\
                  content is captured as a visible-element tree."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
