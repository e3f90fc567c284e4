use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available glimpse subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a snapshot schema
    ///
    /// Loads the schema, checks it for duplicate names, superclass cycles and
    /// malformed properties, compiles it and prints a summary.
    Check(CheckArgs),

    /// Serialize a fixture object graph
    ///
    /// Builds the object graph described by a JSON fixture and prints its
    /// snapshot document.
    Snapshot(SnapshotArgs),

    /// Extract the content tree of a live page
    ///
    /// Opens the URL in headless Chrome and prints the visible-element tree
    /// the content script reports.
    #[cfg(feature = "chrome")]
    Content(ContentArgs),
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Schema file (.toml or .json)
    ///
    /// Defaults to glimpse.schema.toml or glimpse.schema.json in the
    /// current directory.
    #[arg(value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Also reject superclasses and parameter types that are never declared
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the snapshot command
#[derive(Args, Debug, Default)]
pub struct SnapshotArgs {
    /// Fixture describing the object graph
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,

    /// Schema file (.toml or .json)
    ///
    /// Defaults to glimpse.schema.toml or glimpse.schema.json in the
    /// current directory.
    #[arg(short, long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Write the snapshot here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Settings file (defaults to ./glimpse.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail when more objects than this are reachable
    #[arg(long, value_name = "COUNT")]
    pub max_objects: Option<usize>,

    /// How long to wait for embedded content to report, in milliseconds
    #[arg(long, value_name = "MS")]
    pub bridge_timeout_ms: Option<u64>,

    /// Print the snapshot on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the content command
#[cfg(feature = "chrome")]
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Page to open
    #[arg(value_name = "URL")]
    pub url: String,

    /// Settings file (defaults to ./glimpse.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How long to wait for the page to report, in milliseconds
    #[arg(long, value_name = "MS")]
    pub bridge_timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}
