//! Glimpse CLI - validate snapshot schemas and serialize object graphs.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - `check`, `snapshot` and (feature `chrome`) `content`
//! - [`config`] - `glimpse.toml` settings layered with env and flags
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Status lines and summaries on stderr
//!
//! # Example
//!
//! ```rust
//! use glimpse_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, true, true);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use config::GlimpseSettings;
pub use error::{CliError, Result, ResultExt, SettingsError};
