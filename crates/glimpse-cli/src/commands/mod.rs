//! Command implementations for the glimpse CLI.
//!
//! - [`check`] - Schema validation
//! - [`snapshot`] - Fixture graph serialization
//! - `content` - Live page extraction (feature `chrome`)
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod check;
#[cfg(feature = "chrome")]
pub mod content;
pub mod snapshot;
pub(crate) mod utils;

pub use check::execute as check_execute;
#[cfg(feature = "chrome")]
pub use content::execute as content_execute;
pub use snapshot::execute as snapshot_execute;
