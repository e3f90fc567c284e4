//! Check command implementation.
//!
//! Validates a schema and compiles it without touching any object graph.

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;
use glimpse_schema::{SchemaRegistry, TransformRegistry, validate_schema, validate_strict};

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load the explicit or discovered schema file
/// 2. Run the structural checks (strict ones too with `--strict`)
/// 3. Compile against the built-in transforms
/// 4. Print what the schema describes
pub fn execute(args: CheckArgs) -> Result<()> {
    let cwd = utils::get_cwd()?;
    let (path, config) = utils::load_schema_config(args.schema.as_deref(), &cwd)?;
    ui::info(&format!("Checking {}...", path.display()));

    if args.strict {
        validate_strict(&config)?;
    } else {
        validate_schema(&config)?;
    }

    let registry = SchemaRegistry::from_config(&config, &TransformRegistry::builtin())?;
    ui::success("Schema is valid!");
    ui::print_schema_summary(&path, &registry);
    Ok(())
}
