//! Snapshot command implementation.

use crate::cli::SnapshotArgs;
use crate::commands::utils;
use crate::config::{GlimpseSettings, SettingsOverrides};
use crate::error::{Result, ResultExt};
use crate::ui;
use glimpse_bridge::{BridgeOptions, WaitConfig};
use glimpse_graph::{FixtureGraph, GraphSerializer, SerializerOptions, Snapshot};
use glimpse_schema::{SchemaRegistry, TransformRegistry};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Execute the snapshot command.
///
/// The document goes to stdout unless `--output` names a file. Nothing is
/// written when serialization fails.
pub fn execute(args: SnapshotArgs) -> Result<()> {
    let started = Instant::now();
    let cwd = utils::get_cwd()?;

    let overrides = SettingsOverrides {
        bridge_timeout_ms: args.bridge_timeout_ms,
        max_objects: args.max_objects,
        pretty: args.compact.then_some(false),
    };
    let config_path = args.config.as_deref().map(|path| utils::resolve_path(path, &cwd));
    let settings = GlimpseSettings::load(&overrides, config_path.as_deref(), &cwd)?;
    debug!(?settings, "settings loaded");

    let (schema_path, config) = utils::load_schema_config(args.schema.as_deref(), &cwd)?;
    let registry = SchemaRegistry::from_config(&config, &TransformRegistry::builtin())?;
    debug!(
        schema = %schema_path.display(),
        classes = registry.class_count(),
        "schema compiled"
    );

    let graph = FixtureGraph::from_path(&utils::resolve_path(&args.graph, &cwd))?;
    let serializer = build_serializer(registry, &settings);
    let snapshot = serializer.serialize(&graph.root())?;

    let mut document = if settings.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    document.push('\n');

    match &args.output {
        Some(output) => {
            let output = utils::resolve_path(output, &cwd);
            std::fs::write(&output, document).with_path(&output)?;
            ui::success(&format!("Snapshot written to {}", output.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
        }
    }

    ui::print_snapshot_summary(snapshot.len(), content_count(&snapshot), started.elapsed());
    Ok(())
}

fn build_serializer(registry: SchemaRegistry, settings: &GlimpseSettings) -> GraphSerializer {
    let serializer = GraphSerializer::new(Arc::new(registry)).with_bridge_options(BridgeOptions {
        wait: WaitConfig::with_timeout(settings.bridge_timeout()),
        ..BridgeOptions::default()
    });

    match settings.max_objects {
        Some(max) => serializer.with_options(SerializerOptions::with_max_objects(max)),
        None => serializer,
    }
}

fn content_count(snapshot: &Snapshot) -> usize {
    snapshot
        .objects
        .values()
        .filter(|node| node.html_page.is_some())
        .count()
}
