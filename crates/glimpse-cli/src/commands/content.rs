//! Content command implementation.
//!
//! Runs a message-style bridge against a page in headless Chrome. The
//! runtime only drives the browser; extraction itself blocks on the main
//! thread, which the Chrome renderer requires.

use crate::cli::ContentArgs;
use crate::commands::utils;
use crate::config::{GlimpseSettings, SettingsOverrides};
use crate::error::Result;
use crate::ui;
use glimpse_bridge::{
    BridgeError, BridgeOptions, ChromeBrowser, ChromeOptions, ContentBridges, ContentRenderer,
    ContentTreeInfo, MessageRenderer, WaitConfig,
};
use std::io::Write;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Execute the content command.
pub fn execute(args: ContentArgs) -> Result<()> {
    let cwd = utils::get_cwd()?;
    let overrides = SettingsOverrides {
        bridge_timeout_ms: args.bridge_timeout_ms,
        ..SettingsOverrides::default()
    };
    let config_path = args.config.as_deref().map(|path| utils::resolve_path(path, &cwd));
    let settings = GlimpseSettings::load(&overrides, config_path.as_deref(), &cwd)?;
    let wait = WaitConfig::with_timeout(settings.bridge_timeout());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    ui::info(&format!("Opening {}...", args.url));
    let options = ChromeOptions {
        headless: !args.headed,
        ..ChromeOptions::default()
    };
    let browser = runtime.block_on(ChromeBrowser::launch(options))?;

    let extracted = extract(&runtime, &browser, &args.url, wait);
    if let Err(err) = runtime.block_on(browser.close()) {
        ui::warning(&format!("Browser did not shut down cleanly: {err}"));
    }

    let Some(info) = extracted? else {
        return Err(BridgeError::WaitTimeout {
            condition: "content report".to_string(),
            timeout: wait.timeout,
        }
        .into());
    };

    let document = if settings.pretty {
        serde_json::to_string_pretty(&info)?
    } else {
        serde_json::to_string(&info)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{document}")?;

    ui::success(&format!("{} visible elements", info.parsed_nodes()?.len()));
    Ok(())
}

fn extract(
    runtime: &Runtime,
    browser: &ChromeBrowser,
    url: &str,
    wait: WaitConfig,
) -> Result<Option<ContentTreeInfo>> {
    let renderer: Arc<dyn MessageRenderer> = Arc::new(runtime.block_on(browser.open(url, wait))?);
    let bridges = ContentBridges::new(BridgeOptions {
        wait,
        ..BridgeOptions::default()
    });

    let info = bridges.extract(&ContentRenderer::Message(renderer.clone()));
    bridges.teardown_all();
    Ok(info)
}
