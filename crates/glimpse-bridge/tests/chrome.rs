//! Integration tests for the Chrome renderer
//!
//! These tests require Chrome/Chromium to be installed and are marked #[ignore]
//! by default. Run with: cargo test -p glimpse-bridge --features chrome -- --ignored

#![cfg(feature = "chrome")]

use std::sync::Arc;
use std::time::Duration;

use glimpse_bridge::{
    ChromeBrowser, ChromeOptions, MessageBridge, MessageRenderer, WaitConfig,
};

fn test_html_page() -> String {
    r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Test Page</title>
        <link rel="stylesheet" href="data:text/css,">
        <style>body { margin: 0; } div { height: 40px; }</style>
    </head>
    <body>
        <div id="header">Header</div>
        <div>One</div>
        <div>Two</div>
        <script>console.log("loaded");</script>
    </body>
    </html>
    "#
    .to_string()
}

#[test]
#[ignore] // Requires Chrome to be installed
fn extracts_content_tree_from_live_page() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("runtime");

    let browser = runtime
        .block_on(ChromeBrowser::launch(ChromeOptions::default()))
        .expect("failed to launch browser");

    let url = format!("data:text/html,{}", urlencoding::encode(&test_html_page()));
    let renderer = runtime
        .block_on(browser.open(&url, WaitConfig::with_timeout(Duration::from_secs(10))))
        .expect("failed to open page");

    let renderer: Arc<dyn MessageRenderer> = Arc::new(renderer);
    let bridge = MessageBridge::new(&renderer, "glimpseReporter", WaitConfig::with_timeout(Duration::from_secs(5)));

    let info = bridge.extract_content_tree().expect("content tree");
    let paths: Vec<_> = info
        .parsed_nodes()
        .expect("nodes")
        .into_iter()
        .map(|node| node.path)
        .collect();

    assert_eq!(paths, ["/div#header[0]", "/div[0]", "/div[1]"]);

    bridge.teardown();
    drop(bridge);
    drop(renderer);
    runtime.block_on(browser.close()).expect("failed to close");
}
