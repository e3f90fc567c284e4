//! Message-style renderer backed by a headless Chrome page.
//!
//! The named channel is a CDP binding (`Runtime.addBinding`); the binding is
//! called with the JSON-encoded message, which the listener task decodes and
//! hands to the registered handler. User scripts are registered with
//! `Page.addScriptToEvaluateOnNewDocument` and deferred to document end.
//!
//! [`MessageRenderer`] is synchronous, so every CDP call is driven with
//! [`Handle::block_on`]. Call the renderer from a thread outside the runtime
//! (for example the main thread after the runtime was built), never from
//! inside an async task.

use std::future::Future;
use std::sync::Arc;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled, RemoveBindingParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bridge::{InjectionTime, MessageHandler, MessageRenderer};
use crate::error::{BridgeError, Result};
use crate::script::{ContentScript, Delivery};
use crate::wait::{WaitConfig, wait_for_result};

/// Configuration for launching the browser.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub args: Vec<String>,
    pub chrome_path: Option<String>,
}

impl ChromeOptions {
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        if self.headless {
            config = config.arg("--headless");
        } else {
            config = config.with_head();
        }

        config = config.arg(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));

        // Separate profile per instance so parallel launches don't collide.
        let user_data_dir = std::env::temp_dir().join(format!("glimpse-chrome-{}", uuid::Uuid::new_v4()));
        config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| BridgeError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (375, 667),
            args: vec![
                // Containers often lack user namespaces.
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A launched browser. Pages opened from it become [`ChromeRenderer`]s.
pub struct ChromeBrowser {
    inner: tokio::sync::Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    pub async fn launch(options: ChromeOptions) -> Result<Self> {
        debug!(?options, "launching browser");

        let (browser, mut handler) = Browser::launch(options.to_browser_config()?)
            .await
            .map_err(|e| BridgeError::LaunchFailed {
                reason: "failed to launch Chrome process".to_string(),
                source: Some(Box::new(e)),
            })?;

        // chromiumoxide only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e}");
                }
            }
        });

        Ok(Self {
            inner: tokio::sync::Mutex::new(Some(browser)),
            handler,
        })
    }

    /// Open `url` in a new page and wait until the document is complete.
    pub async fn open(&self, url: &str, wait: WaitConfig) -> Result<ChromeRenderer> {
        let page = {
            let browser = self.inner.lock().await;
            let browser = browser.as_ref().ok_or(BridgeError::AlreadyClosed)?;
            browser
                .new_page(url)
                .await
                .map_err(|e| BridgeError::NavigationFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?
        };

        wait_for_result(
            || {
                let page = page.clone();
                async move {
                    let state = page
                        .evaluate("document.readyState")
                        .await
                        .map_err(|e| BridgeError::ScriptExecutionFailed(e.to_string()))?;
                    Ok(state.value().and_then(Value::as_str) == Some("complete"))
                }
            },
            wait,
            "document ready",
        )
        .await?;

        ChromeRenderer::attach(page).await
    }

    pub async fn close(self) -> Result<()> {
        if let Some(mut browser) = self.inner.lock().await.take() {
            browser.close().await?;
        }
        self.handler.abort();
        Ok(())
    }
}

/// A Chrome page driven through CDP bindings.
pub struct ChromeRenderer {
    page: Page,
    runtime: Handle,
    handlers: Arc<Mutex<FxHashMap<String, MessageHandler>>>,
    user_scripts: Mutex<FxHashSet<ContentScript>>,
    listener: JoinHandle<()>,
}

impl ChromeRenderer {
    /// Start listening for binding calls on `page`. Must run inside the runtime.
    pub async fn attach(page: Page) -> Result<Self> {
        let handlers: Arc<Mutex<FxHashMap<String, MessageHandler>>> = Arc::default();
        let mut events = page.event_listener::<EventBindingCalled>().await?;

        let dispatch = handlers.clone();
        let listener = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let Some(handler) = dispatch.lock().get(&event.name).cloned() else {
                    continue;
                };
                match serde_json::from_str::<Value>(&event.payload) {
                    Ok(message) => handler(&message),
                    Err(err) => warn!(channel = %event.name, error = %err, "undecodable binding payload"),
                }
            }
        });

        Ok(Self {
            page,
            runtime: Handle::current(),
            handlers,
            user_scripts: Mutex::new(FxHashSet::default()),
            listener,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl MessageRenderer for ChromeRenderer {
    fn delivery(&self, channel: &str) -> Delivery {
        Delivery::Binding(channel.to_string())
    }

    fn has_user_script(&self, script: &ContentScript) -> bool {
        self.user_scripts.lock().contains(script)
    }

    fn add_user_script(&self, script: &ContentScript, injection: InjectionTime) -> Result<()> {
        let source = match injection {
            InjectionTime::DocumentStart => script.source(),
            InjectionTime::DocumentEnd => format!(
                "document.addEventListener('DOMContentLoaded', function () {{\n{}\n}});",
                script.source()
            ),
        };

        self.block_on(
            self.page
                .execute(AddScriptToEvaluateOnNewDocumentParams::new(source)),
        )?;
        self.user_scripts.lock().insert(script.clone());
        Ok(())
    }

    fn add_message_handler(&self, channel: &str, handler: MessageHandler) -> Result<()> {
        self.block_on(self.page.execute(AddBindingParams::new(channel)))
            .map_err(|e| BridgeError::SubscribeFailed {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?;
        self.handlers.lock().insert(channel.to_string(), handler);
        Ok(())
    }

    fn remove_message_handler(&self, channel: &str) {
        if self.handlers.lock().remove(channel).is_none() {
            return;
        }
        if let Err(err) = self.block_on(self.page.execute(RemoveBindingParams::new(channel))) {
            debug!(channel, error = %err, "failed to remove binding");
        }
    }

    fn evaluate(&self, script: &ContentScript, request: u64) -> Result<()> {
        self.block_on(self.page.evaluate(script.request_source(request)))
            .map_err(|e| BridgeError::ScriptExecutionFailed(e.to_string()))?;
        Ok(())
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
