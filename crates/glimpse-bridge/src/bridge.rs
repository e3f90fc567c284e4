//! Renderer capabilities and the per-renderer bridge registry.
//!
//! A content renderer is either poll-style (synchronous host export) or
//! message-style (named channel). [`ContentBridges`] keeps one bridge, and so
//! one result slot, per live renderer.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::content::ContentTreeInfo;
use crate::error::Result;
use crate::message::MessageBridge;
use crate::poll::PollBridge;
use crate::script::{ContentScript, Delivery};
use crate::wait::WaitConfig;

/// Default name of the object exported into poll-style pages.
pub const DEFAULT_EXPORT_NAME: &str = "GlimpseExport";

/// Default channel message-style pages report on.
pub const DEFAULT_CHANNEL: &str = "glimpseReporter";

/// Receives a full report from a poll-style page, with the request it answers.
pub type ExportCallback = Arc<dyn Fn(u64, ContentTreeInfo) + Send + Sync>;

/// Receives each message posted on a channel.
pub type MessageHandler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionTime {
    DocumentStart,
    DocumentEnd,
}

/// A renderer that can host an exported callback and run scripts on demand.
pub trait PollRenderer: Send + Sync {
    /// Install the script and expose `export` under the script's export name.
    fn install(&self, script: &ContentScript, export: ExportCallback) -> Result<()>;

    /// Run the installed script's report for `request`. The report must be
    /// handed to the export together with the same `request`.
    fn trigger(&self, script: &ContentScript, request: u64) -> Result<()>;

    /// Withdraw the export. Renderers that cannot do this ignore it.
    fn uninstall(&self, _script: &ContentScript) {}
}

/// A renderer that posts script messages to named channels.
pub trait MessageRenderer: Send + Sync {
    /// How scripts running in this renderer reach `channel`.
    fn delivery(&self, channel: &str) -> Delivery {
        Delivery::MessageHandler(channel.to_string())
    }

    fn has_user_script(&self, script: &ContentScript) -> bool;

    /// Register a script that runs on every page load at `injection`.
    fn add_user_script(&self, script: &ContentScript, injection: InjectionTime) -> Result<()>;

    fn add_message_handler(&self, channel: &str, handler: MessageHandler) -> Result<()>;

    /// Remove the handler for `channel`, if any.
    fn remove_message_handler(&self, channel: &str);

    /// Evaluate the script in the current page, tagging the report it posts
    /// with `request`.
    fn evaluate(&self, script: &ContentScript, request: u64) -> Result<()>;
}

/// The content-renderer capability an object may expose.
#[derive(Clone)]
pub enum ContentRenderer {
    Poll(Arc<dyn PollRenderer>),
    Message(Arc<dyn MessageRenderer>),
}

impl ContentRenderer {
    fn key(&self) -> (RendererKind, usize) {
        match self {
            ContentRenderer::Poll(renderer) => (RendererKind::Poll, Arc::as_ptr(renderer).cast::<()>() as usize),
            ContentRenderer::Message(renderer) => {
                (RendererKind::Message, Arc::as_ptr(renderer).cast::<()>() as usize)
            }
        }
    }
}

impl fmt::Debug for ContentRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, address) = self.key();
        f.debug_struct("ContentRenderer")
            .field("kind", &kind)
            .field("address", &format_args!("{address:#x}"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RendererKind {
    Poll,
    Message,
}

pub enum ContentBridge {
    Poll(PollBridge),
    Message(MessageBridge),
}

impl ContentBridge {
    pub fn extract_content_tree(&self) -> Option<ContentTreeInfo> {
        match self {
            ContentBridge::Poll(bridge) => bridge.extract_content_tree(),
            ContentBridge::Message(bridge) => bridge.extract_content_tree(),
        }
    }

    pub fn teardown(&self) {
        match self {
            ContentBridge::Poll(bridge) => bridge.teardown(),
            ContentBridge::Message(bridge) => bridge.teardown(),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            ContentBridge::Poll(bridge) => bridge.is_alive(),
            ContentBridge::Message(bridge) => bridge.is_alive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub wait: WaitConfig,
    pub export_name: String,
    pub channel: String,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            wait: WaitConfig::default(),
            export_name: DEFAULT_EXPORT_NAME.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

/// One bridge per live renderer, created on first extraction.
#[derive(Default)]
pub struct ContentBridges {
    options: BridgeOptions,
    bridges: Mutex<FxHashMap<(RendererKind, usize), Arc<ContentBridge>>>,
}

impl ContentBridges {
    pub fn new(options: BridgeOptions) -> Self {
        Self {
            options,
            bridges: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Extract the content tree of `renderer` through its bridge.
    pub fn extract(&self, renderer: &ContentRenderer) -> Option<ContentTreeInfo> {
        let bridge = self.bridge_for(renderer);
        bridge.extract_content_tree()
    }

    fn bridge_for(&self, renderer: &ContentRenderer) -> Arc<ContentBridge> {
        let mut bridges = self.bridges.lock();
        bridges.retain(|_, bridge| bridge.is_alive());

        bridges
            .entry(renderer.key())
            .or_insert_with(|| {
                Arc::new(match renderer {
                    ContentRenderer::Poll(renderer) => ContentBridge::Poll(PollBridge::new(
                        renderer,
                        &self.options.export_name,
                        self.options.wait,
                    )),
                    ContentRenderer::Message(renderer) => ContentBridge::Message(MessageBridge::new(
                        renderer,
                        &self.options.channel,
                        self.options.wait,
                    )),
                })
            })
            .clone()
    }

    /// Tear down every bridge. Safe to call repeatedly.
    pub fn teardown_all(&self) {
        let bridges: Vec<_> = self.bridges.lock().drain().map(|(_, bridge)| bridge).collect();
        for bridge in bridges {
            bridge.teardown();
        }
    }

    pub fn len(&self) -> usize {
        self.bridges.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ContentBridges {
    fn drop(&mut self) {
        self.teardown_all();
    }
}
