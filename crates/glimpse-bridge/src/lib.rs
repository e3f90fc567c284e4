//! # glimpse-bridge
//!
//! Extracts the visible content tree of an embedded web renderer so a
//! snapshot node can carry it as `htmlPage`.
//!
//! ## Architecture
//!
//! - **ContentScript**: the walk over `<body>`, as JavaScript and as a native
//!   evaluator over the in-memory [`Document`]
//! - **PollBridge**: synchronous host export, install once, trigger, wait
//! - **MessageBridge**: document-end user script plus a named channel whose
//!   messages partially update the result
//! - **ResultSlot**: per-bridge slot answering one request at a time
//! - **ContentBridges**: one bridge per live renderer
//! - **DocumentRenderer**: in-memory renderer implementing both styles
//! - **ChromeRenderer** (feature `chrome`): message-style renderer over CDP
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use glimpse_bridge::{
//!     BridgeOptions, ContentBridges, ContentRenderer, Document, DocumentRenderer, Element,
//!     MessageRenderer, Rect, Viewport,
//! };
//!
//! let document = Document::new("/home", Viewport::new(375.0, 667.0))
//!     .with_child(Element::new("button", Rect::new(10.0, 10.0, 100.0, 44.0)).with_id("buy"));
//!
//! let renderer: Arc<dyn MessageRenderer> = Arc::new(DocumentRenderer::new(document));
//! let bridges = ContentBridges::new(BridgeOptions::default());
//!
//! let info = bridges.extract(&ContentRenderer::Message(renderer)).unwrap();
//! assert_eq!(info.url, "/home");
//! assert_eq!(info.parsed_nodes().unwrap()[0].path, "/button#buy[0]");
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod content;
pub mod document;
pub mod error;
pub mod message;
pub mod poll;
pub mod script;
pub mod slot;
pub mod wait;

#[cfg(feature = "chrome")]
pub mod chrome;

// Re-export main types for convenience
pub use bridge::{
    BridgeOptions, ContentBridge, ContentBridges, ContentRenderer, DEFAULT_CHANNEL,
    DEFAULT_EXPORT_NAME, ExportCallback, InjectionTime, MessageHandler, MessageRenderer,
    PollRenderer,
};
pub use content::{ContentNode, ContentReport, ContentTreeInfo, Document, Element, Rect, Viewport};
pub use document::DocumentRenderer;
pub use error::{BridgeError, Result};
pub use message::{MessageBridge, MessageState};
pub use poll::{PollBridge, PollState};
pub use script::{ContentScript, Delivery, REPORT_OBJECT};
pub use slot::{REQUEST_FIELD, ResultSlot};
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitConfig};
#[cfg(feature = "chrome")]
pub use wait::wait_for_result;

#[cfg(feature = "chrome")]
pub use chrome::{ChromeBrowser, ChromeOptions, ChromeRenderer};
