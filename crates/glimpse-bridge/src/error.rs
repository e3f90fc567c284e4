//! Error types for content-tree extraction.
//!
//! Bridge errors never escape a snapshot: the serializer logs them and omits
//! the `htmlPage` entry. They are still typed so renderer implementations and
//! the CLI can report what went wrong.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The renderer refused or failed to install the content script.
    #[error("failed to install content script: {0}")]
    InstallFailed(String),

    /// Extraction was triggered before the script was installed.
    #[error("content script is not installed")]
    NotInstalled,

    /// Evaluating the content script in the renderer failed.
    #[error("content script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Subscribing to the named message channel failed.
    #[error("failed to subscribe to channel '{channel}': {reason}")]
    SubscribeFailed { channel: String, reason: String },

    /// The renderer went away while a bridge still referenced it.
    #[error("renderer was dropped")]
    RendererGone,

    /// A wait condition was not satisfied within the timeout.
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout { condition: String, timeout: Duration },

    /// A reported node list was not valid JSON.
    #[error("malformed content nodes: {0}")]
    MalformedNodes(#[from] serde_json::Error),

    /// Failed to launch the browser process.
    #[cfg(feature = "chrome")]
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Navigation to a URL failed or timed out.
    #[cfg(feature = "chrome")]
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    /// An operation was attempted on a closed browser instance.
    #[cfg(feature = "chrome")]
    #[error("browser instance is already closed")]
    AlreadyClosed,

    #[cfg(feature = "chrome")]
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
