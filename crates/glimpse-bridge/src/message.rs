//! Message-style bridge for renderers that report over a named channel.
//!
//! The content script is installed once as a persistent document-end user
//! script. Every extraction re-subscribes the channel handler (removing the
//! previous one first), evaluates the script for a new request and waits for
//! that request's answer. Messages are partial updates: a report missing a
//! field keeps the value from the previous one.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::bridge::{InjectionTime, MessageRenderer};
use crate::content::ContentTreeInfo;
use crate::error::{BridgeError, Result};
use crate::script::ContentScript;
use crate::slot::ResultSlot;
use crate::wait::WaitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Idle,
    Subscribed,
    Received,
}

pub struct MessageBridge {
    renderer: Weak<dyn MessageRenderer>,
    channel: String,
    script: ContentScript,
    slot: Arc<ResultSlot>,
    state: Mutex<MessageState>,
    wait: WaitConfig,
}

impl MessageBridge {
    pub fn new(renderer: &Arc<dyn MessageRenderer>, channel: &str, wait: WaitConfig) -> Self {
        Self {
            renderer: Arc::downgrade(renderer),
            channel: channel.to_string(),
            script: ContentScript::new(renderer.delivery(channel)),
            slot: Arc::new(ResultSlot::new()),
            state: Mutex::new(MessageState::Idle),
            wait,
        }
    }

    pub fn state(&self) -> MessageState {
        *self.state.lock()
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_alive(&self) -> bool {
        self.renderer.strong_count() > 0
    }

    /// Run one extraction. Failures and timeouts are logged and yield `None`.
    pub fn extract_content_tree(&self) -> Option<ContentTreeInfo> {
        match self.try_extract() {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                warn!(
                    channel = %self.channel,
                    timeout = ?self.wait.timeout,
                    "no content report received in time"
                );
                None
            }
            Err(err) => {
                warn!(channel = %self.channel, error = %err, "content extraction failed");
                None
            }
        }
    }

    fn try_extract(&self) -> Result<Option<ContentTreeInfo>> {
        let renderer = self.renderer.upgrade().ok_or(BridgeError::RendererGone)?;
        let mut state = self.state.lock();

        if !renderer.has_user_script(&self.script) {
            renderer.add_user_script(&self.script, InjectionTime::DocumentEnd)?;
            debug!(channel = %self.channel, "installed content user script");
        }

        renderer.remove_message_handler(&self.channel);
        let slot = self.slot.clone();
        renderer.add_message_handler(&self.channel, Arc::new(move |message: &Value| {
            slot.merge(message);
        }))?;
        *state = MessageState::Subscribed;

        let request = self.slot.begin();
        renderer.evaluate(&self.script, request)?;

        let result = self.slot.wait_for(request, self.wait.timeout);
        if result.is_some() {
            *state = MessageState::Received;
        }
        Ok(result)
    }

    /// Unsubscribe from the channel. Safe to call repeatedly, and before any
    /// subscription happened.
    pub fn teardown(&self) {
        let mut state = self.state.lock();
        if *state == MessageState::Idle {
            return;
        }
        if let Some(renderer) = self.renderer.upgrade() {
            renderer.remove_message_handler(&self.channel);
        }
        *state = MessageState::Idle;
    }
}
