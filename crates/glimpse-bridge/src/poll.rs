//! Poll-style bridge for renderers with a synchronous host export.
//!
//! The script and export are installed once. Each extraction opens a new
//! request on the bridge's slot, triggers the report for it and waits for
//! that request's answer. Late answers to earlier requests are dropped.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::bridge::PollRenderer;
use crate::content::ContentTreeInfo;
use crate::error::{BridgeError, Result};
use crate::script::{ContentScript, Delivery};
use crate::slot::ResultSlot;
use crate::wait::WaitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    ScriptInstalled,
    Extracted,
}

pub struct PollBridge {
    renderer: Weak<dyn PollRenderer>,
    script: ContentScript,
    slot: Arc<ResultSlot>,
    state: Mutex<PollState>,
    wait: WaitConfig,
}

impl PollBridge {
    pub fn new(renderer: &Arc<dyn PollRenderer>, export_name: &str, wait: WaitConfig) -> Self {
        Self {
            renderer: Arc::downgrade(renderer),
            script: ContentScript::new(Delivery::HostExport(export_name.to_string())),
            slot: Arc::new(ResultSlot::new()),
            state: Mutex::new(PollState::Idle),
            wait,
        }
    }

    pub fn state(&self) -> PollState {
        *self.state.lock()
    }

    pub fn is_alive(&self) -> bool {
        self.renderer.strong_count() > 0
    }

    /// Run one extraction. Failures and timeouts are logged and yield `None`.
    pub fn extract_content_tree(&self) -> Option<ContentTreeInfo> {
        match self.try_extract() {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                warn!(timeout = ?self.wait.timeout, "content report did not arrive in time");
                None
            }
            Err(err) => {
                warn!(error = %err, "content extraction failed");
                None
            }
        }
    }

    fn try_extract(&self) -> Result<Option<ContentTreeInfo>> {
        let renderer = self.renderer.upgrade().ok_or(BridgeError::RendererGone)?;
        let mut state = self.state.lock();

        if *state == PollState::Idle {
            let slot = self.slot.clone();
            renderer.install(
                &self.script,
                Arc::new(move |request, info| {
                    slot.publish(request, info);
                }),
            )?;
            *state = PollState::ScriptInstalled;
            debug!(export = self.script.delivery().name(), "installed content script");
        }

        let request = self.slot.begin();
        renderer.trigger(&self.script, request)?;

        let result = self.slot.wait_for(request, self.wait.timeout);
        if result.is_some() {
            *state = PollState::Extracted;
        }
        Ok(result)
    }

    /// Remove the export and return to `Idle`. Safe to call repeatedly.
    pub fn teardown(&self) {
        let mut state = self.state.lock();
        if *state == PollState::Idle {
            return;
        }
        if let Some(renderer) = self.renderer.upgrade() {
            renderer.uninstall(&self.script);
        }
        *state = PollState::Idle;
    }
}
