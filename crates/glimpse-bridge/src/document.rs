//! An in-memory renderer over a [`Document`].
//!
//! Implements both renderer styles. Scripts are evaluated with
//! [`ContentScript::run`]; reports are delivered either inline or from a
//! background thread after a delay, which is how real renderers behave.

use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::bridge::{ExportCallback, InjectionTime, MessageHandler, MessageRenderer, PollRenderer};
use crate::content::{ContentReport, Document};
use crate::error::{BridgeError, Result};
use crate::script::ContentScript;

#[derive(Default)]
struct Channels {
    handlers: FxHashMap<String, MessageHandler>,
    subscriptions: usize,
}

pub struct DocumentRenderer {
    document: RwLock<Document>,
    delivery_delay: Mutex<Option<Duration>>,
    export: Mutex<Option<(ContentScript, ExportCallback)>>,
    user_scripts: Mutex<Vec<(ContentScript, InjectionTime)>>,
    channels: Mutex<Channels>,
    silent: bool,
}

impl DocumentRenderer {
    pub fn new(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
            delivery_delay: Mutex::new(None),
            export: Mutex::new(None),
            user_scripts: Mutex::new(Vec::new()),
            channels: Mutex::new(Channels::default()),
            silent: false,
        }
    }

    /// Deliver reports from a background thread after `delay`.
    pub fn with_delivery_delay(self, delay: Duration) -> Self {
        self.set_delivery_delay(Some(delay));
        self
    }

    /// Change the delay for reports triggered from now on.
    pub fn set_delivery_delay(&self, delay: Option<Duration>) {
        *self.delivery_delay.lock() = delay;
    }

    /// Evaluate scripts but never deliver a report.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn set_document(&self, document: Document) {
        *self.document.write() = document;
    }

    /// Replace the document and run document-end user scripts against it,
    /// as a page load would.
    pub fn load(&self, document: Document) -> Result<()> {
        self.set_document(document);

        let scripts: Vec<ContentScript> = self
            .user_scripts
            .lock()
            .iter()
            .filter(|(_, injection)| *injection == InjectionTime::DocumentEnd)
            .map(|(script, _)| script.clone())
            .collect();

        for script in &scripts {
            self.post(script, None)?;
        }
        Ok(())
    }

    pub fn user_script_count(&self) -> usize {
        self.user_scripts.lock().len()
    }

    pub fn handler_count(&self) -> usize {
        self.channels.lock().handlers.len()
    }

    /// Total successful `add_message_handler` calls.
    pub fn subscription_count(&self) -> usize {
        self.channels.lock().subscriptions
    }

    fn report(&self, script: &ContentScript) -> ContentReport {
        script.run(&self.document.read())
    }

    fn deliver<F>(&self, send: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.silent {
            return;
        }
        let delay = *self.delivery_delay.lock();
        match delay {
            None => send(),
            Some(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    send();
                });
            }
        }
    }
}

impl PollRenderer for DocumentRenderer {
    fn install(&self, script: &ContentScript, export: ExportCallback) -> Result<()> {
        *self.export.lock() = Some((script.clone(), export));
        Ok(())
    }

    fn trigger(&self, script: &ContentScript, request: u64) -> Result<()> {
        let export = match self.export.lock().as_ref() {
            Some((installed, export)) if installed == script => export.clone(),
            _ => return Err(BridgeError::NotInstalled),
        };

        let info = self.report(script).into_tree_info()?;
        self.deliver(move || export(request, info));
        Ok(())
    }

    fn uninstall(&self, _script: &ContentScript) {
        self.export.lock().take();
    }
}

impl MessageRenderer for DocumentRenderer {
    fn has_user_script(&self, script: &ContentScript) -> bool {
        self.user_scripts
            .lock()
            .iter()
            .any(|(installed, _)| installed == script)
    }

    fn add_user_script(&self, script: &ContentScript, injection: InjectionTime) -> Result<()> {
        self.user_scripts.lock().push((script.clone(), injection));
        Ok(())
    }

    fn add_message_handler(&self, channel: &str, handler: MessageHandler) -> Result<()> {
        let mut channels = self.channels.lock();
        if channels.handlers.contains_key(channel) {
            return Err(BridgeError::SubscribeFailed {
                channel: channel.to_string(),
                reason: "a handler is already registered".to_string(),
            });
        }
        channels.handlers.insert(channel.to_string(), handler);
        channels.subscriptions += 1;
        Ok(())
    }

    fn remove_message_handler(&self, channel: &str) {
        self.channels.lock().handlers.remove(channel);
    }

    fn evaluate(&self, script: &ContentScript, request: u64) -> Result<()> {
        self.post(script, Some(request))
    }
}

impl DocumentRenderer {
    /// Run `script` and post its report on the script's channel.
    fn post(&self, script: &ContentScript, request: Option<u64>) -> Result<()> {
        let channel = script.delivery().name();
        let message = self.report(script).to_message(request)?;

        let Some(handler) = self.channels.lock().handlers.get(channel).cloned() else {
            trace!(channel, "no handler registered, message dropped");
            return Ok(());
        };

        self.deliver(move || handler(&message));
        Ok(())
    }
}

impl From<Document> for DocumentRenderer {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}
