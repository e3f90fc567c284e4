//! The result slot a bridge waits on.
//!
//! Writers (an export callback, a channel handler) may run on any thread.
//! Each extraction takes a fresh request number from [`ResultSlot::begin`]
//! and waits until that request is answered. A poll report answers exactly
//! the request it was triggered for; reports for any other request are
//! dropped. Channel messages tagged with a request are treated the same way.
//! Untagged messages, such as the report a page posts when it loads, update
//! the slot and answer whatever request is pending. The last accepted write
//! wins.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde_json::Value;
use tracing::trace;

use crate::content::ContentTreeInfo;

/// Message field carrying the request a report answers.
pub const REQUEST_FIELD: &str = "request";

#[derive(Debug, Default)]
struct SlotState {
    issued: u64,
    answered: u64,
    info: ContentTreeInfo,
}

#[derive(Debug, Default)]
pub struct ResultSlot {
    state: Mutex<SlotState>,
    written: Condvar,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request. Reports for earlier requests are ignored from now on.
    pub fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.issued += 1;
        state.issued
    }

    /// Replace the whole value with the answer to `request`.
    ///
    /// Returns `false` when `request` is not the pending one.
    pub fn publish(&self, request: u64, info: ContentTreeInfo) -> bool {
        let mut state = self.state.lock();
        if request != state.issued {
            trace!(request, pending = state.issued, "dropping report for another request");
            return false;
        }
        state.info = info;
        state.answered = request;
        self.written.notify_all();
        true
    }

    /// Partially update from a channel message.
    ///
    /// Returns `false` when the message is tagged with a request other than
    /// the pending one.
    pub fn merge(&self, message: &Value) -> bool {
        let mut state = self.state.lock();
        if let Some(request) = request_of(message) {
            if request != state.issued {
                trace!(request, pending = state.issued, "dropping message for another request");
                return false;
            }
        }
        state.info.merge_message(message);
        state.answered = state.issued;
        self.written.notify_all();
        true
    }

    /// Current value, whichever request it answered.
    pub fn current(&self) -> ContentTreeInfo {
        self.state.lock().info.clone()
    }

    /// Block until `request` is answered, or `timeout` elapses.
    pub fn wait_for(&self, request: u64, timeout: Duration) -> Option<ContentTreeInfo> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        while state.answered < request {
            if self.written.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }

        (state.answered >= request).then(|| state.info.clone())
    }
}

/// Request tag of a message. The wire carries it as a string like every other field.
fn request_of(message: &Value) -> Option<u64> {
    message
        .get(REQUEST_FIELD)
        .and_then(Value::as_str)
        .and_then(|tag| tag.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn info(url: &str) -> ContentTreeInfo {
        ContentTreeInfo {
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn wait_returns_value_written_from_another_thread() {
        let slot = Arc::new(ResultSlot::new());
        let request = slot.begin();

        let writer = {
            let slot = slot.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                slot.merge(&json!({ "path": "/late" }));
            })
        };

        let info = slot.wait_for(request, Duration::from_secs(5)).unwrap();
        assert_eq!(info.url, "/late");
        writer.join().unwrap();
    }

    #[test]
    fn answer_to_earlier_request_is_dropped() {
        let slot = ResultSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(!slot.publish(first, info("/stale")));
        assert!(slot.wait_for(second, Duration::from_millis(20)).is_none());

        assert!(slot.publish(second, info("/fresh")));
        assert_eq!(slot.wait_for(second, Duration::ZERO).unwrap().url, "/fresh");
    }

    #[test]
    fn answered_request_does_not_satisfy_the_next_one() {
        let slot = ResultSlot::new();
        let first = slot.begin();
        slot.publish(first, info("/old"));

        let second = slot.begin();
        assert!(slot.wait_for(second, Duration::from_millis(20)).is_none());
        assert_eq!(slot.current().url, "/old");
    }

    #[test]
    fn tagged_messages_only_answer_their_request() {
        let slot = ResultSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        let stale = json!({ "path": "/stale", "request": first.to_string() });
        assert!(!slot.merge(&stale));
        assert_eq!(slot.current().url, "");

        let fresh = json!({ "path": "/fresh", "request": second.to_string() });
        assert!(slot.merge(&fresh));
        assert_eq!(slot.wait_for(second, Duration::ZERO).unwrap().url, "/fresh");
    }

    #[test]
    fn last_write_wins() {
        let slot = ResultSlot::new();
        let request = slot.begin();
        slot.merge(&json!({ "path": "/a", "clientWidth": "1" }));
        slot.merge(&json!({ "path": "/b" }));

        let info = slot.wait_for(request, Duration::ZERO).unwrap();
        assert_eq!(info.url, "/b");
        assert_eq!(info.client_width, "1");
    }
}
