//! Auxiliary event handlers: push notifications and background sync.
//!
//! Thin hooks with no caching interaction. The push payload contract is a
//! JSON object with `title`, `body`, and opaque `data`; display is
//! delegated to a host-provided [`Notifier`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;

/// Push payload contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Opaque payload forwarded to the notification, untouched.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PushPayload {
    /// Parse a raw push message body.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }
}

/// Host hook for displaying a notification.
pub trait Notifier: Send + Sync {
    fn show(&self, payload: &PushPayload);
}

/// Background-sync and push hooks.
pub struct EventHandlers {
    notifier: Option<Arc<dyn Notifier>>,
}

impl EventHandlers {
    pub fn new(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { notifier }
    }

    /// Parse a push message and hand it to the notifier, if any.
    pub fn on_push(&self, raw: &[u8]) -> Result<()> {
        let payload = PushPayload::parse(raw)?;
        info!(title = %payload.title, "push received");
        if let Some(notifier) = &self.notifier {
            notifier.show(&payload);
        }
        Ok(())
    }

    /// Background sync hook. Log-only; sync work is a host concern.
    pub fn on_sync(&self, tag: &str) {
        debug!(tag, "sync event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<PushPayload>>,
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, payload: &PushPayload) {
            self.shown.lock().unwrap().push(payload.clone());
        }
    }

    #[test]
    fn push_payload_parses_full_contract() {
        let raw = br#"{"title":"New post","body":"Read it","data":{"url":"/posts/1"}}"#;
        let payload = PushPayload::parse(raw).unwrap();
        assert_eq!(payload.title, "New post");
        assert_eq!(payload.body, "Read it");
        assert_eq!(payload.data["url"], "/posts/1");
    }

    #[test]
    fn push_payload_defaults_optional_fields() {
        let payload = PushPayload::parse(br#"{"title":"Ping"}"#).unwrap();
        assert_eq!(payload.body, "");
        assert!(payload.data.is_null());
    }

    #[test]
    fn malformed_push_payload_is_rejected() {
        assert!(PushPayload::parse(b"not json").is_err());
    }

    #[test]
    fn on_push_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let handlers = EventHandlers::new(Some(notifier.clone()));
        handlers.on_push(br#"{"title":"Hello"}"#).unwrap();
        assert_eq!(notifier.shown.lock().unwrap().len(), 1);
    }

    #[test]
    fn on_push_without_notifier_still_parses() {
        let handlers = EventHandlers::new(None);
        assert!(handlers.on_push(br#"{"title":"Hello"}"#).is_ok());
        assert!(handlers.on_push(b"garbage").is_err());
    }
}
