//! Notifier contract: confirmation prompts and fire-and-forget events.
//!
//! ## Implementations
//!
//! | Notifier | Description |
//! |----------|-------------|
//! | `ScriptedNotifier` | Answers from a script, records everything (headless / tests) |
//! | `ChannelNotifier` | Request/response over tokio channels for a UI task |

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

/// A question the core needs answered before an irreversible step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub is_destructive: bool,
}

/// A fire-and-forget event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Resolves `true` to proceed, `false` to cancel. Suspends until the
    /// other side answers.
    async fn confirm(&self, request: ConfirmRequest) -> bool;

    /// Return value is never consulted.
    fn notify(&self, message: &str, severity: Severity);
}

#[async_trait]
impl<N: Notifier> Notifier for std::sync::Arc<N> {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        (**self).confirm(request).await
    }

    fn notify(&self, message: &str, severity: Severity) {
        (**self).notify(message, severity)
    }
}

// ============================================================================
// ScriptedNotifier
// ============================================================================

/// Answers confirmations from a queue, falling back to a default, and keeps
/// a log of every prompt and notification.
pub struct ScriptedNotifier {
    inner: Mutex<Script>,
}

struct Script {
    answers: VecDeque<bool>,
    default_answer: bool,
    prompts: Vec<ConfirmRequest>,
    notifications: Vec<Notification>,
}

impl ScriptedNotifier {
    /// Confirms everything.
    pub fn accepting() -> Self {
        Self::with_default(true)
    }

    /// Cancels everything.
    pub fn declining() -> Self {
        Self::with_default(false)
    }

    fn with_default(default_answer: bool) -> Self {
        Self {
            inner: Mutex::new(Script {
                answers: VecDeque::new(),
                default_answer,
                prompts: Vec::new(),
                notifications: Vec::new(),
            }),
        }
    }

    /// Queue one answer ahead of the default.
    pub fn push_answer(&self, answer: bool) {
        self.inner.lock().answers.push_back(answer);
    }

    pub fn prompts(&self) -> Vec<ConfirmRequest> {
        self.inner.lock().prompts.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().notifications.clone()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.inner.lock().notifications.last().cloned()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let mut script = self.inner.lock();
        script.prompts.push(request);
        let fallback = script.default_answer;
        script.answers.pop_front().unwrap_or(fallback)
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.inner.lock().notifications.push(Notification {
            message: message.to_string(),
            severity,
        });
    }
}

// ============================================================================
// ChannelNotifier
// ============================================================================

/// A confirmation waiting for the UI. Dropping it unanswered cancels.
#[derive(Debug)]
pub struct ConfirmPrompt {
    pub request: ConfirmRequest,
    reply: oneshot::Sender<bool>,
}

impl ConfirmPrompt {
    pub fn answer(self, proceed: bool) {
        // The core may have gone away; nothing to do then.
        let _ = self.reply.send(proceed);
    }

    pub fn accept(self) {
        self.answer(true)
    }

    pub fn decline(self) {
        self.answer(false)
    }
}

/// UI-side ends of a [`ChannelNotifier`].
pub struct NotifierHandle {
    pub prompts: mpsc::Receiver<ConfirmPrompt>,
    pub events: mpsc::UnboundedReceiver<Notification>,
}

/// Notifier that forwards prompts and events to another task.
///
/// A confirmation is a message carrying a `oneshot` reply; the delete
/// pipeline suspends on that reply only.
pub struct ChannelNotifier {
    prompts: mpsc::Sender<ConfirmPrompt>,
    events: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(prompt_capacity: usize) -> (Self, NotifierHandle) {
        let (prompt_tx, prompt_rx) = mpsc::channel(prompt_capacity.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self { prompts: prompt_tx, events: event_tx },
            NotifierHandle { prompts: prompt_rx, events: event_rx },
        )
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        let prompt = ConfirmPrompt { request, reply: reply_tx };
        if self.prompts.send(prompt).await.is_err() {
            tracing::debug!("confirmation receiver gone, treating as cancel");
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }

    fn notify(&self, message: &str, severity: Severity) {
        let _ = self.events.send(Notification { message: message.to_string(), severity });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ConfirmRequest {
        ConfirmRequest {
            title: "Delete Block".into(),
            message: "Delete 'Block A'?".into(),
            is_destructive: true,
        }
    }

    #[tokio::test]
    async fn test_scripted_answers_then_default() {
        let n = ScriptedNotifier::accepting();
        n.push_answer(false);
        assert!(!n.confirm(request()).await);
        assert!(n.confirm(request()).await);
        assert_eq!(n.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_scripted_records_notifications() {
        let n = ScriptedNotifier::declining();
        n.notify("done", Severity::Success);
        assert_eq!(
            n.last_notification(),
            Some(Notification { message: "done".into(), severity: Severity::Success })
        );
    }

    #[tokio::test]
    async fn test_channel_rendezvous() {
        let (notifier, mut handle) = ChannelNotifier::new(1);

        let ui = tokio::spawn(async move {
            let prompt = handle.prompts.recv().await.unwrap();
            assert!(prompt.request.is_destructive);
            prompt.accept();
            handle
        });

        assert!(notifier.confirm(request()).await);
        let mut handle = ui.await.unwrap();

        notifier.notify("removed", Severity::Success);
        assert_eq!(handle.events.recv().await.unwrap().severity, Severity::Success);
    }

    #[tokio::test]
    async fn test_channel_dropped_prompt_cancels() {
        let (notifier, mut handle) = ChannelNotifier::new(1);
        let ui = tokio::spawn(async move {
            drop(handle.prompts.recv().await);
        });
        assert!(!notifier.confirm(request()).await);
        ui.await.unwrap();
    }

    #[tokio::test]
    async fn test_channel_without_ui_cancels() {
        let (notifier, handle) = ChannelNotifier::new(1);
        drop(handle);
        assert!(!notifier.confirm(request()).await);
    }
}
