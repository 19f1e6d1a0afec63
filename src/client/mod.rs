//! Client controller: session state and the optimize request lifecycle
//!
//! A [`ClientController`] owns one [`ClientSession`]. It drives
//! Idle -> Pending -> Succeeded/Failed, keeps at most one request in flight,
//! and derives the reduction percentage from the last successful cycle.

mod backend;
mod clipboard;

pub use backend::{BackendError, HttpBackend, OptimizerBackend};
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard, SystemClipboard};

use crate::metrics::reduction_percentage;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long the copy confirmation stays visible
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// State of one client session
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub input_text: String,
    pub output_text: String,
    pub status: RequestStatus,
    pub auto_clear_enabled: bool,
    /// Input length in characters at the last successful submission
    pub last_submitted_input_length: usize,
    pub(crate) copy_feedback_until: Option<Instant>,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            output_text: String::new(),
            status: RequestStatus::Idle,
            auto_clear_enabled: true,
            last_submitted_input_length: 0,
            copy_feedback_until: None,
        }
    }
}

impl ClientSession {
    pub fn copy_feedback_active(&self) -> bool {
        self.copy_feedback_until
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn reduction_percentage(&self) -> Option<f64> {
        reduction_percentage(
            self.last_submitted_input_length,
            self.output_text.chars().count(),
        )
    }

    pub fn input_chars(&self) -> usize {
        self.input_text.chars().count()
    }

    pub fn output_chars(&self) -> usize {
        self.output_text.chars().count()
    }
}

/// Transient user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    EmptyPrompt,
    OptimizeFailed,
    Copied,
    CopyFailed,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Copied => "Copied!",
            _ => "Error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::EmptyPrompt => "Please enter a prompt to optimize.",
            Notice::OptimizeFailed => "Failed to optimize prompt. Please try again.",
            Notice::Copied => "Optimized prompt copied to clipboard.",
            Notice::CopyFailed => "Failed to copy to clipboard.",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Copied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// Input was blank; nothing was sent
    EmptyInput,
    /// A request is already in flight; nothing was sent
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
    NothingToCopy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Submitted(SubmitOutcome),
    Edited,
    Ignored,
}

/// Platform-modifier + Enter
pub fn is_submit_chord(key: &KeyEvent) -> bool {
    key.code == KeyCode::Enter
        && key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

pub struct ClientController {
    backend: Arc<dyn OptimizerBackend>,
    clipboard: Mutex<Box<dyn Clipboard>>,
    session: Mutex<ClientSession>,
    notices: Mutex<VecDeque<Notice>>,
}

impl ClientController {
    pub fn new(backend: Arc<dyn OptimizerBackend>, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            backend,
            clipboard: Mutex::new(clipboard),
            session: Mutex::new(ClientSession::default()),
            notices: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_auto_clear(self, enabled: bool) -> Self {
        self.set_auto_clear(enabled);
        self
    }

    // Every session update is a plain field write; a poisoned lock still holds a valid session
    fn session(&self) -> MutexGuard<'_, ClientSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, notice: Notice) {
        debug!(?notice, "Notice");
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(notice);
    }

    /// Drain notices emitted since the last call
    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn snapshot(&self) -> ClientSession {
        self.session().clone()
    }

    pub fn status(&self) -> RequestStatus {
        self.session().status
    }

    pub fn reduction_percentage(&self) -> Option<f64> {
        self.session().reduction_percentage()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.session().input_text = text.into();
    }

    /// Append pasted text to the input
    pub fn append_input(&self, text: &str) {
        self.session().input_text.push_str(text);
    }

    pub fn clear_input(&self) {
        self.session().input_text.clear();
    }

    pub fn set_auto_clear(&self, enabled: bool) {
        self.session().auto_clear_enabled = enabled;
    }

    /// Flip auto-clear and return the new value
    pub fn toggle_auto_clear(&self) -> bool {
        let mut session = self.session();
        session.auto_clear_enabled = !session.auto_clear_enabled;
        session.auto_clear_enabled
    }

    /// Send the current input for optimization.
    ///
    /// The session lock is released before awaiting the backend; the Pending
    /// status alone keeps a second submit from issuing another request.
    pub async fn submit(&self) -> SubmitOutcome {
        let prompt = {
            let mut session = self.session();
            if session.status == RequestStatus::Pending {
                return SubmitOutcome::Busy;
            }
            if session.input_text.trim().is_empty() {
                drop(session);
                self.notify(Notice::EmptyPrompt);
                return SubmitOutcome::EmptyInput;
            }
            session.status = RequestStatus::Pending;
            session.input_text.clone()
        };
        let submitted_chars = prompt.chars().count();

        match self.backend.optimize(&prompt).await {
            Ok(output) => {
                let mut session = self.session();
                session.output_text = output;
                session.last_submitted_input_length = submitted_chars;
                if session.auto_clear_enabled {
                    session.input_text.clear();
                }
                session.status = RequestStatus::Succeeded;
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                warn!("Optimize request failed: {}", e);
                self.session().status = RequestStatus::Failed;
                self.notify(Notice::OptimizeFailed);
                SubmitOutcome::Failed
            }
        }
    }

    /// Copy the current output to the clipboard
    pub fn copy_output(&self) -> CopyOutcome {
        let output = self.session().output_text.clone();
        if output.is_empty() {
            return CopyOutcome::NothingToCopy;
        }

        let written = self
            .clipboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_text(&output);

        match written {
            Ok(()) => {
                self.session().copy_feedback_until = Some(Instant::now() + COPY_FEEDBACK_WINDOW);
                self.notify(Notice::Copied);
                CopyOutcome::Copied
            }
            Err(e) => {
                warn!("{}", e);
                self.notify(Notice::CopyFailed);
                CopyOutcome::Failed
            }
        }
    }

    /// Apply a key press from the input area.
    ///
    /// The submit chord is consumed and never inserted as a newline.
    pub async fn handle_key(&self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Ignored;
        }
        if is_submit_chord(&key) {
            return KeyOutcome::Submitted(self.submit().await);
        }

        let typing = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);
        let mut session = self.session();
        match key.code {
            KeyCode::Char(c) if typing => session.input_text.push(c),
            KeyCode::Enter => session.input_text.push('\n'),
            KeyCode::Tab => session.input_text.push('\t'),
            KeyCode::Backspace => {
                if session.input_text.pop().is_none() {
                    return KeyOutcome::Ignored;
                }
            }
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Edited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct StubBackend {
        reply: Option<String>,
        calls: AtomicUsize,
        gate: Option<Notify>,
    }

    impl StubBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
                gate: Some(Notify::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OptimizerBackend for StubBackend {
        async fn optimize(&self, _prompt: &str) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply.clone().ok_or(BackendError::Status {
                status: 500,
                message: "Failed to optimize prompt".to_string(),
            })
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Write("denied".to_string()))
        }
    }

    fn controller(backend: Arc<StubBackend>) -> ClientController {
        ClientController::new(backend, Box::new(MemoryClipboard::new()))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_new_session_defaults() {
        let session = ClientSession::default();
        assert_eq!(session.status, RequestStatus::Idle);
        assert!(session.auto_clear_enabled);
        assert_eq!(session.last_submitted_input_length, 0);
        assert!(!session.copy_feedback_active());
        assert_eq!(session.reduction_percentage(), None);
    }

    #[tokio::test]
    async fn test_whitespace_input_stays_idle_without_request() {
        let backend = StubBackend::replying("unused");
        let controller = controller(backend.clone());
        controller.set_input("   ");

        assert_eq!(controller.submit().await, SubmitOutcome::EmptyInput);
        assert_eq!(controller.status(), RequestStatus::Idle);
        assert_eq!(backend.calls(), 0);
        assert_eq!(controller.take_notices(), vec![Notice::EmptyPrompt]);
    }

    #[tokio::test]
    async fn test_success_stores_output_and_clears_input() {
        let input = "Could you please reduce this prompt by approximately eight times?";
        let backend = StubBackend::replying("reduce prompt ~8x");
        let controller = controller(backend.clone());
        controller.set_input(input);

        assert_eq!(controller.submit().await, SubmitOutcome::Succeeded);

        let session = controller.snapshot();
        assert_eq!(session.status, RequestStatus::Succeeded);
        assert_eq!(session.output_text, "reduce prompt ~8x");
        assert_eq!(session.input_text, "");
        assert_eq!(session.last_submitted_input_length, input.len());
        assert_eq!(
            controller.reduction_percentage(),
            reduction_percentage(input.len(), "reduce prompt ~8x".len())
        );
        // 65 -> 17 characters
        assert_eq!(controller.reduction_percentage(), Some(73.8));
        assert!(controller.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_success_keeps_input_when_auto_clear_disabled() {
        let controller = controller(StubBackend::replying("short")).with_auto_clear(false);
        controller.set_input("a much longer prompt");

        controller.submit().await;

        let session = controller.snapshot();
        assert_eq!(session.input_text, "a much longer prompt");
        assert_eq!(session.output_text, "short");
    }

    #[tokio::test]
    async fn test_failure_preserves_input_and_notifies() {
        let controller = controller(StubBackend::failing());
        controller.set_input("keep me");

        assert_eq!(controller.submit().await, SubmitOutcome::Failed);

        let session = controller.snapshot();
        assert_eq!(session.status, RequestStatus::Failed);
        assert_eq!(session.input_text, "keep me");
        assert_eq!(session.output_text, "");
        assert_eq!(controller.take_notices(), vec![Notice::OptimizeFailed]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_output() {
        let backend = StubBackend::replying("first");
        let controller = controller(backend);
        controller.set_input("prompt one");
        controller.submit().await;

        let failing = ClientController {
            backend: StubBackend::failing(),
            ..controller
        };
        failing.set_input("prompt two");
        failing.submit().await;

        let session = failing.snapshot();
        assert_eq!(session.status, RequestStatus::Failed);
        assert_eq!(session.output_text, "first");
        assert_eq!(session.last_submitted_input_length, "prompt one".len());
    }

    #[tokio::test]
    async fn test_resubmit_after_success_starts_new_cycle() {
        let backend = StubBackend::replying("out");
        let controller = controller(backend.clone()).with_auto_clear(false);
        controller.set_input("first prompt");
        controller.submit().await;
        controller.set_input("second, longer prompt");

        assert_eq!(controller.submit().await, SubmitOutcome::Succeeded);
        assert_eq!(backend.calls(), 2);
        assert_eq!(
            controller.snapshot().last_submitted_input_length,
            "second, longer prompt".len()
        );
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_ignored() {
        let backend = StubBackend::gated("done");
        let controller = Arc::new(controller(backend.clone()));
        controller.set_input("a prompt");

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        while controller.status() != RequestStatus::Pending {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.submit().await, SubmitOutcome::Busy);
        assert_eq!(
            controller.handle_key(key(KeyCode::Enter, KeyModifiers::CONTROL)).await,
            KeyOutcome::Submitted(SubmitOutcome::Busy)
        );

        if let Some(gate) = &backend.gate {
            gate.notify_one();
        }
        assert_eq!(first.await.unwrap(), SubmitOutcome::Succeeded);
        assert_eq!(backend.calls(), 1);
        assert_eq!(controller.status(), RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_previous_output_visible_while_next_cycle_pending() {
        let controller = controller(StubBackend::replying("first")).with_auto_clear(false);
        controller.set_input("prompt one");
        controller.submit().await;

        let gated = StubBackend::gated("second");
        let controller = Arc::new(ClientController {
            backend: gated.clone(),
            ..controller
        });
        controller.set_input("prompt two, longer");

        let next = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        while controller.status() != RequestStatus::Pending {
            tokio::task::yield_now().await;
        }

        let pending = controller.snapshot();
        assert_eq!(pending.output_text, "first");
        assert_eq!(pending.last_submitted_input_length, "prompt one".len());

        if let Some(gate) = &gated.gate {
            gate.notify_one();
        }
        assert_eq!(next.await.unwrap(), SubmitOutcome::Succeeded);
        assert_eq!(controller.snapshot().output_text, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_feedback_lasts_two_seconds() {
        let controller = controller(StubBackend::replying("copied text"));
        controller.set_input("some prompt");
        controller.submit().await;
        controller.take_notices();

        assert_eq!(controller.copy_output(), CopyOutcome::Copied);
        assert!(controller.snapshot().copy_feedback_active());
        assert_eq!(controller.take_notices(), vec![Notice::Copied]);
        assert_eq!(controller.status(), RequestStatus::Succeeded);

        tokio::time::advance(Duration::from_millis(1900)).await;
        assert!(controller.snapshot().copy_feedback_active());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(!controller.snapshot().copy_feedback_active());
    }

    #[tokio::test]
    async fn test_copy_failure_notifies_without_feedback() {
        let controller = ClientController::new(
            StubBackend::replying("text"),
            Box::new(BrokenClipboard),
        );
        controller.set_input("prompt");
        controller.submit().await;

        assert_eq!(controller.copy_output(), CopyOutcome::Failed);
        assert!(!controller.snapshot().copy_feedback_active());
        assert_eq!(controller.take_notices(), vec![Notice::CopyFailed]);
        assert_eq!(controller.status(), RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_copy_without_system_clipboard_fails() {
        let controller = ClientController::new(
            StubBackend::replying("text"),
            Box::new(super::clipboard::tests::unreachable_system_clipboard()),
        );
        controller.set_input("prompt");
        controller.submit().await;

        assert_eq!(controller.copy_output(), CopyOutcome::Failed);
        assert!(!controller.snapshot().copy_feedback_active());
        assert_eq!(controller.take_notices(), vec![Notice::CopyFailed]);
    }

    #[test]
    fn test_copy_with_no_output() {
        let controller = controller(StubBackend::replying("x"));
        assert_eq!(controller.copy_output(), CopyOutcome::NothingToCopy);
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn test_submit_chord_detection() {
        assert!(is_submit_chord(&key(KeyCode::Enter, KeyModifiers::CONTROL)));
        assert!(is_submit_chord(&key(KeyCode::Enter, KeyModifiers::SUPER)));
        assert!(!is_submit_chord(&key(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!is_submit_chord(&key(KeyCode::Char('j'), KeyModifiers::CONTROL)));
    }

    #[tokio::test]
    async fn test_keys_edit_input_and_chord_submits() {
        let backend = StubBackend::replying("hi");
        let controller = controller(backend.clone());

        for c in "hey".chars() {
            controller.handle_key(key(KeyCode::Char(c), KeyModifiers::NONE)).await;
        }
        controller.handle_key(key(KeyCode::Enter, KeyModifiers::NONE)).await;
        controller.handle_key(key(KeyCode::Char('x'), KeyModifiers::SHIFT)).await;
        controller.handle_key(key(KeyCode::Backspace, KeyModifiers::NONE)).await;
        assert_eq!(
            controller.handle_key(key(KeyCode::Char('y'), KeyModifiers::CONTROL)).await,
            KeyOutcome::Ignored
        );
        assert_eq!(controller.snapshot().input_text, "hey\n");

        let outcome = controller
            .handle_key(key(KeyCode::Enter, KeyModifiers::CONTROL))
            .await;
        assert_eq!(outcome, KeyOutcome::Submitted(SubmitOutcome::Succeeded));
        assert_eq!(backend.calls(), 1);
        assert_eq!(controller.snapshot().output_text, "hi");
    }

    #[test]
    fn test_toggle_auto_clear() {
        let controller = controller(StubBackend::replying("x"));
        assert!(!controller.toggle_auto_clear());
        assert!(controller.toggle_auto_clear());
    }
}
