//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! transcript, drives the reveal engine, and orchestrates session start,
//! turns, reset, and logout against a [`Backend`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::Backend;
use crate::error::Result;
use crate::observability::{SESSION_FALLBACKS, SESSION_RESETS, SESSION_STARTS, SESSION_TURNS};
use crate::render::Renderer;
use crate::reveal::{RevealPolicy, RevealTask};
use crate::store::SessionStore;
use crate::types::{Message, Transcript};

/// Greeting shown when the backend cannot produce one.
pub const DEFAULT_GREETING: &str = "Hello, how are you feeling today?";

/// Apology appended when a turn fails. Shown in full immediately; animating
/// an error would be misleading.
pub const TURN_APOLOGY: &str =
    "I apologize, but I encountered an issue processing your message. Could you try again?";

/// How long to let the backend settle after a reset before restarting.
const RESET_GRACE: Duration = Duration::from_millis(300);

/// Lifecycle of a chat session.
///
/// `Ready` is the only state that accepts user input; every other state gates
/// submission and reset so transcript mutation and backend calls never
/// overlap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No conversation yet, or logged out.
    Idle,
    /// Waiting on the backend for the opening greeting.
    Initiating,
    /// An assistant message is being revealed.
    AwaitingReveal,
    /// Waiting for user input.
    Ready,
    /// Waiting on the backend for a turn reply.
    SendingTurn,
    /// Tearing down for a fresh session.
    Resetting,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The current lifecycle state.
    pub state: SessionState,
    /// The number of messages in the transcript.
    pub message_count: usize,
    /// User turns submitted this session.
    pub turns: u64,
    /// Resets performed this session.
    pub resets: u64,
    /// Whether a token is currently stored.
    pub authenticated: bool,
}

/// A chat session that owns the transcript and drives the reveal engine.
///
/// The session holds at most one reveal task at a time; starting a new reveal
/// cancels any prior one unconditionally.
pub struct ChatSession<B: Backend> {
    backend: B,
    store: SessionStore,
    transcript: Arc<Mutex<Transcript>>,
    state: SessionState,
    reveal: Option<RevealTask>,
    policy: RevealPolicy,
    turns: u64,
    resets: u64,
}

impl<B: Backend> ChatSession<B> {
    /// Creates a new session with the default reveal policy.
    pub fn new(backend: B, store: SessionStore) -> Self {
        Self::with_policy(backend, store, RevealPolicy::default())
    }

    /// Creates a new session with a custom reveal policy.
    pub fn with_policy(backend: B, store: SessionStore, policy: RevealPolicy) -> Self {
        Self {
            backend,
            store,
            transcript: Arc::new(Mutex::new(Transcript::new())),
            state: SessionState::Idle,
            reveal: None,
            policy,
            turns: 0,
            resets: 0,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// A handle to the transcript for rendering.
    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }

    /// The number of messages in the transcript.
    pub fn message_count(&self) -> usize {
        self.transcript.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Returns true while a reveal is incomplete or a backend call is
    /// outstanding. Submission and reset are rejected while busy.
    pub fn is_busy(&self) -> bool {
        if matches!(
            self.state,
            SessionState::Initiating | SessionState::SendingTurn | SessionState::Resetting
        ) {
            return true;
        }
        if self.state == SessionState::AwaitingReveal {
            return true;
        }
        self.reveal
            .as_ref()
            .is_some_and(|task| !task.is_complete() && !task.is_cancelled())
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            state: self.state,
            message_count: self.message_count(),
            turns: self.turns,
            resets: self.resets,
            authenticated: self.store.load().is_authenticated(),
        }
    }

    /// Start a fresh conversation: request the opening greeting and reveal it.
    ///
    /// On `Unauthorized` the session forces a logout and propagates the error
    /// so the view can return to the login screen. Any other failure is
    /// absorbed into the fixed default greeting so the transcript is never
    /// empty.
    pub async fn start(
        &mut self,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Result<()> {
        if self.state != SessionState::Idle || self.is_busy() {
            return Ok(());
        }
        self.state = SessionState::Initiating;
        SESSION_STARTS.click();

        match self.backend.start_session().await {
            Ok(greeting) => {
                let index = self.append(Message::assistant(greeting));
                self.reveal_and_wait(index, renderer, &interrupted).await;
                Ok(())
            }
            Err(err) if err.is_unauthorized() => {
                self.force_logout().await;
                Err(err)
            }
            Err(_) => {
                SESSION_FALLBACKS.click();
                self.append(Message::assistant_revealed(DEFAULT_GREETING));
                renderer.print_text(DEFAULT_GREETING);
                renderer.finish_response();
                self.state = SessionState::Ready;
                Ok(())
            }
        }
    }

    /// Submit one user turn.
    ///
    /// Blank input, or input while the session is not `Ready`, is a no-op.
    /// The user message lands in the transcript immediately; the reply is
    /// revealed incrementally. A failed turn appends the fixed apology in
    /// full, and a 401 additionally forces a logout.
    pub async fn submit_user_text(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Result<()> {
        let text = text.trim();
        if text.is_empty() || self.state != SessionState::Ready || self.is_busy() {
            return Ok(());
        }

        self.append(Message::user(text));
        self.state = SessionState::SendingTurn;
        self.turns += 1;
        SESSION_TURNS.click();

        match self.backend.send_turn(text).await {
            Ok(reply) => {
                let index = self.append(Message::assistant(reply));
                self.reveal_and_wait(index, renderer, &interrupted).await;
                Ok(())
            }
            Err(err) => {
                SESSION_FALLBACKS.click();
                self.append(Message::assistant_revealed(TURN_APOLOGY));
                renderer.print_text(TURN_APOLOGY);
                renderer.finish_response();
                if err.is_unauthorized() {
                    self.force_logout().await;
                    return Err(err);
                }
                self.state = SessionState::Ready;
                Ok(())
            }
        }
    }

    /// Discard the conversation and start over.
    ///
    /// Ignored while a reveal is incomplete or a backend call is outstanding;
    /// returns `Ok(false)` in that case. The transcript clears immediately
    /// for responsive UX, the backend reset is tolerated failing, and after a
    /// short grace period a fresh session starts, retried once for transient
    /// failures. `Unauthorized` during the restart propagates so the caller
    /// returns to login.
    pub async fn reset(
        &mut self,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Result<bool> {
        if self.state != SessionState::Ready || self.is_busy() {
            return Ok(false);
        }
        self.resets += 1;
        SESSION_RESETS.click();

        if let Some(task) = self.reveal.take() {
            task.cancel();
        }
        self.clear_transcript();
        self.state = SessionState::Resetting;

        // Server-side reset failure is non-fatal; we re-initiate regardless.
        let _ = self.backend.reset_session().await;
        tokio::time::sleep(RESET_GRACE).await;

        self.state = SessionState::Idle;
        match self.start(renderer, Arc::clone(&interrupted)).await {
            Ok(()) => Ok(true),
            // Session expiry is not a reset outcome the caller can ignore:
            // the logout already happened, so surface it.
            Err(err) if err.is_unauthorized() => Err(err),
            Err(_) => {
                let _ = self.start(renderer, interrupted).await;
                Ok(true)
            }
        }
    }

    /// Log out: cancel any reveal, tell the backend best-effort, and clear
    /// local state. Local clearing succeeds regardless of backend
    /// reachability.
    pub async fn logout(&mut self) {
        self.force_logout().await;
    }

    async fn force_logout(&mut self) {
        if let Some(task) = self.reveal.take() {
            task.cancel();
        }
        let _ = self.backend.logout().await;
        // The stale token must not outlive the session it belonged to.
        self.backend.clear_auth();
        self.store.clear();
        self.clear_transcript();
        self.state = SessionState::Idle;
    }

    fn append(&mut self, message: Message) -> usize {
        match self.transcript.lock() {
            Ok(mut transcript) => transcript.push(message),
            Err(_) => 0,
        }
    }

    fn clear_transcript(&mut self) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.clear();
        }
    }

    /// Reveal the message at `index`, forwarding each chunk to the renderer.
    ///
    /// Drives the reveal to completion (or cancellation via the interrupt
    /// flag) before returning, so at most one task is ever live.
    async fn reveal_and_wait(
        &mut self,
        index: usize,
        renderer: &mut dyn Renderer,
        interrupted: &AtomicBool,
    ) {
        self.state = SessionState::AwaitingReveal;
        if let Some(prior) = self.reveal.take() {
            prior.cancel();
        }

        let (task, mut rx) =
            RevealTask::spawn(Arc::clone(&self.transcript), index, self.policy.clone());
        self.reveal = Some(task);

        while let Some(delta) = rx.recv().await {
            if interrupted.load(Ordering::Relaxed) {
                if let Some(task) = &self.reveal {
                    task.cancel();
                }
                renderer.print_interrupted();
                break;
            }
            renderer.print_text(&delta);
        }

        if let Some(mut task) = self.reveal.take() {
            task.wait().await;
            if task.is_complete() {
                renderer.finish_response();
            }
        }
        self.state = SessionState::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Backend;
    use crate::error::Error;
    use crate::types::{MessageRole, Session, UserProfile};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// Renderer that collects everything it is asked to print.
    #[derive(Default)]
    struct CollectingRenderer {
        text: String,
        errors: Vec<String>,
        infos: Vec<String>,
        finished: usize,
        interrupted: usize,
    }

    impl Renderer for CollectingRenderer {
        fn print_text(&mut self, text: &str) {
            self.text.push_str(text);
        }

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn print_info(&mut self, info: &str) {
            self.infos.push(info.to_string());
        }

        fn print_meta(&mut self, _meta: &str) {}

        fn finish_response(&mut self) {
            self.finished += 1;
        }

        fn print_interrupted(&mut self) {
            self.interrupted += 1;
        }
    }

    /// Backend whose responses are scripted up front.
    ///
    /// Greetings are consumed in order; the last one repeats for any further
    /// session starts.
    struct ScriptedBackend {
        greetings: Mutex<VecDeque<crate::error::Result<String>>>,
        replies: Mutex<VecDeque<crate::error::Result<String>>>,
        starts: AtomicUsize,
        resets: AtomicUsize,
        logouts: AtomicUsize,
        notifies: AtomicUsize,
        auth_clears: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(greeting: crate::error::Result<String>) -> Self {
            Self {
                greetings: Mutex::new(VecDeque::from([greeting])),
                replies: Mutex::new(VecDeque::new()),
                starts: AtomicUsize::new(0),
                resets: AtomicUsize::new(0),
                logouts: AtomicUsize::new(0),
                notifies: AtomicUsize::new(0),
                auth_clears: AtomicUsize::new(0),
            }
        }

        fn greeting_ok(text: &str) -> Self {
            Self::new(Ok(text.to_string()))
        }

        fn then_greeting(self, greeting: crate::error::Result<String>) -> Self {
            self.greetings.lock().unwrap().push_back(greeting);
            self
        }

        fn with_reply(self, reply: crate::error::Result<String>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }
    }

    #[async_trait::async_trait]
    impl Backend for ScriptedBackend {
        async fn start_session(&self) -> crate::error::Result<String> {
            self.starts.fetch_add(1, Ordering::Relaxed);
            let mut greetings = self.greetings.lock().unwrap();
            if greetings.len() > 1 {
                greetings.pop_front().unwrap()
            } else {
                greetings
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Err(Error::unavailable("no scripted greeting", None)))
            }
        }

        async fn send_turn(&self, _text: &str) -> crate::error::Result<String> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::unavailable("no scripted reply", None)))
        }

        async fn reset_session(&self) -> crate::error::Result<()> {
            self.resets.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn notify_login(&self) -> crate::error::Result<()> {
            self.notifies.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn logout(&self) -> crate::error::Result<()> {
            self.logouts.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn clear_auth(&mut self) {
            self.auth_clears.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn scratch_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir()
            .join("caremind-session-tests")
            .join(format!("{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        SessionStore::new(path)
    }

    fn not_interrupted() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[tokio::test(start_paused = true)]
    async fn start_reveals_the_greeting() {
        let backend = ScriptedBackend::greeting_ok("Welcome back. How are you feeling?");
        let mut session = ChatSession::new(backend, scratch_store("start"));
        let mut renderer = CollectingRenderer::default();

        assert_eq!(session.state(), SessionState::Idle);
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.message_count(), 1);
        assert_eq!(renderer.text, "Welcome back. How are you feeling?");
        assert_eq!(renderer.finished, 1);

        let transcript = session.transcript();
        let guard = transcript.lock().unwrap();
        let greeting = guard.message(0).unwrap();
        assert_eq!(greeting.role, MessageRole::Assistant);
        assert!(greeting.is_fully_revealed());
    }

    #[tokio::test(start_paused = true)]
    async fn start_falls_back_when_backend_unavailable() {
        let backend = ScriptedBackend::new(Err(Error::unavailable("timed out", None)));
        let mut session = ChatSession::new(backend, scratch_store("fallback"));
        let mut renderer = CollectingRenderer::default();

        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        let transcript = session.transcript();
        let guard = transcript.lock().unwrap();
        let greeting = guard.message(0).unwrap();
        assert_eq!(greeting.full_text, DEFAULT_GREETING);
        assert!(greeting.is_fully_revealed());
    }

    #[tokio::test(start_paused = true)]
    async fn start_unauthorized_forces_logout() {
        let backend = ScriptedBackend::new(Err(Error::unauthorized("token expired")));
        let store = scratch_store("start-401");
        store.save(&Session::new("tok", UserProfile::new("a@b.c", None)));
        let mut session = ChatSession::new(backend, store.clone());
        let mut renderer = CollectingRenderer::default();

        let err = session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(store.load(), Session::empty());
        assert_eq!(session.backend.logouts.load(Ordering::Relaxed), 1);
        assert_eq!(session.backend.auth_clears.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_submissions_change_nothing() {
        let backend = ScriptedBackend::greeting_ok("hi");
        let mut session = ChatSession::new(backend, scratch_store("blank"));
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();
        let before = session.message_count();

        session
            .submit_user_text("", &mut renderer, not_interrupted())
            .await
            .unwrap();
        session
            .submit_user_text("   ", &mut renderer, not_interrupted())
            .await
            .unwrap();

        assert_eq!(session.message_count(), before);
        assert_eq!(session.stats().turns, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_requires_ready_state() {
        let backend = ScriptedBackend::greeting_ok("hi");
        let mut session = ChatSession::new(backend, scratch_store("not-ready"));
        let mut renderer = CollectingRenderer::default();

        // Never started: Idle rejects input.
        session
            .submit_user_text("hello?", &mut renderer, not_interrupted())
            .await
            .unwrap();
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn a_turn_appends_user_then_assistant() {
        let backend = ScriptedBackend::greeting_ok("hi")
            .with_reply(Ok("That sounds hard. Tell me more.".to_string()));
        let mut session = ChatSession::new(backend, scratch_store("turn"));
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        session
            .submit_user_text("I had a rough day", &mut renderer, not_interrupted())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        let transcript = session.transcript();
        let guard = transcript.lock().unwrap();
        assert_eq!(guard.len(), 3);
        let user = guard.message(1).unwrap();
        assert_eq!(user.role, MessageRole::User);
        assert!(user.is_fully_revealed());
        let reply = guard.message(2).unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.full_text, "That sounds hard. Tell me more.");
        assert!(reply.is_fully_revealed());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_turn_appends_the_apology_in_full() {
        let backend = ScriptedBackend::greeting_ok("hi")
            .with_reply(Err(Error::unavailable("timed out after 45s", None)));
        let mut session = ChatSession::new(backend, scratch_store("apology"));
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        session
            .submit_user_text("are you there?", &mut renderer, not_interrupted())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        let transcript = session.transcript();
        let guard = transcript.lock().unwrap();
        let apology = guard.last().unwrap();
        assert_eq!(apology.full_text, TURN_APOLOGY);
        // No reveal for failures: visible immediately upon insertion.
        assert!(apology.is_fully_revealed());
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_turn_forces_logout() {
        let backend =
            ScriptedBackend::greeting_ok("hi").with_reply(Err(Error::unauthorized("expired")));
        let store = scratch_store("turn-401");
        store.save(&Session::new("tok", UserProfile::new("a@b.c", None)));
        let mut session = ChatSession::new(backend, store.clone());
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        let err = session
            .submit_user_text("hello", &mut renderer, not_interrupted())
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(store.load(), Session::empty());
        assert_eq!(session.backend.logouts.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_is_ignored_while_busy() {
        let backend = ScriptedBackend::greeting_ok("hi");
        let mut session = ChatSession::new(backend, scratch_store("reset-busy"));
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();
        let before = session.message_count();

        session.state = SessionState::SendingTurn;
        let performed = session
            .reset(&mut renderer, not_interrupted())
            .await
            .unwrap();
        assert!(!performed);
        assert_eq!(session.message_count(), before);
        assert_eq!(session.backend.resets.load(Ordering::Relaxed), 0);
        session.state = SessionState::Ready;
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_and_restarts() {
        let backend = ScriptedBackend::greeting_ok("fresh greeting")
            .with_reply(Ok("first reply".to_string()));
        let mut session = ChatSession::new(backend, scratch_store("reset"));
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();
        session
            .submit_user_text("hello", &mut renderer, not_interrupted())
            .await
            .unwrap();
        assert_eq!(session.message_count(), 3);

        let performed = session
            .reset(&mut renderer, not_interrupted())
            .await
            .unwrap();

        assert!(performed);
        assert_eq!(session.backend.resets.load(Ordering::Relaxed), 1);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.message_count(), 1);
        let transcript = session.transcript();
        let guard = transcript.lock().unwrap();
        assert_eq!(guard.message(0).unwrap().full_text, "fresh greeting");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_surfaces_session_expiry() {
        let backend = ScriptedBackend::greeting_ok("hi")
            .then_greeting(Err(Error::unauthorized("token expired")));
        let store = scratch_store("reset-401");
        store.save(&Session::new("tok", UserProfile::new("a@b.c", None)));
        let mut session = ChatSession::new(backend, store.clone());
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        let err = session
            .reset(&mut renderer, not_interrupted())
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(store.load(), Session::empty());
        // One initial start plus the single restart attempt; expiry is not
        // blindly retried.
        assert_eq!(session.backend.starts.load(Ordering::Relaxed), 2);
        assert_eq!(session.backend.logouts.load(Ordering::Relaxed), 1);
        assert_eq!(session.backend.auth_clears.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_reveal_cancels_the_prior_one() {
        let backend = ScriptedBackend::greeting_ok("hi");
        let mut session = ChatSession::new(backend, scratch_store("cancel-prior"));
        let mut renderer = CollectingRenderer::default();

        let long_text = "x".repeat(2000);
        let first = session.append(Message::assistant(long_text.clone()));
        let (task, _first_rx) =
            RevealTask::spawn(session.transcript(), first, RevealPolicy::default());
        session.reveal = Some(task);
        // Let the first reveal make some progress.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let second = session.append(Message::assistant("short reply"));
        let flag = AtomicBool::new(false);
        session.reveal_and_wait(second, &mut renderer, &flag).await;

        let transcript = session.transcript();
        {
            let guard = transcript.lock().unwrap();
            assert!(guard.message(second).unwrap().is_fully_revealed());
            let frozen = guard.message(first).unwrap().visible_text.clone();
            assert!(long_text.starts_with(&frozen));
            assert_ne!(frozen, long_text);
        }

        // The first task applies no further mutation after being displaced.
        let frozen = transcript
            .lock()
            .unwrap()
            .message(first)
            .unwrap()
            .visible_text
            .clone();
        tokio::time::sleep(Duration::from_secs(2)).await;
        let after = transcript
            .lock()
            .unwrap()
            .message(first)
            .unwrap()
            .visible_text
            .clone();
        assert_eq!(frozen, after, "displaced reveal mutated the transcript");
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_local_state() {
        let backend = ScriptedBackend::greeting_ok("hi");
        let store = scratch_store("logout");
        store.save(&Session::new("tok", UserProfile::new("a@b.c", None)));
        let mut session = ChatSession::new(backend, store.clone());
        let mut renderer = CollectingRenderer::default();
        session
            .start(&mut renderer, not_interrupted())
            .await
            .unwrap();

        session.logout().await;

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.message_count(), 0);
        assert_eq!(store.load(), Session::empty());
        assert_eq!(session.backend.logouts.load(Ordering::Relaxed), 1);
        assert_eq!(session.backend.auth_clears.load(Ordering::Relaxed), 1);
    }
}
