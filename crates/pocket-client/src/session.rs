//! The conversation session: transcript plus the single in-flight command.
//!
//! A session is a two-state machine:
//!
//! ```text
//!            submit(valid text)
//!   Idle  ───────────────────────▶  Awaiting
//!    ▲                                 │
//!    └──── resolve(success|failure) ◀──┘
//! ```
//!
//! The synchronous half of a submit ([`ConversationSession::submit`]) appends
//! the user message and hands back a [`PendingCommand`]. The caller performs
//! the request however it likes (awaiting inline, or on a spawned task whose
//! result comes back over a channel) and feeds the outcome to
//! [`ConversationSession::resolve`]. Nothing here locks: the one-in-flight
//! rule is the state itself.

use tracing::{debug, warn};

use crate::backend::AssistantBackend;
use crate::config::DEFAULT_GREETING;
use crate::error::Result;
use crate::types::{CommandResponse, Message};

/// Whether a command request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No command outstanding; submits are accepted.
    #[default]
    Idle,
    /// One command sent and not yet resolved; submits are skipped.
    Awaiting,
}

/// A command the caller must now send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    /// Sequence number; `resolve` ignores outcomes for any other id.
    pub id: u64,
    /// Trimmed text to send.
    pub text: String,
}

/// Why a submit did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Input was empty after trimming.
    EmptyInput,
    /// A request is already in flight.
    RequestInFlight,
}

/// Result of [`ConversationSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// User message appended; the command must be sent.
    Sent(PendingCommand),
    /// Nothing changed.
    Skipped(SkipReason),
}

impl SubmitOutcome {
    /// The command to send, if any.
    pub fn into_pending(self) -> Option<PendingCommand> {
        match self {
            SubmitOutcome::Sent(pending) => Some(pending),
            SubmitOutcome::Skipped(_) => None,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent(_))
    }
}

/// Read-only view of a session for renderers.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub transcript: &'a [Message],
    pub pending_input: &'a str,
    pub request_in_flight: bool,
}

/// Owns the transcript, the draft and the in-flight flag.
#[derive(Debug)]
pub struct ConversationSession {
    transcript: Vec<Message>,
    pending_input: String,
    state: SessionState,
    in_flight_id: Option<u64>,
    next_id: u64,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// Start a session seeded with the default greeting.
    pub fn new() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }

    /// Start a session seeded with a custom greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            transcript: vec![Message::assistant(greeting)],
            pending_input: String::new(),
            state: SessionState::Idle,
            in_flight_id: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_awaiting(&self) -> bool {
        self.state == SessionState::Awaiting
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            transcript: &self.transcript,
            pending_input: &self.pending_input,
            request_in_flight: self.is_awaiting(),
        }
    }

    /// Replace the draft. Allowed in any state.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Append one character to the draft.
    pub fn push_draft_char(&mut self, c: char) {
        self.pending_input.push(c);
    }

    /// Remove the last character of the draft.
    pub fn pop_draft_char(&mut self) {
        self.pending_input.pop();
    }

    /// Idle → Awaiting.
    ///
    /// Appends the user message, clears the draft and returns the command to
    /// send. Empty input and submits while awaiting leave everything as is.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring empty submit");
            return SubmitOutcome::Skipped(SkipReason::EmptyInput);
        }
        if self.is_awaiting() {
            debug!("ignoring submit while a command is in flight");
            return SubmitOutcome::Skipped(SkipReason::RequestInFlight);
        }

        self.transcript.push(Message::user(text));
        self.pending_input.clear();
        self.state = SessionState::Awaiting;

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight_id = Some(id);

        debug!(command_id = id, "command submitted");
        SubmitOutcome::Sent(PendingCommand {
            id,
            text: text.to_string(),
        })
    }

    /// Submit whatever is in the draft.
    pub fn submit_draft(&mut self) -> SubmitOutcome {
        let draft = std::mem::take(&mut self.pending_input);
        let outcome = self.submit(&draft);
        if !outcome.is_sent() {
            self.pending_input = draft;
        }
        outcome
    }

    /// Awaiting → Idle.
    ///
    /// Appends exactly one assistant message for the command `id`. Returns
    /// false, changing nothing, if `id` is not the command in flight.
    pub fn resolve(&mut self, id: u64, outcome: Result<CommandResponse>) -> bool {
        if self.in_flight_id != Some(id) {
            warn!(command_id = id, "dropping outcome for a command that is not in flight");
            return false;
        }

        let message = match outcome {
            Ok(response) => {
                debug!(
                    command_id = id,
                    intent = response.intent.as_ref().map(|i| i.kind.as_str()),
                    "command succeeded"
                );
                Message::from_response(response)
            }
            Err(e) => {
                warn!(
                    command_id = id,
                    error = %e,
                    network = e.is_network_error(),
                    backend_fault = e.is_backend_fault(),
                    "command failed"
                );
                Message::command_error()
            }
        };

        self.transcript.push(message);
        self.in_flight_id = None;
        self.state = SessionState::Idle;
        true
    }

    /// Submit, send through `backend`, and resolve, in one call.
    ///
    /// Returns the assistant reply, or `None` if the submit was skipped.
    pub async fn submit_and_wait(
        &mut self,
        backend: &dyn AssistantBackend,
        text: &str,
    ) -> Option<&Message> {
        let pending = self.submit(text).into_pending()?;
        let outcome = backend.send_command(&pending.text).await;
        self.resolve(pending.id, outcome);
        self.transcript.last()
    }
}
