//! The conversation engine: message log, streaming state machine and
//! retry handling for a single chat session.
//!
//! The engine is a single-writer actor. Commands (`send`, `retry`, ...) are
//! applied synchronously; provider output arrives over a channel from the
//! task spawned by [`ChatStreamService`] and is applied when the owner
//! awaits [`ConversationEngine::next_event`]. Every applied change yields a
//! [`ConversationEvent`] so a presentation layer can redraw from
//! [`ConversationEngine::state`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::chat_stream::{
    ChatStreamService, GenerationSession, StreamMessage, TextGenerationProvider,
};
use crate::core::error_classifier::{classify, ErrorKind, ProviderFailure};
use crate::core::message::{character_count, throughput, ChatMessage, MessageId};
use crate::core::persona::{instructions_for, Persona, DEFAULT_INSTRUCTIONS};
use crate::core::questions::Question;

/// Source of monotonic time for latency and throughput measurements.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// `Idle -> Sending -> Streaming -> Completed | Failed`. The terminal phases
/// are resting states: they accept new commands exactly like `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    #[default]
    Idle,
    /// Request issued, no snapshot received yet.
    Sending,
    Streaming,
    Completed,
    Failed,
}

impl StreamPhase {
    pub fn is_active(self) -> bool {
        matches!(self, StreamPhase::Sending | StreamPhase::Streaming)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    MessageAppended(MessageId),
    MessageUpdated(MessageId),
    MessageRemoved(MessageId),
    StreamCompleted(MessageId),
    StreamFailed { id: MessageId, kind: ErrorKind },
    /// A send found no provider session; the reply slot stays empty.
    ProviderUnavailable,
}

#[derive(Debug, Clone)]
struct OpenStream {
    message_id: MessageId,
    stream_id: u64,
    started_at: Instant,
    prompt: String,
}

/// Everything the presentation layer needs to draw the conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    pending: bool,
    draft_input: String,
    phase: StreamPhase,
    open: Option<OpenStream>,
}

impl ConversationState {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id() == id)
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn draft_input(&self) -> &str {
        &self.draft_input
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// The assistant message currently receiving snapshots.
    pub fn open_message_id(&self) -> Option<MessageId> {
        self.open.as_ref().map(|open| open.message_id)
    }

    /// The most recent message that can be retried.
    pub fn last_retryable(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.can_retry())
    }

    fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.iter().position(|m| m.id() == id)
    }
}

pub struct ConversationEngine {
    state: ConversationState,
    session: Option<Arc<dyn GenerationSession>>,
    stream_service: ChatStreamService,
    stream_rx: mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    next_stream_id: u64,
    events: VecDeque<ConversationEvent>,
    clock: Arc<dyn Clock>,
}

impl ConversationEngine {
    /// Starts a session primed with the persona's instructions, or
    /// [`DEFAULT_INSTRUCTIONS`] when no persona is given.
    pub async fn new(provider: &dyn TextGenerationProvider, persona: Option<&Persona>) -> Self {
        Self::with_instructions(provider, instructions_for(persona, DEFAULT_INSTRUCTIONS)).await
    }

    pub async fn with_instructions(provider: &dyn TextGenerationProvider, instructions: &str) -> Self {
        Self::with_clock(provider, instructions, Arc::new(SystemClock)).await
    }

    pub async fn with_clock(
        provider: &dyn TextGenerationProvider,
        instructions: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = provider.initialize(instructions).await;
        let (stream_service, stream_rx) = ChatStreamService::new();
        let mut events = VecDeque::new();
        if session.is_none() {
            warn!("text generation provider unavailable");
            events.push_back(ConversationEvent::ProviderUnavailable);
        }

        Self {
            state: ConversationState::default(),
            session,
            stream_service,
            stream_rx,
            next_stream_id: 0,
            events,
            clock,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.clone()
    }

    pub fn provider_available(&self) -> bool {
        self.session.is_some()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft_input = text.into();
    }

    /// Sends `text` as a new user message. Returns `false`, changing nothing,
    /// when the text is blank or a reply is still streaming.
    pub fn send(&mut self, text: &str) -> bool {
        self.submit(text, true)
    }

    pub fn send_draft(&mut self) -> bool {
        let draft = std::mem::take(&mut self.state.draft_input);
        let sent = self.submit(&draft, true);
        if !sent {
            self.state.draft_input = draft;
        }
        sent
    }

    /// Sends a catalog question without touching the draft.
    pub fn send_question(&mut self, question: &Question) -> bool {
        self.submit(&question.content, false)
    }

    /// Removes a failed reply and asks again with its saved prompt.
    pub fn retry(&mut self, id: MessageId) -> bool {
        if self.state.pending {
            debug!(%id, "retry rejected while a reply is pending");
            return false;
        }
        let Some(index) = self.state.position(id) else {
            return false;
        };
        let Some(prompt) = self.state.messages[index]
            .retry_prompt()
            .filter(|_| self.state.messages[index].is_error())
            .map(str::to_string)
        else {
            return false;
        };

        self.state.messages.remove(index);
        self.events.push_back(ConversationEvent::MessageRemoved(id));
        info!(%id, "retrying failed reply");
        self.begin_stream(prompt);
        true
    }

    fn submit(&mut self, text: &str, clear_draft: bool) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        if self.state.pending {
            debug!("send rejected while a reply is pending");
            return false;
        }

        let message = ChatMessage::user(trimmed);
        let id = message.id();
        self.state.messages.push(message);
        self.events.push_back(ConversationEvent::MessageAppended(id));
        if clear_draft {
            self.state.draft_input.clear();
        }
        self.begin_stream(trimmed.to_string());
        true
    }

    fn begin_stream(&mut self, prompt: String) {
        self.state.pending = true;
        self.state.phase = StreamPhase::Sending;

        let reply = ChatMessage::assistant_placeholder();
        let message_id = reply.id();
        self.state.messages.push(reply);
        self.events
            .push_back(ConversationEvent::MessageAppended(message_id));

        let Some(session) = self.session.clone() else {
            warn!(%message_id, "no provider session; reply left empty");
            self.state.pending = false;
            self.state.phase = StreamPhase::Idle;
            self.events.push_back(ConversationEvent::ProviderUnavailable);
            return;
        };

        self.next_stream_id += 1;
        let stream_id = self.next_stream_id;
        info!(stream_id, %message_id, prompt_chars = prompt.len(), "starting reply stream");
        self.state.open = Some(OpenStream {
            message_id,
            stream_id,
            started_at: self.clock.now(),
            prompt: prompt.clone(),
        });
        self.stream_service.spawn_stream(session, prompt, stream_id);
    }

    /// Next state change, applying provider output as it arrives. Returns
    /// `None` once nothing is queued and no reply is streaming.
    pub async fn next_event(&mut self) -> Option<ConversationEvent> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            self.state.open.as_ref()?;
            let (message, stream_id) = self.stream_rx.recv().await?;
            self.apply(message, stream_id);
        }
    }

    /// Drains events until the current reply has finished.
    pub async fn run_until_idle(&mut self) -> Vec<ConversationEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn apply(&mut self, message: StreamMessage, stream_id: u64) {
        let Some(open) = self
            .state
            .open
            .as_ref()
            .filter(|open| open.stream_id == stream_id)
            .cloned()
        else {
            debug!(stream_id, "ignoring message from stale stream");
            return;
        };
        let Some(index) = self.state.position(open.message_id) else {
            warn!(stream_id, "open reply vanished from the log");
            self.finish(StreamPhase::Failed);
            return;
        };

        match message {
            StreamMessage::Snapshot(text) => {
                let elapsed = self.clock.now().saturating_duration_since(open.started_at);
                let reply = &mut self.state.messages[index];
                if !text.is_empty() && reply.record_first_token(elapsed) {
                    debug!(stream_id, latency_ms = elapsed.as_millis() as u64, "first token");
                }
                reply.replace_content(text);
                self.state.phase = StreamPhase::Streaming;
                self.events
                    .push_back(ConversationEvent::MessageUpdated(open.message_id));
            }
            StreamMessage::End => {
                let elapsed = self
                    .clock
                    .now()
                    .saturating_duration_since(open.started_at)
                    .as_secs_f64();
                let reply = &mut self.state.messages[index];
                let chars = character_count(reply.content());
                let rate = throughput(chars, elapsed);
                reply.record_throughput(rate);
                info!(stream_id, chars, throughput = rate, "reply complete");
                self.finish(StreamPhase::Completed);
                self.events
                    .push_back(ConversationEvent::MessageUpdated(open.message_id));
                self.events
                    .push_back(ConversationEvent::StreamCompleted(open.message_id));
            }
            StreamMessage::Failed(failure) => {
                self.fail(index, &open, &failure);
            }
        }
    }

    fn fail(&mut self, index: usize, open: &OpenStream, failure: &ProviderFailure) {
        let classified = classify(failure);
        warn!(
            stream_id = open.stream_id,
            kind = classified.kind.label(),
            error = %failure,
            "reply failed"
        );
        self.state.messages[index].mark_failed(classified.message, open.prompt.clone());
        self.finish(StreamPhase::Failed);
        self.events
            .push_back(ConversationEvent::MessageUpdated(open.message_id));
        self.events.push_back(ConversationEvent::StreamFailed {
            id: open.message_id,
            kind: classified.kind,
        });
    }

    fn finish(&mut self, phase: StreamPhase) {
        self.state.open = None;
        self.state.pending = false;
        self.state.phase = phase;
    }

    #[cfg(test)]
    fn inject(&self, message: StreamMessage, stream_id: u64) {
        self.stream_service.send_for_test(message, stream_id);
    }
}
