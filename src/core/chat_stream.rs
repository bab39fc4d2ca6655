//! Text generation providers and the task that drives their streams.
//!
//! A provider hands out a [`GenerationSession`] once per conversation. Each
//! prompt yields a [`SnapshotStream`] of cumulative reply text; the
//! [`ChatStreamService`] polls it on a spawned task and forwards every item
//! to the conversation engine tagged with the stream id it was started with.

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use memchr::memchr;
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::error_classifier::{GenerationFailureReason, ProviderFailure};
use crate::core::message::Role;
use crate::utils::url::{construct_api_url, is_local_endpoint};

/// Cumulative snapshots of a reply. Each item holds the full text so far.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<String, ProviderFailure>> + Send>>;

#[async_trait]
pub trait TextGenerationProvider: Send + Sync {
    /// Opens a session primed with `instructions`. `None` means the provider
    /// cannot serve requests right now.
    async fn initialize(&self, instructions: &str) -> Option<Arc<dyn GenerationSession>>;
}

pub trait GenerationSession: Send + Sync {
    fn stream_response(&self, prompt: &str) -> SnapshotStream;
}

#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Snapshot(String),
    /// Terminal; no `End` follows a failure.
    Failed(ProviderFailure),
    End,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Polls `session` for `prompt` on a new task. Must be called from within
    /// a tokio runtime.
    pub fn spawn_stream(&self, session: Arc<dyn GenerationSession>, prompt: String, stream_id: u64) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut snapshots = session.stream_response(&prompt);
            while let Some(item) = snapshots.next().await {
                let message = match item {
                    Ok(text) => StreamMessage::Snapshot(text),
                    Err(failure) => {
                        let _ = tx.send((StreamMessage::Failed(failure), stream_id));
                        return;
                    }
                };
                if tx.send((message, stream_id)).is_err() {
                    debug!(stream_id, "conversation dropped; abandoning stream");
                    return;
                }
            }
            let _ = tx.send((StreamMessage::End, stream_id));
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

/// Provider for any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl TextGenerationProvider for OpenAiCompatibleProvider {
    async fn initialize(&self, instructions: &str) -> Option<Arc<dyn GenerationSession>> {
        if self.api_key.is_none() && !is_local_endpoint(&self.base_url) {
            debug!(base_url = %self.base_url, "no API key for remote endpoint");
            return None;
        }

        let mut transcript = Vec::new();
        if !instructions.trim().is_empty() {
            transcript.push(ChatMessage::new("system", instructions));
        }

        Some(Arc::new(OpenAiSession {
            client: self.client.clone(),
            chat_url: construct_api_url(&self.base_url, "chat/completions"),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            transcript: Arc::new(Mutex::new(transcript)),
        }))
    }
}

/// Keeps the running transcript so each prompt is answered in context.
struct OpenAiSession {
    client: reqwest::Client,
    chat_url: String,
    model: String,
    api_key: Option<String>,
    transcript: Arc<Mutex<Vec<ChatMessage>>>,
}

type SnapshotSender = mpsc::UnboundedSender<Result<String, ProviderFailure>>;

impl GenerationSession for OpenAiSession {
    fn stream_response(&self, prompt: &str) -> SnapshotStream {
        let mut messages = self
            .transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        messages.push(ChatMessage::new(Role::User.as_str(), prompt));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: true,
        };

        let mut http_request = self
            .client
            .post(&self.chat_url)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let transcript = Arc::clone(&self.transcript);
        let prompt = prompt.to_string();
        tokio::spawn(async move {
            if let Some(reply) = run_completion(http_request, &tx).await {
                let mut transcript = transcript.lock().unwrap_or_else(PoisonError::into_inner);
                transcript.push(ChatMessage::new(Role::User.as_str(), prompt));
                transcript.push(ChatMessage::new(Role::Assistant.as_str(), reply));
            }
        });

        Box::pin(stream::poll_fn(move |cx| rx.poll_recv(cx)))
    }
}

/// Sends the request and forwards cumulative snapshots. Returns the final
/// reply when the stream completed without a failure.
async fn run_completion(request: reqwest::RequestBuilder, tx: &SnapshotSender) -> Option<String> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            let _ = tx.send(Err(describe_transport_error(&err)));
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_default();
        let _ = tx.send(Err(failure_from_payload(Some(status), &body)));
        return None;
    }

    let mut reply = String::new();
    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        if tx.is_closed() {
            return None;
        }
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                let _ = tx.send(Err(ProviderFailure::unstructured(format!(
                    "connection interrupted: {err}"
                ))));
                return None;
            }
        };
        buffer.extend_from_slice(&chunk);

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let event = match std::str::from_utf8(&buffer[..newline_pos]) {
                Ok(line) => parse_sse_line(line.trim()),
                Err(err) => {
                    debug!(error = %err, "skipping invalid UTF-8 in event stream");
                    None
                }
            };
            buffer.drain(..=newline_pos);

            match event {
                Some(SseEvent::Delta(delta)) => {
                    if delta.is_empty() {
                        continue;
                    }
                    reply.push_str(&delta);
                    let _ = tx.send(Ok(reply.clone()));
                }
                Some(SseEvent::Done) => return Some(reply),
                Some(SseEvent::Failure(failure)) => {
                    let _ = tx.send(Err(failure));
                    return None;
                }
                None => {}
            }
        }
    }

    Some(reply)
}

#[derive(Debug, PartialEq)]
enum SseEvent {
    Delta(String),
    Done,
    Failure(ProviderFailure),
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let payload = extract_data_payload(line)?;
    if payload == "[DONE]" {
        return Some(SseEvent::Done);
    }
    if payload.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => {
            let choice = response.choices.into_iter().next()?;
            if choice.finish_reason.as_deref() == Some("content_filter") {
                return Some(SseEvent::Failure(ProviderFailure::generation(
                    GenerationFailureReason::GuardrailViolation,
                    "the provider stopped the reply (finish reason: content_filter)",
                )));
            }
            choice.delta.content.map(SseEvent::Delta)
        }
        Err(_) => Some(SseEvent::Failure(failure_from_payload(None, payload))),
    }
}

const MAX_DETAIL_CHARS: usize = 300;

fn collapse_whitespace(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_DETAIL_CHARS {
        let mut truncated: String = collapsed.chars().take(MAX_DETAIL_CHARS).collect();
        truncated.push('…');
        truncated
    } else {
        collapsed
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;
    let summary = collapse_whitespace(summary);
    (!summary.is_empty()).then_some(summary)
}

fn extract_error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .pointer("/error/code")
        .or_else(|| value.get("code"))
        .and_then(|v| v.as_str())
}

fn reason_for_code(code: &str) -> Option<GenerationFailureReason> {
    match code {
        "context_length_exceeded" => Some(GenerationFailureReason::ExceededContextWindowSize),
        "content_filter" | "content_policy_violation" => {
            Some(GenerationFailureReason::GuardrailViolation)
        }
        "unsupported_language" => Some(GenerationFailureReason::UnsupportedLanguageOrLocale),
        _ => None,
    }
}

/// Builds a failure from an error body, optionally tagged with its HTTP status.
fn failure_from_payload(status: Option<reqwest::StatusCode>, body: &str) -> ProviderFailure {
    let trimmed = body.trim();
    let value = serde_json::from_str::<serde_json::Value>(trimmed).ok();
    let detail = match value.as_ref().and_then(extract_error_summary) {
        Some(summary) => summary,
        None => collapse_whitespace(trimmed),
    };

    let description = match (status, detail.is_empty()) {
        (Some(status), true) => format!("HTTP {status}"),
        (Some(status), false) => format!("HTTP {status}: {detail}"),
        (None, true) => "empty error payload".to_string(),
        (None, false) => detail,
    };

    match value
        .as_ref()
        .and_then(extract_error_code)
        .and_then(reason_for_code)
    {
        Some(reason) => ProviderFailure::generation(reason, description),
        None => ProviderFailure::unstructured(description),
    }
}

fn describe_transport_error(err: &reqwest::Error) -> ProviderFailure {
    let description = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    };
    ProviderFailure::unstructured(description)
}
