use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

/// Opaque message identifier, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

impl MessageId {
    fn next() -> Self {
        MessageId(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// One entry in the conversation log.
///
/// Fields are read-only outside the crate; the conversation engine is the
/// only writer, which keeps the error/retry and metric invariants intact.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    first_token_latency: Option<Duration>,
    throughput: Option<f64>,
    is_error: bool,
    retry_prompt: Option<String>,
}

impl ChatMessage {
    pub(crate) fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub(crate) fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new())
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            id: MessageId::next(),
            role,
            content,
            created_at: Utc::now(),
            first_token_latency: None,
            throughput: None,
            is_error: false,
            retry_prompt: None,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn first_token_latency(&self) -> Option<Duration> {
        self.first_token_latency
    }

    /// Characters per second, set once a reply completes successfully.
    pub fn throughput(&self) -> Option<f64> {
        self.throughput
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn retry_prompt(&self) -> Option<&str> {
        self.retry_prompt.as_deref()
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    /// True when the message carries an error with a prompt to resend.
    pub fn can_retry(&self) -> bool {
        self.is_error && self.retry_prompt.is_some()
    }

    pub(crate) fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Records the first-token latency. Later calls are ignored.
    pub(crate) fn record_first_token(&mut self, latency: Duration) -> bool {
        if self.role.is_user() || self.first_token_latency.is_some() {
            return false;
        }
        self.first_token_latency = Some(latency);
        true
    }

    pub(crate) fn record_throughput(&mut self, throughput: f64) {
        if self.role.is_assistant() {
            self.throughput = Some(throughput);
        }
    }

    pub(crate) fn mark_failed(&mut self, message: impl Into<String>, prompt: impl Into<String>) {
        self.content = message.into();
        self.is_error = true;
        self.retry_prompt = Some(prompt.into());
        self.throughput = None;
    }
}

/// Number of user-perceived characters (extended grapheme clusters).
pub fn character_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Characters per second over `elapsed_secs`; non-positive spans yield zero.
pub fn throughput(characters: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        characters as f64 / elapsed_secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let first = ChatMessage::user("a");
        let second = ChatMessage::assistant_placeholder();
        assert_ne!(first.id(), second.id());
        assert!(first.id() < second.id());
    }

    #[test]
    fn first_token_latency_is_set_once() {
        let mut message = ChatMessage::assistant_placeholder();
        assert!(message.record_first_token(Duration::from_millis(120)));
        assert!(!message.record_first_token(Duration::from_millis(900)));
        assert_eq!(
            message.first_token_latency(),
            Some(Duration::from_millis(120))
        );
    }

    #[test]
    fn user_messages_never_carry_metrics() {
        let mut message = ChatMessage::user("hi");
        assert!(!message.record_first_token(Duration::from_secs(1)));
        message.record_throughput(12.0);
        assert_eq!(message.first_token_latency(), None);
        assert_eq!(message.throughput(), None);
    }

    #[test]
    fn failure_sets_error_and_prompt_together() {
        let mut message = ChatMessage::assistant_placeholder();
        assert!(!message.can_retry());
        message.mark_failed("Sorry", "original prompt");
        assert!(message.is_error());
        assert_eq!(message.retry_prompt(), Some("original prompt"));
        assert!(message.can_retry());
        assert_eq!(message.content(), "Sorry");
    }

    #[test]
    fn throughput_guards_non_positive_elapsed() {
        assert_eq!(throughput(100, 0.0), 0.0);
        assert_eq!(throughput(100, -1.5), 0.0);
        assert_eq!(throughput(100, 4.0), 25.0);
    }

    #[test]
    fn character_count_uses_graphemes() {
        assert_eq!(character_count("héllo"), 5);
        assert_eq!(character_count("👍🏽!"), 2);
        assert_eq!(character_count(""), 0);
    }

    #[test]
    fn roles_use_wire_names() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(ChatMessage::assistant_placeholder().role().as_str(), "assistant");
    }
}
