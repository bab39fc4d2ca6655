#[cfg(test)]
use crate::core::chat_stream::{GenerationSession, SnapshotStream, TextGenerationProvider};
#[cfg(test)]
use crate::core::conversation::Clock;
#[cfg(test)]
use crate::core::error_classifier::ProviderFailure;
#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::time::{Duration, Instant};

#[cfg(test)]
type ScriptedReply = Vec<Result<String, ProviderFailure>>;

/// Session that replays queued replies in order, one per prompt.
/// Once the queue runs dry every prompt gets an empty, successful reply.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedSession {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply<'a>(&self, snapshots: impl IntoIterator<Item = &'a str>) {
        let reply = snapshots.into_iter().map(|s| Ok(s.to_string())).collect();
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_failure<'a>(
        &self,
        snapshots: impl IntoIterator<Item = &'a str>,
        failure: ProviderFailure,
    ) {
        let mut reply: ScriptedReply = snapshots.into_iter().map(|s| Ok(s.to_string())).collect();
        reply.push(Err(failure));
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl GenerationSession for ScriptedSession {
    fn stream_response(&self, prompt: &str) -> SnapshotStream {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Box::pin(futures_util::stream::iter(reply))
    }
}

/// Provider handing out a shared [`ScriptedSession`], or none at all.
#[cfg(test)]
pub struct ScriptedProvider {
    session: Option<Arc<ScriptedSession>>,
    instructions: Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedProvider {
    pub fn with_session(session: Arc<ScriptedSession>) -> Self {
        Self {
            session: Some(session),
            instructions: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            session: None,
            instructions: Mutex::new(Vec::new()),
        }
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl TextGenerationProvider for ScriptedProvider {
    async fn initialize(&self, instructions: &str) -> Option<Arc<dyn GenerationSession>> {
        self.instructions
            .lock()
            .unwrap()
            .push(instructions.to_string());
        self.session
            .clone()
            .map(|session| session as Arc<dyn GenerationSession>)
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }
}

#[cfg(test)]
pub const SAMPLE_REPLY: &str = "### Summary\nUse **bold** for emphasis, *italics* for nuance and `code` for identifiers.\n\\[ a \\times b \\leq c \\]";

/// Clonable in-memory writer for inspecting rendered output.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
