//! One-shot "say" command

use std::error::Error;

use crate::ui::chat_loop::ChatSession;

pub async fn run_say(mut session: ChatSession, prompt: &str) -> Result<(), Box<dyn Error>> {
    session.engine_mut().send(prompt);
    session.drain().await?;

    if !say_succeeded(&session) {
        std::process::exit(1);
    }
    Ok(())
}

fn say_succeeded(session: &ChatSession) -> bool {
    let engine = session.engine();
    engine.provider_available()
        && engine
            .state()
            .messages()
            .last()
            .is_some_and(|message| message.is_assistant() && !message.is_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::ConversationEngine;
    use crate::core::error_classifier::ProviderFailure;
    use crate::core::persona::DEFAULT_INSTRUCTIONS;
    use crate::ui::renderer::Renderer;
    use crate::ui::theme::Theme;
    use crate::utils::test_utils::{ScriptedProvider, ScriptedSession, SharedBuffer};
    use std::sync::Arc;

    async fn new_session(provider: &ScriptedProvider) -> (ChatSession, SharedBuffer) {
        let engine = ConversationEngine::with_instructions(provider, DEFAULT_INSTRUCTIONS).await;
        let buffer = SharedBuffer::default();
        let renderer = Renderer::new(Box::new(buffer.clone()), Theme::monochrome(), false);
        (ChatSession::new(engine, renderer, Vec::new()), buffer)
    }

    #[tokio::test]
    async fn successful_reply_is_printed() {
        let scripted = Arc::new(ScriptedSession::new());
        scripted.push_reply(["Bonjour", "Bonjour !"]);
        let provider = ScriptedProvider::with_session(scripted);
        let (mut session, buffer) = new_session(&provider).await;

        session.engine_mut().send("say hello in French");
        session.drain().await.unwrap();

        assert!(say_succeeded(&session));
        assert!(buffer.contents().contains("Bonjour !"));
    }

    #[tokio::test]
    async fn failed_or_unavailable_replies_are_unsuccessful() {
        let scripted = Arc::new(ScriptedSession::new());
        scripted.push_failure(["half"], ProviderFailure::unstructured("connection reset"));
        let provider = ScriptedProvider::with_session(scripted);
        let (mut session, _) = new_session(&provider).await;
        session.engine_mut().send("hi");
        session.drain().await.unwrap();
        assert!(!say_succeeded(&session));

        let provider = ScriptedProvider::unavailable();
        let (mut session, _) = new_session(&provider).await;
        session.engine_mut().send("hi");
        session.drain().await.unwrap();
        assert!(!say_succeeded(&session));
    }
}
