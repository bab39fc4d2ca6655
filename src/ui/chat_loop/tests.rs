use std::sync::Arc;

use super::*;
use crate::core::error_classifier::{GenerationFailureReason, ProviderFailure};
use crate::core::persona::DEFAULT_INSTRUCTIONS;
use crate::ui::theme::Theme;
use crate::utils::test_utils::{ScriptedProvider, ScriptedSession, SharedBuffer, SAMPLE_REPLY};

fn questions() -> Vec<Question> {
    vec![Question {
        title: "Rust".to_string(),
        content: "What is ownership?".to_string(),
    }]
}

async fn session_with(provider: &ScriptedProvider, markdown: bool) -> (ChatSession, SharedBuffer) {
    let engine = ConversationEngine::with_instructions(provider, DEFAULT_INSTRUCTIONS).await;
    let buffer = SharedBuffer::default();
    let renderer = Renderer::new(Box::new(buffer.clone()), Theme::monochrome(), markdown)
        .with_assistant_label("Bot");
    (ChatSession::new(engine, renderer, questions()), buffer)
}

#[tokio::test]
async fn typed_messages_stream_into_the_reply() {
    let scripted = Arc::new(ScriptedSession::new());
    scripted.push_reply(["Hi", "Hi there", "Hi there!"]);
    let provider = ScriptedProvider::with_session(scripted.clone());
    let (mut session, buffer) = session_with(&provider, true).await;

    assert_eq!(session.handle_line("hello").unwrap(), LoopAction::Continue);
    session.drain().await.unwrap();

    let text = buffer.contents();
    // typed input is already on screen, so it is not echoed
    assert!(!text.contains("You:"));
    assert!(text.contains("Bot:"));
    assert_eq!(text.matches("Hi there!").count(), 1);
    assert_eq!(scripted.prompts(), vec!["hello".to_string()]);
    assert!(!session.engine().state().pending());
}

#[tokio::test]
async fn markdown_replies_are_reformatted_when_complete() {
    let scripted = Arc::new(ScriptedSession::new());
    scripted.push_reply([SAMPLE_REPLY]);
    let provider = ScriptedProvider::with_session(scripted);
    let (mut session, buffer) = session_with(&provider, true).await;

    session.handle_line("format something").unwrap();
    session.drain().await.unwrap();

    let text = buffer.contents();
    assert_eq!(text.matches("**bold**").count(), 1);
    assert!(text.contains("a × b ≤ c"));
}

#[tokio::test]
async fn questions_are_echoed_before_the_reply() {
    let scripted = Arc::new(ScriptedSession::new());
    scripted.push_reply(["Ownership is..."]);
    let provider = ScriptedProvider::with_session(scripted.clone());
    let (mut session, buffer) = session_with(&provider, false).await;

    session.handle_line("/q 1").unwrap();
    session.drain().await.unwrap();

    let text = buffer.contents();
    let you = text.find("What is ownership?").unwrap();
    let reply = text.find("Ownership is...").unwrap();
    assert!(you < reply);
    assert_eq!(scripted.prompts(), vec!["What is ownership?".to_string()]);
}

#[tokio::test]
async fn failures_offer_retry_and_retry_recovers() {
    let scripted = Arc::new(ScriptedSession::new());
    scripted.push_failure(
        ["partial"],
        ProviderFailure::generation(GenerationFailureReason::Other("rate_limited".into()), "slow down"),
    );
    scripted.push_reply(["Recovered"]);
    let provider = ScriptedProvider::with_session(scripted.clone());
    let (mut session, buffer) = session_with(&provider, false).await;

    session.handle_line("hello").unwrap();
    session.drain().await.unwrap();
    assert!(buffer.contents().contains("Type /retry to try again."));

    session.handle_line("/retry").unwrap();
    session.drain().await.unwrap();

    let text = buffer.contents();
    assert!(text.find("Recovered").unwrap() > text.find("Type /retry").unwrap());
    assert_eq!(scripted.prompts(), vec!["hello".to_string(), "hello".to_string()]);
    let messages = session.engine().state().messages();
    assert_eq!(messages.len(), 2);
    assert!(!messages[1].is_error());
}

#[tokio::test]
async fn input_while_pending_is_turned_away() {
    let scripted = Arc::new(ScriptedSession::new());
    scripted.push_reply(["one"]);
    let provider = ScriptedProvider::with_session(scripted.clone());
    let (mut session, buffer) = session_with(&provider, false).await;

    session.handle_line("first").unwrap();
    assert!(session.engine().state().pending());
    session.handle_line("second").unwrap();
    session.drain().await.unwrap();

    assert!(buffer
        .contents()
        .contains("Still answering; wait for the reply to finish."));
    assert_eq!(scripted.prompts(), vec!["first".to_string()]);
    assert_eq!(session.engine().state().draft_input(), "");
}

#[tokio::test]
async fn unavailable_provider_is_reported() {
    let provider = ScriptedProvider::unavailable();
    let (mut session, buffer) = session_with(&provider, false).await;

    session.drain().await.unwrap();
    assert!(buffer.contents().contains("provider is unavailable"));

    session.handle_line("anyone there?").unwrap();
    session.drain().await.unwrap();
    assert_eq!(buffer.contents().matches("provider is unavailable").count(), 2);
    assert!(!session.engine().state().pending());
}

#[tokio::test]
async fn quit_ends_the_loop() {
    let provider = ScriptedProvider::unavailable();
    let (mut session, _buffer) = session_with(&provider, false).await;
    assert_eq!(session.handle_line("/quit").unwrap(), LoopAction::Quit);
    assert_eq!(session.handle_line("  ").unwrap(), LoopAction::Continue);
}
