use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::core::questions::{load_questions, Question};

pub fn list_questions(config: &Config) {
    let Some(path) = config.questions_path() else {
        println!("No question catalog location is available.");
        return;
    };
    println!("Quick questions (from {}):\n", path_display(&path));
    let questions = load_questions(&path);
    if questions.is_empty() {
        println!("  No questions found.");
        println!("\n💡 Add a catalog shaped like:");
        println!(r#"   {{ "questions": [ {{ "title": "...", "content": "..." }} ] }}"#);
        return;
    }
    for line in question_lines(&questions) {
        println!("{line}");
    }
    println!("\n💡 Send one during a chat with /q <n>");
}

fn question_lines(questions: &[Question]) -> Vec<String> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| format!("  {}. {}", index + 1, question.title))
        .collect()
}
