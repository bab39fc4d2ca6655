//! Quick-question catalog read from `questions.json`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionList {
    pub questions: Vec<Question>,
}

/// Loads the catalog at `path`. A missing or malformed file yields an empty
/// list; the cause is only logged at debug level.
pub fn load_questions(path: &Path) -> Vec<Question> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "question catalog unavailable");
            return Vec::new();
        }
    };

    match serde_json::from_str::<QuestionList>(&contents) {
        Ok(list) => list.questions,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "question catalog could not be decoded");
            Vec::new()
        }
    }
}
