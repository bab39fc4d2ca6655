use crate::ui::markdown::format_markdown;
use crate::ui::span::{visible_text, FormattedSpan, StyleTag};

pub fn styles_of(spans: &[FormattedSpan]) -> Vec<StyleTag> {
    spans.iter().map(|span| span.style).collect()
}

pub fn texts_of(spans: &[FormattedSpan]) -> Vec<&str> {
    spans.iter().map(|span| span.text.as_str()).collect()
}

/// Formats `input` and asserts the result is exactly `expected`.
pub fn assert_spans(input: &str, expected: &[(StyleTag, &str)]) {
    let spans = format_markdown(input);
    let actual: Vec<(StyleTag, &str)> = spans
        .iter()
        .map(|span| (span.style, span.text.as_str()))
        .collect();
    assert_eq!(actual, expected, "formatting {input:?}");
}

/// Formats `input` and asserts it is left untouched as one plain span.
pub fn assert_literal(input: &str) {
    let spans = format_markdown(input);
    assert_eq!(spans, vec![FormattedSpan::plain(input)], "formatting {input:?}");
    assert_eq!(visible_text(&spans), input);
}
