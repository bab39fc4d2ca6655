use super::helpers::{assert_literal, assert_spans, styles_of, texts_of};
use crate::ui::markdown::format_markdown;
use crate::ui::span::{visible_text, StyleTag};

#[test]
fn plain_text_is_a_single_plain_span() {
    assert_literal("Just a sentence, nothing special.");
}

#[test]
fn empty_input_has_no_spans() {
    assert!(format_markdown("").is_empty());
}

#[test]
fn bold_strips_delimiters() {
    assert_spans("**bold**", &[(StyleTag::Bold, "bold")]);
    assert_spans("__bold__", &[(StyleTag::Bold, "bold")]);
}

#[test]
fn mixed_inline_tokens_keep_document_order() {
    assert_spans(
        "*em* and **bo** and `code`",
        &[
            (StyleTag::Italic, "em"),
            (StyleTag::Plain, " and "),
            (StyleTag::Bold, "bo"),
            (StyleTag::Plain, " and "),
            (StyleTag::InlineCode, "code"),
        ],
    );
}

#[test]
fn header_prefix_is_removed() {
    assert_spans("### Title", &[(StyleTag::Header, "Title")]);
}

#[test]
fn header_keeps_following_lines_plain() {
    assert_spans(
        "### Steps\nfirst *then* last",
        &[
            (StyleTag::Header, "Steps"),
            (StyleTag::Plain, "\nfirst "),
            (StyleTag::Italic, "then"),
            (StyleTag::Plain, " last"),
        ],
    );
}

#[test]
fn header_interior_is_not_restyled() {
    assert_spans("### A **loud** title", &[(StyleTag::Header, "A **loud** title")]);
}

#[test]
fn math_expands_control_sequences() {
    assert_spans("\\[ x \\times y \\]", &[(StyleTag::MathExpression, " x × y ")]);
}

#[test]
fn math_interior_is_not_italicised() {
    assert_spans(
        "Area: \\[ a_1 * b_2 \\]",
        &[
            (StyleTag::Plain, "Area: "),
            (StyleTag::MathExpression, " a_1 * b_2 "),
        ],
    );
}

#[test]
fn math_may_span_lines() {
    let spans = format_markdown("\\[\n\\alpha\n\\]");
    assert_eq!(styles_of(&spans), vec![StyleTag::MathExpression]);
    assert_eq!(texts_of(&spans), vec!["\nα\n"]);
}

#[test]
fn code_block_keeps_interior_verbatim() {
    let input = "Run:\n```rust\nlet **x** = `y`;\n```\ndone";
    assert_spans(
        input,
        &[
            (StyleTag::Plain, "Run:\n"),
            (StyleTag::CodeBlock, "rust\nlet **x** = `y`;\n"),
            (StyleTag::Plain, "\ndone"),
        ],
    );
}

#[test]
fn bold_wins_over_italic_for_doubled_delimiters() {
    assert_spans(
        "**strong** _soft_",
        &[
            (StyleTag::Bold, "strong"),
            (StyleTag::Plain, " "),
            (StyleTag::Italic, "soft"),
        ],
    );
}

#[test]
fn bold_interior_is_not_rescanned_for_code() {
    assert_spans("**`x`**", &[(StyleTag::Bold, "`x`")]);
}

#[test]
fn spans_concatenate_to_visible_text() {
    let spans = format_markdown("### H\nSome **b** and *i* with `c` and \\[ \\pi \\]");
    assert_eq!(visible_text(&spans), "H\nSome b and i with c and  π ");
}

#[test]
fn adjacent_plain_spans_are_merged() {
    let spans = format_markdown("a `b` c `d` e");
    assert_eq!(
        styles_of(&spans),
        vec![
            StyleTag::Plain,
            StyleTag::InlineCode,
            StyleTag::Plain,
            StyleTag::InlineCode,
            StyleTag::Plain,
        ]
    );
}
