use super::helpers::{assert_literal, assert_spans};
use crate::ui::markdown::format_markdown;
use crate::ui::span::StyleTag;

#[test]
fn unterminated_delimiters_stay_literal() {
    assert_literal("**never closed");
    assert_literal("__never closed");
    assert_literal("a lone * star");
    assert_literal("`unclosed code");
    assert_literal("\\[ 1 + 1");
    assert_literal("```\nfn main() {}");
}

#[test]
fn header_needs_text_after_prefix() {
    assert_literal("### ");
    assert_literal("###Title");
    assert_literal("#### Too deep");
}

#[test]
fn header_must_start_a_line() {
    assert_literal("see ### not a header");
}

#[test]
fn zero_length_bold_yields_empty_styled_span() {
    assert_spans("****", &[(StyleTag::Bold, "")]);
    assert_spans(
        "a____b",
        &[
            (StyleTag::Plain, "a"),
            (StyleTag::Bold, ""),
            (StyleTag::Plain, "b"),
        ],
    );
}

#[test]
fn zero_length_math_and_code_block_are_valid() {
    assert_spans("\\[\\]", &[(StyleTag::MathExpression, "")]);
    assert_spans("``````", &[(StyleTag::CodeBlock, "")]);
}

#[test]
fn bare_double_star_is_literal() {
    assert_literal("**");
}

#[test]
fn italic_may_wrap_whitespace() {
    assert_spans(
        "a * * b",
        &[
            (StyleTag::Plain, "a "),
            (StyleTag::Italic, " "),
            (StyleTag::Plain, " b"),
        ],
    );
}

#[test]
fn emphasis_does_not_cross_line_breaks() {
    assert_literal("*start\nend*");
    assert_literal("**start\nend**");
    assert_literal("`start\nend`");
}

#[test]
fn regex_metacharacters_are_plain_text() {
    assert_literal("(a|b)+ [c]? {d} ^$ .* \\d");
}

#[test]
fn multibyte_text_around_delimiters() {
    assert_spans(
        "héllo **wörld** ✨ *ß*",
        &[
            (StyleTag::Plain, "héllo "),
            (StyleTag::Bold, "wörld"),
            (StyleTag::Plain, " ✨ "),
            (StyleTag::Italic, "ß"),
        ],
    );
}

#[test]
fn multiple_matches_per_rule_are_all_applied() {
    let spans = format_markdown("**a** **b** **c**");
    let bold: Vec<_> = spans
        .iter()
        .filter(|span| span.style == StyleTag::Bold)
        .map(|span| span.text.as_str())
        .collect();
    assert_eq!(bold, vec!["a", "b", "c"]);
}

#[test]
fn triple_star_prefers_bold_then_leaves_star() {
    assert_spans("***x**", &[(StyleTag::Bold, "*x")]);
}

#[test]
fn snake_case_underscores_pair_as_italic() {
    assert_spans(
        "snake_case_name",
        &[
            (StyleTag::Plain, "snake"),
            (StyleTag::Italic, "case"),
            (StyleTag::Plain, "name"),
        ],
    );
}
