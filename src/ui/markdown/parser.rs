use std::ops::Range;

use memchr::{memchr, memchr2, memmem};

use super::math::expand_math;
use crate::ui::span::{push_span, FormattedSpan, StyleTag};

/// One delimiter rule of the formatter. Rules run in [`Rule::PRECEDENCE`]
/// order and only ever scan plain residual text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Header,
    Math,
    CodeBlock,
    Bold,
    Italic,
    InlineCode,
}

/// Byte offsets of a single match inside the scanned text.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct RuleMatch {
    pub start: usize,
    pub end: usize,
    pub interior: Range<usize>,
}

const HEADER_PREFIX: &str = "### ";
const MATH_OPEN: &str = "\\[";
const MATH_CLOSE: &str = "\\]";
const FENCE: &str = "```";

impl Rule {
    pub const PRECEDENCE: [Rule; 6] = [
        Rule::Header,
        Rule::Math,
        Rule::CodeBlock,
        Rule::Bold,
        Rule::Italic,
        Rule::InlineCode,
    ];

    pub fn style(self) -> StyleTag {
        match self {
            Rule::Header => StyleTag::Header,
            Rule::Math => StyleTag::MathExpression,
            Rule::CodeBlock => StyleTag::CodeBlock,
            Rule::Bold => StyleTag::Bold,
            Rule::Italic => StyleTag::Italic,
            Rule::InlineCode => StyleTag::InlineCode,
        }
    }

    /// Finds the leftmost match starting at or after `from`.
    pub(super) fn find(self, text: &str, from: usize) -> Option<RuleMatch> {
        match self {
            Rule::Header => find_header(text, from),
            Rule::Math => find_enclosed(text, from, MATH_OPEN, MATH_CLOSE),
            Rule::CodeBlock => find_enclosed(text, from, FENCE, FENCE),
            Rule::Bold => find_bold(text, from),
            Rule::Italic => find_italic(text, from),
            Rule::InlineCode => find_inline_code(text, from),
        }
    }

    fn render_interior(self, interior: &str) -> String {
        match self {
            Rule::Math => expand_math(interior),
            _ => interior.to_string(),
        }
    }
}

/// Applies `rule` to every plain span, leaving styled spans untouched.
pub(super) fn apply_rule(spans: Vec<FormattedSpan>, rule: Rule) -> Vec<FormattedSpan> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if span.is_plain() {
            split_plain(&span.text, rule, &mut out);
        } else {
            push_span(&mut out, span);
        }
    }
    out
}

fn split_plain(text: &str, rule: Rule, out: &mut Vec<FormattedSpan>) {
    let mut cursor = 0;
    while let Some(found) = rule.find(text, cursor) {
        push_span(out, FormattedSpan::plain(&text[cursor..found.start]));
        let interior = rule.render_interior(&text[found.interior]);
        push_span(out, FormattedSpan::new(interior, rule.style()));
        cursor = found.end;
    }
    push_span(out, FormattedSpan::plain(&text[cursor..]));
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    memchr(b'\n', &bytes[from..]).map_or(bytes.len(), |offset| from + offset)
}

fn find_header(text: &str, from: usize) -> Option<RuleMatch> {
    let bytes = text.as_bytes();
    let mut line_start = from;
    if line_start > 0 && bytes[line_start - 1] != b'\n' {
        line_start = memchr(b'\n', &bytes[line_start..]).map(|offset| line_start + offset + 1)?;
    }

    while line_start <= bytes.len() {
        let end = line_end(bytes, line_start);
        let line = &text[line_start..end];
        let content_end = if line.ends_with('\r') { end - 1 } else { end };
        let prefix_end = line_start + HEADER_PREFIX.len();
        if line.starts_with(HEADER_PREFIX) && content_end > prefix_end {
            return Some(RuleMatch {
                start: line_start,
                end: content_end,
                interior: prefix_end..content_end,
            });
        }
        if end == bytes.len() {
            return None;
        }
        line_start = end + 1;
    }
    None
}

/// Matches `open ... close` with the shortest interior. Interiors may span lines.
fn find_enclosed(text: &str, from: usize, open: &str, close: &str) -> Option<RuleMatch> {
    let bytes = text.as_bytes();
    let start = from + memmem::find(&bytes[from..], open.as_bytes())?;
    let interior_start = start + open.len();
    let close_at = interior_start + memmem::find(&bytes[interior_start..], close.as_bytes())?;
    Some(RuleMatch {
        start,
        end: close_at + close.len(),
        interior: interior_start..close_at,
    })
}

fn find_bold(text: &str, from: usize) -> Option<RuleMatch> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while let Some(offset) = memchr2(b'*', b'_', &bytes[pos..]) {
        let start = pos + offset;
        let delim = bytes[start];
        if bytes.get(start + 1) == Some(&delim) {
            let interior_start = start + 2;
            let limit = line_end(bytes, interior_start);
            let pair = [delim, delim];
            if let Some(close) = memmem::find(&bytes[interior_start..limit], &pair) {
                let close_at = interior_start + close;
                return Some(RuleMatch {
                    start,
                    end: close_at + 2,
                    interior: interior_start..close_at,
                });
            }
        }
        pos = start + 1;
    }
    None
}

/// A single delimiter byte not directly touching another copy of itself.
fn is_lone_delimiter(bytes: &[u8], at: usize) -> bool {
    let delim = bytes[at];
    let before = at.checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(at + 1).copied();
    before != Some(delim) && after != Some(delim)
}

fn find_italic(text: &str, from: usize) -> Option<RuleMatch> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while let Some(offset) = memchr2(b'*', b'_', &bytes[pos..]) {
        let start = pos + offset;
        let delim = bytes[start];
        if is_lone_delimiter(bytes, start) {
            let interior_start = start + 1;
            let limit = line_end(bytes, interior_start);
            let mut search_from = interior_start;
            while let Some(close) = memchr(delim, &bytes[search_from..limit]) {
                let close_at = search_from + close;
                if close_at > interior_start && is_lone_delimiter(bytes, close_at) {
                    return Some(RuleMatch {
                        start,
                        end: close_at + 1,
                        interior: interior_start..close_at,
                    });
                }
                search_from = close_at + 1;
            }
        }
        pos = start + 1;
    }
    None
}

fn find_inline_code(text: &str, from: usize) -> Option<RuleMatch> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while let Some(offset) = memchr(b'`', &bytes[pos..]) {
        let start = pos + offset;
        if is_lone_delimiter(bytes, start) {
            let interior_start = start + 1;
            let limit = line_end(bytes, interior_start);
            if let Some(close) = memchr(b'`', &bytes[interior_start..limit]) {
                let close_at = interior_start + close;
                if is_lone_delimiter(bytes, close_at) {
                    return Some(RuleMatch {
                        start,
                        end: close_at + 1,
                        interior: interior_start..close_at,
                    });
                }
            }
        }
        pos = start + 1;
    }
    None
}
