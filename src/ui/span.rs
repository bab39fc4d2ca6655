//! Styled span model produced by the markdown formatter.
//!
//! This module defines [`FormattedSpan`] and [`StyleTag`], the output of
//! [`crate::ui::markdown::format_markdown`]. A formatted message is an
//! ordered list of disjoint spans; concatenating their text yields the
//! visible text with every recognised delimiter removed.
//!
//! # Examples
//!
//! Building spans and reading back the visible text:
//!
//! ```
//! use parley::ui::span::{visible_text, FormattedSpan, StyleTag};
//!
//! let spans = vec![
//!     FormattedSpan::plain("Hello, "),
//!     FormattedSpan::new("world", StyleTag::Bold),
//! ];
//!
//! assert_eq!(visible_text(&spans), "Hello, world");
//! assert!(spans[0].is_plain());
//! assert_eq!(spans[1].style, StyleTag::Bold);
//! ```

/// Style classification attached to every formatted span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleTag {
    /// Residual text not claimed by any rule.
    Plain,
    /// `**text**` or `__text__`.
    Bold,
    /// `*text*` or `_text_`.
    Italic,
    /// Single-backtick code.
    InlineCode,
    /// Triple-backtick code block, interior kept verbatim.
    CodeBlock,
    /// `### text` at the start of a line.
    Header,
    /// `\[ ... \]` with control sequences expanded.
    MathExpression,
}

impl StyleTag {
    pub const ALL: [StyleTag; 7] = [
        StyleTag::Plain,
        StyleTag::Bold,
        StyleTag::Italic,
        StyleTag::InlineCode,
        StyleTag::CodeBlock,
        StyleTag::Header,
        StyleTag::MathExpression,
    ];

    #[inline]
    pub fn is_plain(self) -> bool {
        self == StyleTag::Plain
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Plain => "plain",
            StyleTag::Bold => "bold",
            StyleTag::Italic => "italic",
            StyleTag::InlineCode => "inline-code",
            StyleTag::CodeBlock => "code-block",
            StyleTag::Header => "header",
            StyleTag::MathExpression => "math",
        }
    }
}

/// A run of text carrying a single style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedSpan {
    pub text: String,
    pub style: StyleTag,
}

impl FormattedSpan {
    pub fn new(text: impl Into<String>, style: StyleTag) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, StyleTag::Plain)
    }

    #[inline]
    pub fn is_plain(&self) -> bool {
        self.style.is_plain()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Concatenates span text in document order.
pub fn visible_text(spans: &[FormattedSpan]) -> String {
    let capacity = spans.iter().map(|span| span.text.len()).sum();
    spans
        .iter()
        .fold(String::with_capacity(capacity), |mut out, span| {
            out.push_str(&span.text);
            out
        })
}

/// Appends `span` to `out`, merging consecutive plain runs and dropping
/// empty plain text. Styled spans are always kept, even when empty.
pub(crate) fn push_span(out: &mut Vec<FormattedSpan>, span: FormattedSpan) {
    if span.is_plain() {
        if span.text.is_empty() {
            return;
        }
        if let Some(last) = out.last_mut() {
            if last.is_plain() {
                last.text.push_str(&span.text);
                return;
            }
        }
    }
    out.push(span);
}
