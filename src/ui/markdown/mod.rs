//! Inline markdown formatting for chat replies.
//!
//! Only a fixed token set is recognised. Rules run in precedence order
//! (header, math, code block, bold, italic, inline code) and each rule
//! scans only the plain text left over by the rules before it, so the
//! interior of a header, formula or code block is never restyled.
//!
//! ```
//! use parley::ui::markdown::format_markdown;
//! use parley::ui::span::{FormattedSpan, StyleTag};
//!
//! let spans = format_markdown("**bold** move");
//! assert_eq!(
//!     spans,
//!     vec![
//!         FormattedSpan::new("bold", StyleTag::Bold),
//!         FormattedSpan::plain(" move"),
//!     ]
//! );
//! ```

mod math;
mod parser;

#[cfg(test)]
mod tests;

pub use math::expand_math;
pub use parser::Rule;

use crate::ui::span::{push_span, FormattedSpan};

/// Formats `text` into ordered, non-overlapping styled spans.
///
/// The empty string yields no spans; text without any recognised token
/// yields a single plain span equal to the input.
pub fn format_markdown(text: &str) -> Vec<FormattedSpan> {
    Rule::PRECEDENCE
        .iter()
        .fold(plain_spans(text), |spans, rule| parser::apply_rule(spans, *rule))
}

/// Wraps `text` as a single plain span, for callers with formatting turned off.
pub fn plain_spans(text: &str) -> Vec<FormattedSpan> {
    let mut spans = Vec::with_capacity(1);
    push_span(&mut spans, FormattedSpan::plain(text));
    spans
}
