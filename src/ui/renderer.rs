//! Line-mode output for the conversation.
//!
//! Replies are written incrementally as snapshots arrive. Once a reply is
//! complete it is re-printed through the markdown formatter when it carries
//! any markup, followed by a metrics footer.

use std::io::{self, Write};
use std::time::Duration;

use ratatui::crossterm::style::ContentStyle;

use crate::core::message::ChatMessage;
use crate::ui::markdown::format_markdown;
use crate::ui::span::FormattedSpan;
use crate::ui::theme::Theme;

/// `"0.42s · 31.5 chars/s"`; parts that were never measured are left out.
pub fn format_metrics(latency: Option<Duration>, throughput: Option<f64>) -> Option<String> {
    let parts: Vec<String> = [
        latency.map(|latency| format!("{:.2}s", latency.as_secs_f64())),
        throughput.map(|rate| format!("{rate:.1} chars/s")),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!parts.is_empty()).then(|| parts.join(" · "))
}

pub fn write_spans(out: &mut dyn Write, spans: &[FormattedSpan], theme: &Theme) -> io::Result<()> {
    for span in spans {
        write_styled(out, &span.text, theme.style_for(span.style))?;
    }
    Ok(())
}

/// Styles each line separately so escape codes never straddle a newline.
fn write_styled(out: &mut dyn Write, text: &str, style: ContentStyle) -> io::Result<()> {
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        if !line.is_empty() {
            write!(out, "{}", style.apply(line))?;
        }
        if lines.peek().is_some() {
            writeln!(out)?;
        }
    }
    Ok(())
}

pub struct Renderer {
    out: Box<dyn Write + Send>,
    theme: Theme,
    markdown: bool,
    assistant_label: String,
    /// Text of the open reply already written to `out`.
    streamed: String,
    /// A reply prefix is on screen without its closing newline.
    reply_open: bool,
}

impl Renderer {
    pub fn new(out: Box<dyn Write + Send>, theme: Theme, markdown: bool) -> Self {
        Self {
            out,
            theme,
            markdown,
            assistant_label: "Assistant".to_string(),
            streamed: String::new(),
            reply_open: false,
        }
    }

    pub fn stdout(theme: Theme, markdown: bool) -> Self {
        Self::new(Box::new(io::stdout()), theme, markdown)
    }

    pub fn with_assistant_label(mut self, label: impl Into<String>) -> Self {
        self.assistant_label = label.into();
        self
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        if std::mem::take(&mut self.reply_open) {
            writeln!(self.out)?;
        }
        write_styled(&mut self.out, text, self.theme.notice_style)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{} ", self.theme.user_prefix_style.apply(">"))?;
        self.out.flush()
    }

    pub fn user_message(&mut self, message: &ChatMessage) -> io::Result<()> {
        write!(self.out, "{} ", self.theme.user_prefix_style.apply("You:"))?;
        write_styled(&mut self.out, message.content(), self.theme.user_text_style)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn begin_reply(&mut self) -> io::Result<()> {
        self.streamed.clear();
        self.reply_open = true;
        let label = format!("{}:", self.assistant_label);
        write!(self.out, "{} ", self.theme.assistant_prefix_style.apply(label))?;
        self.out.flush()
    }

    /// Writes whatever `content` adds to the text already shown.
    pub fn stream_update(&mut self, content: &str) -> io::Result<()> {
        match content.strip_prefix(self.streamed.as_str()) {
            Some(suffix) => self.out.write_all(suffix.as_bytes())?,
            None => {
                // The provider revised earlier text; start the reply over.
                writeln!(self.out)?;
                self.out.write_all(content.as_bytes())?;
            }
        }
        self.streamed = content.to_string();
        self.reply_open = true;
        self.out.flush()
    }

    pub fn finish_reply(&mut self, message: &ChatMessage) -> io::Result<()> {
        self.reply_open = false;
        writeln!(self.out)?;
        if self.markdown {
            let spans = format_markdown(message.content());
            if spans.iter().any(|span| !span.is_plain()) {
                writeln!(self.out)?;
                write_spans(&mut self.out, &spans, &self.theme)?;
                writeln!(self.out)?;
            }
        }
        if let Some(metrics) = format_metrics(message.first_token_latency(), message.throughput()) {
            writeln!(self.out, "{}", self.theme.metrics_style.apply(metrics))?;
        }
        writeln!(self.out)?;
        self.streamed.clear();
        self.out.flush()
    }

    pub fn failed_reply(&mut self, message: &ChatMessage) -> io::Result<()> {
        if std::mem::take(&mut self.reply_open) && !self.streamed.is_empty() {
            writeln!(self.out)?;
        }
        write_styled(&mut self.out, message.content(), self.theme.error_text_style)?;
        writeln!(self.out)?;
        if message.can_retry() {
            self.notice("Type /retry to try again.")?;
        }
        writeln!(self.out)?;
        self.streamed.clear();
        self.out.flush()
    }
}
