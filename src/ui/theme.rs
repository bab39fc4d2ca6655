use std::io::IsTerminal;

use ratatui::crossterm::style::{Color, ContentStyle, Stylize};

use crate::ui::span::StyleTag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // Formatted reply text
    pub plain_style: ContentStyle,
    pub bold_style: ContentStyle,
    pub italic_style: ContentStyle,
    pub inline_code_style: ContentStyle,
    pub code_block_style: ContentStyle,
    pub header_style: ContentStyle,
    pub math_style: ContentStyle,

    // Conversation chrome
    pub user_prefix_style: ContentStyle,
    pub user_text_style: ContentStyle,
    pub assistant_prefix_style: ContentStyle,
    pub error_text_style: ContentStyle,
    pub metrics_style: ContentStyle,
    pub notice_style: ContentStyle,
}

impl Theme {
    pub fn dark_default() -> Self {
        let plain = ContentStyle::new();
        Theme {
            plain_style: plain,
            bold_style: plain.bold(),
            italic_style: plain.italic(),
            inline_code_style: plain.with(Color::Yellow),
            code_block_style: plain.with(Color::Green),
            header_style: plain.with(Color::Magenta).bold(),
            math_style: plain.with(Color::Cyan).italic(),

            user_prefix_style: plain.with(Color::Cyan).bold(),
            user_text_style: plain.with(Color::Cyan),
            assistant_prefix_style: plain.with(Color::White).bold(),
            error_text_style: plain.with(Color::Red),
            metrics_style: plain.with(Color::DarkGrey),
            notice_style: plain.with(Color::DarkGrey).italic(),
        }
    }

    /// Attributes only, no colors. Used for `NO_COLOR` and non-terminal output.
    pub fn monochrome() -> Self {
        let plain = ContentStyle::new();
        Theme {
            plain_style: plain,
            bold_style: plain.bold(),
            italic_style: plain.italic(),
            inline_code_style: plain.reverse(),
            code_block_style: plain.dim(),
            header_style: plain.bold().underlined(),
            math_style: plain.italic(),

            user_prefix_style: plain.bold(),
            user_text_style: plain,
            assistant_prefix_style: plain.bold(),
            error_text_style: plain.bold(),
            metrics_style: plain.dim(),
            notice_style: plain.dim(),
        }
    }

    /// Picks a theme for stdout, honoring `NO_COLOR`.
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        if no_color || !std::io::stdout().is_terminal() {
            Self::monochrome()
        } else {
            Self::dark_default()
        }
    }

    pub fn style_for(&self, tag: StyleTag) -> ContentStyle {
        match tag {
            StyleTag::Plain => self.plain_style,
            StyleTag::Bold => self.bold_style,
            StyleTag::Italic => self.italic_style,
            StyleTag::InlineCode => self.inline_code_style,
            StyleTag::CodeBlock => self.code_block_style,
            StyleTag::Header => self.header_style,
            StyleTag::MathExpression => self.math_style,
        }
    }
}
