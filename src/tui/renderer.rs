//! Full-screen rendering of a client session

use super::commands::HELP;
use super::spinner;
use super::theme::Theme;
use crate::client::{ClientSession, Notice, RequestStatus};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, Stylize},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Text,
    Dim,
    Success,
    Error,
    Spinner,
    Command,
}

/// One screen line before styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub style: LineStyle,
}

impl Line {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// What the shell shows besides the session itself
#[derive(Debug, Clone, Default)]
pub struct View {
    pub notice: Option<Notice>,
    pub show_help: bool,
    pub tick: usize,
}

pub struct TerminalRenderer {
    theme: Theme,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
        }
    }

    fn color(&self, style: LineStyle) -> Color {
        match style {
            LineStyle::Title => self.theme.title,
            LineStyle::Heading => self.theme.heading,
            LineStyle::Text => self.theme.text,
            LineStyle::Dim => self.theme.dim,
            LineStyle::Success => self.theme.success,
            LineStyle::Error => self.theme.error,
            LineStyle::Spinner => self.theme.spinner,
            LineStyle::Command => self.theme.command,
        }
    }

    /// Lay out the screen for a session
    pub fn layout(&self, session: &ClientSession, view: &View) -> Vec<Line> {
        let mut lines = vec![
            Line::new("  Prompt Optimizer", LineStyle::Title),
            Line::new(
                "  Reduce token usage while maintaining prompt effectiveness",
                LineStyle::Dim,
            ),
            Line::new("", LineStyle::Text),
            Line::new("Original Prompt", LineStyle::Heading),
        ];

        if session.input_text.is_empty() {
            lines.push(Line::new(
                "  Enter your AI prompt here... (Ctrl/Cmd + Enter to optimize)",
                LineStyle::Dim,
            ));
        } else {
            lines.extend(
                session
                    .input_text
                    .split('\n')
                    .map(|l| Line::new(format!("  {}", l), LineStyle::Text)),
            );
        }

        let auto_clear = if session.auto_clear_enabled { "on" } else { "off" };
        lines.push(Line::new(
            format!(
                "  {} characters | Auto clear: {}",
                session.input_chars(),
                auto_clear
            ),
            LineStyle::Dim,
        ));
        lines.push(Line::new("", LineStyle::Text));

        lines.push(Line::new("Optimized Prompt", LineStyle::Heading));
        if session.output_text.is_empty() {
            lines.push(Line::new(
                "  Optimized prompt will appear here...",
                LineStyle::Dim,
            ));
        } else {
            lines.extend(
                session
                    .output_text
                    .split('\n')
                    .map(|l| Line::new(format!("  {}", l), LineStyle::Text)),
            );
        }

        lines.push(Line::new(
            format!("  {} characters", session.output_chars()),
            LineStyle::Dim,
        ));
        if let Some(percent) = session.reduction_percentage() {
            lines.push(Line::new(
                format!("  {:.1}% reduction", percent),
                LineStyle::Success,
            ));
        }
        if session.copy_feedback_active() {
            lines.push(Line::new("  \u{2713} Copied", LineStyle::Success));
        }
        lines.push(Line::new("", LineStyle::Text));

        if session.status == RequestStatus::Pending {
            lines.push(Line::new(
                format!("{} Optimizing...", spinner::frame(view.tick)),
                LineStyle::Spinner,
            ));
        }

        if let Some(notice) = view.notice {
            let style = if notice.is_error() {
                LineStyle::Error
            } else {
                LineStyle::Success
            };
            lines.push(Line::new(
                format!("{}: {}", notice.title(), notice.message()),
                style,
            ));
        }

        if view.show_help {
            lines.push(Line::new("", LineStyle::Text));
            lines.extend(
                HELP.iter()
                    .map(|(key, desc)| Line::new(format!("  {:<16} {}", key, desc), LineStyle::Command)),
            );
        } else {
            lines.push(Line::new(
                "Ctrl+Enter optimize | Ctrl+Y copy | F1 help | Esc quit",
                LineStyle::Dim,
            ));
        }

        lines
    }

    /// Clear the screen and draw the session
    pub fn draw(&self, out: &mut impl Write, session: &ClientSession, view: &View) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in self.layout(session, view) {
            // Raw mode: explicit carriage return
            queue!(
                out,
                Print(line.text.as_str().with(self.color(line.style))),
                Print("\r\n")
            )?;
        }
        out.flush()
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}
