//! Status bar widget.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::domain::entities::UnreadSnapshot;

/// Status bar severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Informational.
    Info,
    /// Success.
    Success,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl StatusLevel {
    /// Returns color for level.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Status bar widget.
#[derive(Debug, Clone)]
pub struct StatusBar {
    left: String,
    right: String,
    level: StatusLevel,
}

impl StatusBar {
    /// Creates empty status bar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            level: StatusLevel::Info,
        }
    }

    /// Sets left content.
    #[must_use]
    pub fn left(mut self, content: impl Into<String>) -> Self {
        self.left = content.into();
        self
    }

    /// Sets right content.
    #[must_use]
    pub fn right(mut self, content: impl Into<String>) -> Self {
        self.right = content.into();
        self
    }

    /// Sets status level.
    #[must_use]
    pub const fn level(mut self, level: StatusLevel) -> Self {
        self.level = level;
        self
    }

    /// Creates success status bar.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new().left(message).level(StatusLevel::Success)
    }

    /// Creates error status bar.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new().left(message).level(StatusLevel::Error)
    }

    /// Describes the refresh state of `snapshot`.
    ///
    /// A failed refresh wins over loading so the error stays visible while
    /// the next attempt runs.
    #[must_use]
    pub fn for_snapshot(snapshot: &UnreadSnapshot) -> Self {
        if let Some(error) = &snapshot.error {
            return Self::error(format!("⚠ {error}"));
        }
        if snapshot.is_loading {
            return Self::new()
                .left("Refreshing…")
                .level(StatusLevel::Warning);
        }
        match snapshot.last_updated {
            Some(at) => Self::new().left(format!("Updated {}", local_time(at))),
            None => Self::new().left("Waiting for first refresh"),
        }
    }

    /// Returns the left text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.left
    }

    /// Returns the level.
    #[must_use]
    pub const fn current_level(&self) -> StatusLevel {
        self.level
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.level.color())
            .add_modifier(Modifier::BOLD);
        let hint_style = Style::default().fg(Color::DarkGray);

        let width = area.width as usize;
        let left_len = self.left.width();
        let right_len = self.right.width();

        let mut spans = vec![Span::styled(&self.left, style)];

        if left_len + right_len < width && !self.right.is_empty() {
            spans.push(Span::raw(" ".repeat(width - left_len - right_len)));
            spans.push(Span::styled(&self.right, hint_style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
