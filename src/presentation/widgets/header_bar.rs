use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::domain::entities::badge_text;

pub struct HeaderBarStyle {
    pub background: Style,
    pub app_name: Style,
    pub version: Style,
    pub role: Style,
    pub badge_unread: Style,
    pub badge_clear: Style,
    pub badge_loading: Style,
}

impl Default for HeaderBarStyle {
    fn default() -> Self {
        Self {
            background: Style::default().bg(Color::Black),
            app_name: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            version: Style::default().bg(Color::DarkGray).fg(Color::White),
            role: Style::default().fg(Color::Gray),
            badge_unread: Style::default()
                .bg(Color::Red)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            badge_clear: Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            badge_loading: Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Top bar with the app name, signed-in role and unread badge.
pub struct HeaderBar<'a> {
    app_name: &'a str,
    version: &'a str,
    role: Option<&'a str>,
    unread: usize,
    loading: bool,
    style: HeaderBarStyle,
}

impl<'a> HeaderBar<'a> {
    #[must_use]
    pub fn new(app_name: &'a str, version: &'a str) -> Self {
        Self {
            app_name,
            version,
            role: None,
            unread: 0,
            loading: false,
            style: HeaderBarStyle::default(),
        }
    }

    #[must_use]
    pub const fn role(mut self, role: &'a str) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub const fn unread(mut self, count: usize) -> Self {
        self.unread = count;
        self
    }

    #[must_use]
    pub const fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub fn style(mut self, style: HeaderBarStyle) -> Self {
        self.style = style;
        self
    }

    fn badge(&self) -> (String, Style) {
        match badge_text(self.unread) {
            Some(text) => (format!(" ● {text} UNREAD "), self.style.badge_unread),
            None if self.loading => (" ◐ LOADING ".to_string(), self.style.badge_loading),
            None => (" ○ ALL READ ".to_string(), self.style.badge_clear),
        }
    }
}

impl Widget for HeaderBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        for x in area.left()..area.right() {
            buf[(x, area.y)]
                .set_char(' ')
                .set_style(self.style.background);
        }

        let mut left_spans = vec![
            Span::styled(
                format!(" {} ", self.app_name.to_uppercase()),
                self.style.app_name,
            ),
            Span::raw(" "),
            Span::styled(format!(" v{} ", self.version), self.style.version),
        ];
        if let Some(role) = self.role {
            left_spans.push(Span::styled(format!("  {role}"), self.style.role));
        }

        let left_line = Line::from(left_spans);
        let left_width = left_line.width() as u16;
        let left_area = Rect::new(area.x, area.y, left_width.min(area.width), 1);
        Paragraph::new(left_line).render(left_area, buf);

        let (badge, badge_style) = self.badge();
        let badge_width = badge.width() as u16;

        if badge_width < area.width.saturating_sub(left_width) {
            let right_x = area.right().saturating_sub(badge_width);
            let right_area = Rect::new(right_x, area.y, badge_width, 1);
            Paragraph::new(Span::styled(badge, badge_style)).render(right_area, buf);
        }
    }
}
