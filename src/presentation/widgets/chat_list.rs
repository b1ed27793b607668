//! Conversation list widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::entities::ChatSummary;

const PREVIEW_WIDTH: usize = 48;

/// Chats shown for the current filter, in backend order.
#[must_use]
pub fn visible_chats(chats: &[ChatSummary], show_read: bool) -> Vec<&ChatSummary> {
    chats
        .iter()
        .filter(|chat| show_read || chat.has_unread())
        .collect()
}

/// Cuts `text` to `max_width` columns, ending with `…` when shortened.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

/// Selection state of the list.
#[derive(Debug, Default)]
pub struct ChatListState {
    list_state: ListState,
}

impl ChatListState {
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let next = self.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(next));
    }

    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let previous = self.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(previous));
    }

    /// Keeps the selection inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        match (self.selected(), len) {
            (_, 0) => self.list_state.select(None),
            (None, _) => self.list_state.select(Some(0)),
            (Some(i), _) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }
}

/// Renders conversations with an unread marker, preview and time.
pub struct ChatList<'a> {
    chats: Vec<&'a ChatSummary>,
    timestamp_format: &'a str,
    loading: bool,
}

impl<'a> ChatList<'a> {
    #[must_use]
    pub fn new(chats: Vec<&'a ChatSummary>, timestamp_format: &'a str) -> Self {
        Self {
            chats,
            timestamp_format,
            loading: false,
        }
    }

    #[must_use]
    pub const fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    fn row(&self, chat: &ChatSummary) -> ListItem<'a> {
        let unread = chat.has_unread();
        let (marker, name_style) = if unread {
            (
                Span::styled("● ", Style::default().fg(Color::Red)),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else {
            (Span::raw("  "), Style::default().fg(Color::Gray))
        };

        let mut spans = vec![marker, Span::styled(chat.display_name(), name_style)];

        if let Some(last) = &chat.last_message {
            if let Some(sent_at) = last.sent_at {
                spans.push(Span::styled(
                    format!("  {}", sent_at.format(self.timestamp_format)),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let preview = format!("{}: {}", last.sender.name, last.message);
            spans.push(Span::styled(
                format!("  {}", truncate_to_width(&preview, PREVIEW_WIDTH)),
                Style::default().fg(Color::Gray),
            ));
        }

        ListItem::new(Line::from(spans))
    }
}

impl StatefulWidget for ChatList<'_> {
    type State = ChatListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Conversations ")
            .title_style(Style::default().add_modifier(Modifier::BOLD));

        if self.chats.is_empty() {
            let text = if self.loading {
                "Loading conversations…"
            } else {
                "No unread conversations"
            };
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                .block(block)
                .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = self.chats.iter().map(|chat| self.row(chat)).collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        state.clamp(self.chats.len());
        StatefulWidget::render(list, area, buf, &mut state.list_state);
    }
}
