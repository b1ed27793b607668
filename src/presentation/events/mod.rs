//! Key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Exit application.
    Quit,
    /// Forced refresh of the unread list.
    Refresh,
    /// Move selection up.
    SelectPrevious,
    /// Move selection down.
    SelectNext,
    /// Mark the selected chat as read.
    MarkRead,
    /// Show or hide chats without unread messages.
    ToggleReadChats,
    /// Key has no binding.
    Ignored,
}

/// Terminal key classifier.
pub struct EventHandler;

impl EventHandler {
    /// Maps a key event to an action. Releases and repeats are ignored.
    #[must_use]
    pub fn classify(key: &KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::Ignored;
        }
        if Self::is_quit_event(key) {
            return KeyAction::Quit;
        }
        if Self::is_submit_event(key) {
            return KeyAction::MarkRead;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('r') | KeyCode::F(5), KeyModifiers::NONE) => KeyAction::Refresh,
            (KeyCode::Up | KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::SelectPrevious,
            (KeyCode::Down | KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::SelectNext,
            (KeyCode::Char('a'), KeyModifiers::NONE) => KeyAction::ToggleReadChats,
            _ => KeyAction::Ignored,
        }
    }

    /// Checks if key is a quit event.
    #[must_use]
    pub fn is_quit_event(key: &KeyEvent) -> bool {
        matches!(
            key,
            KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::NONE,
                ..
            } | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } | KeyEvent {
                code: KeyCode::Esc,
                modifiers: KeyModifiers::NONE,
                ..
            }
        )
    }

    /// Checks if key is a submit event.
    #[must_use]
    pub fn is_submit_event(key: &KeyEvent) -> bool {
        matches!(
            key,
            KeyEvent {
                code: KeyCode::Enter,
                ..
            }
        )
    }
}
