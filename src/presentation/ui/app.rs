//! Main application orchestrator.

use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::services::{ChatUnreadStore, RefreshOptions, UnreadNotifier};
use crate::application::use_cases::MarkChatReadUseCase;
use crate::domain::entities::{ChatId, ChatSummary, Role, UnreadSnapshot};
use crate::infrastructure::config::UiConfig;
use crate::presentation::events::{EventHandler, KeyAction};
use crate::presentation::widgets::{
    ChatList, ChatListState, HeaderBar, StatusBar, visible_chats,
};

const KEY_HINTS: &str = "r refresh  ⏎ mark read  a all/unread  q quit ";

#[derive(Debug)]
enum Action {
    Snapshot(Arc<UnreadSnapshot>),
    MarkedRead {
        chat: String,
        result: Result<bool, String>,
    },
}

pub struct App {
    store: ChatUnreadStore,
    mark_read: Arc<MarkChatReadUseCase>,
    notifier: Arc<UnreadNotifier>,
    role: Role,
    ui: UiConfig,
    snapshot: Arc<UnreadSnapshot>,
    list_state: ChatListState,
    show_read: bool,
    flash: Option<StatusBar>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    exiting: bool,
}

impl App {
    #[must_use]
    pub fn new(
        store: ChatUnreadStore,
        mark_read: MarkChatReadUseCase,
        notifier: UnreadNotifier,
        role: Role,
        ui: UiConfig,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let snapshot = store.snapshot();
        let show_read = ui.show_read_chats;

        Self {
            store,
            mark_read: Arc::new(mark_read),
            notifier: Arc::new(notifier),
            role,
            ui,
            snapshot,
            list_state: ChatListState::default(),
            show_read,
            flash: None,
            action_tx,
            action_rx,
            exiting: false,
        }
    }

    /// Subscribes to the unread store and runs until the user quits.
    ///
    /// # Errors
    /// Returns error if drawing to the terminal fails.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let subscription = {
            let tx = self.action_tx.clone();
            let notifier = Arc::clone(&self.notifier);
            self.store.subscribe(move |snapshot| {
                notifier.observe(snapshot);
                let _ = tx.send(Action::Snapshot(Arc::clone(snapshot)));
            })
        };

        let result = self.run_event_loop(terminal).await;

        subscription.unsubscribe();
        info!("Application exiting normally");
        result
    }

    async fn run_event_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();

        terminal.draw(|frame| self.render(frame))?;

        while !self.exiting {
            tokio::select! {
                biased;

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                    terminal.draw(|frame| self.render(frame))?;
                }

                Some(event) = terminal_events.next() => {
                    match event {
                        Ok(Event::Key(key)) => self.handle_key(&key),
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "Failed to read terminal event"),
                    }
                    terminal.draw(|frame| self.render(frame))?;
                }

                else => break,
            }
        }

        Ok(())
    }

    fn visible(&self) -> Vec<&ChatSummary> {
        visible_chats(&self.snapshot.chats, self.show_read)
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        let len = self.visible().len();

        match EventHandler::classify(key) {
            KeyAction::Quit => self.exiting = true,
            KeyAction::Refresh => {
                debug!("Manual refresh requested");
                self.flash = None;
                // Runs on its own task; the result arrives through the subscription.
                drop(self.store.refresh(RefreshOptions::forced()));
            }
            KeyAction::SelectPrevious => self.list_state.select_previous(len),
            KeyAction::SelectNext => self.list_state.select_next(len),
            KeyAction::ToggleReadChats => {
                self.show_read = !self.show_read;
                let len = self.visible().len();
                self.list_state.clamp(len);
            }
            KeyAction::MarkRead => self.mark_selected_read(),
            KeyAction::Ignored => {}
        }
    }

    fn selected_chat(&self) -> Option<&ChatSummary> {
        let index = self.list_state.selected()?;
        self.visible().get(index).copied()
    }

    fn mark_selected_read(&self) {
        let Some(chat) = self.selected_chat() else {
            return;
        };
        let Some(last) = &chat.last_message else {
            debug!(chat_id = %chat.id, "Chat has no messages to mark");
            return;
        };

        let chat_id: ChatId = chat.id;
        let message_id = last.id;
        let name = chat.display_name();
        let use_case = Arc::clone(&self.mark_read);
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = use_case
                .execute(chat_id, message_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::MarkedRead { chat: name, result });
        });
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Snapshot(snapshot) => {
                debug!(
                    count = snapshot.count,
                    loading = snapshot.is_loading,
                    "Unread snapshot received"
                );
                self.snapshot = snapshot;
                let len = self.visible().len();
                self.list_state.clamp(len);
            }
            Action::MarkedRead { chat, result } => {
                self.flash = match result {
                    Ok(true) => Some(StatusBar::success(format!("Marked {chat} as read"))),
                    Ok(false) => None,
                    Err(e) => Some(StatusBar::error(format!("Could not mark {chat}: {e}"))),
                };
            }
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let [header_area, list_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            HeaderBar::new(crate::NAME, crate::VERSION)
                .role(self.role.label())
                .unread(self.snapshot.count)
                .loading(self.snapshot.is_loading),
            header_area,
        );

        let snapshot = Arc::clone(&self.snapshot);
        let chats = visible_chats(&snapshot.chats, self.show_read);
        frame.render_stateful_widget(
            ChatList::new(chats, &self.ui.timestamp_format).loading(snapshot.is_loading),
            list_area,
            &mut self.list_state,
        );

        let status = self
            .flash
            .clone()
            .unwrap_or_else(|| StatusBar::for_snapshot(&snapshot))
            .right(KEY_HINTS);
        frame.render_widget(&status, status_area);
    }
}
