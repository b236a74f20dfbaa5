//! Keyboard input mapping for the shell.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pocket_client::ActiveView;

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Switch to a specific view
    SelectView(ActiveView),
    /// Cycle to the next view
    NextView,
    /// Cycle to the previous view
    PrevView,
    /// Request application quit
    Quit,
    /// Text input character
    TextInput(char),
    /// Backspace in text input
    Backspace,
    /// Submit the draft
    Submit,
    /// Scroll the transcript towards older messages
    ScrollUp,
    /// Scroll the transcript towards newer messages
    ScrollDown,
    /// No action needed
    None,
}

/// Converts key events into [`AppEvent`]s.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Map a key press given the view that currently has focus.
    pub fn handle_key(&self, key: KeyEvent, view: ActiveView) -> AppEvent {
        if key.kind == KeyEventKind::Release {
            return AppEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::Quit;
        }

        match key.code {
            KeyCode::Esc => AppEvent::Quit,
            KeyCode::F(1) => AppEvent::SelectView(ActiveView::Chat),
            KeyCode::F(2) => AppEvent::SelectView(ActiveView::Status),
            KeyCode::F(3) => AppEvent::SelectView(ActiveView::Settings),
            KeyCode::Tab => AppEvent::NextView,
            KeyCode::BackTab => AppEvent::PrevView,
            KeyCode::Up => AppEvent::ScrollUp,
            KeyCode::Down => AppEvent::ScrollDown,
            _ if view == ActiveView::Chat => Self::handle_chat_key(key),
            _ => Self::handle_navigation_key(key),
        }
    }

    fn handle_chat_key(key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Enter => AppEvent::Submit,
            KeyCode::Backspace => AppEvent::Backspace,
            KeyCode::Char(c) => AppEvent::TextInput(c),
            _ => AppEvent::None,
        }
    }

    /// Outside the chat view letters are shortcuts rather than text.
    fn handle_navigation_key(key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,
            KeyCode::Char('c') | KeyCode::Char('C') => AppEvent::SelectView(ActiveView::Chat),
            KeyCode::Char('s') | KeyCode::Char('S') => AppEvent::SelectView(ActiveView::Status),
            KeyCode::Char(',') => AppEvent::SelectView(ActiveView::Settings),
            _ => AppEvent::None,
        }
    }
}
