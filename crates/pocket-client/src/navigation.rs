//! Which top-level view is active.

use std::fmt;

/// The fixed set of views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveView {
    /// Conversation transcript and input box
    #[default]
    Chat,
    /// Security profile, connectivity and app routing
    Status,
    /// Placeholder for client settings
    Settings,
}

impl ActiveView {
    /// All views in sidebar order.
    pub const ALL: [ActiveView; 3] = [ActiveView::Chat, ActiveView::Status, ActiveView::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            ActiveView::Chat => "Chat",
            ActiveView::Status => "Status",
            ActiveView::Settings => "Settings",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Active view selection. Starts on [`ActiveView::Chat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigation {
    current: ActiveView,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ActiveView {
        self.current
    }

    pub fn select(&mut self, view: ActiveView) {
        self.current = view;
    }

    pub fn select_next(&mut self) {
        self.current = self.current.next();
    }

    pub fn select_prev(&mut self) {
        self.current = self.current.prev();
    }
}
