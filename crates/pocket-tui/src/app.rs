//! Main application state and event loop for the shell.
//!
//! All state mutation happens on the loop thread. Backend calls run on the
//! tokio runtime and report back through an unbounded channel that the loop
//! drains between frames, so a command's outcome is merged into the session
//! exactly like a key press would be.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use pocket_client::{
    ActiveView, AssistantBackend, ClientError, CommandResponse, ConfigSnapshot, ConfigStore,
    ConversationSession, Navigation, PendingCommand, SubmitOutcome,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::event::{AppEvent, InputHandler};
use crate::panels;

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// How long to wait for a key before checking the backend channel again.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

const ACCENT: Color = Color::Cyan;
const BORDER_DIM: Color = Color::DarkGray;

/// Results delivered from background backend calls.
#[derive(Debug)]
pub enum BackendEvent {
    CommandFinished {
        id: u64,
        outcome: Result<CommandResponse, ClientError>,
    },
    ConfigLoaded(Option<ConfigSnapshot>),
}

/// Main application state.
pub struct App {
    navigation: Navigation,
    session: ConversationSession,
    config: ConfigStore,
    input_handler: InputHandler,
    backend: Arc<dyn AssistantBackend>,
    runtime: Handle,
    events_tx: UnboundedSender<BackendEvent>,
    events_rx: UnboundedReceiver<BackendEvent>,
    /// Lines scrolled back from the newest transcript entry
    scroll_back: u16,
    should_quit: bool,
}

impl App {
    /// Create an app talking to `backend`, spawning work on `runtime`.
    pub fn new(backend: Arc<dyn AssistantBackend>, runtime: Handle, greeting: &str) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            navigation: Navigation::new(),
            session: ConversationSession::with_greeting(greeting),
            config: ConfigStore::new(),
            input_handler: InputHandler::new(),
            backend,
            runtime,
            events_tx,
            events_rx,
            scroll_back: 0,
            should_quit: false,
        }
    }

    pub fn current_view(&self) -> ActiveView {
        self.navigation.current()
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Start the one-time config fetch in the background.
    pub fn start(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let mut store = ConfigStore::new();
            store.load(backend.as_ref()).await;
            let _ = tx.send(BackendEvent::ConfigLoaded(store.get().cloned()));
        });
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key, self.current_view());
        self.handle_app_event(event);
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SelectView(view) => self.navigation.select(view),
            AppEvent::NextView => self.navigation.select_next(),
            AppEvent::PrevView => self.navigation.select_prev(),
            AppEvent::Quit => self.should_quit = true,
            AppEvent::TextInput(c) => self.session.push_draft_char(c),
            AppEvent::Backspace => self.session.pop_draft_char(),
            AppEvent::Submit => self.submit(),
            AppEvent::ScrollUp => self.scroll_back = self.scroll_back.saturating_add(1),
            AppEvent::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(1),
            AppEvent::None => {}
        }
    }

    fn submit(&mut self) {
        if let SubmitOutcome::Sent(pending) = self.session.submit_draft() {
            self.scroll_back = 0;
            self.spawn_command(pending);
        }
    }

    fn spawn_command(&self, pending: PendingCommand) {
        debug!(command_id = pending.id, backend = self.backend.name(), "dispatching command");
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let outcome = backend.send_command(&pending.text).await;
            let _ = tx.send(BackendEvent::CommandFinished {
                id: pending.id,
                outcome,
            });
        });
    }

    /// Merge a finished backend call into app state.
    pub fn apply_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::CommandFinished { id, outcome } => {
                self.session.resolve(id, outcome);
            }
            BackendEvent::ConfigLoaded(snapshot) => self.config.set(snapshot),
        }
    }

    /// Apply every backend event received so far. Returns how many.
    pub fn drain_backend_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_backend_event(event);
            applied += 1;
        }
        applied
    }

    /// Run the main application loop.
    pub fn run(&mut self) -> AppResult<()> {
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.start();
        let result = self.run_loop(&mut terminal);

        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> AppResult<()> {
        info!("shell started");
        while !self.should_quit {
            self.drain_backend_events();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(EVENT_POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_event(key);
                }
            }
        }
        info!("shell exiting");
        Ok(())
    }

    /// Draw the UI.
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(20)])
            .split(rows[0]);

        self.draw_sidebar(frame, columns[0]);
        match self.current_view() {
            ActiveView::Chat => self.draw_chat(frame, columns[1]),
            ActiveView::Status => self.draw_status(frame, columns[1]),
            ActiveView::Settings => self.draw_settings(frame, columns[1]),
        }
        self.draw_footer(frame, rows[1]);
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        let mut lines = vec![
            Line::from(Span::styled(
                "POCKET-AI",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
        ];
        for (idx, view) in ActiveView::ALL.iter().enumerate() {
            let label = format!(" F{} {} ", idx + 1, view.title());
            let style = if *view == self.current_view() {
                Style::default().fg(Color::Black).bg(ACCENT)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(label, style)));
        }

        let nav = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER_DIM)),
        );
        frame.render_widget(nav, chunks[0]);

        let profile = Paragraph::new(panels::sidebar_profile(&self.config)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER_DIM)),
        );
        frame.render_widget(profile, chunks[1]);
    }

    fn draw_chat(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.view();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        // Scroll offsets count rendered rows, so measure after wrapping.
        let transcript =
            Paragraph::new(panels::transcript_lines(&view)).wrap(Wrap { trim: false });
        let inner_width = chunks[0].width.saturating_sub(2);
        let visible = chunks[0].height.saturating_sub(2);
        let bottom = u16::try_from(transcript.line_count(inner_width))
            .unwrap_or(u16::MAX)
            .saturating_sub(visible);
        let offset = bottom.saturating_sub(self.scroll_back);

        let transcript = transcript
            .block(panel_block("Chat", true))
            .scroll((offset, 0));
        frame.render_widget(transcript, chunks[0]);

        let title = if view.request_in_flight {
            "Input (waiting for reply)"
        } else {
            "Input"
        };
        let input_width = chunks[1].width.saturating_sub(2);
        let input = Paragraph::new(panels::input_line(&view, input_width))
            .block(panel_block(title, !view.request_in_flight));
        frame.render_widget(input, chunks[1]);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let snapshot = self.config.get();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(4)])
            .split(area);
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[0]);

        let profile = Paragraph::new(vec![
            Line::from(Span::styled(
                panels::status_profile(&self.config).to_string(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::from(panels::profile_description(snapshot)),
        ])
        .wrap(Wrap { trim: true })
        .block(panel_block("Security Profile", false));
        frame.render_widget(profile, cards[0]);

        let connectivity = Paragraph::new(panels::connectivity_label(&self.config))
            .block(panel_block("Connectivity", false));
        frame.render_widget(connectivity, cards[1]);

        let rows: Vec<Line> = panels::routing_rows(snapshot)
            .into_iter()
            .map(|(label, handler)| {
                Line::from(vec![
                    Span::styled(format!("{label:<12}"), Style::default().fg(Color::Gray)),
                    Span::styled(handler, Style::default().add_modifier(Modifier::BOLD)),
                ])
            })
            .collect();
        let routing = Paragraph::new(rows).block(panel_block("App Routing", false));
        frame.render_widget(routing, chunks[1]);
    }

    fn draw_settings(&self, frame: &mut Frame, area: Rect) {
        let settings = Paragraph::new(panels::SETTINGS_TEXT)
            .style(Style::default().fg(Color::Gray))
            .block(panel_block("Settings", false));
        frame.render_widget(settings, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.current_view() {
            ActiveView::Chat => "Enter send  ↑/↓ scroll  Tab next view  Esc quit",
            _ => "F1 chat  F2 status  F3 settings  Tab next view  q quit",
        };
        let footer = Paragraph::new(hints).style(Style::default().fg(BORDER_DIM));
        frame.render_widget(footer, area);
    }
}

fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let border = if focused { ACCENT } else { BORDER_DIM };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_client::types::COMMAND_ERROR_TEXT;
    use pocket_client::{MockBackend, SessionState};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use std::collections::BTreeMap;

    fn test_app(backend: MockBackend) -> App {
        App::new(Arc::new(backend), Handle::current(), "Hello from the test")
    }

    fn render_app(app: &App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_to_string(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut result = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                result.push_str(buffer[(x, y)].symbol());
            }
            result.push('\n');
        }
        result
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_app_event(AppEvent::TextInput(c));
        }
    }

    async fn wait_for_events(app: &mut App, expected: usize) {
        let mut seen = 0;
        for _ in 0..200 {
            seen += app.drain_backend_events();
            if seen >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {expected} backend events, saw {seen}");
    }

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot {
            profile: "OFFLINE_ONLY".into(),
            routing: BTreeMap::from([("task_app".to_string(), "todoist".to_string())]),
        }
    }

    #[tokio::test]
    async fn test_app_starts_on_chat_with_greeting() {
        let app = test_app(MockBackend::new());
        assert_eq!(app.current_view(), ActiveView::Chat);
        assert_eq!(app.session().transcript().len(), 1);
        assert!(!app.should_quit());

        let screen = buffer_to_string(&render_app(&app, 100, 30));
        assert!(screen.contains("POCKET-AI"));
        assert!(screen.contains("Hello from the test"));
        assert!(screen.contains("Profile: Loading..."));
        assert!(screen.contains(panels::INPUT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_navigation_events() {
        let mut app = test_app(MockBackend::new());
        app.handle_app_event(AppEvent::SelectView(ActiveView::Settings));
        assert_eq!(app.current_view(), ActiveView::Settings);
        assert!(buffer_to_string(&render_app(&app, 100, 30)).contains(panels::SETTINGS_TEXT));

        app.handle_app_event(AppEvent::NextView);
        assert_eq!(app.current_view(), ActiveView::Chat);
        app.handle_app_event(AppEvent::PrevView);
        assert_eq!(app.current_view(), ActiveView::Settings);

        app.handle_app_event(AppEvent::Quit);
        assert!(app.should_quit());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_submit_round_trip_through_channel() {
        let backend = MockBackend::new().with_text("Added task.").with_delay(10);
        let mut app = test_app(backend);

        type_text(&mut app, "buy milk");
        app.handle_app_event(AppEvent::Submit);

        assert_eq!(app.session().state(), SessionState::Awaiting);
        assert_eq!(app.session().transcript().len(), 2);
        assert_eq!(app.session().pending_input(), "");
        assert!(buffer_to_string(&render_app(&app, 100, 30)).contains(panels::THINKING_LABEL));

        // Typing while awaiting is fine; submitting is ignored.
        type_text(&mut app, "again");
        app.handle_app_event(AppEvent::Submit);
        assert_eq!(app.session().transcript().len(), 2);

        wait_for_events(&mut app, 1).await;
        assert_eq!(app.session().state(), SessionState::Idle);
        assert_eq!(app.session().transcript().len(), 3);
        assert_eq!(app.session().transcript()[2].text, "Added task.");
        assert_eq!(app.session().pending_input(), "again");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_failed_command_shows_error_message() {
        let mut app = test_app(MockBackend::new().failing());
        type_text(&mut app, "hello");
        app.handle_app_event(AppEvent::Submit);

        wait_for_events(&mut app, 1).await;
        assert_eq!(
            app.session().transcript().last().unwrap().text,
            COMMAND_ERROR_TEXT
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_start_loads_config_for_status_view() {
        let mut app = test_app(MockBackend::new().with_config(snapshot()));
        app.start();
        wait_for_events(&mut app, 1).await;

        app.handle_app_event(AppEvent::SelectView(ActiveView::Status));
        let screen = buffer_to_string(&render_app(&app, 100, 30));
        assert!(screen.contains("OFFLINE_ONLY"));
        assert!(screen.contains("Strict offline mode."));
        assert!(screen.contains("Connected"));
        assert!(screen.contains("task"));
        assert!(screen.contains("todoist"));
        assert!(screen.contains("Profile: OFFLINE_ONLY"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_config_failure_renders_fallbacks() {
        let mut app = test_app(MockBackend::new());
        app.start();
        wait_for_events(&mut app, 1).await;
        assert!(app.config().get().is_none());

        app.handle_app_event(AppEvent::SelectView(ActiveView::Status));
        let screen = buffer_to_string(&render_app(&app, 100, 30));
        assert!(screen.contains("UNKNOWN"));
        assert!(screen.contains("Not connected"));
        assert!(screen.contains("Profile: Loading..."));
    }

    #[tokio::test]
    async fn test_stale_command_event_is_ignored() {
        let mut app = test_app(MockBackend::new());
        app.apply_backend_event(BackendEvent::CommandFinished {
            id: 42,
            outcome: Ok(CommandResponse::default()),
        });
        assert_eq!(app.session().transcript().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_wrapped_transcript_stays_scrolled_to_newest() {
        let mut app = test_app(MockBackend::new().with_text("Done.").with_delay(50));
        type_text(&mut app, &"word ".repeat(60));
        app.handle_app_event(AppEvent::Submit);
        assert_eq!(app.session().state(), SessionState::Awaiting);

        let screen = buffer_to_string(&render_app(&app, 60, 16));
        assert!(screen.contains(panels::THINKING_LABEL), "screen:\n{screen}");

        wait_for_events(&mut app, 1).await;
        let screen = buffer_to_string(&render_app(&app, 60, 16));
        assert!(screen.contains("Done."), "screen:\n{screen}");
        assert!(!screen.contains(panels::THINKING_LABEL));
    }

    #[tokio::test]
    async fn test_long_draft_shows_its_end() {
        let mut app = test_app(MockBackend::new());
        type_text(&mut app, &"x".repeat(80));
        type_text(&mut app, "END");

        let screen = buffer_to_string(&render_app(&app, 60, 16));
        assert!(screen.contains("END█"), "screen:\n{screen}");
    }

    #[tokio::test]
    async fn test_small_terminal_does_not_panic() {
        let mut app = test_app(MockBackend::new());
        for view in ActiveView::ALL {
            app.handle_app_event(AppEvent::SelectView(view));
            render_app(&app, 30, 8);
        }
    }
}
