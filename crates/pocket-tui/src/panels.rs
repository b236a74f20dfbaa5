//! Content builders for the shell's views.
//!
//! Pure functions from client state to Ratatui text, so layout code in
//! [`crate::app`] stays small and these can be tested without a terminal.

use pocket_client::config_store::{PROFILE_LOADING_LABEL, PROFILE_UNKNOWN_LABEL};
use pocket_client::{ConfigSnapshot, ConfigStore, Message, Role, SessionView};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Placeholder shown in an empty input box.
pub const INPUT_PLACEHOLDER: &str = "Type a command (e.g., 'Add task to buy milk')...";

/// Shown under the transcript while a command is in flight.
pub const THINKING_LABEL: &str = "Thinking...";

/// Body of the settings view.
pub const SETTINGS_TEXT: &str = "Settings are not available yet.";

const USER_COLOR: Color = Color::Blue;
const ASSISTANT_COLOR: Color = Color::Green;
const DIM_COLOR: Color = Color::DarkGray;

/// Transcript as display lines, oldest first.
pub fn transcript_lines(view: &SessionView<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in view.transcript {
        lines.extend(message_lines(message));
        lines.push(Line::default());
    }

    if view.request_in_flight {
        lines.push(Line::from(Span::styled(
            THINKING_LABEL,
            Style::default()
                .fg(DIM_COLOR)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, color) = match message.role {
        Role::User => ("You", USER_COLOR),
        Role::Assistant => ("Pocket", ASSISTANT_COLOR),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", message.timestamp.format("%H:%M")),
            Style::default().fg(DIM_COLOR),
        ),
    ])];

    lines.extend(
        message
            .text
            .lines()
            .map(|line| Line::from(format!("  {line}"))),
    );

    if let Some(intent) = message.intent_type() {
        lines.push(Line::from(Span::styled(
            format!("  Intent: {intent}"),
            Style::default().fg(DIM_COLOR),
        )));
    }

    lines
}

/// Input box content for a box `width` cells wide (inside its borders).
///
/// Shows the placeholder when the draft is empty. A draft longer than the
/// box is cut from the left so the cursor stays visible.
pub fn input_line(view: &SessionView<'_>, width: u16) -> Line<'static> {
    if view.pending_input.is_empty() {
        return Line::from(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(DIM_COLOR)));
    }

    // "> " prefix plus the cursor cell
    let room = usize::from(width).saturating_sub(3).max(1);
    let chars = view.pending_input.chars().count();
    let visible: String = view
        .pending_input
        .chars()
        .skip(chars.saturating_sub(room))
        .collect();

    Line::from(vec![
        Span::raw(format!("> {visible}")),
        Span::styled("█", Style::default().fg(USER_COLOR)),
    ])
}

/// Sidebar footer: profile name or `Loading...`.
pub fn sidebar_profile(store: &ConfigStore) -> String {
    format!("Profile: {}", store.profile_or(PROFILE_LOADING_LABEL))
}

/// Status view: profile name or `UNKNOWN`.
pub fn status_profile(store: &ConfigStore) -> &str {
    store.profile_or(PROFILE_UNKNOWN_LABEL)
}

/// One-line explanation of the active profile.
pub fn profile_description(snapshot: Option<&ConfigSnapshot>) -> &'static str {
    match snapshot {
        Some(s) if s.is_offline_only() => "Strict offline mode. No cloud calls allowed.",
        _ => "Hybrid mode. Cloud calls allowed per policy.",
    }
}

/// Connectivity card text. Unset and failed config read the same.
pub fn connectivity_label(store: &ConfigStore) -> &'static str {
    if store.get().is_some() {
        "Connected"
    } else {
        "Not connected"
    }
}

/// Short label for a routing slot: `default_task_app` → `task`.
pub fn routing_label(slot: &str) -> String {
    slot.replacen("default_", "", 1).replacen("_app", "", 1)
}

/// Routing table rows as `(label, handler)` in slot order.
pub fn routing_rows(snapshot: Option<&ConfigSnapshot>) -> Vec<(String, String)> {
    snapshot
        .map(|s| {
            s.routing
                .iter()
                .map(|(slot, handler)| (routing_label(slot), handler.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_client::{CommandResponse, ConversationSession};
    use std::collections::BTreeMap;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn all_text(lines: &[Line<'_>]) -> String {
        lines.iter().map(line_text).collect::<Vec<_>>().join("\n")
    }

    fn snapshot(profile: &str) -> ConfigSnapshot {
        ConfigSnapshot {
            profile: profile.to_string(),
            routing: BTreeMap::from([
                ("task_app".to_string(), "todoist".to_string()),
                ("default_notes_app".to_string(), "local".to_string()),
            ]),
        }
    }

    #[test]
    fn test_transcript_shows_roles_intent_and_thinking() {
        let mut session = ConversationSession::new();
        let pending = session.submit("buy milk").into_pending().unwrap();

        let text = all_text(&transcript_lines(&session.view()));
        assert!(text.contains("Pocket"));
        assert!(text.contains("You"));
        assert!(text.contains("  buy milk"));
        assert!(text.contains(THINKING_LABEL));

        let response: CommandResponse = serde_json::from_value(serde_json::json!({
            "response_text": "Added task.",
            "intent": {"type": "create_task"}
        }))
        .unwrap();
        session.resolve(pending.id, Ok(response));

        let text = all_text(&transcript_lines(&session.view()));
        assert!(text.contains("Added task."));
        assert!(text.contains("Intent: create_task"));
        assert!(!text.contains(THINKING_LABEL));
    }

    #[test]
    fn test_multiline_message_is_indented() {
        let mut session = ConversationSession::new();
        let pending = session.submit("list").into_pending().unwrap();
        let response = CommandResponse {
            response_text: Some("one\ntwo".into()),
            ..Default::default()
        };
        session.resolve(pending.id, Ok(response));

        let lines = transcript_lines(&session.view());
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert!(texts.contains(&"  one".to_string()));
        assert!(texts.contains(&"  two".to_string()));
    }

    #[test]
    fn test_input_line_placeholder_and_draft() {
        let mut session = ConversationSession::new();
        assert_eq!(line_text(&input_line(&session.view(), 40)), INPUT_PLACEHOLDER);

        session.update_draft("hi");
        assert_eq!(line_text(&input_line(&session.view(), 40)), "> hi█");
    }

    #[test]
    fn test_long_draft_keeps_cursor_in_view() {
        let mut session = ConversationSession::new();
        session.update_draft("abcdefghijklmnopqrstuvwxyz");

        let text = line_text(&input_line(&session.view(), 10));
        assert_eq!(text, "> tuvwxyz█");
        assert_eq!(text.chars().count(), 10);
    }

    #[test]
    fn test_profile_labels_when_unset() {
        let store = ConfigStore::new();
        assert_eq!(sidebar_profile(&store), "Profile: Loading...");
        assert_eq!(status_profile(&store), "UNKNOWN");
        assert_eq!(connectivity_label(&store), "Not connected");
        assert!(routing_rows(store.get()).is_empty());
    }

    #[test]
    fn test_profile_description() {
        assert_eq!(
            profile_description(Some(&snapshot("OFFLINE_ONLY"))),
            "Strict offline mode. No cloud calls allowed."
        );
        assert_eq!(
            profile_description(Some(&snapshot("HYBRID"))),
            "Hybrid mode. Cloud calls allowed per policy."
        );
    }

    #[test]
    fn test_routing_labels() {
        assert_eq!(routing_label("task_app"), "task");
        assert_eq!(routing_label("default_calendar_app"), "calendar");
        assert_eq!(routing_label("custom"), "custom");
        assert_eq!(routing_label("default_default_x_app_app"), "default_x_app");

        let snap = snapshot("HYBRID");
        let rows = routing_rows(Some(&snap));
        assert_eq!(
            rows,
            vec![
                ("notes".to_string(), "local".to_string()),
                ("task".to_string(), "todoist".to_string()),
            ]
        );
    }
}
