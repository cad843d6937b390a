//! Terminal rendering of session updates.

use std::fmt::Write as _;
use std::io;

use travelcare_assist::{ChatError, Message, SessionState, SessionUpdate};

/// Render one update as text. Empty-message rejections are silent.
pub fn render(update: &SessionUpdate) -> String {
    let mut out = String::new();

    for id in &update.removed {
        let _ = writeln!(out, "  (message {} closed)", id);
    }
    for message in &update.appended {
        out.push_str(&render_message(message));
    }
    if let Some(widget) = &update.widget {
        for line in widget.lines() {
            let _ = writeln!(out, "  | {}", line);
        }
    } else if update.widget_closed {
        out.push_str("  (widget closed)\n");
    }
    for effect in &update.effects {
        let _ = writeln!(out, "  -> {}", effect);
    }
    if update.state == Some(SessionState::AwaitingResponse) {
        out.push_str("  assistant is typing...\n");
    }
    match &update.rejected {
        None | Some(ChatError::EmptyMessage) => {}
        Some(err) => {
            let _ = writeln!(out, "  ! {}", err);
        }
    }
    out
}

fn render_message(message: &Message) -> String {
    let mut out = format!("[{}] {}: {}\n", message.id, message.sender, message.text);
    for (i, button) in message.actions.iter().enumerate() {
        let marker = if button.primary { "*" } else { " " };
        let _ = writeln!(out, "   {}{}. {}", marker, i + 1, button.label);
    }
    if let Some(widget) = &message.widget {
        let _ = writeln!(out, "   [{} widget]", widget.kind);
    }
    out
}

/// Render each appended message as one JSON line.
pub fn render_json(update: &SessionUpdate) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for message in &update.appended {
        out.push_str(&serde_json::to_string(message)?);
        out.push('\n');
    }
    for effect in &update.effects {
        out.push_str(&serde_json::to_string(effect)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write one update to `out` and flush it.
pub fn write_update(
    out: &mut impl io::Write,
    update: &SessionUpdate,
    json: bool,
) -> io::Result<()> {
    let text = if json {
        render_json(update)?
    } else {
        render(update)
    };
    out.write_all(text.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelcare_assist::{
        response, ActionButton, ActionId, Effect, MessageDraft, ResponsePayload,
    };
    use travelcare_core::types::MessageId;

    fn assistant(id: u64, draft: MessageDraft) -> Message {
        Message::from_draft(MessageId(id), draft)
    }

    #[test]
    fn test_buttons_are_numbered_from_one() {
        let update = SessionUpdate {
            appended: vec![assistant(2, MessageDraft::assistant(response::emergency()))],
            ..Default::default()
        };
        let text = render(&update);
        assert!(text.starts_with("[#2] assistant: "));
        assert!(text.contains("*1. Call Emergency (112)"));
        assert!(text.contains("  2. "));
    }

    #[test]
    fn test_effects_and_rejections() {
        let update = SessionUpdate {
            effects: vec![Effect::OpenExternal {
                uri: "tel:112".to_string(),
            }],
            rejected: Some(ChatError::NoActiveWidget),
            ..Default::default()
        };
        let text = render(&update);
        assert!(text.contains("-> open tel:112"));
        assert!(text.contains("! No widget is open"));
    }

    #[test]
    fn test_empty_message_is_silent() {
        let update = SessionUpdate {
            rejected: Some(ChatError::EmptyMessage),
            ..Default::default()
        };
        assert_eq!(render(&update), "");
    }

    #[test]
    fn test_widget_closed_line() {
        let update = SessionUpdate {
            removed: vec![MessageId(4)],
            widget_closed: true,
            ..Default::default()
        };
        let text = render(&update);
        assert!(text.contains("(message #4 closed)"));
        assert!(text.contains("(widget closed)"));
    }

    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_update_reports_errors() {
        let update = SessionUpdate {
            appended: vec![assistant(2, MessageDraft::assistant(response::greeting()))],
            ..Default::default()
        };

        let mut buf = Vec::new();
        write_update(&mut buf, &update, false).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("[#2] assistant: "));

        let err = write_update(&mut ClosedPipe, &update, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_json_lines() {
        let body = ResponsePayload::text(response::FOLLOW_UP_TEXT)
            .with_actions(vec![ActionButton::new("Emergency", ActionId::Emergency)]);
        let message = assistant(5, MessageDraft::assistant(body));
        let update = SessionUpdate {
            appended: vec![message],
            ..Default::default()
        };
        let json = render_json(&update).unwrap();
        let value: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
        assert_eq!(value["text"], response::FOLLOW_UP_TEXT);
        assert_eq!(value["actions"][0]["action"], "emergency");
    }
}
