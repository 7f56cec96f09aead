//! Transcript formatting for full-history display.

use crate::core::conversation::{Message, Role};

const USER_HEADING: &str = "# You said:";
const ASSISTANT_HEADING: &str = "# Model replied:";

/// Format a stored history as a Markdown document, one heading per turn,
/// suitable for [`crate::render::markdown::render_markdown`].
pub fn transcript_markdown(messages: &[Message]) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(messages.len() * 2);
    for message in messages {
        lines.push(match message.role {
            Role::User => USER_HEADING,
            Role::Assistant => ASSISTANT_HEADING,
        });
        lines.push(&message.content);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_renders_empty() {
        assert_eq!(transcript_markdown(&[]), "");
    }

    #[test]
    fn turns_alternate_headings_in_stored_order() {
        let messages = vec![
            Message::user("What is Rust?"),
            Message::assistant("A systems language."),
            Message::user("Show me."),
        ];
        assert_eq!(
            transcript_markdown(&messages),
            "# You said:\nWhat is Rust?\n# Model replied:\nA systems language.\n# You said:\nShow me."
        );
    }
}
