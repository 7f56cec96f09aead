//! Markdown to plain terminal text.
//!
//! Answers come back from the provider as Markdown; this strips the markup
//! down to readable terminal output. Pure function, no state.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Render a Markdown string as plain terminal text: inline markup is
/// dropped, list items get bullets or numbers, code blocks are indented,
/// inline code keeps its backticks.
pub fn render_markdown(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if list_stack.is_empty() {
                    ensure_blank_line(&mut out);
                }
            }
            Event::End(TagEnd::Paragraph) => push_newline(&mut out),
            Event::Start(Tag::Heading { .. }) => ensure_blank_line(&mut out),
            Event::End(TagEnd::Heading(_)) => push_newline(&mut out),
            Event::Start(Tag::List(start)) => {
                if list_stack.is_empty() {
                    ensure_blank_line(&mut out);
                }
                list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
            }
            Event::Start(Tag::Item) => {
                push_newline(&mut out);
                let indent = "  ".repeat(list_stack.len().saturating_sub(1));
                match list_stack.last_mut() {
                    Some(Some(number)) => {
                        out.push_str(&format!("{indent}{number}. "));
                        *number += 1;
                    }
                    _ => out.push_str(&format!("{indent}• ")),
                }
            }
            Event::End(TagEnd::Item) => push_newline(&mut out),
            Event::Start(Tag::CodeBlock(_)) => {
                ensure_blank_line(&mut out);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                push_newline(&mut out);
            }
            Event::Text(text) => {
                if in_code_block {
                    for line in text.lines() {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                } else {
                    out.push_str(&text);
                }
            }
            Event::Code(code) => {
                out.push('`');
                out.push_str(&code);
                out.push('`');
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str("────────\n");
            }
            Event::TaskListMarker(done) => {
                out.push_str(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}
