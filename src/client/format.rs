// ABOUTME: Lightweight markdown-to-HTML formatter for chat message bodies
// ABOUTME: Regex passes in fixed order: fences, inline code, bold, italic, lists, paragraphs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Message Formatter
//!
//! A best-effort transform, not a markdown parser. The input is HTML-escaped
//! first, then each construct is rewritten by an independent pass:
//!
//! 1. fenced code blocks (```` ```lang ````) become `<pre><code>`
//! 2. inline code spans become `<code>`
//! 3. `**bold**` becomes `<strong>`
//! 4. `*italic*` becomes `<em>`
//! 5. `-`, `*`, `+` and `1.` items become `<li>`, each contiguous run wrapped in `<ul>`/`<ol>`
//! 6. blank lines split paragraphs; single newlines become `<br>`
//!
//! Code produced by passes 1 and 2 is swapped out for placeholders until the
//! end so later passes never rewrite code content.
//!
//! ## Known limitations
//!
//! Nested or overlapping constructs (bold inside italic, lists inside list
//! items, emphasis spanning lines) are not handled. The formatter is re-run on
//! the whole accumulated text after every delta, so a construct that is still
//! open renders as plain text until its closing marker arrives.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Marks a protected span; never produced by HTML escaping
const SHIELD: char = '\u{0}';

static FENCE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```([\w+#-]*)\r?\n?(.*?)```").ok());

static INLINE_CODE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").ok());

static BOLD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").ok());

// Opening marker must touch a word so `* item` and `2 * 3` are left alone
static ITALIC_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*\n]*)\*").ok());

static UNORDERED_ITEM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.+)$").ok());

static ORDERED_ITEM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+(.+)$").ok());

static PARAGRAPH_BREAK_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").ok());

static SHIELD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x00(\d+)\x00").ok());

/// Render message text as HTML
#[must_use]
pub fn format_message(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned: String = text.chars().filter(|&c| c != SHIELD).collect();
    let escaped = html_escape::encode_text(&cleaned).into_owned();

    let mut shielded = Vec::new();
    let text = replace_fences(&escaped, &mut shielded);
    let text = replace_inline_code(&text, &mut shielded);
    let text = replace_pattern(&BOLD_PATTERN, &text, "<strong>$1</strong>");
    let text = replace_pattern(&ITALIC_PATTERN, &text, "<em>$1</em>");
    let text = wrap_lists(&text);
    let text = wrap_paragraphs(&text, &shielded);

    restore_shielded(&text, &shielded)
}

fn shield(shielded: &mut Vec<String>, html: String) -> String {
    let token = format!("{SHIELD}{}{SHIELD}", shielded.len());
    shielded.push(html);
    token
}

fn replace_fences(text: &str, shielded: &mut Vec<String>) -> String {
    let Some(pattern) = FENCE_PATTERN.as_ref() else {
        return text.to_owned();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let language = caps.get(1).map_or("", |m| m.as_str());
            let code = caps.get(2).map_or("", |m| m.as_str());
            let html = if language.is_empty() {
                format!("<pre><code>{code}</code></pre>")
            } else {
                format!("<pre><code class=\"language-{language}\">{code}</code></pre>")
            };
            // Own paragraph so it is never wrapped in <p>
            format!("\n\n{}\n\n", shield(shielded, html))
        })
        .into_owned()
}

fn replace_inline_code(text: &str, shielded: &mut Vec<String>) -> String {
    let Some(pattern) = INLINE_CODE_PATTERN.as_ref() else {
        return text.to_owned();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let code = caps.get(1).map_or("", |m| m.as_str());
            shield(shielded, format!("<code>{code}</code>"))
        })
        .into_owned()
}

fn replace_pattern(pattern: &LazyLock<Option<Regex>>, text: &str, replacement: &str) -> String {
    pattern.as_ref().map_or_else(
        || text.to_owned(),
        |re| re.replace_all(text, replacement).into_owned(),
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    const fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

fn list_item(line: &str) -> Option<(ListKind, String)> {
    let capture = |pattern: &LazyLock<Option<Regex>>| {
        pattern
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end().to_owned())
    };

    capture(&UNORDERED_ITEM_PATTERN)
        .map(|item| (ListKind::Unordered, item))
        .or_else(|| capture(&ORDERED_ITEM_PATTERN).map(|item| (ListKind::Ordered, item)))
}

/// Turn list lines into `<li>` and wrap each contiguous same-kind run as its own block
fn wrap_lists(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut run: Option<(ListKind, Vec<String>)> = None;

    let close = |lines: &mut Vec<String>, run: Option<(ListKind, Vec<String>)>| {
        if let Some((kind, items)) = run {
            let tag = kind.tag();
            let body: String = items.iter().map(|item| format!("<li>{item}</li>")).collect();
            lines.push(String::new());
            lines.push(format!("<{tag}>{body}</{tag}>"));
            lines.push(String::new());
        }
    };

    for line in text.split('\n') {
        let Some((kind, item)) = list_item(line) else {
            close(&mut lines, run.take());
            lines.push(line.to_owned());
            continue;
        };

        if let Some((_, items)) = run.as_mut().filter(|(current, _)| *current == kind) {
            items.push(item);
            continue;
        }

        close(&mut lines, run.take());
        run = Some((kind, vec![item]));
    }
    close(&mut lines, run);

    lines.join("\n")
}

/// Lists and lone fenced code blocks are not wrapped in `<p>`
fn is_block(paragraph: &str, shielded: &[String]) -> bool {
    if paragraph.starts_with("<ul>") || paragraph.starts_with("<ol>") {
        return true;
    }

    paragraph
        .strip_prefix(SHIELD)
        .and_then(|rest| rest.strip_suffix(SHIELD))
        .and_then(|index| index.parse::<usize>().ok())
        .and_then(|index| shielded.get(index))
        .is_some_and(|html| html.starts_with("<pre>"))
}

fn wrap_paragraphs(text: &str, shielded: &[String]) -> String {
    let paragraphs: Vec<&str> = PARAGRAPH_BREAK_PATTERN.as_ref().map_or_else(
        || text.split("\n\n").collect(),
        |re| re.split(text).collect(),
    );

    paragraphs
        .into_iter()
        .map(|p| p.trim_matches('\n'))
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            if is_block(p, shielded) {
                p.to_owned()
            } else {
                format!("<p>{}</p>", p.replace('\n', "<br>"))
            }
        })
        .collect()
}

fn restore_shielded(text: &str, shielded: &[String]) -> String {
    let Some(pattern) = SHIELD_PATTERN.as_ref() else {
        return text.to_owned();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .and_then(|index| shielded.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_code(html: &str) -> String {
        let start = html.find("<code").unwrap();
        let open_end = start + html[start..].find('>').unwrap() + 1;
        let close = html.find("</code>").unwrap();
        html_escape::decode_html_entities(&html[open_end..close]).into_owned()
    }

    #[test]
    fn test_fenced_code_round_trip_preserves_whitespace() {
        let code = "fn main() {\n    let x = a < b && *p;\n\n    **not bold**\n}\n";
        let html = format_message(&format!("Look:\n\n```rust\n{code}```\n\nDone."));
        assert!(html.contains("<pre><code class=\"language-rust\">"));
        assert_eq!(extract_code(&html), code);
        assert!(html.starts_with("<p>Look:</p>"));
        assert!(html.ends_with("<p>Done.</p>"));
    }

    #[test]
    fn test_crlf_after_fence_language_is_dropped() {
        let html = format_message("```rust\r\nlet x = 1;\r\n```");
        assert!(html.contains("<pre><code class=\"language-rust\">"));
        assert_eq!(extract_code(&html), "let x = 1;\r\n");
    }

    #[test]
    fn test_inline_code_is_not_emphasised() {
        let html = format_message("Use `a*b*c` here");
        assert_eq!(html, "<p>Use <code>a*b*c</code> here</p>");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            format_message("**strong** and *soft*"),
            "<p><strong>strong</strong> and <em>soft</em></p>"
        );
        assert_eq!(format_message("2 * 3 * 4"), "<p>2 * 3 * 4</p>");
    }

    #[test]
    fn test_lists_wrap_each_run() {
        let html = format_message("Items:\n- one\n- two\n\n1. first\n2. second");
        assert_eq!(
            html,
            "<p>Items:</p><ul><li>one</li><li>two</li></ul><ol><li>first</li><li>second</li></ol>"
        );
    }

    #[test]
    fn test_paragraphs_and_line_breaks() {
        assert_eq!(
            format_message("line one\nline two\n\nnext"),
            "<p>line one<br>line two</p><p>next</p>"
        );
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            format_message("<script>alert(1)</script>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_unclosed_fence_renders_as_text() {
        let html = format_message("```py\nprint(1)");
        assert!(!html.contains("<pre>"));
        assert!(html.contains("print(1)"));
    }

    #[test]
    fn test_lone_inline_code_is_still_a_paragraph() {
        assert_eq!(format_message("`cargo test`"), "<p><code>cargo test</code></p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_message(""), "");
    }
}
