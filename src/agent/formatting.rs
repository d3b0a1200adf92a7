// src/agent/formatting.rs
//! Whitespace and delimiter cleanup for model output.
//!
//! Only whitespace and repeated emphasis markers are touched; words are never
//! added or removed. Every pass is idempotent, so plans that travel back and
//! forth between client and server do not drift.

use regex::{Captures, Regex};

lazy_static::lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"\r\n?").unwrap();
    static ref WHITESPACE_ONLY_LINE: Regex = Regex::new(r"(?m)^[ \t]+$").unwrap();
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref RUN_OF_ASTERISKS: Regex = Regex::new(r"\*{4,}").unwrap();
    static ref EMPTY_BOLD: Regex = Regex::new(r"(^|[^*\w])\*\*[ \t]+\*\*([^*\w]|$)").unwrap();
    static ref EMPTY_ITALIC: Regex = Regex::new(r"(^|[^*\w])\*[ \t]+\*([^*\w]|$)").unwrap();
    static ref COLON: Regex = Regex::new(r"([^\s:])([ \t]*):([ \t]*)").unwrap();
    static ref HEADER: Regex = Regex::new(r"^#{1,6} ").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^(?:[-*+] |\d+\. )").unwrap();
}

/// Clean up LLM markdown: blank-line runs, broken emphasis, colon spacing,
/// paragraph breaks after headers and list items, outer whitespace.
pub fn clean_response_formatting(text: &str) -> String {
    let text = LINE_BREAK.replace_all(text, "\n");
    let text = WHITESPACE_ONLY_LINE.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    // Structural passes anchor on line starts, so leading indent must go first.
    let text = text.trim();

    let text = RUN_OF_ASTERISKS.replace_all(text, "**");
    let text = collapse_empty_emphasis(&text);
    let text = normalize_colons(&text);
    let text = insert_paragraph_breaks(&text);

    text.trim().to_string()
}

/// Horizontal rules and bare list markers are made of the same characters as
/// broken emphasis; leave those lines alone.
fn is_rule_line(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '*' | '-' | '_' | ' ' | '\t'))
}

fn collapse_empty_emphasis(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if is_rule_line(line) {
                return line.to_string();
            }
            let mut current = line.to_string();
            loop {
                let next = {
                    let bold = EMPTY_BOLD.replace_all(&current, "${1}**${2}");
                    EMPTY_ITALIC.replace_all(&bold, "${1}*${2}").into_owned()
                };
                if next == current {
                    return current;
                }
                current = next;
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A blank line goes after a header unless another header follows, and after a
/// list item unless the next line continues the list or is indented under it.
fn needs_break_between(line: &str, next: &str) -> bool {
    if next.is_empty() || HEADER.is_match(next) {
        return false;
    }
    if HEADER.is_match(line) {
        return true;
    }
    LIST_ITEM.is_match(line) && !LIST_ITEM.is_match(next) && !next.starts_with(char::is_whitespace)
}

fn insert_paragraph_breaks(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::with_capacity(text.len() + 16);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line);
        if let Some(next) = lines.get(i + 1) {
            if needs_break_between(line, next) {
                out.push('\n');
            }
        }
    }
    out
}

/// `/` (URLs), digits (times, ports, ratios) and closing delimiters keep a tight colon.
fn keeps_tight_colon(next: char) -> bool {
    next.is_ascii_digit() || matches!(next, '/' | '*' | '_' | '`' | ')' | '"' | '\'')
}

fn normalize_colons(text: &str) -> String {
    COLON
        .replace_all(text, |caps: &Captures| {
            let prev = &caps[1];
            let end = caps.get(0).map_or(text.len(), |m| m.end());
            match text[end..].chars().next() {
                None | Some('\n') | Some(':') => format!("{}:", prev),
                Some(next) if caps[2].is_empty() && caps[3].is_empty() && keeps_tight_colon(next) => {
                    caps[0].to_string()
                }
                Some(_) => format!("{}: ", prev),
            }
        })
        .into_owned()
}
