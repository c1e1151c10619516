//! Ticket references in commit subjects.
//!
//! Looked up on the first line only, in priority order: bracketed
//! `[ABC-123]`, bare `ABC-123`, `Fixes/Fixed/Closes/Closed #N`, then any
//! `#N`.

use std::sync::LazyLock;

use regex::Regex;

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Z]{2,}-[0-9]+)\]").expect("valid regex"));

static KEYED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9\-])([A-Z]{2,}-[0-9]+)(?:[^A-Za-z0-9]|$)").expect("valid regex")
});

static CLOSING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fixes|fixed|closes|closed) #([0-9]+)").expect("valid regex")
});

static ISSUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([0-9]+)").expect("valid regex"));

pub fn extract_ticket(message: &str) -> Option<String> {
    let subject = message.lines().next().unwrap_or("");

    if let Some(c) = BRACKETED.captures(subject) {
        return Some(c[1].to_string());
    }
    if let Some(c) = KEYED.captures(subject) {
        return Some(c[1].to_string());
    }
    if let Some(c) = CLOSING.captures(subject) {
        return Some(format!("#{}", &c[1]));
    }
    ISSUE.captures(subject).map(|c| format!("#{}", &c[1]))
}

#[cfg(test)]
#[path = "ticket_test.rs"]
mod tests;
