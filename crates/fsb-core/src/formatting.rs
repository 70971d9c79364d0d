//! User-facing text helpers (Telegram HTML).

use std::time::Duration;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Human-readable delay, e.g. `20 minutes`, `1 minute`, `45 seconds`.
pub fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let mins = secs / 60;
        return if mins == 1 {
            "1 minute".to_string()
        } else {
            format!("{mins} minutes")
        };
    }
    if secs >= 60 {
        return format!("{}m {}s", secs / 60, secs % 60);
    }
    if secs == 1 {
        return "1 second".to_string();
    }
    format!("{secs} seconds")
}

/// Tail of an opaque file reference, safe to put in logs.
pub fn short_ref(file_ref: &str) -> String {
    let tail: Vec<char> = file_ref.chars().rev().take(10).collect();
    let tail: String = tail.into_iter().rev().collect();
    if tail.len() < file_ref.len() {
        format!("...{tail}")
    } else {
        tail
    }
}
