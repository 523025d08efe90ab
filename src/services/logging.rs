// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Tracing setup and helpers for keeping log lines bounded.

use tracing_subscriber::EnvFilter;

/// Longest excerpt of remote text (response bodies, queries) written to logs
pub const MAX_LOGGED_CHARS: usize = 200;

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedded use) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Cut `text` to [`MAX_LOGGED_CHARS`] characters, marking the cut with `...`
pub fn truncate_for_log(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_CHARS) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_for_log("golang"), "golang");
        assert_eq!(truncate_for_log(""), "");
    }

    #[test]
    fn test_long_text_truncated() {
        let text = "a".repeat(MAX_LOGGED_CHARS + 50);
        let logged = truncate_for_log(&text);

        assert_eq!(logged.len(), MAX_LOGGED_CHARS + 3);
        assert!(logged.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(MAX_LOGGED_CHARS + 1);
        let logged = truncate_for_log(&text);

        assert_eq!(logged.chars().count(), MAX_LOGGED_CHARS + 3);
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing("debug");
        init_tracing("info");
    }
}
