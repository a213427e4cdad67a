// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX shell quoting

/// Quote `s` so a POSIX shell reads it back as exactly one word.
///
/// Strings made only of characters with no shell meaning are returned bare;
/// anything else is wrapped in single quotes with embedded quotes spliced as
/// `'\''`.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '%' | ':' | ',' | '+' | '@')
    }) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}
