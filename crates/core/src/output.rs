// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of captured script output
//!
//! Scripts write free-form log text and may append two delimited sections:
//!
//! ```text
//! BEGIN_EXTRA_PAYLOAD
//! <JSON, or a MIME document carrying JSON parts>
//! END_EXTRA_PAYLOAD
//! BEGIN_EXTRA_RET_ERR_MSG
//! <error text>
//! END_EXTRA_RET_ERR_MSG
//! ```
//!
//! Neither section is required. Buffers cut short by a timeout are accepted:
//! an unterminated section is handed back as ordinary log text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

pub const PAYLOAD_BEGIN: &str = "BEGIN_EXTRA_PAYLOAD";
pub const PAYLOAD_END: &str = "END_EXTRA_PAYLOAD";
pub const ERR_MSG_BEGIN: &str = "BEGIN_EXTRA_RET_ERR_MSG";
pub const ERR_MSG_END: &str = "END_EXTRA_RET_ERR_MSG";

/// Structured view of a raw output buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedOutput {
    pub log_lines: Vec<String>,
    pub payload: Option<Value>,
    /// Error text the script reported about itself
    pub error_message: Option<String>,
}

enum Section {
    Log,
    Payload(Vec<String>),
    ErrMsg(Vec<String>),
}

/// Split a raw buffer into log lines, an optional payload and optional
/// script-reported error text.
pub fn classify(raw: &[u8]) -> ClassifiedOutput {
    let text = String::from_utf8_lossy(raw);
    let mut out = ClassifiedOutput::default();
    let mut payloads = Vec::new();
    let mut err_lines: Vec<String> = Vec::new();
    let mut section = Section::Log;

    for line in text.lines() {
        let trimmed = line.trim();
        section = match section {
            Section::Log => {
                if trimmed.starts_with(PAYLOAD_BEGIN) {
                    Section::Payload(Vec::new())
                } else if trimmed.starts_with(ERR_MSG_BEGIN) {
                    Section::ErrMsg(Vec::new())
                } else {
                    if !trimmed.is_empty() {
                        out.log_lines.push(trimmed.to_string());
                    }
                    Section::Log
                }
            }
            Section::Payload(mut lines) => {
                if trimmed.starts_with(PAYLOAD_END) {
                    match decode_payload(&lines) {
                        Some(value) => payloads.push(value),
                        None => tracing::warn!(
                            lines = lines.len(),
                            "payload section carried no decodable JSON"
                        ),
                    }
                    Section::Log
                } else {
                    lines.push(trimmed.to_string());
                    Section::Payload(lines)
                }
            }
            Section::ErrMsg(mut lines) => {
                if trimmed.starts_with(ERR_MSG_END) {
                    err_lines.append(&mut lines);
                    Section::Log
                } else {
                    lines.push(line.trim_end().to_string());
                    Section::ErrMsg(lines)
                }
            }
        };
    }

    // Cut off mid-section (timeout or crash): keep the text as log
    if let Section::Payload(lines) | Section::ErrMsg(lines) = section {
        out.log_lines.extend(
            lines
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        );
    }

    out.payload = merge(payloads);
    if !err_lines.is_empty() {
        out.error_message = Some(err_lines.join("\n"));
    }
    out
}

/// Drop lines from the end until the log fits in `max_bytes`, then append a
/// marker with the number of characters removed. Returns that number.
pub fn truncate_log_lines(lines: &mut Vec<String>, max_bytes: usize) -> usize {
    let mut total: usize = lines.iter().map(String::len).sum();
    if total <= max_bytes {
        return 0;
    }

    let mut removed = 0;
    while total > max_bytes {
        let Some(line) = lines.pop() else { break };
        total -= line.len();
        removed += line.chars().count();
    }
    lines.push(format!("[...] TRUNCATED CHARS : {}", removed));
    removed
}

fn decode_payload(lines: &[String]) -> Option<Value> {
    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let mut found = Vec::new();
    collect_json_parts(text, &mut found);
    merge(found)
}

/// Walk a MIME entity, collecting every JSON leaf part
fn collect_json_parts(entity: &str, out: &mut Vec<Value>) {
    let (headers, body) = split_headers(entity);
    let Some(content_type) = header(&headers, "content-type") else {
        return;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime.starts_with("multipart/") {
        if let Some(boundary) = parameter(content_type, "boundary") {
            for part in split_multipart(body, &boundary) {
                collect_json_parts(part, out);
            }
        }
        return;
    }

    if !mime.ends_with("/json") {
        return;
    }

    let base64 = header(&headers, "content-transfer-encoding")
        .is_some_and(|enc| enc.eq_ignore_ascii_case("base64"));
    let decoded = if base64 {
        let compact: String = body.split_whitespace().collect();
        STANDARD
            .decode(compact)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    } else {
        Some(body.to_string())
    };

    if let Some(value) = decoded.and_then(|s| serde_json::from_str(s.trim()).ok()) {
        out.push(value);
    }
}

/// Split header block from body. Lines without a `name:` prefix continue the
/// previous header, since line trimming has already removed fold indentation.
fn split_headers(entity: &str) -> (Vec<(String, String)>, &str) {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut rest = entity;

    loop {
        let (line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            return (headers, remainder);
        }

        match line.split_once(':').filter(|(name, _)| is_header_name(name)) {
            Some((name, value)) => {
                headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()))
            }
            None => match headers.last_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                None => return (Vec::new(), entity),
            },
        }

        if remainder.is_empty() {
            return (headers, "");
        }
        rest = remainder;
    }
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn parameter(value: &str, name: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.split_once('=')?;
        (key.trim().eq_ignore_ascii_case(name)).then(|| val.trim().trim_matches('"').to_string())
    })
}

fn split_multipart<'a>(body: &'a str, boundary: &str) -> Vec<&'a str> {
    let delimiter = format!("--{}", boundary);
    body.split(delimiter.as_str())
        .skip(1)
        .take_while(|chunk| !chunk.starts_with("--"))
        .map(|chunk| chunk.trim_start_matches(['\r', '\n']))
        .collect()
}

/// Combine payloads; JSON objects are merged with later keys winning
fn merge(values: Vec<Value>) -> Option<Value> {
    let mut iter = values.into_iter();
    let mut merged = iter.next()?;
    for value in iter {
        match value {
            Value::Object(next) if merged.is_object() => {
                if let Value::Object(acc) = &mut merged {
                    acc.extend(next);
                }
            }
            other => merged = other,
        }
    }
    Some(merged)
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
