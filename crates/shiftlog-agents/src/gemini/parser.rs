use chrono::{DateTime, Utc};
use serde_json::Value;
use shiftlog_types::{Entry, Message, Role, Transcript, UsageMetrics};
use std::io::Read;

use crate::error::Result;
use crate::ndjson::read_json_lines;

/// Parse a Gemini CLI transcript. Two on-disk shapes exist: a single JSON
/// object `{"messages": [...]}` (pre-0.29) and newline-delimited JSON, one
/// record per line (0.29+). Sniff the first non-whitespace byte to tell
/// them apart.
pub fn parse(reader: &mut dyn Read) -> Result<Transcript> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;

    let first_non_ws = buf.iter().find(|b| !b.is_ascii_whitespace()).copied();
    match first_non_ws {
        Some(b'{') => parse_object_shape(&buf),
        _ => parse_ndjson_shape(&buf),
    }
}

fn parse_object_shape(buf: &[u8]) -> Result<Transcript> {
    let value: Value = serde_json::from_slice(buf)?;
    let messages = value.get("messages").and_then(Value::as_array).cloned().unwrap_or_default();
    let mut entries = Vec::with_capacity(messages.len());
    for (idx, item) in messages.iter().enumerate() {
        if let Some(entry) = record_to_entry(item, idx) {
            entries.push(entry);
        }
    }
    Ok(Transcript::from_entries(entries))
}

fn parse_ndjson_shape(buf: &[u8]) -> Result<Transcript> {
    let mut cursor = buf;
    let lines = read_json_lines(&mut cursor)?;
    let mut entries = Vec::with_capacity(lines.len());
    for (idx, (_raw, value)) in lines.into_iter().enumerate() {
        if let Some(entry) = record_to_entry(&value, idx) {
            entries.push(entry);
        }
    }
    Ok(Transcript::from_entries(entries))
}

fn record_to_entry(value: &Value, idx: usize) -> Option<Entry> {
    let role_str = value
        .get("role")
        .and_then(Value::as_str)
        .or_else(|| value.get("type").and_then(Value::as_str))
        .unwrap_or("");
    let role = Role::normalize(role_str)?;

    let id = value
        .get("id")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| idx.to_string());
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let message = serde_json::from_value::<Message>(value.clone()).ok();
    let raw = serde_json::to_string(value).unwrap_or_default();

    Some(Entry {
        id,
        parent_id: None,
        role,
        timestamp,
        message,
        raw,
    })
}

/// Gemini records usage as `tokens` on the record itself, when present.
pub fn extract_usage(entry: &Entry) -> Option<UsageMetrics> {
    let value: Value = serde_json::from_str(&entry.raw).ok()?;
    let tokens = value.get("tokens")?;
    Some(UsageMetrics {
        input_tokens: tokens.get("input").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: tokens.get("output").and_then(Value::as_u64).unwrap_or(0),
        cache_creation_input_tokens: 0,
        cache_read_input_tokens: tokens.get("cached").and_then(Value::as_u64).unwrap_or(0),
    })
}

pub fn extract_model(transcript: &Transcript) -> Option<String> {
    transcript.entries.iter().rev().find_map(|entry| {
        let value: Value = serde_json::from_str(&entry.raw).ok()?;
        value.get("model").and_then(Value::as_str).map(|s| s.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_shape_with_messages_array() {
        let input = r#"{"messages": [
            {"role": "user", "content": "hi", "id": "1"},
            {"role": "model", "content": "hello", "id": "2"}
        ]}"#;
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.count_turns(), 1);
    }

    #[test]
    fn parses_ndjson_shape() {
        let input = concat!(
            r#"{"role": "user", "content": "hi", "id": "1"}"#,
            "\n",
            r#"{"role": "model", "content": "hello", "id": "2", "model": "gemini-2.5-pro"}"#,
        );
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(extract_model(&transcript), Some("gemini-2.5-pro".to_string()));
    }
}
