use chrono::{DateTime, Utc};
use serde_json::Value;
use shiftlog_types::{Entry, Message, Role, Transcript, UsageMetrics};
use std::io::Read;

use crate::error::Result;
use crate::ndjson::read_json_lines;

/// Parse a Claude Code `.jsonl` transcript: one JSON object per line, each
/// carrying `uuid`, `parentUuid`, `type`, `timestamp`, and (for user and
/// assistant records) a `message` object.
pub fn parse(reader: &mut dyn Read) -> Result<Transcript> {
    let lines = read_json_lines(reader)?;
    let mut entries = Vec::with_capacity(lines.len());

    for (raw, value) in lines {
        let type_str = value.get("type").and_then(Value::as_str).unwrap_or("");
        let role = match Role::normalize(type_str) {
            Some(role) => role,
            None => continue, // unrecognized record kind (e.g. "summary"); skip, don't fail
        };

        let id = value
            .get("uuid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parent_id = value
            .get("parentUuid")
            .and_then(Value::as_str)
            .map(|s| s.to_string());
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let message = value
            .get("message")
            .and_then(|m| serde_json::from_value::<Message>(m.clone()).ok());

        entries.push(Entry {
            id,
            parent_id,
            role,
            timestamp,
            message,
            raw,
        });
    }

    Ok(Transcript::from_entries(entries))
}

/// Extract `message.usage` from a raw Claude record line, if present.
pub fn extract_usage(entry: &Entry) -> Option<UsageMetrics> {
    let value: Value = serde_json::from_str(&entry.raw).ok()?;
    let usage = value.get("message")?.get("usage")?;
    Some(UsageMetrics {
        input_tokens: usage.get("input_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("output_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_creation_input_tokens: usage
            .get("cache_creation_input_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        cache_read_input_tokens: usage
            .get("cache_read_input_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
    })
}

/// Extract the model identifier from the last assistant record that reports
/// one.
pub fn extract_model(transcript: &Transcript) -> Option<String> {
    transcript.entries.iter().rev().find_map(|entry| {
        let value: Value = serde_json::from_str(&entry.raw).ok()?;
        value
            .get("message")?
            .get("model")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_and_assistant_records() {
        let input = concat!(
            r#"{"uuid":"a","parentUuid":null,"type":"user","timestamp":"2024-01-01T00:00:00Z","message":{"role":"user","content":"hi"}}"#,
            "\n",
            r#"{"uuid":"b","parentUuid":"a","type":"assistant","timestamp":"2024-01-01T00:00:01Z","message":{"role":"assistant","content":[{"type":"text","text":"hello"}],"model":"claude-opus-4","usage":{"input_tokens":5,"output_tokens":3,"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}"#,
        );
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.count_turns(), 1);
        assert_eq!(extract_model(&transcript), Some("claude-opus-4".to_string()));
        let usage = extract_usage(&transcript.entries[1]).unwrap();
        assert_eq!(usage.input_tokens, 5);
        assert_eq!(usage.output_tokens, 3);
    }

    #[test]
    fn skips_unrecognized_record_types() {
        let input = concat!(
            r#"{"uuid":"a","type":"summary","summary":"a long chat"}"#,
            "\n",
            r#"{"uuid":"b","parentUuid":null,"type":"user","timestamp":"2024-01-01T00:00:00Z","message":{"role":"user","content":"hi"}}"#,
        );
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn preserves_raw_line_verbatim() {
        let line = r#"{"uuid":"a","parentUuid":null,"type":"user","timestamp":"2024-01-01T00:00:00Z","message":{"role":"user","content":"hi"}}"#;
        let mut reader = line.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.entries[0].raw, line);
    }
}
