use chrono::{DateTime, Utc};
use serde_json::Value;
use shiftlog_types::{ContentBlock, Entry, Message, Role, Transcript, UsageMetrics};
use std::io::Read;

use crate::error::Result;
use crate::ndjson::read_json_lines;

/// Parse a Copilot CLI `events.jsonl` transcript: one event object per
/// line, `type` one of `user.message`, `assistant.message`,
/// `tool.execution_complete`.
pub fn parse(reader: &mut dyn Read) -> Result<Transcript> {
    let lines = read_json_lines(reader)?;
    let mut entries = Vec::with_capacity(lines.len());

    for (idx, (raw, value)) in lines.into_iter().enumerate() {
        let event_type = value.get("type").and_then(Value::as_str).unwrap_or("");
        let Some(entry) = event_to_entry(event_type, &value, idx, raw) else {
            continue;
        };
        entries.push(entry);
    }

    Ok(Transcript::from_entries(entries))
}

fn event_to_entry(event_type: &str, value: &Value, idx: usize, raw: String) -> Option<Entry> {
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

    let (role, message) = match event_type {
        "user.message" => {
            let text = value.get("content").and_then(Value::as_str).unwrap_or("").to_string();
            (
                Role::User,
                Some(Message {
                    role: Role::User,
                    content: vec![ContentBlock::Text { text }],
                }),
            )
        }
        "assistant.message" => {
            let text = value.get("content").and_then(Value::as_str).unwrap_or("").to_string();
            (
                Role::Assistant,
                Some(Message {
                    role: Role::Assistant,
                    content: vec![ContentBlock::Text { text }],
                }),
            )
        }
        "tool.execution_complete" => {
            let tool_use_id = value.get("tool_call_id").and_then(Value::as_str).unwrap_or("").to_string();
            let output = value.get("output").cloned().unwrap_or(Value::Null);
            let is_error = value.get("is_error").and_then(Value::as_bool).unwrap_or(false);
            (
                Role::User,
                Some(Message {
                    role: Role::User,
                    content: vec![ContentBlock::ToolResult {
                        tool_use_id,
                        output,
                        is_error,
                    }],
                }),
            )
        }
        _ => return None,
    };

    Some(Entry {
        id,
        parent_id: None,
        role,
        timestamp,
        message,
        raw,
    })
}

pub fn extract_usage(entry: &Entry) -> Option<UsageMetrics> {
    let value: Value = serde_json::from_str(&entry.raw).ok()?;
    let usage = value.get("usage")?;
    Some(UsageMetrics {
        input_tokens: usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_creation_input_tokens: 0,
        cache_read_input_tokens: 0,
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
    fn parses_message_and_tool_events() {
        let input = concat!(
            r#"{"type":"user.message","content":"hi","id":"1"}"#,
            "\n",
            r#"{"type":"assistant.message","content":"hello","id":"2","model":"gpt-5"}"#,
            "\n",
            r#"{"type":"tool.execution_complete","tool_call_id":"t1","output":"done","id":"3"}"#,
        );
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.count_turns(), 1);
        assert_eq!(extract_model(&transcript), Some("gpt-5".to_string()));
    }
}
