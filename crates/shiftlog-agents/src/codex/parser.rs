use chrono::{DateTime, Utc};
use serde_json::Value;
use shiftlog_types::{ContentBlock, Entry, Message, Role, Transcript, UsageMetrics};
use std::io::Read;

use crate::error::Result;
use crate::ndjson::read_json_lines;

/// Parse a Codex rollout file: `session_meta` first, then `response_item`
/// lines whose `payload` is one of `message`, `function_call`, or
/// `function_call_output`.
pub fn parse(reader: &mut dyn Read) -> Result<Transcript> {
    let lines = read_json_lines(reader)?;
    let mut entries = Vec::with_capacity(lines.len());

    for (idx, (raw, value)) in lines.into_iter().enumerate() {
        let record_type = value.get("type").and_then(Value::as_str).unwrap_or("");
        if record_type != "response_item" {
            continue; // session_meta and any other envelope record
        }
        let Some(payload) = value.get("payload") else {
            continue;
        };
        let Some(entry) = payload_to_entry(payload, idx, raw) else {
            continue;
        };
        entries.push(entry);
    }

    Ok(Transcript::from_entries(entries))
}

fn payload_to_entry(payload: &Value, idx: usize, raw: String) -> Option<Entry> {
    let payload_type = payload.get("type").and_then(Value::as_str).unwrap_or("");
    let timestamp = payload
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let id = payload
        .get("id")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| idx.to_string());

    let (role, message) = match payload_type {
        "message" => {
            let role_str = payload.get("role").and_then(Value::as_str).unwrap_or("");
            let role = Role::normalize(role_str)?;
            let message = serde_json::from_value::<Message>(payload.clone()).ok();
            (role, message)
        }
        "function_call" => {
            let name = payload.get("name").and_then(Value::as_str).unwrap_or("").to_string();
            let call_id = payload.get("call_id").and_then(Value::as_str).unwrap_or("").to_string();
            let input = payload.get("arguments").cloned().unwrap_or(Value::Null);
            let message = Message {
                role: Role::Assistant,
                content: vec![ContentBlock::ToolUse {
                    id: call_id,
                    name,
                    input,
                }],
            };
            (Role::Assistant, Some(message))
        }
        "function_call_output" => {
            let call_id = payload.get("call_id").and_then(Value::as_str).unwrap_or("").to_string();
            let output = payload.get("output").cloned().unwrap_or(Value::Null);
            let message = Message {
                role: Role::User,
                content: vec![ContentBlock::ToolResult {
                    tool_use_id: call_id,
                    output,
                    is_error: false,
                }],
            };
            (Role::User, Some(message))
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

pub fn extract_usage(_entry: &Entry) -> Option<UsageMetrics> {
    None
}

pub fn extract_model(transcript: &Transcript) -> Option<String> {
    transcript.entries.iter().find_map(|entry| {
        let value: Value = serde_json::from_str(&entry.raw).ok()?;
        value.get("payload")?.get("model").and_then(Value::as_str).map(|s| s.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_session_meta_and_parses_message_and_tool_records() {
        let input = concat!(
            r#"{"type":"session_meta","id":"s1"}"#,
            "\n",
            r#"{"type":"response_item","payload":{"type":"message","role":"user","content":"list files"}}"#,
            "\n",
            r#"{"type":"response_item","payload":{"type":"function_call","name":"shell","call_id":"c1","arguments":"{\"command\":\"ls\"}"}}"#,
            "\n",
            r#"{"type":"response_item","payload":{"type":"function_call_output","call_id":"c1","output":"file.txt"}}"#,
            "\n",
            r#"{"type":"response_item","payload":{"type":"message","role":"assistant","content":"done"}}"#,
        );
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.count_turns(), 1);
    }
}
