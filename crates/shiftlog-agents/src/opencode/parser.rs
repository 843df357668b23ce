use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::Value;
use shiftlog_types::{Entry, Message, Role, Transcript, UsageMetrics};
use std::io::Read;
use std::path::Path;

use crate::error::Result;

use super::discovery;

/// OpenCode's storage shape has changed more than once. Newest first:
/// v1.2+ keeps messages in a SQLite database; before that, a per-message
/// JSON file directory; before that, a single JSON array embedded in the
/// session file. Each older shape stays readable as a fallback.
pub fn parse_transcript_file(path: &Path) -> Result<Transcript> {
    if let Some(transcript) = try_sqlite(path)? {
        return Ok(transcript);
    }
    if let Some(transcript) = try_message_directory(path)? {
        return Ok(transcript);
    }
    parse_json_array_file(path)
}

pub fn parse(reader: &mut dyn Read) -> Result<Transcript> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_json_array_bytes(&buf)
}

fn session_id_from_path(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

fn try_sqlite(path: &Path) -> Result<Option<Transcript>> {
    let db_path = discovery::storage_root().join("opencode.db");
    if !db_path.is_file() {
        return Ok(None);
    }
    let Some(session_id) = session_id_from_path(path) else {
        return Ok(None);
    };

    let conn = Connection::open(&db_path)?;
    let mut stmt = match conn.prepare(
        "SELECT id, parent_id, role, timestamp, content FROM messages WHERE session_id = ?1 ORDER BY seq ASC",
    ) {
        Ok(stmt) => stmt,
        Err(_) => return Ok(None),
    };

    let rows = stmt.query_map([&session_id], |row| {
        let id: String = row.get(0)?;
        let parent_id: Option<String> = row.get(1)?;
        let role: String = row.get(2)?;
        let timestamp: Option<String> = row.get(3)?;
        let content: String = row.get(4)?;
        Ok((id, parent_id, role, timestamp, content))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, parent_id, role_str, timestamp, content) = row?;
        let Some(role) = Role::normalize(&role_str) else {
            continue;
        };
        let timestamp = timestamp
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let message = serde_json::from_str::<Value>(&content)
            .ok()
            .and_then(|v| serde_json::from_value::<Message>(v).ok());
        entries.push(Entry {
            id,
            parent_id,
            role,
            timestamp,
            message,
            raw: content,
        });
    }
    Ok(Some(Transcript::from_entries(entries)))
}

fn try_message_directory(path: &Path) -> Result<Option<Transcript>> {
    let session_id = match session_id_from_path(path) {
        Some(id) => id,
        None => return Ok(None),
    };
    // path is .../storage/session/<project-id>/<session-id>.json; the
    // sibling message directory swaps "session" for "message".
    let Some(project_dir) = path.parent() else {
        return Ok(None);
    };
    let Some(project_id) = project_dir.file_name() else {
        return Ok(None);
    };
    let Some(storage_root) = project_dir.parent().and_then(Path::parent) else {
        return Ok(None);
    };
    let message_dir = storage_root.join("message").join(project_id).join(&session_id);
    if !message_dir.is_dir() {
        return Ok(None);
    }

    let mut file_names: Vec<_> = std::fs::read_dir(&message_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    file_names.sort();

    let mut entries = Vec::with_capacity(file_names.len());
    for file_path in file_names {
        let raw = std::fs::read_to_string(&file_path)?;
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        let role_str = value.get("role").and_then(Value::as_str).unwrap_or("");
        let Some(role) = Role::normalize(role_str) else {
            continue;
        };
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .unwrap_or_else(|| file_path.file_stem().unwrap().to_string_lossy().to_string());
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let message = serde_json::from_value::<Message>(value).ok();
        entries.push(Entry {
            id,
            parent_id: None,
            role,
            timestamp,
            message,
            raw,
        });
    }
    Ok(Some(Transcript::from_entries(entries)))
}

fn parse_json_array_file(path: &Path) -> Result<Transcript> {
    let bytes = std::fs::read(path)?;
    parse_json_array_bytes(&bytes)
}

fn parse_json_array_bytes(buf: &[u8]) -> Result<Transcript> {
    let value: Value = serde_json::from_slice(buf)?;
    let messages = value
        .get("messages")
        .and_then(Value::as_array)
        .cloned()
        .or_else(|| value.as_array().cloned())
        .unwrap_or_default();

    let mut entries = Vec::with_capacity(messages.len());
    for (idx, item) in messages.iter().enumerate() {
        let role_str = item.get("role").and_then(Value::as_str).unwrap_or("");
        let Some(role) = Role::normalize(role_str) else {
            continue;
        };
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .unwrap_or_else(|| idx.to_string());
        let timestamp = item
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let message = serde_json::from_value::<Message>(item.clone()).ok();
        let raw = serde_json::to_string(item).unwrap_or_default();
        entries.push(Entry {
            id,
            parent_id: None,
            role,
            timestamp,
            message,
            raw,
        });
    }
    Ok(Transcript::from_entries(entries))
}

pub fn extract_usage(entry: &Entry) -> Option<UsageMetrics> {
    let value: Value = serde_json::from_str(&entry.raw).ok()?;
    let usage = value.get("usage")?;
    Some(UsageMetrics {
        input_tokens: usage.get("inputTokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("outputTokens").and_then(Value::as_u64).unwrap_or(0),
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
    fn parses_json_array_shape() {
        let input = r#"{"messages": [
            {"role": "user", "content": "hi", "id": "1"},
            {"role": "assistant", "content": "hello", "id": "2", "model": "gpt-5-codex"}
        ]}"#;
        let mut reader = input.as_bytes();
        let transcript = parse(&mut reader).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(extract_model(&transcript), Some("gpt-5-codex".to_string()));
    }
}
