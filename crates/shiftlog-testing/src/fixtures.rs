//! Minimal but well-formed sample transcripts in each agent's native
//! on-disk format, plus the hook-input JSON a tool hook would have sent for
//! the commit that followed them.

use serde_json::json;

/// A generated transcript plus the hook input bytes that would have
/// triggered its capture (`None` for hookless agents like Codex).
pub struct Sample {
    pub session_id: String,
    pub transcript_bytes: Vec<u8>,
    pub hook_input: Option<Vec<u8>>,
}

fn hook_input(session_id: &str, transcript_path: &std::path::Path, tool_name: &str, command: &str) -> Vec<u8> {
    json!({
        "session_id": session_id,
        "transcript_path": transcript_path.to_string_lossy(),
        "tool_name": tool_name,
        "tool_input": { "command": command },
    })
    .to_string()
    .into_bytes()
}

/// Claude Code `.jsonl`: one record per line, `uuid`/`parentUuid`/`type`/
/// `timestamp`/`message`.
pub fn claude(transcript_path: &std::path::Path, session_id: &str) -> Sample {
    let user_uuid = "11111111-1111-1111-1111-111111111111";
    let assistant_uuid = "22222222-2222-2222-2222-222222222222";
    let lines = [
        json!({
            "uuid": user_uuid,
            "parentUuid": null,
            "type": "user",
            "timestamp": "2026-07-28T10:00:00Z",
            "message": {"role": "user", "content": "add a retry to the fetch helper"},
        }),
        json!({
            "uuid": assistant_uuid,
            "parentUuid": user_uuid,
            "type": "assistant",
            "timestamp": "2026-07-28T10:00:05Z",
            "message": {
                "role": "assistant",
                "content": "done, committing now",
                "model": "claude-sonnet-4-5",
                "usage": {"input_tokens": 120, "output_tokens": 48},
            },
        }),
    ];
    let body = lines.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n") + "\n";
    Sample {
        session_id: session_id.to_string(),
        hook_input: Some(hook_input(session_id, transcript_path, "Bash", "git commit -m 'retry fetch'")),
        transcript_bytes: body.into_bytes(),
    }
}

/// Gemini CLI, 0.29+ newline-delimited shape: `{"role": ..., "parts": [...]}`
/// per line.
pub fn gemini(transcript_path: &std::path::Path, session_id: &str) -> Sample {
    let lines = [
        json!({"role": "user", "timestamp": "2026-07-28T10:00:00Z", "parts": [{"text": "tighten the retry loop"}]}),
        json!({
            "role": "gemini",
            "timestamp": "2026-07-28T10:00:06Z",
            "parts": [{"text": "committed the change"}],
            "model": "gemini-2.5-pro",
        }),
    ];
    let body = lines.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n") + "\n";
    Sample {
        session_id: session_id.to_string(),
        hook_input: Some(hook_input(session_id, transcript_path, "run_shell_command", "git commit -m 'tighten retry loop'")),
        transcript_bytes: body.into_bytes(),
    }
}

/// Codex rollout `.jsonl`: a `session_meta` envelope then `response_item`
/// envelopes. Codex has no tool hook, so `hook_input` is `None`.
pub fn codex(session_id: &str) -> Sample {
    let lines = [
        json!({"type": "session_meta", "payload": {"id": session_id}}),
        json!({
            "type": "response_item",
            "payload": {"type": "message", "role": "user", "id": "0", "timestamp": "2026-07-28T10:00:00Z", "content": "refactor the retry helper"},
        }),
        json!({
            "type": "response_item",
            "payload": {"type": "message", "role": "assistant", "id": "1", "timestamp": "2026-07-28T10:00:09Z", "content": "refactored and committed"},
        }),
    ];
    let body = lines.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n") + "\n";
    Sample {
        session_id: session_id.to_string(),
        hook_input: None,
        transcript_bytes: body.into_bytes(),
    }
}

/// GitHub Copilot CLI `events.jsonl`.
pub fn copilot(transcript_path: &std::path::Path, session_id: &str) -> Sample {
    let lines = [
        json!({"type": "user.message", "id": "0", "timestamp": "2026-07-28T10:00:00Z", "content": "add retries"}),
        json!({"type": "assistant.message", "id": "1", "timestamp": "2026-07-28T10:00:07Z", "content": "added and committed"}),
    ];
    let body = lines.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n") + "\n";
    Sample {
        session_id: session_id.to_string(),
        hook_input: Some(hook_input(session_id, transcript_path, "shell", "git commit -m 'add retries'")),
        transcript_bytes: body.into_bytes(),
    }
}

/// OpenCode's oldest-and-always-readable shape: a single JSON array of
/// message objects.
pub fn opencode(transcript_path: &std::path::Path, session_id: &str) -> Sample {
    let body = json!([
        {"role": "user", "timestamp": "2026-07-28T10:00:00Z", "content": "wrap the fetch in a retry"},
        {"role": "assistant", "timestamp": "2026-07-28T10:00:08Z", "content": "wrapped it and committed"},
    ])
    .to_string();
    Sample {
        session_id: session_id.to_string(),
        hook_input: Some(hook_input(session_id, transcript_path, "bash", "git commit -m 'wrap fetch in retry'")),
        transcript_bytes: body.into_bytes(),
    }
}
