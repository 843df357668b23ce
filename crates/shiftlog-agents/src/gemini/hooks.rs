use serde_json::{json, Value};
use std::path::Path;

use crate::error::Result;
use crate::json_file::{ensure_array, ensure_object, load_json, write_json_atomic};
use crate::traits::DiagnosticCheck;

const SETTINGS_REL: &str = ".gemini/settings.json";
const MATCHER: &str = "run_shell_command";
const HOOK_COMMAND: &str = "shiftlog store";

fn settings_path(repo_root: &Path) -> std::path::PathBuf {
    repo_root.join(SETTINGS_REL)
}

fn entry_is_ours(entry: &Value) -> bool {
    entry.get("matcher").and_then(Value::as_str) == Some(MATCHER)
        && entry
            .get("hooks")
            .and_then(Value::as_array)
            .is_some_and(|inner| {
                inner
                    .iter()
                    .any(|h| h.get("command").and_then(Value::as_str) == Some(HOOK_COMMAND))
            })
}

pub fn configure(repo_root: &Path) -> Result<()> {
    let path = settings_path(repo_root);
    let mut settings = load_json(&path)?;
    let root = ensure_object(&mut settings);
    let hooks = ensure_object(root.entry("hooks").or_insert_with(|| json!({})));
    let after_tool = ensure_array(hooks.entry("AfterTool").or_insert_with(|| json!([])));

    if !after_tool.iter().any(entry_is_ours) {
        after_tool.push(json!({
            "matcher": MATCHER,
            "hooks": [
                {"type": "command", "command": HOOK_COMMAND, "timeout": 30}
            ]
        }));
    }

    // SessionStart/SessionEnd maintain the active-session file for the
    // hookless-equivalent discovery path when AfterTool hasn't fired yet.
    for event in ["SessionStart", "SessionEnd"] {
        let entries = ensure_array(hooks.entry(event).or_insert_with(|| json!([])));
        let command = if event == "SessionStart" {
            "shiftlog session-start"
        } else {
            "shiftlog session-end"
        };
        let already = entries.iter().any(|h| {
            h.get("hooks")
                .and_then(Value::as_array)
                .is_some_and(|inner| inner.iter().any(|i| i.get("command").and_then(Value::as_str) == Some(command)))
        });
        if !already {
            entries.push(json!({
                "hooks": [
                    {"type": "command", "command": command, "timeout": 30}
                ]
            }));
        }
    }

    write_json_atomic(&path, &settings)
}

pub fn remove(repo_root: &Path) -> Result<()> {
    let path = settings_path(repo_root);
    if !path.exists() {
        return Ok(());
    }
    let mut settings = load_json(&path)?;
    if let Some(root) = settings.as_object_mut() {
        let mut drop_hooks_key = false;
        if let Some(hooks) = root.get_mut("hooks").and_then(Value::as_object_mut) {
            if let Some(after_tool) = hooks.get_mut("AfterTool").and_then(Value::as_array_mut) {
                after_tool.retain(|entry| !entry_is_ours(entry));
                if after_tool.is_empty() {
                    hooks.remove("AfterTool");
                }
            }
            for event in ["SessionStart", "SessionEnd"] {
                hooks.remove(event);
            }
            drop_hooks_key = hooks.is_empty();
        }
        if drop_hooks_key {
            root.remove("hooks");
        }
    }
    write_json_atomic(&path, &settings)
}

pub fn diagnose(repo_root: &Path) -> Vec<DiagnosticCheck> {
    let path = settings_path(repo_root);
    let mut checks = Vec::new();

    if !path.exists() {
        checks.push(DiagnosticCheck::fail(
            "gemini.settings_file",
            format!("{SETTINGS_REL} does not exist — run init"),
        ));
        return checks;
    }
    checks.push(DiagnosticCheck::pass("gemini.settings_file", format!("{SETTINGS_REL} exists")));

    let settings = match load_json(&path) {
        Ok(v) => v,
        Err(err) => {
            checks.push(DiagnosticCheck::fail(
                "gemini.settings_parse",
                format!("failed to parse {SETTINGS_REL}: {err}"),
            ));
            return checks;
        }
    };

    let configured = settings
        .get("hooks")
        .and_then(|h| h.get("AfterTool"))
        .and_then(Value::as_array)
        .is_some_and(|arr| arr.iter().any(entry_is_ours));

    if configured {
        checks.push(DiagnosticCheck::pass(
            "gemini.after_tool_hook",
            "AfterTool hook for run_shell_command is configured",
        ));
    } else {
        checks.push(DiagnosticCheck::fail(
            "gemini.after_tool_hook",
            "AfterTool hook for run_shell_command is missing — run init",
        ));
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn configure_is_idempotent() {
        let dir = TempDir::new().unwrap();
        configure(dir.path()).unwrap();
        let after_first = std::fs::read_to_string(settings_path(dir.path())).unwrap();
        configure(dir.path()).unwrap();
        let after_second = std::fs::read_to_string(settings_path(dir.path())).unwrap();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn remove_drops_managed_events_but_keeps_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        configure(dir.path()).unwrap();
        remove(dir.path()).unwrap();
        let settings = load_json(&path).unwrap();
        assert_eq!(settings["theme"].as_str(), Some("dark"));
        assert!(settings.get("hooks").is_none());
    }
}
