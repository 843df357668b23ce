use serde_json::{json, Value};
use std::path::Path;

use crate::error::Result;
use crate::json_file::{ensure_array, ensure_object, load_json, write_json_atomic};
use crate::traits::DiagnosticCheck;

const SETTINGS_REL: &str = ".claude/settings.local.json";
const MATCHER: &str = "Bash";
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
    let post_tool_use = ensure_array(hooks.entry("PostToolUse").or_insert_with(|| json!([])));

    if !post_tool_use.iter().any(entry_is_ours) {
        post_tool_use.push(json!({
            "matcher": MATCHER,
            "hooks": [
                {"type": "command", "command": HOOK_COMMAND, "timeout": 30}
            ]
        }));
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
            if let Some(post_tool_use) = hooks.get_mut("PostToolUse").and_then(Value::as_array_mut) {
                post_tool_use.retain(|entry| !entry_is_ours(entry));
                if post_tool_use.is_empty() {
                    hooks.remove("PostToolUse");
                }
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
            "claude.settings_file",
            format!("{} does not exist — run init", SETTINGS_REL),
        ));
        return checks;
    }
    checks.push(DiagnosticCheck::pass(
        "claude.settings_file",
        format!("{SETTINGS_REL} exists"),
    ));

    let settings = match load_json(&path) {
        Ok(v) => v,
        Err(err) => {
            checks.push(DiagnosticCheck::fail(
                "claude.settings_parse",
                format!("failed to parse {SETTINGS_REL}: {err}"),
            ));
            return checks;
        }
    };

    let configured = settings
        .get("hooks")
        .and_then(|h| h.get("PostToolUse"))
        .and_then(Value::as_array)
        .is_some_and(|arr| arr.iter().any(entry_is_ours));

    if configured {
        checks.push(DiagnosticCheck::pass(
            "claude.post_tool_use_hook",
            "PostToolUse hook for Bash is configured",
        ));
    } else {
        checks.push(DiagnosticCheck::fail(
            "claude.post_tool_use_hook",
            "PostToolUse hook for Bash is missing — run init",
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
    fn configure_preserves_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"permissions": {"allow": ["Bash(ls:*)"]}}"#).unwrap();

        configure(dir.path()).unwrap();
        let settings = load_json(&path).unwrap();
        assert_eq!(
            settings["permissions"]["allow"][0].as_str(),
            Some("Bash(ls:*)")
        );
        assert!(settings["hooks"]["PostToolUse"].as_array().unwrap().len() >= 1);
    }

    #[test]
    fn remove_after_configure_leaves_no_managed_hook() {
        let dir = TempDir::new().unwrap();
        configure(dir.path()).unwrap();
        remove(dir.path()).unwrap();
        let checks = diagnose(dir.path());
        assert!(checks.iter().any(|c| !c.ok));
    }

    #[test]
    fn diagnose_passes_after_configure() {
        let dir = TempDir::new().unwrap();
        configure(dir.path()).unwrap();
        let checks = diagnose(dir.path());
        assert!(checks.iter().all(|c| c.ok));
    }
}
