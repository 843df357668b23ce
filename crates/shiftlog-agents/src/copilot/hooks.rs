use serde_json::{json, Value};
use std::path::Path;

use crate::error::Result;
use crate::json_file::{ensure_array, ensure_object, load_json, write_json_atomic};
use crate::traits::DiagnosticCheck;

const CONFIG_REL: &str = ".github/hooks/shiftlog.json";
const HOOK_COMMAND: &str = "shiftlog store";

fn config_path(repo_root: &Path) -> std::path::PathBuf {
    repo_root.join(CONFIG_REL)
}

fn entry_is_ours(entry: &Value) -> bool {
    entry.get("command").and_then(Value::as_str) == Some(HOOK_COMMAND)
}

pub fn configure(repo_root: &Path) -> Result<()> {
    let path = config_path(repo_root);
    let mut config = load_json(&path)?;
    let root = ensure_object(&mut config);
    let hooks = ensure_object(root.entry("hooks").or_insert_with(|| json!({})));
    let post_tool_use = ensure_array(hooks.entry("postToolUse").or_insert_with(|| json!([])));

    if !post_tool_use.iter().any(entry_is_ours) {
        post_tool_use.push(json!({"command": HOOK_COMMAND, "timeout": 30}));
    }

    write_json_atomic(&path, &config)
}

pub fn remove(repo_root: &Path) -> Result<()> {
    let path = config_path(repo_root);
    if !path.exists() {
        return Ok(());
    }
    let mut config = load_json(&path)?;
    if let Some(root) = config.as_object_mut() {
        let mut drop_hooks_key = false;
        if let Some(hooks) = root.get_mut("hooks").and_then(Value::as_object_mut) {
            if let Some(post_tool_use) = hooks.get_mut("postToolUse").and_then(Value::as_array_mut) {
                post_tool_use.retain(|entry| !entry_is_ours(entry));
                if post_tool_use.is_empty() {
                    hooks.remove("postToolUse");
                }
            }
            drop_hooks_key = hooks.is_empty();
        }
        if drop_hooks_key {
            root.remove("hooks");
        }
    }
    write_json_atomic(&path, &config)
}

pub fn diagnose(repo_root: &Path) -> Vec<DiagnosticCheck> {
    let path = config_path(repo_root);
    let mut checks = Vec::new();

    if !path.exists() {
        checks.push(DiagnosticCheck::fail(
            "copilot.config_file",
            format!("{CONFIG_REL} does not exist — run init"),
        ));
        return checks;
    }
    checks.push(DiagnosticCheck::pass("copilot.config_file", format!("{CONFIG_REL} exists")));

    let config = match load_json(&path) {
        Ok(v) => v,
        Err(err) => {
            checks.push(DiagnosticCheck::fail(
                "copilot.config_parse",
                format!("failed to parse {CONFIG_REL}: {err}"),
            ));
            return checks;
        }
    };

    let configured = config
        .get("hooks")
        .and_then(|h| h.get("postToolUse"))
        .and_then(Value::as_array)
        .is_some_and(|arr| arr.iter().any(entry_is_ours));

    if configured {
        checks.push(DiagnosticCheck::pass("copilot.post_tool_use_hook", "postToolUse hook is configured"));
    } else {
        checks.push(DiagnosticCheck::fail(
            "copilot.post_tool_use_hook",
            "postToolUse hook is missing — run init",
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
        let after_first = std::fs::read_to_string(config_path(dir.path())).unwrap();
        configure(dir.path()).unwrap();
        let after_second = std::fs::read_to_string(config_path(dir.path())).unwrap();
        assert_eq!(after_first, after_second);
    }
}
