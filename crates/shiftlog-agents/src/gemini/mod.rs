mod discovery;
mod hooks;
mod parser;

use std::fs;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use shiftlog_types::{Entry, Transcript, UsageMetrics};

use crate::error::Result;
use crate::helpers::is_commit_command;
use crate::traits::{Agent, DiagnosticCheck, DiscoveredSession, HookInput, RestoreRequest};

/// The Gemini CLI adapter: `.gemini/settings.json` AfterTool hooks,
/// `~/.gemini/tmp/<slug-or-sha256>/chats/session-<timestamp>.json` transcripts.
pub struct GeminiAgent;

/// Gemini's shell-executing tool names.
const SHELL_TOOLS: &[&str] = &[
    "shell",
    "shell_exec",
    "run_in_terminal",
    "execute_command",
    "run_shell_command",
];

impl Agent for GeminiAgent {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Gemini CLI"
    }

    fn configure_hooks(&self, repo_root: &Path) -> Result<()> {
        hooks::configure(repo_root)
    }

    fn remove_hooks(&self, repo_root: &Path) -> Result<()> {
        hooks::remove(repo_root)
    }

    fn diagnose_hooks(&self, repo_root: &Path) -> Vec<DiagnosticCheck> {
        hooks::diagnose(repo_root)
    }

    fn parse_hook_input(&self, raw: &[u8]) -> Result<HookInput> {
        let value: Value = serde_json::from_slice(raw)?;
        Ok(HookInput {
            session_id: value
                .get("session_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            transcript_path: value
                .get("transcript_path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tool_name: value
                .get("tool_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            command: value
                .get("tool_input")
                .and_then(|i| i.get("command"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    fn is_commit_command(&self, tool_name: &str, command: &str) -> bool {
        SHELL_TOOLS.contains(&tool_name) && is_commit_command(command)
    }

    fn parse_transcript(&self, reader: &mut dyn Read) -> Result<Transcript> {
        parser::parse(reader)
    }

    fn parse_transcript_file(&self, path: &Path) -> Result<Transcript> {
        let mut file = fs::File::open(path)?;
        parser::parse(&mut file)
    }

    fn discover_session(&self, project_path: &Path) -> Result<Option<DiscoveredSession>> {
        discovery::discover(project_path)
    }

    fn restore_session(&self, request: &RestoreRequest) -> Result<()> {
        let path = discovery::chats_dir(request.project_path).join(format!("session-{}.json", request.session_id));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, request.transcript_bytes)?;
        Ok(())
    }

    fn resume_command(&self, session_id: &str) -> (String, Vec<String>) {
        (
            "gemini".to_string(),
            vec!["--resume".to_string(), session_id.to_string()],
        )
    }

    fn tool_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("run_shell_command", "Bash")]
    }

    fn extract_usage(&self, entry: &Entry) -> Option<UsageMetrics> {
        parser::extract_usage(entry)
    }

    fn extract_model(&self, transcript: &Transcript) -> Option<String> {
        parser::extract_model(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shell_tool_name_detects_a_commit() {
        let agent = GeminiAgent;
        for tool in SHELL_TOOLS {
            assert!(agent.is_commit_command(tool, "git commit -m 'x'"));
        }
    }

    #[test]
    fn non_shell_tool_never_counts_even_with_a_commit_command() {
        let agent = GeminiAgent;
        assert!(!agent.is_commit_command("read_file", "git commit -m 'x'"));
    }

    #[test]
    fn shell_tool_without_a_commit_command_is_false() {
        let agent = GeminiAgent;
        assert!(!agent.is_commit_command("run_shell_command", "git status"));
    }
}
